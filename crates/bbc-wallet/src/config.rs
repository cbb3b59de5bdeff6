//! Driver configuration.
//!
//! Provides [`DriverConfig`] with defaults for the BigBang token driver. The
//! configuration can be built programmatically or loaded from an optional
//! file layered under `BBC_*` environment variables.

use std::path::Path;

use bbc_core::amount::parse_amount;
use bbc_core::constants::{DEFAULT_DECIMALS, MAX_DECIMALS};
use bbc_core::crypto::SignatureScheme;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::error::WalletError;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "BBC";

/// Configuration for a driver instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Asset symbol.
    pub symbol: String,
    /// Decimal places between a whole coin and the smallest unit.
    pub decimals: u32,
    /// Fee charged when the caller supplies none, as a decimal coin amount.
    pub fixed_fee: String,
    /// Curve/scheme tag written into key signatures.
    pub scheme: SignatureScheme,
    /// Worker threads used for consolidation passes.
    pub consolidation_workers: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            symbol: "BBC".to_string(),
            decimals: DEFAULT_DECIMALS,
            fixed_fee: "0.01".to_string(),
            scheme: SignatureScheme::Ed25519,
            consolidation_workers: 1,
        }
    }
}

impl DriverConfig {
    /// Load configuration from an optional file and the environment.
    ///
    /// The file format follows its extension (TOML, JSON, YAML). A missing
    /// file is not an error. Environment variables such as `BBC_FIXED_FEE`
    /// override file values.
    pub fn load(path: Option<&Path>) -> Result<Self, WalletError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));

        let cfg: DriverConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| WalletError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check value ranges and that the fixed fee parses.
    pub fn validate(&self) -> Result<(), WalletError> {
        if self.decimals > MAX_DECIMALS {
            return Err(WalletError::Config(format!(
                "decimals {} exceeds {MAX_DECIMALS}",
                self.decimals
            )));
        }
        if self.consolidation_workers == 0 {
            return Err(WalletError::Config(
                "consolidation_workers must be at least 1".into(),
            ));
        }
        self.fixed_fee_units()?;
        Ok(())
    }

    /// The fixed fee in smallest units.
    pub fn fixed_fee_units(&self) -> Result<BigUint, WalletError> {
        parse_amount(&self.fixed_fee, self.decimals)
            .map_err(|e| WalletError::Config(format!("fixed_fee: {e}")))
    }
}
