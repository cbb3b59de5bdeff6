//! Explicit driver context passed to every component.
//!
//! Holds the node capability and the validated configuration. There is no
//! process-wide client or config state; callers build one context and share
//! it by reference.

use std::fmt;
use std::sync::Arc;

use bbc_core::crypto::SignatureScheme;
use bbc_core::traits::NodeApi;
use num_bigint::BigUint;

use crate::config::DriverConfig;
use crate::error::WalletError;

/// Node access plus configuration for one driver instance.
#[derive(Clone)]
pub struct DriverContext {
    node: Arc<dyn NodeApi>,
    config: DriverConfig,
    fixed_fee: BigUint,
}

impl DriverContext {
    /// Validate `config` and bundle it with the node capability.
    pub fn new(node: Arc<dyn NodeApi>, config: DriverConfig) -> Result<Self, WalletError> {
        config.validate()?;
        let fixed_fee = config.fixed_fee_units()?;
        Ok(Self {
            node,
            config,
            fixed_fee,
        })
    }

    pub fn node(&self) -> &dyn NodeApi {
        self.node.as_ref()
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Configured fixed fee in smallest units.
    pub fn fixed_fee(&self) -> &BigUint {
        &self.fixed_fee
    }

    /// The caller's fee if given, otherwise the configured fixed fee.
    pub fn fee_or_default(&self, fee: Option<&BigUint>) -> BigUint {
        fee.cloned().unwrap_or_else(|| self.fixed_fee.clone())
    }

    pub fn scheme(&self) -> SignatureScheme {
        self.config.scheme
    }
}

impl fmt::Debug for DriverContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverContext")
            .field("config", &self.config)
            .field("fixed_fee", &self.fixed_fee)
            .finish_non_exhaustive()
    }
}
