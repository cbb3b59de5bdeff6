//! Wallet driver error types.

use bbc_core::error::{AmountError, CodecError, CryptoError, NodeError};
use bbc_core::types::Address;
use num_bigint::BigUint;
use thiserror::Error;

/// Errors that can occur while building, signing, verifying or submitting
/// a transaction.
///
/// Amounts are reported in the smallest unit. No variant carries key
/// material.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// Not enough funds across all of the account's addresses.
    #[error("insufficient balance: need {need}, account total {total}")]
    InsufficientBalance {
        /// Amount plus fee.
        need: BigUint,
        /// Sum of all address balances.
        total: BigUint,
    },

    /// The account holds enough in aggregate, but no single address does.
    #[error("cannot fund {need} from one address (account total {total}); multi-address funding is not supported")]
    CannotSplitAcrossAddresses {
        /// Amount plus fee.
        need: BigUint,
        /// Sum of all address balances.
        total: BigUint,
    },

    /// Funds exist but are tied up in unconfirmed transactions.
    #[error("funds of {address} are pending confirmation; retry later")]
    PendingConfirmationRequired {
        /// The address (or, for a multi-candidate build, the last candidate tried).
        address: Address,
    },

    /// A node lookup could not be completed.
    #[error("node unavailable during {step}: {reason}")]
    NodeUnavailable {
        /// Which lookup failed.
        step: &'static str,
        /// Transport or response error.
        reason: String,
    },

    /// The key holder could not produce the signing key.
    #[error("key derivation for {address}: {reason}")]
    KeyDerivation {
        address: Address,
        reason: String,
    },

    /// The signing primitive failed.
    #[error("signing: {0}")]
    Signing(String),

    /// Signature does not match the digest and public key.
    #[error("signature verification failed for {address}")]
    VerificationFailed {
        address: Address,
    },

    /// Malformed UTXO reference, digest or transaction bytes.
    #[error("encoding: {0}")]
    Encoding(String),

    /// The account has no addresses.
    #[error("account {account} has no addresses")]
    NoAddresses {
        account: String,
    },

    /// An address selected for spending is not known to the wallet store.
    #[error("unknown address: {0}")]
    UnknownAddress(String),

    /// Invalid monetary amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Minimum transfer is below the retained balance.
    #[error("minimum transfer {min_transfer} must not be below retained balance {retained}")]
    InvalidThreshold {
        min_transfer: BigUint,
        retained: BigUint,
    },

    /// The request has not been built yet.
    #[error("transaction has not been built")]
    NotBuilt,

    /// The request has not passed verification.
    #[error("transaction is not completed")]
    NotCompleted,

    /// Invalid driver configuration.
    #[error("config: {0}")]
    Config(String),
}

impl WalletError {
    /// Wrap a node failure with the step that issued the lookup.
    pub fn node(step: &'static str, err: NodeError) -> Self {
        WalletError::NodeUnavailable {
            step,
            reason: err.to_string(),
        }
    }

    /// Whether retrying the whole pipeline later may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            WalletError::PendingConfirmationRequired { .. }
                | WalletError::NodeUnavailable { .. }
                | WalletError::VerificationFailed { .. }
        )
    }
}

impl From<CodecError> for WalletError {
    fn from(e: CodecError) -> Self {
        WalletError::Encoding(e.to_string())
    }
}

impl From<AmountError> for WalletError {
    fn from(e: AmountError) -> Self {
        WalletError::InvalidAmount(e.to_string())
    }
}

impl From<CryptoError> for WalletError {
    fn from(e: CryptoError) -> Self {
        WalletError::Signing(e.to_string())
    }
}
