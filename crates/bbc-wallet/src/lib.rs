//! # bbc-wallet: transaction construction and signing for BigBang.
//!
//! Selects spendable outputs from a single funded address, builds the
//! canonical unsigned transaction, coordinates signing with an external key
//! holder, verifies and combines the signature, and generates per-address
//! consolidation ("summary") transactions.
//!
//! # Modules
//!
//! - [`error`]: `WalletError` enum
//! - [`config`]: `DriverConfig` (fixed fee, scheme, decimals, workers)
//! - [`context`]: `DriverContext` bundling node access and configuration
//! - [`ledger`]: Balance Ledger View
//! - [`pending`]: Pending-Spend Filter
//! - [`coin_selection`]: single-address greedy UTXO selection
//! - [`request`]: `TransactionRequest` and `KeySignature` records
//! - [`builder`]: raw transaction builder
//! - [`signer`]: signature coordinator
//! - [`verify`]: verify-and-combine engine
//! - [`consolidation`]: summary transaction generator
//! - [`decoder`]: `TransactionDecoder`, the operations exposed to the wallet
//! - [`keys`]: seed-backed reference key holder

pub mod builder;
pub mod coin_selection;
pub mod config;
pub mod consolidation;
pub mod context;
pub mod decoder;
pub mod error;
pub mod keys;
pub mod ledger;
pub mod pending;
pub mod request;
pub mod signer;
pub mod verify;

#[cfg(any(test, feature = "testing"))]
pub mod mock;

// Re-exports for convenient access
pub use builder::{RawTransactionBuilder, UnsignedTransaction};
pub use coin_selection::{CoinSelection, CoinSelector};
pub use config::DriverConfig;
pub use consolidation::{ConsolidationParams, ConsolidationResult, ConsolidationReport};
pub use context::DriverContext;
pub use decoder::TransactionDecoder;
pub use error::WalletError;
pub use keys::{Seed, SeedKeyHolder};
pub use ledger::BalanceLedger;
pub use pending::PendingSpendFilter;
pub use request::{Destination, KeySignature, SubmittedTransaction, TransactionRequest};
