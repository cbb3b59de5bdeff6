//! Protocol constants for BigBang token transfers.
//!
//! All monetary values inside the driver are integers in the smallest unit.

/// Default number of decimal places between one coin and the smallest unit.
pub const DEFAULT_DECIMALS: u32 = 6;

/// Largest decimal scale accepted by amount parsing.
pub const MAX_DECIMALS: u32 = 18;

/// Transaction format version written by the builder.
pub const TX_VERSION: u16 = 1;

/// Transaction type tag for a plain token transfer.
pub const TX_TYPE_TOKEN: u16 = 0;

/// Lock time for transactions built by this driver (no timelock).
pub const NO_LOCK_UNTIL: u32 = 0;

/// Size of an Ed25519 signature in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// Size of an Ed25519 public key in bytes.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Output indexes are encoded as a single byte.
pub const MAX_OUTPUT_INDEX: u32 = u8::MAX as u32;

/// Unit reported alongside the fixed fee: the fee is charged per transaction.
pub const FEE_UNIT: &str = "TX";
