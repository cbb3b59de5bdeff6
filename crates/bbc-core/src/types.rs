//! Core driver types: hashes, addresses, outpoints, UTXOs and balances.
//!
//! Monetary values are arbitrary-precision integers in the smallest unit.
//! Transaction ids arrive from the node as hex strings and are only parsed
//! into [`Hash256`] when a transaction is encoded.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::MAX_OUTPUT_INDEX;
use crate::error::CodecError;

/// A 32-byte hash value.
///
/// Used for transaction ids, the chain anchor (genesis hash) and the
/// signable digest of an unsigned transaction.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The zero hash (32 zero bytes).
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create a Hash256 from a byte array.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Lowercase hex rendering (64 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for Hash256 {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| CodecError::MalformedHash(s.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CodecError::MalformedHash(s.to_string()))?;
        Ok(Self(arr))
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// An encoded chain address.
///
/// Address encoding and decoding belong to the wallet layer; the driver
/// treats addresses as opaque strings and writes their bytes verbatim into
/// the transaction's destination field.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Wrap an encoded address string.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// The encoded address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw bytes written into the destination field.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Reference to a specific output of a previous transaction, as reported
/// by the node.
///
/// The txid is kept in its lowercase hex form so that UTXOs and pending-pool
/// entries compare equal regardless of how the node capitalised them.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct OutPoint {
    /// Transaction id (hex).
    pub txid: String,
    /// Index of the output within the transaction.
    pub index: u32,
}

impl OutPoint {
    pub fn new(txid: impl Into<String>, index: u32) -> Self {
        Self {
            txid: txid.into().to_ascii_lowercase(),
            index,
        }
    }

    /// Parse into the fixed-width form used by the transaction encoding.
    ///
    /// Fails if the txid is not 32 bytes of hex or the index does not fit
    /// in one byte.
    pub fn parse(&self) -> Result<(Hash256, u8), CodecError> {
        let malformed = || CodecError::MalformedOutPoint {
            txid: self.txid.clone(),
            index: self.index,
        };
        let txid: Hash256 = self.txid.parse().map_err(|_| malformed())?;
        if self.index > MAX_OUTPUT_INDEX {
            return Err(malformed());
        }
        Ok((txid, self.index as u8))
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.index)
    }
}

/// A candidate spendable output at query time. May be stale by the time it
/// is spent.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Utxo {
    pub outpoint: OutPoint,
    /// Value in the smallest unit.
    pub amount: BigUint,
}

impl Utxo {
    pub fn new(txid: impl Into<String>, index: u32, amount: impl Into<BigUint>) -> Self {
        Self {
            outpoint: OutPoint::new(txid, index),
            amount: amount.into(),
        }
    }
}

/// An output already consumed by a transaction sitting in the node's
/// unconfirmed pool. Used only as an exclusion set.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PendingSpend {
    pub txid: String,
    pub index: u32,
}

impl PendingSpend {
    pub fn new(txid: impl Into<String>, index: u32) -> Self {
        Self {
            txid: txid.into(),
            index,
        }
    }

    /// The outpoint this pending spend consumes.
    pub fn outpoint(&self) -> OutPoint {
        OutPoint::new(self.txid.clone(), self.index)
    }
}

/// Spendable balance of one address.
///
/// `ordinal` records the position of the address in the caller's address
/// list and breaks ties between equal balances.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AddressBalance {
    pub address: Address,
    /// Balance in the smallest unit.
    pub balance: BigUint,
    pub ordinal: usize,
}

/// Wallet-side record of an address owned by an account.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AddressInfo {
    pub address: Address,
    pub account_id: String,
    /// Hex-encoded public key controlling this address.
    pub public_key: String,
    /// HD derivation path of the signing key.
    pub hd_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_hex_roundtrip() {
        let h = Hash256([0xAB; 32]);
        let parsed: Hash256 = h.to_hex().parse().unwrap();
        assert_eq!(parsed, h);
        assert_eq!(h.to_string(), h.to_hex());
    }

    #[test]
    fn hash_rejects_short_hex() {
        let err = "abcd".parse::<Hash256>().unwrap_err();
        assert!(matches!(err, CodecError::MalformedHash(_)));
    }

    #[test]
    fn hash_rejects_non_hex() {
        let s = "zz".repeat(32);
        assert!(s.parse::<Hash256>().is_err());
    }

    #[test]
    fn outpoint_normalises_case() {
        let a = OutPoint::new("ABCDEF", 1);
        let b = OutPoint::new("abcdef", 1);
        assert_eq!(a, b);
    }

    #[test]
    fn outpoint_parse_valid() {
        let op = OutPoint::new("11".repeat(32), 3);
        let (txid, vout) = op.parse().unwrap();
        assert_eq!(txid, Hash256([0x11; 32]));
        assert_eq!(vout, 3);
    }

    #[test]
    fn outpoint_parse_rejects_large_index() {
        let op = OutPoint::new("11".repeat(32), 256);
        assert!(matches!(
            op.parse(),
            Err(CodecError::MalformedOutPoint { index: 256, .. })
        ));
    }

    #[test]
    fn outpoint_parse_rejects_bad_txid() {
        let op = OutPoint::new("not-a-txid", 0);
        assert!(op.parse().is_err());
    }

    #[test]
    fn pending_spend_matches_utxo_outpoint() {
        let utxo = Utxo::new("AA".repeat(32), 0, 10u32);
        let pending = PendingSpend::new("aa".repeat(32), 0);
        assert_eq!(pending.outpoint(), utxo.outpoint);
    }

    #[test]
    fn address_serializes_transparently() {
        let addr = Address::from("1abc");
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"1abc\"");
    }
}
