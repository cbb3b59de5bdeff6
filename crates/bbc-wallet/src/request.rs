//! Transaction request records.
//!
//! A [`TransactionRequest`] carries one transfer through the
//! build, sign, verify and submit pipeline. It always has exactly one source
//! address and exactly one destination.

use bbc_core::crypto::{PublicKey, SignatureScheme};
use bbc_core::types::{Address, AddressInfo, Hash256};
use chrono::{DateTime, Utc};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::error::WalletError;

/// The single payment of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub address: Address,
    /// Amount in the smallest unit.
    pub amount: BigUint,
}

impl Destination {
    pub fn new(address: impl Into<Address>, amount: impl Into<BigUint>) -> Self {
        Self {
            address: address.into(),
            amount: amount.into(),
        }
    }
}

/// Signature slot for one signer of a transaction.
///
/// Created empty by the builder, filled by the signer and consumed by
/// verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySignature {
    /// The address whose key must sign.
    pub signer: AddressInfo,
    /// The digest to sign.
    pub digest: Hash256,
    /// Signature bytes; empty until signed.
    pub signature: Vec<u8>,
    pub scheme: SignatureScheme,
}

impl KeySignature {
    /// An unsigned slot for `signer` over `digest`.
    pub fn empty(signer: AddressInfo, digest: Hash256, scheme: SignatureScheme) -> Self {
        Self {
            signer,
            digest,
            signature: Vec::new(),
            scheme,
        }
    }

    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }

    /// The signer's recorded public key.
    pub fn public_key(&self) -> Result<PublicKey, WalletError> {
        PublicKey::from_hex(&self.signer.public_key).map_err(|e| {
            WalletError::Encoding(format!("public key of {}: {e}", self.signer.address))
        })
    }
}

/// One transfer moving through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub account_id: String,
    /// The single source address, set when the request is built.
    pub from: Address,
    pub to: Destination,
    /// Fee in the smallest unit.
    pub fee: BigUint,
    pub memo: String,
    /// Always 0 (no timelock).
    pub lock_until: u32,
    /// Genesis hash of the targeted fork.
    pub anchor: Hash256,
    /// Canonical transaction bytes: unsigned after building, signed once
    /// verification succeeds.
    pub raw: Vec<u8>,
    /// Signable digest of `raw`.
    pub digest: Hash256,
    pub signatures: Vec<KeySignature>,
    pub is_built: bool,
    pub is_completed: bool,
    pub is_submitted: bool,
    /// Set by submission.
    pub txid: Option<String>,
}

impl TransactionRequest {
    /// A request to pay `to` from `account_id`, not yet built.
    pub fn new(account_id: impl Into<String>, to: Destination) -> Self {
        Self {
            account_id: account_id.into(),
            from: Address::default(),
            to,
            fee: BigUint::default(),
            memo: String::new(),
            lock_until: 0,
            anchor: Hash256::ZERO,
            raw: Vec::new(),
            digest: Hash256::ZERO,
            signatures: Vec::new(),
            is_built: false,
            is_completed: false,
            is_submitted: false,
            txid: None,
        }
    }
}

/// A broadcast transaction as reported back to the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedTransaction {
    pub txid: String,
    pub from: Address,
    pub to: Address,
    pub amount: BigUint,
    pub fee: BigUint,
    pub account_id: String,
    /// Decimal places of `amount` and `fee` when displayed.
    pub decimals: u32,
    pub submitted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bbc_core::crypto::KeyPair;

    fn info(public_key: String) -> AddressInfo {
        AddressInfo {
            address: Address::from("A"),
            account_id: "acct".into(),
            public_key,
            hd_path: "m/0".into(),
        }
    }

    #[test]
    fn new_request_is_unbuilt() {
        let req = TransactionRequest::new("acct", Destination::new("D", 80u32));
        assert!(!req.is_built && !req.is_completed && !req.is_submitted);
        assert!(req.raw.is_empty());
        assert!(req.memo.is_empty());
        assert_eq!(req.lock_until, 0);
    }

    #[test]
    fn empty_slot_then_signed() {
        let kp = KeyPair::from_secret_bytes([3; 32]);
        let mut slot = KeySignature::empty(
            info(kp.public_key().to_hex()),
            Hash256([1; 32]),
            SignatureScheme::Ed25519,
        );
        assert!(!slot.is_signed());
        slot.signature = kp.sign(slot.digest.as_bytes()).to_vec();
        assert!(slot.is_signed());
        assert_eq!(slot.public_key().unwrap(), kp.public_key());
    }

    #[test]
    fn bad_public_key_is_encoding_error() {
        let slot = KeySignature::empty(info("zz".into()), Hash256::ZERO, SignatureScheme::Ed25519);
        assert!(matches!(slot.public_key(), Err(WalletError::Encoding(_))));
    }

    #[test]
    fn request_serde_roundtrip() {
        let req = TransactionRequest::new("acct", Destination::new("D", 7u32));
        let json = serde_json::to_string(&req).unwrap();
        let back: TransactionRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, req);
    }
}
