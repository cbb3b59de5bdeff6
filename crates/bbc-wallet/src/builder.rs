//! Raw transaction builder.
//!
//! Turns a coin selection and a destination into the canonical unsigned
//! transaction and its signable digest:
//! 1. Parse every selected outpoint into its fixed-width input form
//! 2. Narrow amount and fee to the encoding width
//! 3. Encode with an empty signature and hash the payload
//!
//! The encoding has one explicit output. Change returns to the source
//! address implicitly, so nothing else is written.

use bbc_core::amount::to_wire;
use bbc_core::codec::{RawTransaction, TxInput};
use bbc_core::constants::{NO_LOCK_UNTIL, TX_TYPE_TOKEN, TX_VERSION};
use bbc_core::crypto::SignatureScheme;
use bbc_core::traits::WalletStore;
use bbc_core::types::Hash256;
use num_bigint::BigUint;
use tracing::debug;

use crate::coin_selection::CoinSelection;
use crate::error::WalletError;
use crate::request::{Destination, KeySignature, TransactionRequest};

/// An unsigned transaction ready for signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    /// The transaction with an empty signature.
    pub tx: RawTransaction,
    /// Canonical encoding of `tx`.
    pub raw: Vec<u8>,
    /// Digest to sign.
    pub digest: Hash256,
}

/// Builder for the canonical unsigned transaction.
///
/// # Example
/// ```ignore
/// let unsigned = RawTransactionBuilder::new(anchor)
///     .set_memo("invoice 42")
///     .build(&selection, &destination, &fee)?;
/// ```
#[derive(Debug, Clone)]
pub struct RawTransactionBuilder {
    anchor: Hash256,
    memo: String,
    timestamp: Option<u32>,
}

impl RawTransactionBuilder {
    /// Builder for a transaction on the fork identified by `anchor`.
    pub fn new(anchor: Hash256) -> Self {
        Self {
            anchor,
            memo: String::new(),
            timestamp: None,
        }
    }

    pub fn set_memo(&mut self, memo: impl Into<String>) -> &mut Self {
        self.memo = memo.into();
        self
    }

    /// Fix the creation time instead of reading the clock.
    pub fn set_timestamp(&mut self, timestamp: u32) -> &mut Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Build the unsigned transaction spending `selection` to pay `to`.
    ///
    /// Fails with `Encoding` if an input reference is malformed or a value
    /// does not fit the encoding.
    pub fn build(
        &self,
        selection: &CoinSelection,
        to: &Destination,
        fee: &BigUint,
    ) -> Result<UnsignedTransaction, WalletError> {
        if selection.inputs.is_empty() {
            return Err(WalletError::Encoding("transaction has no inputs".into()));
        }

        let inputs = selection
            .inputs
            .iter()
            .map(|utxo| -> Result<TxInput, WalletError> {
                let (txid, vout) = utxo.outpoint.parse()?;
                Ok(TxInput { txid, vout })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let tx = RawTransaction {
            version: TX_VERSION,
            tx_type: TX_TYPE_TOKEN,
            timestamp: self.timestamp()?,
            lock_until: NO_LOCK_UNTIL,
            anchor: self.anchor,
            inputs,
            send_to: to.address.clone(),
            amount: to_wire(&to.amount, "amount")?,
            fee: to_wire(fee, "fee")?,
            memo: self.memo.as_bytes().to_vec(),
            signature: Vec::new(),
        };

        let raw = tx.encode();
        let digest = tx.digest();
        debug!(
            from = %selection.address,
            to = %to.address,
            inputs = tx.inputs.len(),
            %digest,
            "built unsigned transaction"
        );

        Ok(UnsignedTransaction { tx, raw, digest })
    }

    /// Build `selection` into a [`TransactionRequest`] for `account_id`.
    ///
    /// Looks up the source address in `store` to attach an empty signature
    /// slot for its key. Fails with `UnknownAddress` if the store does not
    /// know it.
    pub fn build_request(
        &self,
        store: &dyn WalletStore,
        account_id: &str,
        selection: &CoinSelection,
        to: Destination,
        fee: BigUint,
        scheme: SignatureScheme,
    ) -> Result<TransactionRequest, WalletError> {
        let signer = store
            .address(&selection.address)
            .ok_or_else(|| WalletError::UnknownAddress(selection.address.to_string()))?;
        let unsigned = self.build(selection, &to, &fee)?;

        let mut request = TransactionRequest::new(account_id, to);
        request.from = selection.address.clone();
        request.fee = fee;
        request.memo = self.memo.clone();
        request.lock_until = unsigned.tx.lock_until;
        request.anchor = self.anchor;
        request.digest = unsigned.digest;
        request.raw = unsigned.raw;
        request.signatures = vec![KeySignature::empty(signer, unsigned.digest, scheme)];
        request.is_built = true;
        Ok(request)
    }

    fn timestamp(&self) -> Result<u32, WalletError> {
        match self.timestamp {
            Some(ts) => Ok(ts),
            None => u32::try_from(chrono::Utc::now().timestamp())
                .map_err(|_| WalletError::Encoding("clock outside timestamp range".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{ANCHOR, MemoryWallet, big, txid};
    use bbc_core::types::{Address, Utxo};

    fn selection(utxos: Vec<Utxo>) -> CoinSelection {
        let total = utxos.iter().map(|u| &u.amount).sum();
        CoinSelection {
            address: Address::from("A"),
            inputs: utxos,
            total,
        }
    }

    fn builder() -> RawTransactionBuilder {
        let mut b = RawTransactionBuilder::new(ANCHOR);
        b.set_timestamp(1_700_000_000);
        b
    }

    #[test]
    fn builds_single_output() {
        let sel = selection(vec![Utxo::new(txid(1), 0, 60u32), Utxo::new(txid(1), 2, 40u32)]);
        let unsigned = builder()
            .set_memo("memo")
            .build(&sel, &Destination::new("D", 80u32), &big(5))
            .unwrap();

        let tx = &unsigned.tx;
        assert_eq!(tx.inputs.len(), 2);
        assert_eq!(tx.inputs[1].vout, 2);
        assert_eq!(tx.send_to.as_str(), "D");
        assert_eq!(tx.amount, 80);
        assert_eq!(tx.fee, 5);
        assert_eq!(tx.lock_until, 0);
        assert_eq!(tx.anchor, ANCHOR);
        assert_eq!(tx.memo, b"memo");
        assert!(!tx.is_signed());
        assert_eq!(RawTransaction::decode(&unsigned.raw).unwrap(), *tx);
        assert_eq!(unsigned.digest, tx.digest());
    }

    #[test]
    fn digest_is_deterministic() {
        let sel = selection(vec![Utxo::new(txid(1), 0, 60u32)]);
        let to = Destination::new("D", 50u32);
        let a = builder().build(&sel, &to, &big(1)).unwrap();
        let b = builder().build(&sel, &to, &big(1)).unwrap();
        assert_eq!(a, b);
        let c = builder().build(&sel, &to, &big(2)).unwrap();
        assert_ne!(a.digest, c.digest);
    }

    #[test]
    fn malformed_txid_rejected() {
        let sel = selection(vec![Utxo::new("not-hex", 0, 60u32)]);
        let err = builder()
            .build(&sel, &Destination::new("D", 50u32), &big(1))
            .unwrap_err();
        assert!(matches!(err, WalletError::Encoding(_)));
    }

    #[test]
    fn oversized_index_rejected() {
        let sel = selection(vec![Utxo::new(txid(1), 256, 60u32)]);
        let err = builder()
            .build(&sel, &Destination::new("D", 50u32), &big(1))
            .unwrap_err();
        assert!(matches!(err, WalletError::Encoding(_)));
    }

    #[test]
    fn amount_beyond_u64_rejected() {
        let sel = selection(vec![Utxo::new(txid(1), 0, 60u32)]);
        let huge = BigUint::from(u64::MAX) + 1u32;
        let err = builder()
            .build(&sel, &Destination::new("D", huge), &big(1))
            .unwrap_err();
        assert!(matches!(err, WalletError::Encoding(_)));
    }

    #[test]
    fn empty_selection_rejected() {
        let sel = selection(Vec::new());
        assert!(builder().build(&sel, &Destination::new("D", 1u32), &big(1)).is_err());
    }

    #[test]
    fn clock_timestamp_used_by_default() {
        let sel = selection(vec![Utxo::new(txid(1), 0, 60u32)]);
        let unsigned = RawTransactionBuilder::new(ANCHOR)
            .build(&sel, &Destination::new("D", 50u32), &big(1))
            .unwrap();
        assert!(unsigned.tx.timestamp > 1_600_000_000);
    }

    #[test]
    fn request_carries_one_empty_slot() {
        let wallet = MemoryWallet::with_addresses(&["A"]);
        let sel = selection(vec![Utxo::new(txid(1), 0, 90u32)]);
        let mut b = builder();
        b.set_memo("sweep");
        let req = b
            .build_request(
                &wallet,
                "acct",
                &sel,
                Destination::new("D", 80u32),
                big(5),
                SignatureScheme::Ed25519,
            )
            .unwrap();

        assert!(req.is_built);
        assert!(!req.is_completed);
        assert_eq!(req.from.as_str(), "A");
        assert_eq!(req.memo, "sweep");
        assert_eq!(req.anchor, ANCHOR);
        assert_eq!(req.signatures.len(), 1);
        assert!(!req.signatures[0].is_signed());
        assert_eq!(req.signatures[0].digest, req.digest);
        assert_eq!(req.signatures[0].signer, wallet.records[0]);
        assert_eq!(RawTransaction::decode(&req.raw).unwrap().digest(), req.digest);
    }

    #[test]
    fn request_for_unknown_source_rejected() {
        let wallet = MemoryWallet::with_addresses(&["B"]);
        let sel = selection(vec![Utxo::new(txid(1), 0, 90u32)]);
        let err = builder()
            .build_request(
                &wallet,
                "acct",
                &sel,
                Destination::new("D", 80u32),
                big(5),
                SignatureScheme::Ed25519,
            )
            .unwrap_err();
        assert_eq!(err, WalletError::UnknownAddress("A".into()));
    }
}
