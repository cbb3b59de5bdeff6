//! Signature coordinator.
//!
//! Fills every pending [`KeySignature`] of a request with a signature over
//! its digest, using keys obtained from the external key holder. No network
//! I/O happens here.

use bbc_core::traits::KeyHolder;
use tracing::debug;

use crate::error::WalletError;
use crate::request::{KeySignature, TransactionRequest};

/// Sign every slot of `request`.
///
/// Fails with `NotBuilt` on an unbuilt request, `KeyDerivation` if the key
/// holder cannot produce a key, and `Signing` if the derived key does not
/// control the slot's address or the slot's digest is not the request's.
pub fn sign_request(
    request: &mut TransactionRequest,
    keys: &dyn KeyHolder,
) -> Result<(), WalletError> {
    if !request.is_built {
        return Err(WalletError::NotBuilt);
    }
    for slot in &mut request.signatures {
        if slot.digest != request.digest {
            return Err(WalletError::Signing(format!(
                "signature slot for {} covers a different digest",
                slot.signer.address
            )));
        }
        sign_slot(slot, keys)?;
    }
    Ok(())
}

/// Derive the signer's key and sign the slot's digest.
pub fn sign_slot(slot: &mut KeySignature, keys: &dyn KeyHolder) -> Result<(), WalletError> {
    let address = slot.signer.address.clone();
    let key = keys
        .derive_signing_key(&slot.signer, slot.scheme)
        .map_err(|e| WalletError::KeyDerivation {
            address: address.clone(),
            reason: e.to_string(),
        })?;

    let expected = slot.public_key()?;
    if key.public_key() != expected {
        return Err(WalletError::Signing(format!(
            "derived key does not control {address}"
        )));
    }

    slot.signature = key.sign(slot.digest.as_bytes()).to_vec();
    debug!(%address, scheme = %slot.scheme, "signed digest");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{FailingKeys, MemoryWallet, PathKeys};
    use crate::request::Destination;
    use bbc_core::crypto::{PublicKey, SignatureScheme};
    use bbc_core::types::Hash256;

    fn built_request(wallet: &MemoryWallet, index: usize) -> TransactionRequest {
        let signer = wallet.records[index].clone();
        let mut req = TransactionRequest::new("acct", Destination::new("D", 10u32));
        req.from = signer.address.clone();
        req.digest = Hash256([9; 32]);
        req.signatures = vec![KeySignature::empty(signer, req.digest, SignatureScheme::Ed25519)];
        req.is_built = true;
        req
    }

    #[test]
    fn fills_signature_over_digest() {
        let wallet = MemoryWallet::with_addresses(&["A", "B"]);
        let mut req = built_request(&wallet, 1);
        sign_request(&mut req, &PathKeys).unwrap();

        let slot = &req.signatures[0];
        assert_eq!(slot.signature.len(), 64);
        let pk = PublicKey::from_hex(&slot.signer.public_key).unwrap();
        assert!(pk.verify(req.digest.as_bytes(), &slot.signature).is_ok());
    }

    #[test]
    fn unbuilt_request_rejected() {
        let wallet = MemoryWallet::with_addresses(&["A"]);
        let mut req = built_request(&wallet, 0);
        req.is_built = false;
        assert_eq!(sign_request(&mut req, &PathKeys), Err(WalletError::NotBuilt));
    }

    #[test]
    fn key_holder_failure_is_key_derivation() {
        let wallet = MemoryWallet::with_addresses(&["A"]);
        let mut req = built_request(&wallet, 0);
        let err = sign_request(&mut req, &FailingKeys).unwrap_err();
        assert!(matches!(
            err,
            WalletError::KeyDerivation { ref address, .. } if address.as_str() == "A"
        ));
        assert!(!req.signatures[0].is_signed());
    }

    #[test]
    fn wrong_key_is_signing_error() {
        let wallet = MemoryWallet::with_addresses(&["A", "B"]);
        let mut req = built_request(&wallet, 0);
        // Path of B, public key of A.
        req.signatures[0].signer.hd_path = wallet.records[1].hd_path.clone();
        let err = sign_request(&mut req, &PathKeys).unwrap_err();
        assert!(matches!(err, WalletError::Signing(_)));
        assert!(!err.to_string().contains(&hex::encode([2u8; 32])));
    }

    #[test]
    fn stale_digest_rejected() {
        let wallet = MemoryWallet::with_addresses(&["A"]);
        let mut req = built_request(&wallet, 0);
        req.digest = Hash256([1; 32]);
        assert!(matches!(
            sign_request(&mut req, &PathKeys),
            Err(WalletError::Signing(_))
        ));
    }
}
