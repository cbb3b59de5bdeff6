//! Verify-and-combine engine.
//!
//! Checks a signature against the transaction digest and, only on success,
//! writes it into the transaction bytes. There is no partial state: either
//! the request ends up completed with signed bytes, or it stays incomplete
//! with its bytes untouched.

use bbc_core::codec::RawTransaction;
use bbc_core::crypto::PublicKey;
use bbc_core::types::Hash256;
use tracing::{debug, warn};

use crate::error::WalletError;
use crate::request::TransactionRequest;

/// Verify `signature` over the digest of `raw` and return the signed bytes,
/// or `None` if the signature does not verify under `public_key`.
///
/// `raw` may already carry a signature; it is replaced, so combining the
/// same signature twice yields identical bytes. Fails with `Encoding` if
/// `raw` does not decode or hashes to something other than `digest`.
pub fn verify_and_combine(
    raw: &[u8],
    digest: &Hash256,
    signature: &[u8],
    public_key: &PublicKey,
) -> Result<Option<Vec<u8>>, WalletError> {
    let tx = RawTransaction::decode(raw)?;
    if &tx.digest() != digest {
        return Err(WalletError::Encoding(
            "transaction bytes do not match recorded digest".into(),
        ));
    }
    if let Err(e) = public_key.verify(digest.as_bytes(), signature) {
        debug!(error = %e, "signature rejected");
        return Ok(None);
    }
    Ok(Some(tx.with_signature(signature).encode()))
}

/// Verify the request's signature and combine it into `request.raw`.
///
/// `is_completed` is cleared up front and set again only once the signature
/// has been combined, so any failure leaves the request incomplete with
/// `raw` unchanged. A signature mismatch fails with `VerificationFailed`;
/// the caller may re-sign and try again.
pub fn verify_request(request: &mut TransactionRequest) -> Result<(), WalletError> {
    request.is_completed = false;
    if !request.is_built || request.raw.is_empty() {
        return Err(WalletError::NotBuilt);
    }
    let slot = match request.signatures.as_slice() {
        [slot] => slot,
        slots => {
            return Err(WalletError::Encoding(format!(
                "expected one signature slot, found {}",
                slots.len()
            )));
        }
    };

    let address = slot.signer.address.clone();
    let public_key = slot.public_key()?;

    match verify_and_combine(&request.raw, &request.digest, &slot.signature, &public_key)? {
        Some(signed) => {
            request.raw = signed;
            request.is_completed = true;
            debug!(%address, digest = %request.digest, "signature verified");
            Ok(())
        }
        None => {
            warn!(%address, "signature verification failed");
            Err(WalletError::VerificationFailed { address })
        }
    }
}
