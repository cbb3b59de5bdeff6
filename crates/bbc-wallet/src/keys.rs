//! Seed-backed key holder.
//!
//! Derives Ed25519 signing keys from a 32-byte master seed and an address's
//! HD path using BLAKE3 keyed derivation. Not BIP-32: the path string is
//! hashed as a whole rather than walked level by level, which keeps the
//! derivation Ed25519-compatible while staying deterministic.

use std::fmt;

use bbc_core::crypto::{KeyPair, SignatureScheme};
use bbc_core::error::KeyError;
use bbc_core::traits::KeyHolder;
use bbc_core::types::{Address, AddressInfo};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// BLAKE3 KDF context for per-path key derivation.
const KDF_CONTEXT: &str = "bbc-wallet-path-key-derivation-v1";

/// A 32-byte master seed.
///
/// Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Seed {
    bytes: [u8; 32],
}

impl Seed {
    /// Generate a random seed from the OS cryptographic RNG.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Raw seed bytes. Handle with care.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seed").field("bytes", &"[REDACTED]").finish()
    }
}

/// [`KeyHolder`] deriving every address key from one seed.
pub struct SeedKeyHolder {
    seed: Seed,
}

impl SeedKeyHolder {
    pub fn new(seed: Seed) -> Self {
        Self { seed }
    }

    /// Key for `hd_path`. Paths must be rooted at `m/`.
    pub fn derive(&self, hd_path: &str) -> Result<KeyPair, KeyError> {
        if !hd_path.starts_with("m/") || hd_path.len() < 3 {
            return Err(KeyError::UnknownPath(hd_path.to_string()));
        }
        let mut ikm = Vec::with_capacity(32 + hd_path.len());
        ikm.extend_from_slice(self.seed.as_bytes());
        ikm.extend_from_slice(hd_path.as_bytes());
        let mut derived = blake3::derive_key(KDF_CONTEXT, &ikm);
        ikm.zeroize();
        let kp = KeyPair::from_secret_bytes(derived);
        derived.zeroize();
        Ok(kp)
    }

    /// Wallet record for an address controlled by the key at `hd_path`.
    pub fn address_info(
        &self,
        address: impl Into<Address>,
        account_id: impl Into<String>,
        hd_path: impl Into<String>,
    ) -> Result<AddressInfo, KeyError> {
        let hd_path = hd_path.into();
        let public_key = self.derive(&hd_path)?.public_key().to_hex();
        Ok(AddressInfo {
            address: address.into(),
            account_id: account_id.into(),
            public_key,
            hd_path,
        })
    }
}

impl KeyHolder for SeedKeyHolder {
    fn derive_signing_key(
        &self,
        info: &AddressInfo,
        scheme: SignatureScheme,
    ) -> Result<KeyPair, KeyError> {
        match scheme {
            SignatureScheme::Ed25519 => self.derive(&info.hd_path),
        }
    }
}

impl fmt::Debug for SeedKeyHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeedKeyHolder").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn holder() -> SeedKeyHolder {
        SeedKeyHolder::new(Seed::from_bytes([1u8; 32]))
    }

    #[test]
    fn seed_generate_unique() {
        assert_ne!(Seed::generate().as_bytes(), Seed::generate().as_bytes());
    }

    #[test]
    fn seed_debug_hides_bytes() {
        let debug = format!("{:?}", Seed::from_bytes([0xAB; 32]));
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("ab"));
    }

    #[test]
    fn derive_deterministic() {
        let a = holder().derive("m/44'/0'/0'/0/1").unwrap();
        let b = holder().derive("m/44'/0'/0'/0/1").unwrap();
        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn different_paths_differ() {
        let h = holder();
        let a = h.derive("m/0/0").unwrap();
        let b = h.derive("m/0/1").unwrap();
        assert_ne!(a.public_key(), b.public_key());
    }

    #[test]
    fn different_seeds_differ() {
        let other = SeedKeyHolder::new(Seed::from_bytes([2u8; 32]));
        assert_ne!(
            holder().derive("m/0").unwrap().public_key(),
            other.derive("m/0").unwrap().public_key()
        );
    }

    #[test]
    fn unrooted_path_rejected() {
        assert!(matches!(holder().derive("44/0"), Err(KeyError::UnknownPath(_))));
        assert!(matches!(holder().derive("m/"), Err(KeyError::UnknownPath(_))));
    }

    #[test]
    fn address_info_matches_signing_key() {
        let h = holder();
        let info = h.address_info("A", "acct", "m/0/7").unwrap();
        let kp = h.derive_signing_key(&info, SignatureScheme::Ed25519).unwrap();
        assert_eq!(kp.public_key().to_hex(), info.public_key);
    }

    #[test]
    fn holder_debug_hides_seed() {
        assert!(!format!("{:?}", holder()).contains("01"));
    }
}
