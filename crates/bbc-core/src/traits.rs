//! Collaborator interfaces consumed by the driver.
//!
//! These traits define the contracts with everything outside the core:
//! - [`NodeApi`]: balance, UTXO, pending-pool and anchor lookups plus broadcast
//! - [`WalletStore`]: the account's address records
//! - [`KeyHolder`]: derivation of signing keys for an address
//!
//! All calls are blocking. Implementations must be `Send + Sync` so that
//! independent consolidation passes can share them across worker threads.

use num_bigint::BigUint;

use crate::crypto::{KeyPair, SignatureScheme};
use crate::error::{KeyError, NodeError};
use crate::types::{Address, AddressInfo, Hash256, PendingSpend, Utxo};

/// Read access to a remote node plus transaction broadcast.
pub trait NodeApi: Send + Sync {
    /// Spendable balances for the given addresses, in smallest units.
    ///
    /// Addresses the node knows nothing about may be omitted from the reply;
    /// callers treat them as zero.
    fn get_balances(&self, addresses: &[Address]) -> Result<Vec<(Address, BigUint)>, NodeError>;

    /// Unspent outputs of one address on the fork identified by `anchor`,
    /// in the node's listing order.
    fn list_unspent(&self, address: &Address, anchor: &Hash256) -> Result<Vec<Utxo>, NodeError>;

    /// Outputs consumed by transactions currently in the unconfirmed pool.
    fn list_pending_spends(&self) -> Result<Vec<PendingSpend>, NodeError>;

    /// Identifier of the targeted fork (genesis block hash).
    fn chain_anchor(&self) -> Result<Hash256, NodeError>;

    /// Submit signed transaction bytes. Returns the transaction id.
    fn broadcast(&self, signed: &[u8]) -> Result<String, NodeError>;
}

/// Address records kept by the surrounding wallet.
pub trait WalletStore: Send + Sync {
    /// All addresses of an account, in the wallet's canonical order.
    fn addresses(&self, account_id: &str) -> Vec<AddressInfo>;

    /// Look up one address record.
    fn address(&self, address: &Address) -> Option<AddressInfo>;
}

/// Holder of the HD root key. Produces per-address signing keys on request.
pub trait KeyHolder: Send + Sync {
    fn derive_signing_key(
        &self,
        info: &AddressInfo,
        scheme: SignatureScheme,
    ) -> Result<KeyPair, KeyError>;
}
