//! In-memory collaborators shared by the unit tests and, behind the
//! `testing` feature, by the integration suite in `bbc-tests`.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use bbc_core::crypto::{KeyPair, SignatureScheme};
use bbc_core::error::{KeyError, NodeError};
use bbc_core::traits::{KeyHolder, NodeApi, WalletStore};
use bbc_core::types::{Address, AddressInfo, Hash256, PendingSpend, Utxo};
use num_bigint::BigUint;

/// Genesis hash served by [`MockNode`]. Other anchors are an unknown fork.
pub const ANCHOR: Hash256 = Hash256([0xA0; 32]);

pub fn txid(seed: u8) -> String {
    hex::encode([seed; 32])
}

pub fn big(v: u64) -> BigUint {
    BigUint::from(v)
}

/// Node double with a mutable unconfirmed pool and per-call failure switches.
#[derive(Default)]
pub struct MockNode {
    pub balances: HashMap<Address, BigUint>,
    pub utxos: HashMap<Address, Vec<Utxo>>,
    pending: Mutex<Vec<PendingSpend>>,
    pub fail_balances: bool,
    pub fail_pending: bool,
    pub fail_anchor: bool,
    pub fail_broadcast: bool,
    pub fail_unspent_for: HashSet<Address>,
    pub pending_calls: AtomicUsize,
    pub unspent_calls: AtomicUsize,
    pub broadcasts: Mutex<Vec<Vec<u8>>>,
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an address whose balance equals the sum of `amounts`, one
    /// UTXO per amount.
    pub fn with_address(mut self, address: &str, seed: u8, amounts: &[u64]) -> Self {
        let addr = Address::from(address);
        let utxos: Vec<Utxo> = amounts
            .iter()
            .enumerate()
            .map(|(i, &a)| Utxo::new(txid(seed), i as u32, a))
            .collect();
        let total: u64 = amounts.iter().sum();
        self.balances.insert(addr.clone(), big(total));
        self.utxos.insert(addr, utxos);
        self
    }

    pub fn with_pending(self, seed: u8, index: u32) -> Self {
        self.spend_in_pool(seed, index);
        self
    }

    /// Mark output `index` of the `seed` transaction as spent by the pool.
    pub fn spend_in_pool(&self, seed: u8, index: u32) {
        if let Ok(mut pool) = self.pending.lock() {
            pool.push(PendingSpend::new(txid(seed), index));
        }
    }

    pub fn unspent_calls(&self) -> usize {
        self.unspent_calls.load(Ordering::SeqCst)
    }

    pub fn broadcasts(&self) -> Vec<Vec<u8>> {
        self.broadcasts.lock().map(|b| b.clone()).unwrap_or_default()
    }

    pub fn broadcast_count(&self) -> usize {
        self.broadcasts.lock().map(|b| b.len()).unwrap_or(0)
    }
}

impl NodeApi for MockNode {
    fn get_balances(&self, addresses: &[Address]) -> Result<Vec<(Address, BigUint)>, NodeError> {
        if self.fail_balances {
            return Err(NodeError::Transport("connection refused".into()));
        }
        Ok(addresses
            .iter()
            .filter_map(|a| self.balances.get(a).map(|b| (a.clone(), b.clone())))
            .collect())
    }

    fn list_unspent(&self, address: &Address, anchor: &Hash256) -> Result<Vec<Utxo>, NodeError> {
        self.unspent_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_unspent_for.contains(address) {
            return Err(NodeError::Transport("timeout".into()));
        }
        if *anchor != ANCHOR {
            return Err(NodeError::Rpc {
                code: -6,
                message: "unknown fork".into(),
            });
        }
        Ok(self.utxos.get(address).cloned().unwrap_or_default())
    }

    fn list_pending_spends(&self) -> Result<Vec<PendingSpend>, NodeError> {
        self.pending_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_pending {
            return Err(NodeError::Rpc {
                code: -32603,
                message: "pool unavailable".into(),
            });
        }
        self.pending
            .lock()
            .map(|p| p.clone())
            .map_err(|_| NodeError::Transport("pool lock poisoned".into()))
    }

    fn chain_anchor(&self) -> Result<Hash256, NodeError> {
        if self.fail_anchor {
            return Err(NodeError::EmptyResponse);
        }
        Ok(ANCHOR)
    }

    fn broadcast(&self, signed: &[u8]) -> Result<String, NodeError> {
        if self.fail_broadcast {
            return Err(NodeError::Rpc {
                code: -26,
                message: "rejected".into(),
            });
        }
        let mut log = self
            .broadcasts
            .lock()
            .map_err(|_| NodeError::Transport("poisoned".into()))?;
        log.push(signed.to_vec());
        Ok(hex::encode(blake3::hash(signed).as_bytes()))
    }
}

/// Seed byte used to derive the key of the address at `index`.
pub fn secret_for(index: usize) -> [u8; 32] {
    [index as u8 + 1; 32]
}

#[derive(Default)]
pub struct MemoryWallet {
    pub records: Vec<AddressInfo>,
}

impl MemoryWallet {
    /// Account `acct` owning `addresses`, each with a key from [`secret_for`].
    pub fn with_addresses(addresses: &[&str]) -> Self {
        let records = addresses
            .iter()
            .enumerate()
            .map(|(i, a)| AddressInfo {
                address: Address::from(*a),
                account_id: "acct".into(),
                public_key: KeyPair::from_secret_bytes(secret_for(i)).public_key().to_hex(),
                hd_path: format!("m/44'/0'/0'/0/{i}"),
            })
            .collect();
        Self { records }
    }
}

impl WalletStore for MemoryWallet {
    fn addresses(&self, account_id: &str) -> Vec<AddressInfo> {
        self.records
            .iter()
            .filter(|r| r.account_id == account_id)
            .cloned()
            .collect()
    }

    fn address(&self, address: &Address) -> Option<AddressInfo> {
        self.records.iter().find(|r| &r.address == address).cloned()
    }
}

/// Key holder that maps the trailing path index to [`secret_for`].
pub struct PathKeys;

impl KeyHolder for PathKeys {
    fn derive_signing_key(
        &self,
        info: &AddressInfo,
        _scheme: SignatureScheme,
    ) -> Result<KeyPair, KeyError> {
        let index: usize = info
            .hd_path
            .rsplit('/')
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| KeyError::UnknownPath(info.hd_path.clone()))?;
        Ok(KeyPair::from_secret_bytes(secret_for(index)))
    }
}

pub struct FailingKeys;

impl KeyHolder for FailingKeys {
    fn derive_signing_key(
        &self,
        info: &AddressInfo,
        _scheme: SignatureScheme,
    ) -> Result<KeyPair, KeyError> {
        Err(KeyError::Unavailable(format!("locked ({})", info.hd_path)))
    }
}
