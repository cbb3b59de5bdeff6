//! Shared test helpers: the wallet crate's in-memory node, a wallet store
//! keyed by a seed key holder and a ready-made decoder fixture.

use std::sync::Arc;

use bbc_core::types::AddressInfo;
use bbc_wallet::{DriverConfig, DriverContext, Seed, SeedKeyHolder, TransactionDecoder};

pub use bbc_wallet::mock::{ANCHOR, MemoryWallet, MockNode, big, txid};

/// Account owning every address of the fixture wallet.
pub const ACCOUNT: &str = "acct";

/// HD path of the fixture address at `index`.
pub fn hd_path(index: usize) -> String {
    format!("m/44'/0'/0'/0/{index}")
}

/// Seed of the fixture key holder.
pub fn fixture_keys() -> SeedKeyHolder {
    SeedKeyHolder::new(Seed::from_bytes([7u8; 32]))
}

/// Records for `addresses` under [`ACCOUNT`], keyed by `keys`.
pub fn fixture_wallet(keys: &SeedKeyHolder, addresses: &[&str]) -> MemoryWallet {
    let records: Vec<AddressInfo> = addresses
        .iter()
        .enumerate()
        .filter_map(|(i, a)| keys.address_info(*a, ACCOUNT, hd_path(i)).ok())
        .collect();
    MemoryWallet { records }
}

/// A decoder over `node` and a wallet owning `addresses`.
pub struct Fixture {
    pub node: Arc<MockNode>,
    pub decoder: TransactionDecoder,
}

impl Fixture {
    pub fn new(node: MockNode, addresses: &[&str]) -> Self {
        Self::with_config(node, addresses, DriverConfig::default())
    }

    /// Panics if `config` is invalid.
    pub fn with_config(node: MockNode, addresses: &[&str], config: DriverConfig) -> Self {
        let node = Arc::new(node);
        let keys = fixture_keys();
        let wallet = fixture_wallet(&keys, addresses);
        let ctx = match DriverContext::new(node.clone(), config) {
            Ok(ctx) => ctx,
            Err(e) => panic!("fixture config rejected: {e}"),
        };
        let decoder = TransactionDecoder::new(ctx, Arc::new(wallet), Arc::new(keys));
        Self { node, decoder }
    }
}
