//! Balance Ledger View.
//!
//! Fetches the spendable balance of every address in a set and orders the
//! result by balance, largest first. The ordering is what lets the selector
//! touch as few addresses as possible: the best-funded address is tried
//! first. Equal balances keep the caller's address order.

use std::collections::{HashMap, HashSet};

use bbc_core::traits::NodeApi;
use bbc_core::types::{Address, AddressBalance};
use num_bigint::BigUint;
use num_traits::Zero;
use tracing::debug;

use crate::error::WalletError;

/// Descending-by-balance view over a set of addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceLedger {
    entries: Vec<AddressBalance>,
}

impl BalanceLedger {
    /// Query the node for `addresses` and build the ordered view.
    ///
    /// Addresses missing from the node's reply get a zero balance. A repeated
    /// address is kept once, at its first position. Fails with
    /// `NodeUnavailable` if the query cannot be completed.
    pub fn fetch(node: &dyn NodeApi, addresses: &[Address]) -> Result<Self, WalletError> {
        let mut seen = HashSet::with_capacity(addresses.len());
        let unique: Vec<(usize, &Address)> = addresses
            .iter()
            .enumerate()
            .filter(|(_, a)| seen.insert(*a))
            .collect();
        let query: Vec<Address> = unique.iter().map(|(_, a)| (*a).clone()).collect();

        let reply = node
            .get_balances(&query)
            .map_err(|e| WalletError::node("get_balances", e))?;

        let mut by_address: HashMap<Address, BigUint> = HashMap::with_capacity(reply.len());
        for (address, balance) in reply {
            by_address.insert(address, balance);
        }

        let entries = unique
            .into_iter()
            .map(|(ordinal, address)| AddressBalance {
                address: address.clone(),
                balance: by_address.remove(address).unwrap_or_else(BigUint::zero),
                ordinal,
            })
            .collect();

        let ledger = Self::from_balances(entries);
        debug!(
            addresses = ledger.len(),
            total = %ledger.total(),
            "fetched address balances"
        );
        Ok(ledger)
    }

    /// Order already-known balances. Stable: ties keep their ordinal order.
    pub fn from_balances(mut entries: Vec<AddressBalance>) -> Self {
        entries.sort_by(|a, b| b.balance.cmp(&a.balance).then(a.ordinal.cmp(&b.ordinal)));
        Self { entries }
    }

    /// Entries, largest balance first.
    pub fn entries(&self) -> &[AddressBalance] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &AddressBalance> {
        self.entries.iter()
    }

    /// Sum of all balances.
    pub fn total(&self) -> BigUint {
        self.entries.iter().map(|e| &e.balance).sum()
    }

    /// Entries whose balance alone covers `needed`, in ledger order.
    pub fn funded(&self, needed: &BigUint) -> Vec<&AddressBalance> {
        self.entries.iter().filter(|e| &e.balance >= needed).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
