//! Pending-Spend Filter.
//!
//! Outputs already consumed by unconfirmed transactions must not be picked
//! again. The pool changes continuously, so a filter is fetched fresh for
//! every build attempt and never cached.

use std::collections::HashSet;

use bbc_core::traits::NodeApi;
use bbc_core::types::{OutPoint, PendingSpend, Utxo};
use tracing::debug;

use crate::error::WalletError;

/// Exclusion set of outpoints spent by the unconfirmed pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingSpendFilter {
    spent: HashSet<OutPoint>,
}

impl PendingSpendFilter {
    /// Query the node's unconfirmed pool.
    pub fn fetch(node: &dyn NodeApi) -> Result<Self, WalletError> {
        let spends = node
            .list_pending_spends()
            .map_err(|e| WalletError::node("list_pending_spends", e))?;
        let filter = Self::from_spends(&spends);
        debug!(pending = filter.len(), "fetched pending spends");
        Ok(filter)
    }

    pub fn from_spends(spends: &[PendingSpend]) -> Self {
        Self {
            spent: spends.iter().map(PendingSpend::outpoint).collect(),
        }
    }

    pub fn is_pending(&self, outpoint: &OutPoint) -> bool {
        self.spent.contains(outpoint)
    }

    /// The UTXOs of `utxos` not spent by the pool, in listing order.
    pub fn available<'a>(&'a self, utxos: &'a [Utxo]) -> impl Iterator<Item = &'a Utxo> + 'a {
        utxos.iter().filter(|u| !self.is_pending(&u.outpoint))
    }

    pub fn len(&self) -> usize {
        self.spent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spent.is_empty()
    }
}
