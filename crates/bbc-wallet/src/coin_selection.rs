//! Single-address coin selection.
//!
//! Greedy, first-fit by address and first-fit by UTXO order. Inputs for one
//! transaction always come from exactly one address: the best-funded
//! candidate whose non-pending outputs cover `amount + fee`.

use bbc_core::traits::NodeApi;
use bbc_core::types::{Address, Hash256, Utxo};
use num_bigint::BigUint;
use num_traits::Zero;
use tracing::debug;

use crate::error::WalletError;
use crate::ledger::BalanceLedger;
use crate::pending::PendingSpendFilter;

/// Result of coin selection: the source address and the UTXOs to spend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinSelection {
    /// The single address funding the transaction.
    pub address: Address,
    /// Selected UTXOs, in the node's listing order.
    pub inputs: Vec<Utxo>,
    /// Sum of the selected UTXO amounts.
    pub total: BigUint,
}

/// Greedy single-address coin selector.
pub struct CoinSelector;

impl CoinSelector {
    /// Pick inputs covering `needed` from one address of `ledger`.
    ///
    /// Candidates are the addresses whose balance alone covers `needed`,
    /// tried in ledger order. Fails with `CannotSplitAcrossAddresses` when
    /// only the aggregate balance would suffice, `InsufficientBalance` when
    /// not even that does, and `PendingConfirmationRequired` when every
    /// candidate's funds are tied up in the unconfirmed pool.
    pub fn select(
        node: &dyn NodeApi,
        ledger: &BalanceLedger,
        pending: &PendingSpendFilter,
        anchor: &Hash256,
        needed: &BigUint,
    ) -> Result<CoinSelection, WalletError> {
        let candidates = ledger.funded(needed);
        if candidates.is_empty() {
            let total = ledger.total();
            return Err(if &total >= needed {
                WalletError::CannotSplitAcrossAddresses {
                    need: needed.clone(),
                    total,
                }
            } else {
                WalletError::InsufficientBalance {
                    need: needed.clone(),
                    total,
                }
            });
        }

        let mut last_tried = None;
        for candidate in candidates {
            if let Some(selection) =
                Self::select_from(node, &candidate.address, anchor, pending, needed)?
            {
                return Ok(selection);
            }
            last_tried = Some(&candidate.address);
        }

        Err(WalletError::PendingConfirmationRequired {
            address: last_tried.cloned().unwrap_or_default(),
        })
    }

    /// Accumulate the non-pending UTXOs of `address` until `needed` is
    /// reached. Returns `None` if they never reach it.
    pub fn select_from(
        node: &dyn NodeApi,
        address: &Address,
        anchor: &Hash256,
        pending: &PendingSpendFilter,
        needed: &BigUint,
    ) -> Result<Option<CoinSelection>, WalletError> {
        let utxos = node
            .list_unspent(address, anchor)
            .map_err(|e| WalletError::node("list_unspent", e))?;

        let mut inputs = Vec::new();
        let mut total = BigUint::zero();
        for utxo in pending.available(&utxos) {
            total += &utxo.amount;
            inputs.push(utxo.clone());
            if &total >= needed {
                debug!(%address, inputs = inputs.len(), %total, "selected inputs");
                return Ok(Some(CoinSelection {
                    address: address.clone(),
                    inputs,
                    total,
                }));
            }
        }

        debug!(
            %address,
            available = %total,
            %needed,
            pending = utxos.len() - inputs.len(),
            "candidate short of non-pending funds"
        );
        Ok(None)
    }
}
