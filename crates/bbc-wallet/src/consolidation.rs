//! Summary/consolidation generator.
//!
//! Sweeps the excess balance of every eligible address to a collection
//! address, one independent transaction per address. Each pass selects
//! inputs from its own address only and is built without touching any
//! shared state, so passes can run on worker threads. A failing address
//! never aborts the others; its error is reported next to its address.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use bbc_core::traits::WalletStore;
use bbc_core::types::{Address, AddressBalance, Hash256};
use num_bigint::BigUint;
use num_traits::Zero;
use tracing::{debug, info, warn};

use crate::builder::RawTransactionBuilder;
use crate::coin_selection::CoinSelector;
use crate::context::DriverContext;
use crate::error::WalletError;
use crate::ledger::BalanceLedger;
use crate::pending::PendingSpendFilter;
use crate::request::{Destination, TransactionRequest};

/// Inputs of one consolidation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidationParams {
    pub account_id: String,
    /// Addresses to sweep. Empty means every address of the account.
    pub addresses: Vec<Address>,
    /// Addresses below this balance are skipped.
    pub min_transfer: BigUint,
    /// Balance left behind on each swept address.
    pub retained_balance: BigUint,
    /// Collection address receiving every sweep.
    pub summary_address: Address,
    /// Per-transaction fee; the configured fixed fee when `None`.
    pub fee: Option<BigUint>,
    pub memo: String,
    /// Skip this many of the account's addresses when `addresses` is empty.
    pub address_offset: usize,
    /// Take at most this many of the account's addresses when `addresses`
    /// is empty.
    pub address_limit: Option<usize>,
}

impl ConsolidationParams {
    pub fn new(account_id: impl Into<String>, summary_address: impl Into<Address>) -> Self {
        Self {
            account_id: account_id.into(),
            addresses: Vec::new(),
            min_transfer: BigUint::zero(),
            retained_balance: BigUint::zero(),
            summary_address: summary_address.into(),
            fee: None,
            memo: String::new(),
            address_offset: 0,
            address_limit: None,
        }
    }

    pub fn with_addresses(mut self, addresses: Vec<Address>) -> Self {
        self.addresses = addresses;
        self
    }

    pub fn with_thresholds(mut self, min_transfer: BigUint, retained_balance: BigUint) -> Self {
        self.min_transfer = min_transfer;
        self.retained_balance = retained_balance;
        self
    }

    pub fn with_fee(mut self, fee: BigUint) -> Self {
        self.fee = Some(fee);
        self
    }

    pub fn validate(&self) -> Result<(), WalletError> {
        if self.min_transfer < self.retained_balance {
            return Err(WalletError::InvalidThreshold {
                min_transfer: self.min_transfer.clone(),
                retained: self.retained_balance.clone(),
            });
        }
        Ok(())
    }

    /// The addresses this run covers: the explicit list, or the paged
    /// address records of the account.
    fn resolve_addresses(&self, store: &dyn WalletStore) -> Vec<Address> {
        if !self.addresses.is_empty() {
            return self.addresses.clone();
        }
        let limit = self.address_limit.unwrap_or(usize::MAX);
        store
            .addresses(&self.account_id)
            .into_iter()
            .skip(self.address_offset)
            .take(limit)
            .map(|info| info.address)
            .collect()
    }
}

/// Outcome of one address's pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidationResult {
    pub address: Address,
    pub outcome: Result<TransactionRequest, WalletError>,
}

/// Per-address outcomes of a run, in ledger order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsolidationReport {
    pub results: Vec<ConsolidationResult>,
}

impl ConsolidationReport {
    /// Successfully built requests.
    pub fn requests(&self) -> impl Iterator<Item = &TransactionRequest> {
        self.results.iter().filter_map(|r| r.outcome.as_ref().ok())
    }

    /// Failed addresses and their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&Address, &WalletError)> {
        self.results
            .iter()
            .filter_map(|r| r.outcome.as_ref().err().map(|e| (&r.address, e)))
    }

    pub fn into_requests(self) -> Vec<TransactionRequest> {
        self.results.into_iter().filter_map(|r| r.outcome.ok()).collect()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// One eligible address and what it should send.
struct SweepJob {
    entry: AddressBalance,
    amount: BigUint,
}

/// Run a consolidation over the account's addresses.
///
/// Fails as a whole only when the thresholds are invalid, the account has
/// no addresses, or the balance or anchor lookup fails. Everything after
/// that is reported per address.
pub fn consolidate(
    ctx: &DriverContext,
    store: &dyn WalletStore,
    params: &ConsolidationParams,
) -> Result<ConsolidationReport, WalletError> {
    params.validate()?;
    let addresses = params.resolve_addresses(store);
    if addresses.is_empty() {
        return Err(WalletError::NoAddresses {
            account: params.account_id.clone(),
        });
    }

    let node = ctx.node();
    let ledger = BalanceLedger::fetch(node, &addresses)?;
    let anchor = node
        .chain_anchor()
        .map_err(|e| WalletError::node("get_chain_anchor", e))?;
    let fee = ctx.fee_or_default(params.fee.as_ref());

    let jobs = sweep_jobs(&ledger, params, &fee);
    debug!(
        account = %params.account_id,
        addresses = ledger.len(),
        eligible = jobs.len(),
        "consolidation candidates"
    );

    let workers = ctx.config().consolidation_workers.min(jobs.len()).max(1);
    let results = if workers == 1 {
        jobs.iter()
            .map(|job| sweep(ctx, store, params, &anchor, &fee, job))
            .collect()
    } else {
        sweep_parallel(ctx, store, params, &anchor, &fee, &jobs, workers)
    };

    let report = ConsolidationReport { results };
    info!(
        account = %params.account_id,
        built = report.requests().count(),
        failed = report.failures().count(),
        "consolidation finished"
    );
    Ok(report)
}

/// Eligible addresses in ledger order with their sweep amounts.
///
/// An address is eligible when its balance is non-zero and at least
/// `min_transfer`, and something is left after the retained balance and
/// fee.
fn sweep_jobs(
    ledger: &BalanceLedger,
    params: &ConsolidationParams,
    fee: &BigUint,
) -> Vec<SweepJob> {
    let reserve = &params.retained_balance + fee;
    ledger
        .iter()
        .filter(|e| !e.balance.is_zero() && e.balance >= params.min_transfer)
        .filter(|e| e.balance > reserve)
        .map(|e| SweepJob {
            entry: e.clone(),
            amount: &e.balance - &reserve,
        })
        .collect()
}

/// Build the sweep transaction for one address.
fn sweep(
    ctx: &DriverContext,
    store: &dyn WalletStore,
    params: &ConsolidationParams,
    anchor: &Hash256,
    fee: &BigUint,
    job: &SweepJob,
) -> ConsolidationResult {
    let address = job.entry.address.clone();
    let outcome = build_sweep(ctx, store, params, anchor, fee, job);
    match &outcome {
        Ok(req) => debug!(%address, amount = %req.to.amount, "sweep built"),
        Err(e) => warn!(%address, error = %e, "sweep failed"),
    }
    ConsolidationResult { address, outcome }
}

fn build_sweep(
    ctx: &DriverContext,
    store: &dyn WalletStore,
    params: &ConsolidationParams,
    anchor: &Hash256,
    fee: &BigUint,
    job: &SweepJob,
) -> Result<TransactionRequest, WalletError> {
    let node = ctx.node();
    let address = &job.entry.address;
    let needed = &job.amount + fee;

    let pending = PendingSpendFilter::fetch(node)?;
    let selection = CoinSelector::select_from(node, address, anchor, &pending, &needed)?
        .ok_or_else(|| WalletError::PendingConfirmationRequired {
            address: address.clone(),
        })?;

    let mut builder = RawTransactionBuilder::new(*anchor);
    builder.set_memo(params.memo.clone());
    builder.build_request(
        store,
        &params.account_id,
        &selection,
        Destination::new(params.summary_address.clone(), job.amount.clone()),
        fee.clone(),
        ctx.scheme(),
    )
}

/// Run the passes on `workers` scoped threads pulling from a shared job
/// index. Results come back through a channel and are restored to ledger
/// order.
fn sweep_parallel(
    ctx: &DriverContext,
    store: &dyn WalletStore,
    params: &ConsolidationParams,
    anchor: &Hash256,
    fee: &BigUint,
    jobs: &[SweepJob],
    workers: usize,
) -> Vec<ConsolidationResult> {
    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            scope.spawn(move || {
                loop {
                    let i = next.fetch_add(1, Ordering::Relaxed);
                    let Some(job) = jobs.get(i) else { break };
                    let result = sweep(ctx, store, params, anchor, fee, job);
                    if tx.send((i, result)).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(tx);

    let mut indexed: Vec<(usize, ConsolidationResult)> = rx.into_iter().collect();
    indexed.sort_by_key(|(i, _)| *i);
    indexed.into_iter().map(|(_, r)| r).collect()
}
