//! Transaction decoder: the operations the surrounding wallet calls.
//!
//! Wires the ledger view, pending-spend filter, selector, builder, signer
//! and verifier into the build, sign, verify and submit pipeline, plus
//! consolidation and fee queries. Every call is blocking and independent;
//! nothing is cached between calls.

use std::fmt;
use std::sync::Arc;

use bbc_core::amount::{format_amount, parse_amount};
use bbc_core::constants::FEE_UNIT;
use bbc_core::traits::{KeyHolder, WalletStore};
use bbc_core::types::Address;
use chrono::Utc;
use num_bigint::BigUint;
use num_traits::Zero;
use tracing::{debug, info};

use crate::builder::RawTransactionBuilder;
use crate::coin_selection::CoinSelector;
use crate::consolidation::{ConsolidationParams, ConsolidationReport, consolidate};
use crate::context::DriverContext;
use crate::error::WalletError;
use crate::ledger::BalanceLedger;
use crate::pending::PendingSpendFilter;
use crate::request::{Destination, SubmittedTransaction, TransactionRequest};
use crate::signer::sign_request;
use crate::verify::verify_request;

/// Entry point for building, signing, verifying and submitting transfers.
#[derive(Clone)]
pub struct TransactionDecoder {
    ctx: DriverContext,
    store: Arc<dyn WalletStore>,
    keys: Arc<dyn KeyHolder>,
}

impl TransactionDecoder {
    pub fn new(ctx: DriverContext, store: Arc<dyn WalletStore>, keys: Arc<dyn KeyHolder>) -> Self {
        Self { ctx, store, keys }
    }

    pub fn context(&self) -> &DriverContext {
        &self.ctx
    }

    /// Parse a display amount using the configured decimals.
    pub fn parse_amount(&self, text: &str) -> Result<BigUint, WalletError> {
        Ok(parse_amount(text, self.ctx.config().decimals)?)
    }

    /// Build an unsigned transfer of `to.amount` from one of the account's
    /// addresses.
    ///
    /// Uses `fee` if given, otherwise the configured fixed fee. The source
    /// is the best-funded address whose non-pending outputs cover amount
    /// plus fee.
    pub fn build_transaction(
        &self,
        account_id: &str,
        to: Destination,
        fee: Option<&BigUint>,
        memo: &str,
    ) -> Result<TransactionRequest, WalletError> {
        if to.amount.is_zero() {
            return Err(WalletError::InvalidAmount("amount must be non-zero".into()));
        }

        let addresses: Vec<Address> = self
            .store
            .addresses(account_id)
            .into_iter()
            .map(|info| info.address)
            .collect();
        if addresses.is_empty() {
            return Err(WalletError::NoAddresses {
                account: account_id.to_string(),
            });
        }

        let node = self.ctx.node();
        let ledger = BalanceLedger::fetch(node, &addresses)?;
        let anchor = node
            .chain_anchor()
            .map_err(|e| WalletError::node("get_chain_anchor", e))?;
        let fee = self.ctx.fee_or_default(fee);
        let needed = &to.amount + &fee;

        let pending = PendingSpendFilter::fetch(node)?;
        let selection = CoinSelector::select(node, &ledger, &pending, &anchor, &needed)?;

        let mut builder = RawTransactionBuilder::new(anchor);
        builder.set_memo(memo);
        let request = builder.build_request(
            self.store.as_ref(),
            account_id,
            &selection,
            to,
            fee,
            self.ctx.scheme(),
        )?;

        info!(
            account = account_id,
            from = %request.from,
            to = %request.to.address,
            amount = %request.to.amount,
            fee = %request.fee,
            inputs = selection.inputs.len(),
            "transaction built"
        );
        Ok(request)
    }

    /// Fill the request's signature slots with the key holder's keys.
    pub fn sign_transaction(&self, request: &mut TransactionRequest) -> Result<(), WalletError> {
        sign_request(request, self.keys.as_ref())?;
        info!(from = %request.from, digest = %request.digest, "transaction signed");
        Ok(())
    }

    /// Verify the signature and combine it into the raw bytes.
    ///
    /// Sets `is_completed` on success. On `VerificationFailed` the request
    /// stays incomplete with its bytes unchanged.
    pub fn verify_transaction(&self, request: &mut TransactionRequest) -> Result<(), WalletError> {
        verify_request(request)?;
        info!(from = %request.from, digest = %request.digest, "transaction verified");
        Ok(())
    }

    /// Build one sweep transaction per eligible address.
    pub fn build_consolidation_transactions(
        &self,
        params: &ConsolidationParams,
    ) -> Result<ConsolidationReport, WalletError> {
        consolidate(&self.ctx, self.store.as_ref(), params)
    }

    /// Broadcast a completed request.
    ///
    /// Records the returned txid on the request and marks it submitted.
    pub fn submit_transaction(
        &self,
        request: &mut TransactionRequest,
    ) -> Result<SubmittedTransaction, WalletError> {
        if request.raw.is_empty() {
            return Err(WalletError::NotBuilt);
        }
        if !request.is_completed {
            return Err(WalletError::NotCompleted);
        }

        let txid = self
            .ctx
            .node()
            .broadcast(&request.raw)
            .map_err(|e| WalletError::node("broadcast", e))?;
        request.txid = Some(txid.clone());
        request.is_submitted = true;

        info!(%txid, from = %request.from, to = %request.to.address, "transaction submitted");
        Ok(SubmittedTransaction {
            txid,
            from: request.from.clone(),
            to: request.to.address.clone(),
            amount: request.to.amount.clone(),
            fee: request.fee.clone(),
            account_id: request.account_id.clone(),
            decimals: self.ctx.config().decimals,
            submitted_at: Utc::now(),
        })
    }

    /// The fixed per-transaction fee as a display amount, and its unit.
    pub fn fee_rate(&self) -> (String, &'static str) {
        let fee = format_amount(self.ctx.fixed_fee(), self.ctx.config().decimals);
        debug!(%fee, unit = FEE_UNIT, "fee rate");
        (fee, FEE_UNIT)
    }
}

impl fmt::Debug for TransactionDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionDecoder")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}
