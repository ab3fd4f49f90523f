//! Append-only fee ledger.
//!
//! Fee transactions are created when the venue reports realized fees,
//! mutated only by the claim action and the payout executor, and never
//! deleted. Claim and distribution transitions are range operations that
//! skip rows already past the target state, so re-running them with an
//! overlapping range is harmless.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use feerail_types::{
    ChainRef, FeeStatus, FeeTransaction, FeeTxId, OperatorId, Period, Result, RevenueStream,
};
use rust_decimal::Decimal;
use tracing::info;

/// The append-only record of operator fee transactions.
#[derive(Debug, Default)]
pub struct FeeLedger {
    entries: Vec<FeeTransaction>,
}

impl FeeLedger {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Record a realized fee in `PENDING` state. No external side effects.
    ///
    /// # Errors
    /// Returns [`feerail_types::FeerailError::InvalidAmount`] for
    /// non-positive amounts.
    pub fn record_fee(
        &mut self,
        operator_id: OperatorId,
        amount: Decimal,
        currency: &str,
        stream: RevenueStream,
    ) -> Result<FeeTxId> {
        self.record_fee_at(operator_id, amount, currency, stream, Utc::now())
    }

    /// Like [`FeeLedger::record_fee`] with an explicit creation timestamp
    /// (webhook events carry the venue's timestamp, not arrival time).
    pub fn record_fee_at(
        &mut self,
        operator_id: OperatorId,
        amount: Decimal,
        currency: &str,
        stream: RevenueStream,
        created_at: DateTime<Utc>,
    ) -> Result<FeeTxId> {
        let tx = FeeTransaction::new(operator_id, amount, currency, stream, created_at)?;
        let id = tx.id;
        self.entries.push(tx);
        Ok(id)
    }

    /// Transition every `PENDING` transaction whose `created_at` falls in
    /// the period to `CLAIMED`, stamping the claim reference. Rows already
    /// claimed or distributed are untouched, so overlapping re-runs only
    /// affect rows still pending. Returns the number of rows transitioned.
    pub fn mark_claimed(&mut self, period: &Period, claim_reference: &str) -> usize {
        let claimed_at = Utc::now();
        let mut count = 0;
        for tx in &mut self.entries {
            if tx.is_pending() && period.contains(tx.created_at) {
                // Cannot fail: status checked above.
                if tx.mark_claimed(claimed_at, claim_reference).is_ok() {
                    count += 1;
                }
            }
        }
        info!(%period, claim_reference, count, "marked fees claimed");
        count
    }

    /// Transition an operator's `CLAIMED` transactions within the period
    /// to `DISTRIBUTED`, stamping the on-chain reference. Called only by
    /// the payout executor after a confirmed transfer. Returns the number
    /// of rows transitioned.
    pub fn mark_distributed(
        &mut self,
        operator_id: OperatorId,
        period: &Period,
        reference: &ChainRef,
    ) -> usize {
        let distributed_at = Utc::now();
        let mut count = 0;
        for tx in &mut self.entries {
            if tx.operator_id == operator_id
                && tx.is_claimed()
                && period.contains(tx.created_at)
                && tx.mark_distributed(distributed_at, reference.clone()).is_ok()
            {
                count += 1;
            }
        }
        info!(%operator_id, %period, %reference, count, "marked fees distributed");
        count
    }

    /// Per-operator sum of `PENDING` amounts (earned on the venue, not
    /// yet claimed).
    #[must_use]
    pub fn unclaimed_total(&self) -> BTreeMap<OperatorId, Decimal> {
        self.sum_by_status(FeeStatus::Pending)
    }

    /// Per-operator sum of `CLAIMED` amounts not yet distributed.
    #[must_use]
    pub fn claimed_not_distributed_total(&self) -> BTreeMap<OperatorId, Decimal> {
        self.sum_by_status(FeeStatus::Claimed)
    }

    fn sum_by_status(&self, status: FeeStatus) -> BTreeMap<OperatorId, Decimal> {
        let mut totals = BTreeMap::new();
        for tx in self.entries.iter().filter(|tx| tx.status == status) {
            *totals.entry(tx.operator_id).or_insert(Decimal::ZERO) += tx.gross_amount;
        }
        totals
    }

    /// All transactions, in insertion order.
    #[must_use]
    pub fn transactions(&self) -> &[FeeTransaction] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, id: FeeTxId) -> Option<&FeeTransaction> {
        self.entries.iter().find(|tx| tx.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
