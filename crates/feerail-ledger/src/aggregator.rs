//! Revenue aggregation — per-operator, per-period summaries.
//!
//! The aggregator is a pure function of ledger state: the same ledger
//! always yields the same summaries, and half-open `[start, end)`
//! intervals guarantee boundary transactions are never double-counted.
//! Output is sorted ascending by operator id so downstream processing
//! order is deterministic.

use std::collections::BTreeMap;

use feerail_types::{FeeStatus, OperatorId, Period, PeriodKind};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::FeeLedger;

/// Which fee statuses count as distributable revenue.
///
/// The default counts `CLAIMED` and `DISTRIBUTED`: fees still pending on
/// the venue are not yet liquid, and distributed fees must keep counting
/// toward the period total so a re-run after a partial payout reports
/// the same revenue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationPolicy {
    pub include: Vec<FeeStatus>,
}

impl AggregationPolicy {
    #[must_use]
    pub fn counts(&self, status: FeeStatus) -> bool {
        self.include.contains(&status)
    }
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self {
            include: vec![FeeStatus::Claimed, FeeStatus::Distributed],
        }
    }
}

/// Derived per-operator revenue totals for one period. Recomputable at
/// any time from the ledger; never authoritative storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenuePeriodSummary {
    pub operator_id: OperatorId,
    pub period_kind: PeriodKind,
    pub period: Period,
    /// Builder-fee revenue from trading activity.
    pub trading_revenue: Decimal,
    /// Affiliate revenue from on-ramp referrals.
    pub on_ramp_revenue: Decimal,
    /// Sum of both streams.
    pub total_revenue: Decimal,
}

/// Sums distributable ledger revenue into period summaries.
#[derive(Debug, Default, Clone)]
pub struct RevenueAggregator {
    policy: AggregationPolicy,
}

impl RevenueAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            policy: AggregationPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(policy: AggregationPolicy) -> Self {
        Self { policy }
    }

    /// Sum distributable revenue per operator within `[start, end)`.
    ///
    /// Operators with zero matching transactions are simply absent; an
    /// empty ledger yields an empty vector, never an error.
    #[must_use]
    pub fn summarize(
        &self,
        ledger: &FeeLedger,
        period_kind: PeriodKind,
        period: &Period,
    ) -> Vec<RevenuePeriodSummary> {
        let mut buckets: BTreeMap<OperatorId, (Decimal, Decimal)> = BTreeMap::new();

        for tx in ledger.transactions() {
            if !self.policy.counts(tx.status) || !period.contains(tx.created_at) {
                continue;
            }
            let bucket = buckets
                .entry(tx.operator_id)
                .or_insert((Decimal::ZERO, Decimal::ZERO));
            match tx.stream {
                feerail_types::RevenueStream::Trading => bucket.0 += tx.gross_amount,
                feerail_types::RevenueStream::OnRamp => bucket.1 += tx.gross_amount,
            }
        }

        // BTreeMap iteration gives ascending operator id order.
        buckets
            .into_iter()
            .map(|(operator_id, (trading, on_ramp))| RevenuePeriodSummary {
                operator_id,
                period_kind,
                period: *period,
                trading_revenue: trading,
                on_ramp_revenue: on_ramp,
                total_revenue: trading + on_ramp,
            })
            .collect()
    }
}
