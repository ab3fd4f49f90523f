//! Payout readiness — the pre-flight check before a payout run.
//!
//! Readiness answers one question: does the payout wallet hold enough to
//! cover every entitlement the next run would pay? The evaluator and the
//! executor compute entitlements through the same
//! [`PayoutShares::entitlement`] formula, so a `ready` verdict cannot be
//! contradicted by the run that follows it.

use feerail_ingress::SecurityGate;
use feerail_ledger::{FeeLedger, RevenueAggregator};
use feerail_types::{
    OperatorId, OperatorProfile, PayoutConfig, PayoutShares, Period, PeriodKind, Result,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chain::{ChainClient, WalletBalances, WalletKind};

/// One eligible operator's requirement for the upcoming run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorRequirement {
    pub operator_id: OperatorId,
    pub trading_revenue: Decimal,
    pub on_ramp_revenue: Decimal,
    /// Amount the executor would transfer.
    pub entitlement: Decimal,
}

/// Snapshot of funds versus obligations for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub period: Period,
    /// Fees earned on the venue but not yet claimed, all operators.
    pub unclaimed: Decimal,
    /// Fees claimed but not yet converted into the payout wallet.
    pub claimed_not_converted: Decimal,
    /// Live payout wallet balance.
    pub available: Decimal,
    /// Sum of eligible entitlements for the period.
    pub required: Decimal,
    /// `available >= required`. A wallet at exactly the required amount
    /// is ready.
    pub ready: bool,
    /// Per-operator breakdown, ascending operator id.
    pub per_operator: Vec<OperatorRequirement>,
}

/// Computes readiness reports against a live chain client.
pub struct ReadinessEvaluator<C> {
    chain: C,
    config: PayoutConfig,
    aggregator: RevenueAggregator,
}

impl<C: ChainClient> ReadinessEvaluator<C> {
    /// # Errors
    /// [`FeerailError::Configuration`](feerail_types::FeerailError::Configuration)
    /// if the configured shares are out of range.
    pub fn new(chain: C, config: PayoutConfig) -> Result<Self> {
        config.shares.validate()?;
        Ok(Self {
            chain,
            config,
            aggregator: RevenueAggregator::new(),
        })
    }

    /// Evaluate whether the payout wallet can cover the period's
    /// entitlements.
    ///
    /// Operators are eligible when the security gate allows payment, a
    /// payout address is configured, and the entitlement meets the
    /// minimum payout threshold. Operators already paid for the period
    /// still count toward `required` only if their fees have not been
    /// marked distributed — the aggregator's default policy keeps the
    /// revenue visible, but the executor's own duplicate check is what
    /// stops a re-pay, so readiness deliberately reports the gross
    /// picture.
    ///
    /// # Errors
    /// Propagates chain balance query failures.
    pub fn check_readiness(
        &self,
        ledger: &FeeLedger,
        gate: &SecurityGate,
        operators: &[OperatorProfile],
        period_kind: PeriodKind,
        period: &Period,
    ) -> Result<ReadinessReport> {
        let available = self.chain.balance(WalletKind::Payout)?;
        let unclaimed: Decimal = ledger.unclaimed_total().values().sum();
        let claimed_not_converted: Decimal =
            ledger.claimed_not_distributed_total().values().sum();

        let summaries = self.aggregator.summarize(ledger, period_kind, period);
        let mut per_operator = Vec::new();
        let mut required = Decimal::ZERO;

        for summary in summaries {
            let Some(profile) = operators
                .iter()
                .find(|p| p.operator_id == summary.operator_id)
            else {
                continue;
            };
            if !gate.is_payable(summary.operator_id) || profile.payout_address.is_none() {
                continue;
            }
            let entitlement = self
                .shares()
                .entitlement(summary.trading_revenue, summary.on_ramp_revenue);
            if entitlement < self.config.min_payout {
                continue;
            }
            required += entitlement;
            per_operator.push(OperatorRequirement {
                operator_id: summary.operator_id,
                trading_revenue: summary.trading_revenue,
                on_ramp_revenue: summary.on_ramp_revenue,
                entitlement,
            });
        }

        let ready = available >= required;
        info!(%period, %available, %required, ready, operators = per_operator.len(),
            "readiness evaluated");
        Ok(ReadinessReport {
            period: *period,
            unclaimed,
            claimed_not_converted,
            available,
            required,
            ready,
            per_operator,
        })
    }

    /// Balances of both engine wallets.
    ///
    /// # Errors
    /// Propagates chain balance query failures.
    pub fn wallet_balances(&self) -> Result<WalletBalances> {
        Ok(WalletBalances {
            payout_wallet: self.chain.balance(WalletKind::Payout)?,
            claim_wallet: self.chain.balance(WalletKind::Claim)?,
        })
    }

    fn shares(&self) -> &PayoutShares {
        &self.config.shares
    }
}
