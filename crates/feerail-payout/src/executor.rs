//! Idempotent payout execution.
//!
//! A run walks the period's revenue summaries in ascending operator-id
//! order and, for each operator, re-checks every precondition at
//! execution time: security veto, configured address, minimum threshold,
//! the completed-payout unique index, and the live wallet balance. A
//! balance shortfall halts the run — partial paying the ledger dry and
//! leaving later operators stranded is worse than stopping loudly.
//!
//! Confirmation timeouts never retry in-run. The transfer may still land;
//! the record stays `PENDING` with its chain reference and the
//! reconciliation pass resolves it later.

use std::fmt;

use chrono::Utc;
use feerail_ingress::SecurityGate;
use feerail_ledger::{FeeLedger, RevenueAggregator};
use feerail_types::{
    ChainAddress, ChainRef, FeerailError, OperatorId, OperatorProfile, OperatorStatus,
    PayoutConfig, PayoutId, PayoutRecord, Period, PeriodKind, Result,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chain::{ChainClient, ConfirmOutcome, WalletKind, to_minor_units};
use crate::records::PayoutStore;
use crate::run_lock::RunLock;

/// Why an operator was skipped without a payout record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The security gate vetoed payment.
    SecurityVeto { status: OperatorStatus },
    /// No profile in the directory snapshot handed to the run.
    UnknownOperator,
    /// No payout address configured.
    NoPayoutAddress,
    /// Entitlement under the minimum payout threshold.
    BelowMinimum { entitlement: Decimal },
    /// A completed payout already exists for this period.
    AlreadyPaid,
    /// A submitted transfer for this period is still unresolved;
    /// reconciliation must settle it before any retry.
    AwaitingReconciliation,
    /// The wallet could not cover this operator's entitlement.
    InsufficientFunds { needed: Decimal, available: Decimal },
    /// An earlier shortfall halted the run before this operator.
    RunHalted,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SecurityVeto { status } => write!(f, "security veto ({status})"),
            Self::UnknownOperator => write!(f, "operator not in directory"),
            Self::NoPayoutAddress => write!(f, "no payout address configured"),
            Self::BelowMinimum { entitlement } => {
                write!(f, "entitlement {entitlement} below minimum")
            }
            Self::AlreadyPaid => write!(f, "already paid for period"),
            Self::AwaitingReconciliation => {
                write!(f, "unresolved pending transfer awaits reconciliation")
            }
            Self::InsufficientFunds { needed, available } => {
                write!(f, "insufficient funds: need {needed}, have {available}")
            }
            Self::RunHalted => write!(f, "run halted by earlier shortfall"),
        }
    }
}

/// Outcome of one operator within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OperatorOutcome {
    /// Transfer confirmed; a `COMPLETED` record exists.
    Paid {
        payout_id: PayoutId,
        amount: Decimal,
        reference: ChainRef,
    },
    /// Transfer submitted, confirmation not observed; a `PENDING` record
    /// awaits reconciliation.
    AwaitingConfirmation {
        payout_id: PayoutId,
        amount: Decimal,
        reference: ChainRef,
    },
    /// Validation or chain rejection; a `FAILED` record exists and the
    /// operator is retryable next run.
    Failed { payout_id: PayoutId, reason: String },
    /// No attempt made; no record written.
    Skipped { reason: SkipReason },
}

/// Per-operator line item of a run report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorResult {
    pub operator_id: OperatorId,
    pub outcome: OperatorOutcome,
}

/// Full report of one payout run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutRunReport {
    pub period_kind: PeriodKind,
    pub period: Period,
    pub outcomes: Vec<OperatorResult>,
    /// Sum of confirmed transfers.
    pub total_paid: Decimal,
    /// True if a balance shortfall stopped the run early.
    pub halted: bool,
}

impl PayoutRunReport {
    /// Operators with a confirmed payout in this run.
    #[must_use]
    pub fn paid_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|r| matches!(r.outcome, OperatorOutcome::Paid { .. }))
            .count()
    }
}

/// Executes payout runs against an injected chain client.
pub struct PayoutExecutor<C> {
    pub(crate) chain: C,
    pub(crate) config: PayoutConfig,
    pub(crate) aggregator: RevenueAggregator,
    pub(crate) store: PayoutStore,
    pub(crate) run_lock: RunLock,
}

impl<C: ChainClient> PayoutExecutor<C> {
    /// # Errors
    /// [`FeerailError::Configuration`] if the configured shares are out
    /// of range.
    pub fn new(chain: C, config: PayoutConfig) -> Result<Self> {
        config.shares.validate()?;
        Ok(Self {
            chain,
            config,
            aggregator: RevenueAggregator::new(),
            store: PayoutStore::new(),
            run_lock: RunLock::new(),
        })
    }

    /// Run payouts for one period.
    ///
    /// Safe to call repeatedly for the same period: operators already
    /// paid are skipped, and the record store's unique index backs the
    /// check even if this process-level guard is bypassed.
    ///
    /// # Errors
    /// [`FeerailError::PayoutRunInProgress`] if another run holds the
    /// period lock; chain balance failures propagate. Per-operator
    /// failures never abort the run — they land in the report.
    pub fn process_payouts(
        &self,
        period_kind: PeriodKind,
        period: &Period,
        ledger: &mut FeeLedger,
        gate: &SecurityGate,
        operators: &[OperatorProfile],
    ) -> Result<PayoutRunReport> {
        let _guard = self.run_lock.acquire(*period)?;
        info!(%period, ?period_kind, "payout run starting");

        let summaries = self.aggregator.summarize(ledger, period_kind, period);
        let mut outcomes = Vec::with_capacity(summaries.len());
        let mut total_paid = Decimal::ZERO;
        let mut halted = false;

        for summary in summaries {
            let operator_id = summary.operator_id;
            if halted {
                outcomes.push(OperatorResult {
                    operator_id,
                    outcome: OperatorOutcome::Skipped {
                        reason: SkipReason::RunHalted,
                    },
                });
                continue;
            }

            let entitlement = self
                .config
                .shares
                .entitlement(summary.trading_revenue, summary.on_ramp_revenue);

            if let Some(reason) = self.skip_reason(gate, operators, operator_id, entitlement, period)
            {
                info!(%operator_id, %reason, "operator skipped");
                outcomes.push(OperatorResult {
                    operator_id,
                    outcome: OperatorOutcome::Skipped { reason },
                });
                continue;
            }

            // Unwrap is safe: skip_reason filtered operators without a
            // profile or address.
            let profile = operators
                .iter()
                .find(|p| p.operator_id == operator_id)
                .ok_or_else(|| FeerailError::Internal("profile vanished mid-run".into()))?;
            let raw_address = profile
                .payout_address
                .as_deref()
                .ok_or_else(|| FeerailError::Internal("address vanished mid-run".into()))?;

            // Balance re-check before every transfer. A shortfall halts
            // the remainder of the run rather than paying operators in
            // arbitrary depth order.
            let available = self.chain.balance(WalletKind::Payout)?;
            if available < entitlement {
                warn!(%operator_id, %entitlement, %available, "wallet shortfall, halting run");
                halted = true;
                outcomes.push(OperatorResult {
                    operator_id,
                    outcome: OperatorOutcome::Skipped {
                        reason: SkipReason::InsufficientFunds {
                            needed: entitlement,
                            available,
                        },
                    },
                });
                continue;
            }

            let outcome =
                self.attempt_transfer(ledger, operator_id, raw_address, entitlement, period)?;
            if let OperatorOutcome::Paid { amount, .. } = &outcome {
                total_paid += *amount;
            }
            outcomes.push(OperatorResult {
                operator_id,
                outcome,
            });
        }

        info!(%period, %total_paid, halted, "payout run finished");
        Ok(PayoutRunReport {
            period_kind,
            period: *period,
            outcomes,
            total_paid,
            halted,
        })
    }

    /// Pre-transfer eligibility checks, cheapest first.
    fn skip_reason(
        &self,
        gate: &SecurityGate,
        operators: &[OperatorProfile],
        operator_id: OperatorId,
        entitlement: Decimal,
        period: &Period,
    ) -> Option<SkipReason> {
        if let Err(FeerailError::SecurityVeto { status, .. }) = gate.veto(operator_id) {
            return Some(SkipReason::SecurityVeto { status });
        }
        let Some(profile) = operators.iter().find(|p| p.operator_id == operator_id) else {
            return Some(SkipReason::UnknownOperator);
        };
        if profile.payout_address.is_none() {
            return Some(SkipReason::NoPayoutAddress);
        }
        if entitlement < self.config.min_payout {
            return Some(SkipReason::BelowMinimum { entitlement });
        }
        if self.store.completed_exists(operator_id, period) {
            return Some(SkipReason::AlreadyPaid);
        }
        if self.store.pending_exists(operator_id, period) {
            return Some(SkipReason::AwaitingReconciliation);
        }
        None
    }

    /// Validate, submit, and confirm one transfer, writing the matching
    /// payout record. Only infrastructure errors (store inconsistency)
    /// propagate; transfer failures become `FAILED` records.
    fn attempt_transfer(
        &self,
        ledger: &mut FeeLedger,
        operator_id: OperatorId,
        raw_address: &str,
        amount: Decimal,
        period: &Period,
    ) -> Result<OperatorOutcome> {
        let now = Utc::now();

        let address = match ChainAddress::parse(raw_address) {
            Ok(addr) => addr,
            Err(err) => {
                let reason = err.to_string();
                warn!(%operator_id, reason, "payout address failed validation");
                let payout_id = self.store.insert(PayoutRecord::failed(
                    operator_id,
                    raw_address,
                    amount,
                    &self.config.currency,
                    *period,
                    now,
                    &reason,
                ))?;
                return Ok(OperatorOutcome::Failed { payout_id, reason });
            }
        };

        if let Err(err) = to_minor_units(amount, self.config.token_decimals) {
            let reason = err.to_string();
            let payout_id = self.store.insert(PayoutRecord::failed(
                operator_id,
                raw_address,
                amount,
                &self.config.currency,
                *period,
                now,
                &reason,
            ))?;
            return Ok(OperatorOutcome::Failed { payout_id, reason });
        }

        let reference = match self.chain.submit_transfer(&address, amount) {
            Ok(reference) => reference,
            Err(err) => {
                let reason = err.to_string();
                warn!(%operator_id, reason, "transfer submission rejected");
                let payout_id = self.store.insert(PayoutRecord::failed(
                    operator_id,
                    raw_address,
                    amount,
                    &self.config.currency,
                    *period,
                    now,
                    &reason,
                ))?;
                return Ok(OperatorOutcome::Failed { payout_id, reason });
            }
        };

        match self
            .chain
            .await_confirmation(&reference, self.config.confirm_timeout)
        {
            Ok(ConfirmOutcome::Confirmed) => {
                let payout_id = self.store.insert(PayoutRecord::completed(
                    operator_id,
                    raw_address,
                    amount,
                    &self.config.currency,
                    reference.clone(),
                    *period,
                    now,
                ))?;
                let rows = ledger.mark_distributed(operator_id, period, &reference);
                info!(%operator_id, %amount, %reference, rows, "payout confirmed");
                Ok(OperatorOutcome::Paid {
                    payout_id,
                    amount,
                    reference,
                })
            }
            // Timed out or provider unreachable after submission: the
            // transfer may still land, so the record stays pending.
            Ok(ConfirmOutcome::TimedOut) | Err(_) => {
                warn!(%operator_id, %reference, "confirmation not observed, leaving pending");
                let payout_id = self.store.insert(PayoutRecord::pending(
                    operator_id,
                    raw_address,
                    amount,
                    &self.config.currency,
                    reference.clone(),
                    *period,
                    now,
                    "confirmation timeout",
                ))?;
                Ok(OperatorOutcome::AwaitingConfirmation {
                    payout_id,
                    amount,
                    reference,
                })
            }
        }
    }

    /// The payout record store.
    #[must_use]
    pub fn store(&self) -> &PayoutStore {
        &self.store
    }

    /// The injected chain client.
    #[must_use]
    pub fn chain(&self) -> &C {
        &self.chain
    }

    /// All payout records for one operator.
    #[must_use]
    pub fn history(&self, operator_id: OperatorId) -> Vec<PayoutRecord> {
        self.store.history(operator_id)
    }
}
