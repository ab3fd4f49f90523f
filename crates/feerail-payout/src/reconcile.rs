//! Reconciliation of pending payouts.
//!
//! A transfer that timed out on confirmation is neither paid nor failed
//! until the chain says so. Reconciliation walks every `PENDING` record
//! with a chain reference, asks the provider for the transfer's current
//! status, and settles the record: confirmed transfers are promoted to
//! `COMPLETED` (and the ledger rows marked distributed), rejected ones
//! to `FAILED`, and anything still in flight or unknown is left alone
//! for the next pass.

use feerail_ledger::FeeLedger;
use feerail_types::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chain::{ChainClient, TransferStatus};
use crate::executor::PayoutExecutor;

/// Tally of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Pending records promoted to `COMPLETED`.
    pub completed: usize,
    /// Pending records settled as `FAILED`.
    pub failed: usize,
    /// Records still pending or unknown after this pass.
    pub unresolved: usize,
}

impl<C: ChainClient> PayoutExecutor<C> {
    /// Settle pending payout records against current chain state.
    ///
    /// Provider lookups that error leave the record unresolved rather
    /// than aborting the pass; everything else is settled in place.
    ///
    /// # Errors
    /// Propagates record-store inconsistencies (a pending record that
    /// cannot be promoted or failed).
    pub fn reconcile(&self, ledger: &mut FeeLedger) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();

        for record in self.store.pending_with_reference() {
            // Filtered on chain_reference.is_some() above.
            let Some(reference) = record.chain_reference.as_ref() else {
                continue;
            };
            match self.chain.transfer_status(reference) {
                Ok(TransferStatus::Confirmed) => {
                    self.store.mark_completed(record.id)?;
                    let rows = ledger.mark_distributed(record.operator_id, &record.period, reference);
                    info!(operator_id = %record.operator_id, %reference, rows,
                        "pending payout confirmed by reconciliation");
                    report.completed += 1;
                }
                Ok(TransferStatus::Rejected { reason }) => {
                    self.store
                        .mark_failed(record.id, &format!("rejected on-chain: {reason}"))?;
                    warn!(operator_id = %record.operator_id, %reference, reason,
                        "pending payout rejected on-chain");
                    report.failed += 1;
                }
                Ok(TransferStatus::Pending | TransferStatus::Unknown) => {
                    report.unresolved += 1;
                }
                Err(err) => {
                    warn!(%reference, %err, "status lookup failed, leaving record pending");
                    report.unresolved += 1;
                }
            }
        }

        info!(
            completed = report.completed,
            failed = report.failed,
            unresolved = report.unresolved,
            "reconciliation pass finished"
        );
        Ok(report)
    }
}
