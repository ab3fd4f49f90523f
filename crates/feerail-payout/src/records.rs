//! Payout record store with storage-level uniqueness.
//!
//! The unique index on `(operator_id, period)` for `COMPLETED` records is
//! maintained by the store itself under its own lock — an insert or
//! promotion that would create a second completed record fails with
//! [`FeerailError::DuplicatePayout`] no matter how the callers are
//! sequenced. This is the invariant that survives concurrent and retried
//! runs; application-level checks are just fast paths in front of it.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use feerail_types::{
    FeerailError, OperatorId, PayoutId, PayoutRecord, PayoutStatus, Period, Result,
};
use tracing::warn;

#[derive(Default)]
struct StoreInner {
    records: Vec<PayoutRecord>,
    /// Unique index: one completed payout per (operator, period).
    completed: HashSet<(OperatorId, Period)>,
}

/// In-memory payout record store. A database-backed implementation would
/// carry the same unique index as a constraint.
#[derive(Default)]
pub struct PayoutStore {
    inner: Mutex<StoreInner>,
}

impl PayoutStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a record. For `COMPLETED` records the unique index is
    /// checked and claimed atomically.
    ///
    /// # Errors
    /// Returns [`FeerailError::DuplicatePayout`] if a completed record
    /// already exists for the same `(operator, period)`.
    pub fn insert(&self, record: PayoutRecord) -> Result<PayoutId> {
        let mut inner = self.lock();
        if record.status == PayoutStatus::Completed
            && !inner.completed.insert((record.operator_id, record.period))
        {
            warn!(operator_id = %record.operator_id, period = %record.period,
                "unique index rejected duplicate completed payout");
            return Err(FeerailError::DuplicatePayout {
                operator_id: record.operator_id,
                period: record.period,
            });
        }
        let id = record.id;
        inner.records.push(record);
        Ok(id)
    }

    /// Promote a `PENDING` record to `COMPLETED` after reconciliation
    /// confirmed its transfer. Goes through the same unique index as a
    /// direct completed insert.
    ///
    /// # Errors
    /// [`FeerailError::Internal`] if the record does not exist or is not
    /// pending; [`FeerailError::DuplicatePayout`] if the index slot is
    /// already taken.
    pub fn mark_completed(&self, id: PayoutId) -> Result<()> {
        let mut inner = self.lock();
        let idx = inner
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| FeerailError::Internal(format!("payout record {id} not found")))?;
        let (operator_id, period, status) = {
            let r = &inner.records[idx];
            (r.operator_id, r.period, r.status)
        };
        if status != PayoutStatus::Pending {
            return Err(FeerailError::Internal(format!(
                "payout record {id} is {status}, not PENDING"
            )));
        }
        if !inner.completed.insert((operator_id, period)) {
            return Err(FeerailError::DuplicatePayout {
                operator_id,
                period,
            });
        }
        inner.records[idx].status = PayoutStatus::Completed;
        Ok(())
    }

    /// Mark a `PENDING` record as `FAILED` with a reason.
    ///
    /// # Errors
    /// [`FeerailError::Internal`] if the record does not exist or is not
    /// pending.
    pub fn mark_failed(&self, id: PayoutId, note: &str) -> Result<()> {
        let mut inner = self.lock();
        let record = inner
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| FeerailError::Internal(format!("payout record {id} not found")))?;
        if record.status != PayoutStatus::Pending {
            return Err(FeerailError::Internal(format!(
                "payout record {id} is {}, not PENDING",
                record.status
            )));
        }
        record.status = PayoutStatus::Failed;
        record.note = Some(note.to_string());
        Ok(())
    }

    /// Whether a completed payout exists for `(operator, period)`.
    #[must_use]
    pub fn completed_exists(&self, operator_id: OperatorId, period: &Period) -> bool {
        self.lock().completed.contains(&(operator_id, *period))
    }

    /// Whether an unresolved pending payout exists for `(operator,
    /// period)`. While one exists, resubmission is forbidden — the
    /// original transfer may still land.
    #[must_use]
    pub fn pending_exists(&self, operator_id: OperatorId, period: &Period) -> bool {
        self.lock().records.iter().any(|r| {
            r.operator_id == operator_id
                && r.period == *period
                && r.status == PayoutStatus::Pending
        })
    }

    /// All records for one operator, in insertion order.
    #[must_use]
    pub fn history(&self, operator_id: OperatorId) -> Vec<PayoutRecord> {
        self.lock()
            .records
            .iter()
            .filter(|r| r.operator_id == operator_id)
            .cloned()
            .collect()
    }

    /// Pending records that carry a chain reference — the reconciliation
    /// work queue.
    #[must_use]
    pub fn pending_with_reference(&self) -> Vec<PayoutRecord> {
        self.lock()
            .records
            .iter()
            .filter(|r| r.status == PayoutStatus::Pending && r.chain_reference.is_some())
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use feerail_types::ChainRef;
    use rust_decimal::Decimal;

    use super::*;

    fn period() -> Period {
        Period::new(
            Utc.timestamp_opt(0, 0).unwrap(),
            Utc.timestamp_opt(86400, 0).unwrap(),
        )
        .unwrap()
    }

    const ADDR: &str = "0x52908400098527886e0f7030069857d2e4169ee7";

    fn completed(op: OperatorId) -> PayoutRecord {
        PayoutRecord::completed(
            op,
            ADDR,
            Decimal::new(100, 0),
            "USDC",
            ChainRef::new("0x1"),
            period(),
            Utc::now(),
        )
    }

    #[test]
    fn first_completed_insert_ok() {
        let store = PayoutStore::new();
        let op = OperatorId::new();
        store.insert(completed(op)).unwrap();
        assert!(store.completed_exists(op, &period()));
    }

    #[test]
    fn second_completed_insert_blocked() {
        let store = PayoutStore::new();
        let op = OperatorId::new();
        store.insert(completed(op)).unwrap();
        let err = store.insert(completed(op)).unwrap_err();
        assert!(matches!(err, FeerailError::DuplicatePayout { .. }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn failed_records_do_not_claim_index() {
        let store = PayoutStore::new();
        let op = OperatorId::new();
        let rec = PayoutRecord::failed(
            op,
            ADDR,
            Decimal::new(100, 0),
            "USDC",
            period(),
            Utc::now(),
            "chain rejected",
        );
        store.insert(rec).unwrap();
        assert!(!store.completed_exists(op, &period()));
        // A retry can still complete.
        store.insert(completed(op)).unwrap();
    }

    #[test]
    fn different_periods_are_independent() {
        let store = PayoutStore::new();
        let op = OperatorId::new();
        store.insert(completed(op)).unwrap();

        let next = period().next();
        let mut rec = completed(op);
        rec.period = next;
        store.insert(rec).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn promote_pending_to_completed() {
        let store = PayoutStore::new();
        let op = OperatorId::new();
        let rec = PayoutRecord::pending(
            op,
            ADDR,
            Decimal::new(100, 0),
            "USDC",
            ChainRef::new("0xslow"),
            period(),
            Utc::now(),
            "confirmation timeout",
        );
        let id = store.insert(rec).unwrap();
        assert_eq!(store.pending_with_reference().len(), 1);

        store.mark_completed(id).unwrap();
        assert!(store.completed_exists(op, &period()));
        assert!(store.pending_with_reference().is_empty());
    }

    #[test]
    fn promotion_respects_unique_index() {
        let store = PayoutStore::new();
        let op = OperatorId::new();
        let rec = PayoutRecord::pending(
            op,
            ADDR,
            Decimal::new(100, 0),
            "USDC",
            ChainRef::new("0xslow"),
            period(),
            Utc::now(),
            "confirmation timeout",
        );
        let id = store.insert(rec).unwrap();
        store.insert(completed(op)).unwrap();

        let err = store.mark_completed(id).unwrap_err();
        assert!(matches!(err, FeerailError::DuplicatePayout { .. }));
    }

    #[test]
    fn mark_failed_requires_pending() {
        let store = PayoutStore::new();
        let op = OperatorId::new();
        let id = store.insert(completed(op)).unwrap();
        assert!(store.mark_failed(id, "nope").is_err());
    }

    #[test]
    fn concurrent_completed_inserts_single_winner() {
        use std::sync::Arc;

        let store = Arc::new(PayoutStore::new());
        let op = OperatorId::new();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                store.insert(completed(op)).is_ok()
            }));
        }
        let wins: usize = handles
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum();
        assert_eq!(wins, 1, "unique index must admit exactly one completed record");
    }

    #[test]
    fn history_filters_by_operator() {
        let store = PayoutStore::new();
        let a = OperatorId::new();
        let b = OperatorId::new();
        store.insert(completed(a)).unwrap();
        let mut rec_b = completed(b);
        rec_b.period = period().next();
        store.insert(rec_b).unwrap();

        assert_eq!(store.history(a).len(), 1);
        assert_eq!(store.history(b).len(), 1);
        assert_eq!(store.history(OperatorId::new()).len(), 0);
    }
}
