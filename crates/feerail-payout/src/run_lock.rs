//! Per-period run lock.
//!
//! Only one payout run may be in flight for a given period. The lock is
//! advisory at the process level; the completed-payout unique index in
//! the record store remains the hard guard if two processes race.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use feerail_types::{FeerailError, Period, Result};

/// Tracks which periods currently have a payout run in flight.
#[derive(Default, Clone)]
pub struct RunLock {
    active: Arc<Mutex<HashSet<Period>>>,
}

impl RunLock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `period`. Released when the returned guard
    /// drops.
    ///
    /// # Errors
    /// [`FeerailError::PayoutRunInProgress`] if a run already holds the
    /// lock for this period.
    pub fn acquire(&self, period: Period) -> Result<RunGuard> {
        let mut active = self.lock();
        if !active.insert(period) {
            return Err(FeerailError::PayoutRunInProgress { period });
        }
        Ok(RunGuard {
            lock: Arc::clone(&self.active),
            period,
        })
    }

    /// Whether a run is currently active for `period`.
    #[must_use]
    pub fn is_active(&self, period: &Period) -> bool {
        self.lock().contains(period)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<Period>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// RAII guard for an in-flight payout run.
#[derive(Debug)]
pub struct RunGuard {
    lock: Arc<Mutex<HashSet<Period>>>,
    period: Period,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.period);
    }
}
