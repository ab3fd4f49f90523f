//! Webhook replay prevention.
//!
//! Two checks, in order: the event timestamp must fall inside the
//! freshness window, and the webhook id must never have been seen.
//! Because a stale timestamp is rejected before the dedup lookup, an id
//! that has aged out of the bounded store is still rejected on replay —
//! its timestamp is stale by then.
//!
//! The dedup store does its check-and-insert under one lock, so two
//! concurrent requests with the same id cannot both pass. The store is
//! bounded: entries older than twice the freshness window are pruned
//! once the size threshold is exceeded.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use feerail_types::{FeerailError, Result, WebhookConfig, WebhookId, constants};
use tracing::debug;

/// Bounded key/inserted-at store with atomic check-and-insert.
///
/// Abstracted as a trait so the in-memory store can be swapped for a
/// shared external store when running multiple instances.
pub trait DedupStore: Send + Sync {
    /// Atomically record `id` at `now`.
    ///
    /// # Errors
    /// Returns [`FeerailError::ReplayDetected`] if the id is already
    /// recorded.
    fn check_and_insert(&self, id: &WebhookId, now: DateTime<Utc>) -> Result<()>;

    /// Number of entries currently held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct DedupInner {
    seen: HashMap<WebhookId, DateTime<Utc>>,
    /// Insertion order for age-based pruning (front = oldest).
    order: VecDeque<(WebhookId, DateTime<Utc>)>,
}

/// Process-local dedup store. Single-instance deployments only; state
/// does not survive restarts (the freshness window covers the gap).
pub struct InMemoryDedupStore {
    inner: Mutex<DedupInner>,
    max_entries: usize,
    prune_age: Duration,
}

impl InMemoryDedupStore {
    /// # Panics
    /// Panics if `max_entries` is zero.
    #[must_use]
    pub fn new(max_entries: usize, prune_age: Duration) -> Self {
        assert!(max_entries > 0, "DedupStore max_entries must be > 0");
        Self {
            inner: Mutex::new(DedupInner {
                seen: HashMap::new(),
                order: VecDeque::new(),
            }),
            max_entries,
            prune_age,
        }
    }
}

impl DedupStore for InMemoryDedupStore {
    fn check_and_insert(&self, id: &WebhookId, now: DateTime<Utc>) -> Result<()> {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if inner.seen.contains_key(id) {
            return Err(FeerailError::ReplayDetected {
                webhook_id: id.clone(),
            });
        }

        // Prune only when the store exceeds its size threshold.
        if inner.seen.len() >= self.max_entries {
            let cutoff = now - self.prune_age;
            let mut pruned = 0usize;
            while let Some((_, inserted_at)) = inner.order.front() {
                if *inserted_at >= cutoff {
                    break;
                }
                if let Some((old_id, _)) = inner.order.pop_front() {
                    inner.seen.remove(&old_id);
                    pruned += 1;
                }
            }
            debug!(pruned, remaining = inner.seen.len(), "pruned dedup store");
        }

        inner.seen.insert(id.clone(), now);
        inner.order.push_back((id.clone(), now));
        Ok(())
    }

    fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .seen
            .len()
    }
}

/// Freshness window plus dedup check for inbound webhooks.
pub struct ReplayGuard {
    store: Box<dyn DedupStore>,
    freshness_window_secs: i64,
}

impl ReplayGuard {
    #[must_use]
    pub fn new(config: &WebhookConfig) -> Self {
        let prune_age = Duration::seconds(
            config.freshness_window_secs * i64::from(constants::DEDUP_PRUNE_AGE_FACTOR),
        );
        Self {
            store: Box::new(InMemoryDedupStore::new(config.dedup_max_entries, prune_age)),
            freshness_window_secs: config.freshness_window_secs,
        }
    }

    /// Use a custom (e.g. shared external) dedup store.
    #[must_use]
    pub fn with_store(store: Box<dyn DedupStore>, freshness_window_secs: i64) -> Self {
        Self {
            store,
            freshness_window_secs,
        }
    }

    /// Reject stale or duplicate events; otherwise atomically record the
    /// id. Future-dated timestamps beyond the window are rejected too.
    ///
    /// # Errors
    /// [`FeerailError::StaleWebhook`] outside the freshness window,
    /// [`FeerailError::ReplayDetected`] for a duplicate id.
    pub fn check_and_record(
        &self,
        id: &WebhookId,
        timestamp: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let age_secs = (now - timestamp).num_seconds();
        if age_secs.abs() > self.freshness_window_secs {
            return Err(FeerailError::StaleWebhook {
                age_secs,
                max_secs: self.freshness_window_secs,
            });
        }
        self.store.check_and_insert(id, now)
    }

    #[must_use]
    pub fn entries(&self) -> usize {
        self.store.len()
    }
}
