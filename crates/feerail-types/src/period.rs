//! Settlement period types.
//!
//! All revenue aggregation and payout bookkeeping is keyed by a half-open
//! time interval `[start, end)`. Half-open intervals tile without overlap,
//! so a transaction created exactly at a period boundary belongs to
//! exactly one period and is never double-counted.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{FeerailError, Result};

/// The granularity a period was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodKind {
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "DAILY"),
            Self::Weekly => write!(f, "WEEKLY"),
            Self::Monthly => write!(f, "MONTHLY"),
        }
    }
}

/// A half-open settlement interval `[start, end)`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    /// Create a period, validating that `start < end`.
    ///
    /// # Errors
    /// Returns [`FeerailError::InvalidPeriod`] if the interval is empty
    /// or inverted.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(FeerailError::InvalidPeriod {
                reason: format!("start {start} must precede end {end}"),
            });
        }
        Ok(Self { start, end })
    }

    /// Whether a timestamp falls inside the interval. Half-open: the
    /// start is included, the end is excluded.
    #[must_use]
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }

    /// Interval length.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// The period of equal length immediately following this one.
    #[must_use]
    pub fn next(&self) -> Self {
        Self {
            start: self.end,
            end: self.end + self.duration(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}..{})",
            self.start.format("%Y-%m-%dT%H:%M:%SZ"),
            self.end.format("%Y-%m-%dT%H:%M:%SZ")
        )
    }
}
