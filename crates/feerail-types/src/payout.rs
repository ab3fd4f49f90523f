//! Payout record model.
//!
//! A [`PayoutRecord`] is the durable outcome of one payout attempt for one
//! operator in one period. The payout store enforces that at most one
//! `COMPLETED` record exists per `(operator, period)` — that uniqueness
//! constraint, not run sequencing, is the authoritative guard against
//! double payment.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ChainRef, OperatorId, PayoutId, Period};

/// Outcome state of a payout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayoutStatus {
    /// Transfer submitted, confirmation not yet observed. Resolved only
    /// by a reconciliation pass — never by blind resubmission.
    Pending,
    /// Transfer confirmed on-chain.
    Completed,
    /// Transfer rejected or invalid; eligible for retry on a future run.
    Failed,
}

impl fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// The durable record of one payout attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutRecord {
    pub id: PayoutId,
    pub operator_id: OperatorId,
    /// Recipient address as configured at execution time (kept verbatim
    /// for audit, even when it failed validation).
    pub recipient: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: PayoutStatus,
    /// Set when a transfer was actually submitted.
    pub chain_reference: Option<ChainRef>,
    pub period: Period,
    pub processed_at: DateTime<Utc>,
    /// Failure reason or operational note.
    pub note: Option<String>,
}

impl PayoutRecord {
    /// A confirmed, completed payout.
    #[must_use]
    pub fn completed(
        operator_id: OperatorId,
        recipient: impl Into<String>,
        amount: Decimal,
        currency: impl Into<String>,
        reference: ChainRef,
        period: Period,
        processed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PayoutId::new(),
            operator_id,
            recipient: recipient.into(),
            amount,
            currency: currency.into(),
            status: PayoutStatus::Completed,
            chain_reference: Some(reference),
            period,
            processed_at,
            note: None,
        }
    }

    /// A failed payout attempt (validation or chain rejection).
    #[must_use]
    pub fn failed(
        operator_id: OperatorId,
        recipient: impl Into<String>,
        amount: Decimal,
        currency: impl Into<String>,
        period: Period,
        processed_at: DateTime<Utc>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            id: PayoutId::new(),
            operator_id,
            recipient: recipient.into(),
            amount,
            currency: currency.into(),
            status: PayoutStatus::Failed,
            chain_reference: None,
            period,
            processed_at,
            note: Some(note.into()),
        }
    }

    /// A submitted transfer whose confirmation timed out. Carries the
    /// chain reference so reconciliation can query its fate.
    #[must_use]
    pub fn pending(
        operator_id: OperatorId,
        recipient: impl Into<String>,
        amount: Decimal,
        currency: impl Into<String>,
        reference: ChainRef,
        period: Period,
        processed_at: DateTime<Utc>,
        note: impl Into<String>,
    ) -> Self {
        Self {
            id: PayoutId::new(),
            operator_id,
            recipient: recipient.into(),
            amount,
            currency: currency.into(),
            status: PayoutStatus::Pending,
            chain_reference: Some(reference),
            period,
            processed_at,
            note: Some(note.into()),
        }
    }
}
