//! Fee transaction model — the unit record of the append-only fee ledger.
//!
//! A fee transaction moves strictly forward through its lifecycle:
//! **PENDING → CLAIMED → DISTRIBUTED**. A transaction is never re-opened
//! and never deleted; `FAILED` is a terminal side-state for fees that can
//! never be realized. The transition methods on [`FeeTransaction`] are
//! the only way to change status, so the forward-only invariant holds at
//! the type level.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ChainRef, FeeTxId, FeerailError, OperatorId, Result};

/// Which revenue category a fee belongs to.
///
/// Trading fees and on-ramp (affiliate) fees carry different operator
/// share percentages, so the ledger keeps them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RevenueStream {
    /// Builder fees from trading activity routed through the operator.
    Trading,
    /// Affiliate revenue from fiat on-ramp referrals.
    OnRamp,
}

impl fmt::Display for RevenueStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trading => write!(f, "TRADING"),
            Self::OnRamp => write!(f, "ON_RAMP"),
        }
    }
}

/// Lifecycle state of a fee transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeeStatus {
    /// Earned on the venue, not yet claimed into the custodial wallet.
    Pending,
    /// Claimed from the venue into the custodial wallet.
    Claimed,
    /// Distributed on-chain to the operator's payout address.
    Distributed,
    /// Terminal: the fee can never be realized.
    Failed,
}

impl fmt::Display for FeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Claimed => write!(f, "CLAIMED"),
            Self::Distributed => write!(f, "DISTRIBUTED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// A single fee earned by an operator, as reported by the venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeTransaction {
    pub id: FeeTxId,
    pub operator_id: OperatorId,
    /// Gross fee amount in fixed-point decimal, always positive.
    pub gross_amount: Decimal,
    /// Currency symbol (e.g., "USDC").
    pub currency: String,
    pub stream: RevenueStream,
    pub status: FeeStatus,
    pub created_at: DateTime<Utc>,
    pub claimed_at: Option<DateTime<Utc>>,
    /// Venue-side reference for the claim action.
    pub claim_reference: Option<String>,
    pub distributed_at: Option<DateTime<Utc>>,
    /// On-chain reference for the distribution transfer.
    pub distribution_reference: Option<ChainRef>,
}

impl FeeTransaction {
    /// Create a new fee transaction in `PENDING` state.
    ///
    /// # Errors
    /// Returns [`FeerailError::InvalidAmount`] if `gross_amount` is zero
    /// or negative.
    pub fn new(
        operator_id: OperatorId,
        gross_amount: Decimal,
        currency: impl Into<String>,
        stream: RevenueStream,
        created_at: DateTime<Utc>,
    ) -> Result<Self> {
        if gross_amount <= Decimal::ZERO {
            return Err(FeerailError::InvalidAmount {
                amount: gross_amount,
            });
        }
        Ok(Self {
            id: FeeTxId::new(),
            operator_id,
            gross_amount,
            currency: currency.into(),
            stream,
            status: FeeStatus::Pending,
            created_at,
            claimed_at: None,
            claim_reference: None,
            distributed_at: None,
            distribution_reference: None,
        })
    }

    /// Transition `PENDING → CLAIMED`, stamping the claim metadata.
    ///
    /// # Errors
    /// Returns [`FeerailError::InvalidTransition`] unless the current
    /// status is `PENDING`.
    pub fn mark_claimed(
        &mut self,
        claimed_at: DateTime<Utc>,
        claim_reference: &str,
    ) -> Result<()> {
        if self.status != FeeStatus::Pending {
            return Err(FeerailError::InvalidTransition {
                from: self.status,
                to: FeeStatus::Claimed,
            });
        }
        self.status = FeeStatus::Claimed;
        self.claimed_at = Some(claimed_at);
        self.claim_reference = Some(claim_reference.to_string());
        Ok(())
    }

    /// Transition `CLAIMED → DISTRIBUTED`, stamping the chain reference.
    ///
    /// # Errors
    /// Returns [`FeerailError::InvalidTransition`] unless the current
    /// status is `CLAIMED` — a fee cannot skip the claim step.
    pub fn mark_distributed(
        &mut self,
        distributed_at: DateTime<Utc>,
        reference: ChainRef,
    ) -> Result<()> {
        if self.status != FeeStatus::Claimed {
            return Err(FeerailError::InvalidTransition {
                from: self.status,
                to: FeeStatus::Distributed,
            });
        }
        self.status = FeeStatus::Distributed;
        self.distributed_at = Some(distributed_at);
        self.distribution_reference = Some(reference);
        Ok(())
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == FeeStatus::Pending
    }

    #[must_use]
    pub fn is_claimed(&self) -> bool {
        self.status == FeeStatus::Claimed
    }
}
