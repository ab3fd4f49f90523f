//! Security state for operator risk gating.
//!
//! Every operator carries a bounded risk score and a status. The status
//! machine lives in the security gate; this module defines the state
//! record and the clamping rule for score updates:
//!
//! ```text
//! active ⇄ suspended           (risk escalation or manual action)
//! active|suspended → under-review → active|suspended   (manual)
//! any non-banned → banned      (terminal, one-way)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{OperatorId, constants};

/// Operator trust status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorStatus {
    Active,
    UnderReview,
    Suspended,
    Banned,
}

impl fmt::Display for OperatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::UnderReview => write!(f, "UNDER_REVIEW"),
            Self::Suspended => write!(f, "SUSPENDED"),
            Self::Banned => write!(f, "BANNED"),
        }
    }
}

/// Per-operator security state consulted before every payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityState {
    pub operator_id: OperatorId,
    pub status: OperatorStatus,
    /// Bounded trustworthiness measure, clamped to `[0, 100]` on every update.
    pub risk_score: u8,
    pub suspended_reason: Option<String>,
    pub banned_reason: Option<String>,
}

impl SecurityState {
    /// A clean, active state with zero risk.
    #[must_use]
    pub fn new(operator_id: OperatorId) -> Self {
        Self {
            operator_id,
            status: OperatorStatus::Active,
            risk_score: 0,
            suspended_reason: None,
            banned_reason: None,
        }
    }

    /// Apply a signed delta to the risk score, clamping to `[0, 100]`.
    /// Returns the new score. Status transitions are the gate's job.
    pub fn apply_risk_delta(&mut self, delta: i32) -> u8 {
        let raw = i32::from(self.risk_score) + delta;
        self.risk_score = raw.clamp(0, i32::from(constants::RISK_SCORE_MAX)) as u8;
        self.risk_score
    }

    /// Whether the payout executor may pay this operator.
    /// Suspended and banned operators are vetoed; under-review is not.
    #[must_use]
    pub fn is_payable(&self) -> bool {
        !matches!(
            self.status,
            OperatorStatus::Suspended | OperatorStatus::Banned
        )
    }
}
