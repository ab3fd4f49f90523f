//! Security gate — per-operator risk scoring and suspension/ban state
//! machine.
//!
//! ## Design Principles
//!
//! - **Fail-closed**: a vetoed operator is skipped, never paid
//! - **No bypass**: the payout executor consults [`SecurityGate::veto`]
//!   before every transfer
//! - **One-way ban**: `BANNED` is terminal; any transition attempt on a
//!   banned operator is an error
//!
//! Crossing a risk score of 80 while `ACTIVE` auto-suspends: four
//! pattern matches (+20 each) leave an operator at exactly 80 and still
//! active; the fifth pushes past the threshold and suspends.

use std::collections::HashMap;

use feerail_types::{
    FeerailError, OperatorId, OperatorStatus, Result, SecurityState, constants,
};
use tracing::{info, warn};

use crate::patterns;

/// External collaborator invoked when an operator is banned: takes the
/// operator's platform offline.
pub trait PlatformPublisher: Send + Sync {
    fn unpublish(&self, operator_id: OperatorId) -> Result<()>;
}

/// Publisher that does nothing. Used in tests and in deployments where
/// unpublishing is handled out-of-band.
#[derive(Debug, Default)]
pub struct NoopPublisher;

impl PlatformPublisher for NoopPublisher {
    fn unpublish(&self, _operator_id: OperatorId) -> Result<()> {
        Ok(())
    }
}

/// Risk scoring and status state machine for all operators.
pub struct SecurityGate {
    states: HashMap<OperatorId, SecurityState>,
    publisher: Box<dyn PlatformPublisher>,
}

impl SecurityGate {
    #[must_use]
    pub fn new(publisher: Box<dyn PlatformPublisher>) -> Self {
        Self {
            states: HashMap::new(),
            publisher,
        }
    }

    /// Current state for an operator; unknown operators are clean/active.
    #[must_use]
    pub fn state(&self, operator_id: OperatorId) -> SecurityState {
        self.states
            .get(&operator_id)
            .cloned()
            .unwrap_or_else(|| SecurityState::new(operator_id))
    }

    /// Scan operator content against the suspicious-pattern catalog.
    /// Each matched pattern adds a fixed risk increment. Returns the
    /// matched pattern ids.
    ///
    /// # Errors
    /// Returns [`FeerailError::BannedIsTerminal`] for banned operators.
    pub fn scan_content(
        &mut self,
        operator_id: OperatorId,
        content: &str,
    ) -> Result<Vec<&'static str>> {
        let matches = patterns::scan(content);
        if !matches.is_empty() {
            let delta =
                i32::try_from(matches.len()).unwrap_or(i32::MAX)
                    * i32::from(constants::RISK_SCORE_PER_MATCH);
            warn!(%operator_id, ?matches, delta, "suspicious content matched");
            self.update_risk_score(operator_id, delta)?;
        }
        Ok(matches)
    }

    /// Apply a risk score delta, clamped to `[0, 100]`. A score strictly
    /// above the auto-suspend threshold while `ACTIVE` suspends the
    /// operator. Returns the new score.
    ///
    /// # Errors
    /// Returns [`FeerailError::BannedIsTerminal`] for banned operators.
    pub fn update_risk_score(&mut self, operator_id: OperatorId, delta: i32) -> Result<u8> {
        let state = self.entry(operator_id)?;
        let score = state.apply_risk_delta(delta);
        if score > constants::RISK_AUTO_SUSPEND_THRESHOLD
            && state.status == OperatorStatus::Active
        {
            state.status = OperatorStatus::Suspended;
            state.suspended_reason = Some(format!(
                "risk score {score} exceeded auto-suspend threshold {}",
                constants::RISK_AUTO_SUSPEND_THRESHOLD
            ));
            warn!(%operator_id, score, "operator auto-suspended");
        }
        Ok(score)
    }

    /// Manually suspend an operator. Reversible via review.
    ///
    /// # Errors
    /// Returns [`FeerailError::BannedIsTerminal`] for banned operators.
    pub fn suspend(&mut self, operator_id: OperatorId, reason: &str) -> Result<()> {
        let state = self.entry(operator_id)?;
        state.status = OperatorStatus::Suspended;
        state.suspended_reason = Some(reason.to_string());
        info!(%operator_id, reason, "operator suspended");
        Ok(())
    }

    /// Permanently ban an operator and unpublish their platform.
    /// The ban is recorded before the unpublish call, so a publisher
    /// failure never leaves a banned operator payable.
    ///
    /// # Errors
    /// Returns [`FeerailError::BannedIsTerminal`] if already banned, or
    /// the publisher's error if unpublishing fails.
    pub fn ban(&mut self, operator_id: OperatorId, reason: &str) -> Result<()> {
        let state = self.entry(operator_id)?;
        state.status = OperatorStatus::Banned;
        state.banned_reason = Some(reason.to_string());
        warn!(%operator_id, reason, "operator banned");
        self.publisher.unpublish(operator_id)
    }

    /// Move an operator into manual review.
    ///
    /// # Errors
    /// Returns [`FeerailError::BannedIsTerminal`] for banned operators.
    pub fn begin_review(&mut self, operator_id: OperatorId) -> Result<()> {
        let state = self.entry(operator_id)?;
        state.status = OperatorStatus::UnderReview;
        Ok(())
    }

    /// Conclude a manual review. Approval resets the risk score to zero
    /// and returns the operator to `ACTIVE`; rejection suspends with the
    /// review notes as the reason.
    ///
    /// # Errors
    /// Returns [`FeerailError::NotUnderReview`] unless the operator is
    /// currently under review.
    pub fn review_platform(
        &mut self,
        operator_id: OperatorId,
        approved: bool,
        notes: &str,
    ) -> Result<()> {
        let state = self.entry(operator_id)?;
        if state.status != OperatorStatus::UnderReview {
            return Err(FeerailError::NotUnderReview {
                operator_id,
                status: state.status,
            });
        }
        if approved {
            state.status = OperatorStatus::Active;
            state.risk_score = 0;
            state.suspended_reason = None;
            info!(%operator_id, notes, "review approved, operator reinstated");
        } else {
            state.status = OperatorStatus::Suspended;
            state.suspended_reason = Some(notes.to_string());
            info!(%operator_id, notes, "review rejected, operator suspended");
        }
        Ok(())
    }

    /// Whether the payout executor may pay this operator.
    #[must_use]
    pub fn is_payable(&self, operator_id: OperatorId) -> bool {
        self.state(operator_id).is_payable()
    }

    /// Payout veto check: error for suspended or banned operators.
    ///
    /// # Errors
    /// Returns [`FeerailError::SecurityVeto`] when the operator is not
    /// payable.
    pub fn veto(&self, operator_id: OperatorId) -> Result<()> {
        let state = self.state(operator_id);
        if state.is_payable() {
            Ok(())
        } else {
            Err(FeerailError::SecurityVeto {
                operator_id,
                status: state.status,
            })
        }
    }

    /// Mutable state entry, failing on banned operators (ban is terminal).
    fn entry(&mut self, operator_id: OperatorId) -> Result<&mut SecurityState> {
        let state = self
            .states
            .entry(operator_id)
            .or_insert_with(|| SecurityState::new(operator_id));
        if state.status == OperatorStatus::Banned {
            return Err(FeerailError::BannedIsTerminal(operator_id));
        }
        Ok(state)
    }
}

impl Default for SecurityGate {
    fn default() -> Self {
        Self::new(Box::new(NoopPublisher))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct RecordingPublisher {
        unpublished: Mutex<Vec<OperatorId>>,
    }

    impl PlatformPublisher for RecordingPublisher {
        fn unpublish(&self, operator_id: OperatorId) -> Result<()> {
            self.unpublished
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(operator_id);
            Ok(())
        }
    }

    #[test]
    fn unknown_operator_is_clean_and_payable() {
        let gate = SecurityGate::default();
        let op = OperatorId::new();
        assert_eq!(gate.state(op).risk_score, 0);
        assert!(gate.is_payable(op));
        assert!(gate.veto(op).is_ok());
    }

    #[test]
    fn three_matches_raise_to_sixty_still_active() {
        let mut gate = SecurityGate::default();
        let op = OperatorId::new();
        for _ in 0..3 {
            let matches = gate
                .scan_content(op, "guaranteed returns every week")
                .unwrap();
            assert_eq!(matches.len(), 1);
        }
        let state = gate.state(op);
        assert_eq!(state.risk_score, 60);
        assert_eq!(state.status, OperatorStatus::Active);
    }

    #[test]
    fn fifth_match_auto_suspends() {
        let mut gate = SecurityGate::default();
        let op = OperatorId::new();
        for _ in 0..4 {
            gate.scan_content(op, "ponzi").unwrap();
        }
        // Exactly 80: threshold not crossed yet.
        let state = gate.state(op);
        assert_eq!(state.risk_score, 80);
        assert_eq!(state.status, OperatorStatus::Active);

        gate.scan_content(op, "ponzi").unwrap();
        let state = gate.state(op);
        assert_eq!(state.risk_score, 100);
        assert_eq!(state.status, OperatorStatus::Suspended);
        assert!(!gate.is_payable(op));
    }

    #[test]
    fn clean_scan_adds_no_risk() {
        let mut gate = SecurityGate::default();
        let op = OperatorId::new();
        let matches = gate.scan_content(op, "portfolio analytics").unwrap();
        assert!(matches.is_empty());
        assert_eq!(gate.state(op).risk_score, 0);
    }

    #[test]
    fn veto_for_suspended() {
        let mut gate = SecurityGate::default();
        let op = OperatorId::new();
        gate.suspend(op, "manual review pending").unwrap();
        let err = gate.veto(op).unwrap_err();
        assert!(matches!(err, FeerailError::SecurityVeto { .. }));
    }

    #[test]
    fn ban_unpublishes_and_is_terminal() {
        let publisher = Box::new(RecordingPublisher {
            unpublished: Mutex::new(Vec::new()),
        });
        let mut gate = SecurityGate::new(publisher);
        let op = OperatorId::new();

        gate.ban(op, "fraudulent platform").unwrap();
        assert_eq!(gate.state(op).status, OperatorStatus::Banned);
        assert!(!gate.is_payable(op));

        // Every further transition fails.
        assert!(matches!(
            gate.suspend(op, "x").unwrap_err(),
            FeerailError::BannedIsTerminal(_)
        ));
        assert!(gate.update_risk_score(op, -50).is_err());
        assert!(gate.begin_review(op).is_err());
        assert!(gate.ban(op, "again").is_err());
    }

    #[test]
    fn review_approval_resets_risk() {
        let mut gate = SecurityGate::default();
        let op = OperatorId::new();
        for _ in 0..5 {
            gate.scan_content(op, "guaranteed profit").unwrap();
        }
        assert_eq!(gate.state(op).status, OperatorStatus::Suspended);

        gate.begin_review(op).unwrap();
        assert_eq!(gate.state(op).status, OperatorStatus::UnderReview);
        assert!(gate.is_payable(op), "under-review operators are payable");

        gate.review_platform(op, true, "false positive").unwrap();
        let state = gate.state(op);
        assert_eq!(state.status, OperatorStatus::Active);
        assert_eq!(state.risk_score, 0);
        assert!(state.suspended_reason.is_none());
    }

    #[test]
    fn review_rejection_suspends_with_notes() {
        let mut gate = SecurityGate::default();
        let op = OperatorId::new();
        gate.begin_review(op).unwrap();
        gate.review_platform(op, false, "confirmed scam phrasing")
            .unwrap();
        let state = gate.state(op);
        assert_eq!(state.status, OperatorStatus::Suspended);
        assert_eq!(
            state.suspended_reason.as_deref(),
            Some("confirmed scam phrasing")
        );
    }

    #[test]
    fn review_requires_under_review_status() {
        let mut gate = SecurityGate::default();
        let op = OperatorId::new();
        let err = gate.review_platform(op, true, "notes").unwrap_err();
        assert!(matches!(err, FeerailError::NotUnderReview { .. }));
    }

    #[test]
    fn risk_score_clamped_at_hundred() {
        let mut gate = SecurityGate::default();
        let op = OperatorId::new();
        let score = gate.update_risk_score(op, 500).unwrap();
        assert_eq!(score, 100);
    }
}
