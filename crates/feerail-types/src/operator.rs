//! Operator directory entry.

use serde::{Deserialize, Serialize};

use crate::OperatorId;

/// Payout-relevant profile of a platform operator.
///
/// The directory itself (CRUD, onboarding) is an external collaborator;
/// the engine only needs the identity and the configured payout address.
/// The address is stored as entered — the payout executor validates it
/// before every transfer attempt and records a validation failure rather
/// than trusting directory state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorProfile {
    pub operator_id: OperatorId,
    /// Human-readable platform name.
    pub name: String,
    /// Configured on-chain payout address, as entered by the operator.
    /// `None` means no address is configured and the executor skips the
    /// operator.
    pub payout_address: Option<String>,
}

impl OperatorProfile {
    #[must_use]
    pub fn new(operator_id: OperatorId, name: impl Into<String>) -> Self {
        Self {
            operator_id,
            name: name.into(),
            payout_address: None,
        }
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.payout_address = Some(address.into());
        self
    }
}
