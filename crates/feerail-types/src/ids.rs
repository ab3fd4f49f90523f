//! Globally unique identifiers used throughout FeeRail.
//!
//! Entity IDs use UUIDv7 for time-ordered lexicographic sorting. Provider
//! and chain references are opaque strings supplied by external systems.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{FeerailError, Result};

// ---------------------------------------------------------------------------
// OperatorId
// ---------------------------------------------------------------------------

/// Unique identifier for a platform operator.
///
/// `Ord` on the underlying UUIDv7 gives the fixed ascending processing
/// order used by the payout executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OperatorId(pub Uuid);

impl OperatorId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for OperatorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// FeeTxId
// ---------------------------------------------------------------------------

/// Unique identifier for a fee ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct FeeTxId(pub Uuid);

impl FeeTxId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for FeeTxId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FeeTxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PayoutId
// ---------------------------------------------------------------------------

/// Unique identifier for a payout record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PayoutId(pub Uuid);

impl PayoutId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for PayoutId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// WebhookId
// ---------------------------------------------------------------------------

/// Provider-supplied webhook event identifier (opaque, used for dedup).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct WebhookId(pub String);

impl WebhookId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for WebhookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wh:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ChainRef
// ---------------------------------------------------------------------------

/// Opaque reference to a submitted on-chain transfer (transaction hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainRef(pub String);

impl ChainRef {
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }
}

impl fmt::Display for ChainRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ChainAddress
// ---------------------------------------------------------------------------

/// A validated on-chain recipient address (`0x` + 40 hex characters).
///
/// Construction goes through [`ChainAddress::parse`] so a malformed
/// address is rejected as a validation error before any transfer attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainAddress(String);

impl ChainAddress {
    /// Parse and validate an address string.
    ///
    /// # Errors
    /// Returns [`FeerailError::ValidationFailed`] if the address is not
    /// `0x` followed by exactly 40 hex characters.
    pub fn parse(addr: &str) -> Result<Self> {
        let hex_part = addr.strip_prefix("0x").ok_or_else(|| {
            FeerailError::ValidationFailed {
                reason: format!("address {addr:?} missing 0x prefix"),
            }
        })?;
        if hex_part.len() != 40 {
            return Err(FeerailError::ValidationFailed {
                reason: format!(
                    "address {addr:?} has {} hex chars, expected 40",
                    hex_part.len()
                ),
            });
        }
        if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(FeerailError::ValidationFailed {
                reason: format!("address {addr:?} contains non-hex characters"),
            });
        }
        Ok(Self(addr.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
