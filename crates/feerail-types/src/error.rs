//! Error types for the FeeRail settlement engine.
//!
//! All errors use the `FR_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Fee ledger errors
//! - 2xx: Period / aggregation errors
//! - 3xx: Webhook ingress errors
//! - 4xx: Security gate errors
//! - 5xx: Payout errors
//! - 6xx: Chain errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{ChainRef, FeeStatus, FeeTxId, OperatorId, OperatorStatus, Period, WebhookId};

/// Central error enum for all FeeRail operations.
#[derive(Debug, Error)]
pub enum FeerailError {
    // =================================================================
    // Fee Ledger Errors (1xx)
    // =================================================================
    /// A fee amount was zero or negative.
    #[error("FR_ERR_100: Fee amount must be positive, got {amount}")]
    InvalidAmount { amount: Decimal },

    /// A fee transaction status transition would move backward or skip a state.
    #[error("FR_ERR_101: Invalid fee status transition: {from} -> {to}")]
    InvalidTransition { from: FeeStatus, to: FeeStatus },

    /// The requested fee transaction was not found in the ledger.
    #[error("FR_ERR_102: Fee transaction not found: {0}")]
    FeeNotFound(FeeTxId),

    // =================================================================
    // Period / Aggregation Errors (2xx)
    // =================================================================
    /// A period's bounds were invalid (start >= end).
    #[error("FR_ERR_200: Invalid period: {reason}")]
    InvalidPeriod { reason: String },

    /// The requested operator is not known to the directory.
    #[error("FR_ERR_201: Operator not found: {0}")]
    OperatorNotFound(OperatorId),

    // =================================================================
    // Webhook Ingress Errors (3xx)
    // =================================================================
    /// The webhook signature header was missing or did not verify.
    #[error("FR_ERR_300: Webhook signature invalid: {reason}")]
    SignatureInvalid { reason: String },

    /// The webhook id was already seen (replay attack prevention).
    #[error("FR_ERR_301: Webhook replay detected: {webhook_id}")]
    ReplayDetected { webhook_id: WebhookId },

    /// The webhook timestamp fell outside the freshness window.
    #[error("FR_ERR_302: Webhook timestamp stale: {age_secs}s old (max {max_secs}s)")]
    StaleWebhook { age_secs: i64, max_secs: i64 },

    /// The webhook payload did not conform to the provider schema.
    #[error("FR_ERR_303: Malformed webhook payload: {reason}")]
    MalformedWebhook { reason: String },

    // =================================================================
    // Security Gate Errors (4xx)
    // =================================================================
    /// The operator is suspended or banned and cannot be paid.
    #[error("FR_ERR_400: Security veto for {operator_id}: status is {status}")]
    SecurityVeto {
        operator_id: OperatorId,
        status: OperatorStatus,
    },

    /// An attempt was made to transition a banned operator (ban is terminal).
    #[error("FR_ERR_401: Operator {0} is banned; ban is terminal")]
    BannedIsTerminal(OperatorId),

    /// A review decision was applied to an operator not under review.
    #[error("FR_ERR_402: Operator {operator_id} is not under review (status {status})")]
    NotUnderReview {
        operator_id: OperatorId,
        status: OperatorStatus,
    },

    // =================================================================
    // Payout Errors (5xx)
    // =================================================================
    /// A recipient address or payout configuration failed validation.
    #[error("FR_ERR_500: Validation failed: {reason}")]
    ValidationFailed { reason: String },

    /// The payout wallet balance cannot cover the next transfer.
    #[error("FR_ERR_501: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    /// A completed payout already exists for this (operator, period).
    #[error("FR_ERR_502: Duplicate payout for {operator_id} in {period}")]
    DuplicatePayout {
        operator_id: OperatorId,
        period: Period,
    },

    /// Another payout run is already in flight for this period.
    #[error("FR_ERR_503: Payout run already in progress for {period}")]
    PayoutRunInProgress { period: Period },

    // =================================================================
    // Chain Errors (6xx)
    // =================================================================
    /// The chain rejected the submitted transfer.
    #[error("FR_ERR_600: Chain rejected transfer: {reason}")]
    ChainRejected { reason: String },

    /// The transfer was submitted but confirmation did not arrive in time.
    /// The transfer's fate is unknown — resubmission is forbidden until
    /// reconciliation resolves it.
    #[error("FR_ERR_601: Confirmation timeout for {reference}")]
    ConfirmationTimeout { reference: ChainRef },

    /// The chain provider could not be reached (balance query, status lookup).
    #[error("FR_ERR_602: Chain unavailable: {reason}")]
    ChainUnavailable { reason: String },

    /// A decimal amount does not fit the token's minor-unit scale.
    #[error("FR_ERR_603: Amount {amount} not representable at {decimals} decimals")]
    AmountNotRepresentable { amount: Decimal, decimals: u32 },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("FR_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("FR_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid shares, missing secret, etc.).
    #[error("FR_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, FeerailError>;

impl From<serde_json::Error> for FeerailError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
