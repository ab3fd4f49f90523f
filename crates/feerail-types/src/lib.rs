//! # feerail-types
//!
//! Shared types, errors, and configuration for the **FeeRail** operator
//! settlement engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`OperatorId`], [`FeeTxId`], [`PayoutId`], [`WebhookId`], [`ChainRef`], [`ChainAddress`]
//! - **Fee model**: [`FeeTransaction`], [`FeeStatus`], [`RevenueStream`]
//! - **Payout model**: [`PayoutRecord`], [`PayoutStatus`]
//! - **Security model**: [`SecurityState`], [`OperatorStatus`]
//! - **Period model**: [`Period`], [`PeriodKind`]
//! - **Operator directory**: [`OperatorProfile`]
//! - **Configuration**: [`PayoutConfig`], [`PayoutShares`], [`WebhookConfig`]
//! - **Errors**: [`FeerailError`] with `FR_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod fee;
pub mod ids;
pub mod operator;
pub mod payout;
pub mod period;
pub mod security;

// Re-export all primary types at crate root for ergonomic imports:
//   use feerail_types::{FeeTransaction, PayoutRecord, Period, ...};

pub use config::*;
pub use error::*;
pub use fee::*;
pub use ids::*;
pub use operator::*;
pub use payout::*;
pub use period::*;
pub use security::*;

// Constants are accessed via `feerail_types::constants::FOO`
// (not re-exported to avoid name collisions).
