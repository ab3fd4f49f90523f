//! # feerail-payout
//!
//! **Finality plane**: readiness evaluation, idempotent payout
//! execution, and on-chain reconciliation.
//!
//! ## Architecture
//!
//! The [`ReadinessEvaluator`] answers "can the payout wallet cover this
//! period?" without side effects. The [`PayoutExecutor`] then runs the
//! period: per-operator eligibility checks, a balance re-check before
//! every transfer, and a payout record per attempt. Idempotency rests on
//! two guards layered under a per-period [`RunLock`]:
//!
//! 1. the [`PayoutStore`]'s unique index — at most one `COMPLETED`
//!    record per `(operator, period)`;
//! 2. pending records block resubmission until a reconciliation pass
//!    ([`PayoutExecutor::reconcile`]) settles the transfer's fate.
//!
//! All chain access goes through the injected [`ChainClient`]; tests use
//! the scriptable [`MockChain`].

pub mod chain;
pub mod executor;
pub mod readiness;
pub mod reconcile;
pub mod records;
pub mod run_lock;

pub use chain::{
    ChainClient, ConfirmOutcome, MockChain, TransferStatus, WalletBalances, WalletKind,
    to_minor_units,
};
pub use executor::{
    OperatorOutcome, OperatorResult, PayoutExecutor, PayoutRunReport, SkipReason,
};
pub use readiness::{OperatorRequirement, ReadinessEvaluator, ReadinessReport};
pub use reconcile::ReconcileReport;
pub use records::PayoutStore;
pub use run_lock::{RunGuard, RunLock};
