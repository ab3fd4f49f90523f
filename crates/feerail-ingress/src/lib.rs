//! # feerail-ingress
//!
//! **Security Envelope**: everything that stands between the outside
//! world and the fee ledger / payout engine.
//!
//! ## Architecture
//!
//! Inbound provider events pass three gates before they may touch the
//! ledger:
//! 1. [`signature::verify_signature`] — provider-specific HMAC-SHA256
//!    over the exact byte payload, constant-time comparison, fail-closed.
//! 2. Payload parsing — schema and amount validation in [`WebhookIngress`].
//! 3. [`ReplayGuard`] — freshness window plus atomic check-and-insert
//!    dedup on the provider's webhook id, written only for events that
//!    passed everything else.
//!
//! Separately, the [`SecurityGate`] maintains each operator's risk score
//! and suspension/ban state machine and vetoes payouts for suspended or
//! banned operators.

pub mod gate;
pub mod intake;
pub mod patterns;
pub mod replay;
pub mod signature;

pub use gate::{PlatformPublisher, SecurityGate};
pub use intake::{FeeEventPayload, WebhookIngress};
pub use replay::{DedupStore, InMemoryDedupStore, ReplayGuard};
pub use signature::{WebhookHeaders, WebhookProvider, verify_signature};
