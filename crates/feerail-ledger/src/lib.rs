//! # feerail-ledger
//!
//! **Fee Ledger plane**: the append-only record of operator fee
//! transactions and the pure aggregation that derives per-period revenue
//! summaries from it.
//!
//! ## Architecture
//!
//! The [`FeeLedger`] is the authoritative store. Fees enter as `PENDING`
//! when the venue reports them, move to `CLAIMED` when an admin claims a
//! date range, and to `DISTRIBUTED` when the payout executor transfers
//! the operator's share on-chain. Transitions are strictly forward.
//!
//! The [`RevenueAggregator`] is a pure function of ledger state: the same
//! ledger always produces the same summaries, and half-open periods
//! guarantee no transaction is counted twice across adjacent periods.

pub mod aggregator;
pub mod ledger;

pub use aggregator::{AggregationPolicy, RevenueAggregator, RevenuePeriodSummary};
pub use ledger::FeeLedger;
