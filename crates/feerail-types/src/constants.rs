//! System-wide constants for the FeeRail settlement engine.

/// Risk score added for each suspicious-pattern match.
pub const RISK_SCORE_PER_MATCH: u8 = 20;

/// Risk score above which an active operator is auto-suspended.
/// Strictly greater-than: a score of exactly 80 does not suspend.
pub const RISK_AUTO_SUSPEND_THRESHOLD: u8 = 80;

/// Upper clamp bound for the risk score.
pub const RISK_SCORE_MAX: u8 = 100;

/// Webhook freshness window in seconds (5 minutes). Events whose
/// timestamp is older than this are rejected before the dedup check.
pub const WEBHOOK_FRESHNESS_WINDOW_SECS: i64 = 300;

/// Dedup entries older than `factor × freshness window` are pruned once
/// the store exceeds its size threshold.
pub const DEDUP_PRUNE_AGE_FACTOR: i32 = 2;

/// Default maximum entries in the webhook dedup store before pruning.
pub const DEFAULT_DEDUP_MAX_ENTRIES: usize = 100_000;

/// Default bounded wait for a single transfer confirmation (milliseconds).
pub const DEFAULT_CONFIRM_TIMEOUT_MS: u64 = 30_000;

/// Default minor-unit scale of the payout token (USDC = 6 decimals).
pub const DEFAULT_TOKEN_DECIMALS: u32 = 6;

/// Default minimum payout amount in whole currency units. Entitlements
/// below this roll forward into the next period's aggregation.
pub const DEFAULT_MIN_PAYOUT_UNITS: i64 = 10;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "FeeRail";
