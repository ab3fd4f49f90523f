//! Configuration types for payout execution and webhook ingress.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{FeerailError, Result, constants};

/// The fixed operator share percentages per revenue category.
///
/// This is the **single source of truth** for the entitlement formula.
/// The readiness evaluator and the payout executor both call
/// [`PayoutShares::entitlement`], so the readiness number and the
/// execution number can never diverge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutShares {
    /// Operator share of trading (builder fee) revenue.
    pub trading_share: Decimal,
    /// Operator share of on-ramp (affiliate) revenue.
    pub on_ramp_share: Decimal,
}

impl PayoutShares {
    /// Validate that both shares lie in `[0, 1]`.
    ///
    /// # Errors
    /// Returns [`FeerailError::Configuration`] if a share is out of range.
    pub fn validate(&self) -> Result<()> {
        for (name, share) in [
            ("trading_share", self.trading_share),
            ("on_ramp_share", self.on_ramp_share),
        ] {
            if share < Decimal::ZERO || share > Decimal::ONE {
                return Err(FeerailError::Configuration(format!(
                    "{name} must be within [0, 1], got {share}"
                )));
            }
        }
        Ok(())
    }

    /// Total operator entitlement for one period:
    /// `trading_share × trading_revenue + on_ramp_share × on_ramp_revenue`.
    #[must_use]
    pub fn entitlement(&self, trading_revenue: Decimal, on_ramp_revenue: Decimal) -> Decimal {
        self.trading_share * trading_revenue + self.on_ramp_share * on_ramp_revenue
    }
}

impl Default for PayoutShares {
    fn default() -> Self {
        Self {
            trading_share: Decimal::new(7, 1),  // 0.7
            on_ramp_share: Decimal::new(5, 1),  // 0.5
        }
    }
}

/// Configuration for the payout executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutConfig {
    /// Shared share constants for entitlement computation.
    pub shares: PayoutShares,
    /// Entitlements below this amount are skipped without a record.
    pub min_payout: Decimal,
    /// Payout currency symbol.
    pub currency: String,
    /// Bounded wait for a single transfer confirmation.
    pub confirm_timeout: Duration,
    /// Minor-unit scale of the payout token.
    pub token_decimals: u32,
}

impl Default for PayoutConfig {
    fn default() -> Self {
        Self {
            shares: PayoutShares::default(),
            min_payout: Decimal::new(constants::DEFAULT_MIN_PAYOUT_UNITS, 0),
            currency: "USDC".to_string(),
            confirm_timeout: Duration::from_millis(constants::DEFAULT_CONFIRM_TIMEOUT_MS),
            token_decimals: constants::DEFAULT_TOKEN_DECIMALS,
        }
    }
}

/// Configuration for the webhook ingress guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Maximum accepted age of an inbound event's timestamp, seconds.
    pub freshness_window_secs: i64,
    /// Size threshold of the dedup store before pruning kicks in.
    pub dedup_max_entries: usize,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            freshness_window_secs: constants::WEBHOOK_FRESHNESS_WINDOW_SECS,
            dedup_max_entries: constants::DEFAULT_DEDUP_MAX_ENTRIES,
        }
    }
}
