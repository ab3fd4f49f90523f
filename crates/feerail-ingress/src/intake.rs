//! Webhook intake — the composed guard in front of the fee ledger.
//!
//! [`WebhookIngress::accept`] runs every check in order (signature,
//! timestamp freshness, payload schema, replay dedup) and only then
//! hands back a parsed [`FeeEventPayload`]. A request that fails any
//! check produces no ledger mutation because the caller never sees a
//! payload for it. The dedup entry is written last, so a malformed
//! delivery does not consume its webhook id — the provider's corrected
//! redelivery under the same id is still accepted.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use feerail_types::{
    FeerailError, OperatorId, Result, RevenueStream, WebhookConfig, WebhookId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::replay::ReplayGuard;
use crate::signature::{WebhookHeaders, WebhookProvider, verify_signature};

/// A verified, parsed fee event ready for ledger recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeEventPayload {
    pub operator_id: OperatorId,
    pub amount: Decimal,
    pub currency: String,
    pub stream: RevenueStream,
    /// When the fee was realized on the venue (not arrival time).
    pub occurred_at: DateTime<Utc>,
}

/// The composed webhook guard: signatures, freshness, replay, schema.
pub struct WebhookIngress {
    secrets: HashMap<WebhookProvider, Vec<u8>>,
    replay: ReplayGuard,
}

impl WebhookIngress {
    #[must_use]
    pub fn new(config: &WebhookConfig) -> Self {
        Self {
            secrets: HashMap::new(),
            replay: ReplayGuard::new(config),
        }
    }

    /// Register the shared secret for a provider.
    #[must_use]
    pub fn with_secret(mut self, provider: WebhookProvider, secret: impl Into<Vec<u8>>) -> Self {
        self.secrets.insert(provider, secret.into());
        self
    }

    /// Run the full guard over an inbound request. On success the caller
    /// records the returned payload into the ledger; a rejected request
    /// has no side effect at all — the dedup entry is only written for
    /// events that passed every other check.
    ///
    /// # Errors
    /// - [`FeerailError::SignatureInvalid`] — bad or missing signature
    /// - [`FeerailError::StaleWebhook`] — timestamp outside the window
    /// - [`FeerailError::MalformedWebhook`] — missing headers or bad payload
    /// - [`FeerailError::ReplayDetected`] — duplicate webhook id
    pub fn accept(
        &self,
        provider: WebhookProvider,
        raw_body: &[u8],
        headers: &WebhookHeaders,
        now: DateTime<Utc>,
    ) -> Result<FeeEventPayload> {
        let secret = self.secrets.get(&provider).ok_or_else(|| {
            FeerailError::Configuration(format!("no webhook secret for {provider:?}"))
        })?;

        // 1. Authenticity, fail-closed.
        verify_signature(provider, raw_body, headers, secret)?;

        // 2. Required identity headers.
        let webhook_id = headers
            .webhook_id
            .as_deref()
            .map(WebhookId::new)
            .ok_or_else(|| FeerailError::MalformedWebhook {
                reason: "missing webhook id header".to_string(),
            })?;
        let timestamp = parse_timestamp(headers)?;

        // 3. Payload schema. Checked before the dedup write so a
        // malformed delivery does not burn its webhook id.
        let payload: FeeEventPayload =
            serde_json::from_slice(raw_body).map_err(|e| FeerailError::MalformedWebhook {
                reason: format!("payload does not match schema: {e}"),
            })?;
        if payload.amount <= Decimal::ZERO {
            return Err(FeerailError::MalformedWebhook {
                reason: format!("non-positive amount {}", payload.amount),
            });
        }

        // 4. Freshness + atomic dedup, last.
        self.replay.check_and_record(&webhook_id, timestamp, now)?;

        info!(%webhook_id, operator_id = %payload.operator_id, amount = %payload.amount,
            stream = %payload.stream, "webhook accepted");
        Ok(payload)
    }
}

fn parse_timestamp(headers: &WebhookHeaders) -> Result<DateTime<Utc>> {
    let raw = headers
        .timestamp
        .as_deref()
        .ok_or_else(|| FeerailError::MalformedWebhook {
            reason: "missing timestamp header".to_string(),
        })?;
    let secs: i64 = raw.parse().map_err(|_| FeerailError::MalformedWebhook {
        reason: format!("timestamp {raw:?} is not unix seconds"),
    })?;
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| FeerailError::MalformedWebhook {
            reason: format!("timestamp {secs} out of range"),
        })
}
