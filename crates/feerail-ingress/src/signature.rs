//! Webhook signature verification.
//!
//! Each provider signs the exact byte payload with HMAC-SHA256 over a
//! provider-specific message layout and sends the hex digest in a
//! signature header. Verification recomputes the keyed hash and compares
//! in constant time via [`Mac::verify_slice`]. Any missing header,
//! malformed hex, or digest mismatch fails closed.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use feerail_types::{FeerailError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Supported webhook providers, each with its own signing scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookProvider {
    /// The trading venue's fee-reporting feed. Signs
    /// `"{timestamp}.{raw_body}"` so the timestamp header is covered by
    /// the signature.
    Venue,
    /// The fiat on-ramp affiliate feed. Signs the raw body only.
    OnRamp,
}

/// The headers the guard requires from every inbound webhook request.
#[derive(Debug, Clone, Default)]
pub struct WebhookHeaders {
    /// Hex HMAC-SHA256 digest.
    pub signature: Option<String>,
    /// Provider-unique event id, used for replay dedup.
    pub webhook_id: Option<String>,
    /// Event timestamp as unix seconds.
    pub timestamp: Option<String>,
}

impl WebhookHeaders {
    #[must_use]
    pub fn new(
        signature: impl Into<String>,
        webhook_id: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            signature: Some(signature.into()),
            webhook_id: Some(webhook_id.into()),
            timestamp: Some(timestamp.into()),
        }
    }
}

/// Verify the provider signature over the exact byte payload.
///
/// # Errors
/// Returns [`FeerailError::SignatureInvalid`] if the signature or
/// timestamp header is missing, the signature is not valid hex, or the
/// digest does not match.
pub fn verify_signature(
    provider: WebhookProvider,
    raw_body: &[u8],
    headers: &WebhookHeaders,
    secret: &[u8],
) -> Result<()> {
    let signature_hex =
        headers
            .signature
            .as_deref()
            .ok_or_else(|| FeerailError::SignatureInvalid {
                reason: "missing signature header".to_string(),
            })?;
    let supplied = hex::decode(signature_hex).map_err(|_| FeerailError::SignatureInvalid {
        reason: "signature header is not valid hex".to_string(),
    })?;

    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| {
        FeerailError::SignatureInvalid {
            reason: "invalid secret key length".to_string(),
        }
    })?;

    match provider {
        WebhookProvider::Venue => {
            // The venue scheme prefixes the timestamp so a valid
            // signature cannot be replayed with a fresher timestamp.
            let timestamp =
                headers
                    .timestamp
                    .as_deref()
                    .ok_or_else(|| FeerailError::SignatureInvalid {
                        reason: "missing timestamp header".to_string(),
                    })?;
            mac.update(timestamp.as_bytes());
            mac.update(b".");
            mac.update(raw_body);
        }
        WebhookProvider::OnRamp => {
            mac.update(raw_body);
        }
    }

    // Constant-time comparison.
    mac.verify_slice(&supplied)
        .map_err(|_| FeerailError::SignatureInvalid {
            reason: "signature mismatch".to_string(),
        })
}

/// Compute the hex signature a provider would send. Used by tests and
/// by outbound webhook emitters.
#[must_use]
pub fn sign(
    provider: WebhookProvider,
    raw_body: &[u8],
    timestamp: &str,
    secret: &[u8],
) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    match provider {
        WebhookProvider::Venue => {
            mac.update(timestamp.as_bytes());
            mac.update(b".");
            mac.update(raw_body);
        }
        WebhookProvider::OnRamp => {
            mac.update(raw_body);
        }
    }
    hex::encode(mac.finalize().into_bytes())
}
