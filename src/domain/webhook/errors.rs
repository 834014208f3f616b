//! Webhook error types.
//!
//! Covers both notification channels (payment gateway and identity
//! provider), with HTTP status mapping and retryability semantics. The
//! status code decides whether the sender redelivers: 2xx acknowledges,
//! 4xx drops, 5xx retries.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature header was absent from the request.
    #[error("Missing signature header")]
    MissingSignature,

    /// Signature did not match the received bytes.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Event is older than the acceptance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// No signing secret is configured for this channel.
    #[error("Webhook signing secret not configured")]
    MissingSecret,

    /// Failed to parse the signature header or the payload.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required metadata field missing from the event.
    #[error("Missing metadata: {0}")]
    MissingMetadata(&'static str),

    /// The event references a purchase the ledger does not know.
    ///
    /// The ledger and the gateway have diverged; redelivery cannot help, so
    /// the event is acknowledged after being recorded for operator follow-up.
    #[error("Ledger diverged: no purchase {purchase_id}")]
    LedgerDiverged { purchase_id: String },

    /// Event was intentionally not processed (not an error condition).
    #[error("Event ignored: {0}")]
    Ignored(String),

    /// A call to the payment gateway failed while resolving the event.
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// A store operation failed.
    #[error("Store error: {0}")]
    Store(String),
}

impl WebhookError {
    /// Returns true if the sender should redeliver this notification.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::MissingSecret | WebhookError::Gateway(_) | WebhookError::Store(_)
        )
    }

    /// Maps the error to the HTTP status returned to the sender.
    pub fn status_code(&self) -> StatusCode {
        match self {
            // Authentication failures: reject, no retry
            WebhookError::MissingSignature
            | WebhookError::InvalidSignature
            | WebhookError::TimestampOutOfRange => StatusCode::UNAUTHORIZED,

            // Malformed input: reject, no retry
            WebhookError::InvalidTimestamp
            | WebhookError::ParseError(_)
            | WebhookError::MissingMetadata(_) => StatusCode::BAD_REQUEST,

            // Acknowledged: redelivery would not help
            WebhookError::LedgerDiverged { .. } | WebhookError::Ignored(_) => StatusCode::OK,

            // Transient server-side problems: the sender retries
            WebhookError::MissingSecret | WebhookError::Gateway(_) | WebhookError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
