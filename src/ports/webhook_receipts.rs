//! ProcessedWebhookStore port - receipt trail for delivered notifications.
//!
//! Payment gateways deliver at-least-once: timeouts, 5xx responses, or a
//! lost acknowledgment all trigger redelivery. Every verified event is
//! recorded here keyed by its provider event id, which gives us delivery
//! deduplication and an operator-facing artifact for events that could not
//! be reconciled (ledger divergence).

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp};

/// How a delivered event was disposed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookDisposition {
    /// Reconciled into a state change (or confirmed as an idempotent replay).
    Processed,
    /// Deliberately not acted on (unhandled type, unmatched lookup).
    Ignored,
    /// Referenced a purchase the ledger does not know; needs operator
    /// follow-up.
    IntegrityGap,
    /// Processing failed; the sender was asked to redeliver.
    Failed,
}

impl WebhookDisposition {
    /// Stable string form used in persistence and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookDisposition::Processed => "processed",
            WebhookDisposition::Ignored => "ignored",
            WebhookDisposition::IntegrityGap => "integrity_gap",
            WebhookDisposition::Failed => "failed",
        }
    }
}

/// Record of one delivered notification.
#[derive(Debug, Clone)]
pub struct WebhookReceipt {
    /// Provider-assigned event id.
    pub event_id: String,

    /// Provider event type string.
    pub event_type: String,

    /// How the event was disposed of.
    pub disposition: WebhookDisposition,

    /// Human-readable detail (ignore reason, failure message, missing
    /// purchase id).
    pub detail: Option<String>,

    /// Original payload, kept for auditing and reconciliation.
    pub payload: serde_json::Value,

    /// When the event was handled.
    pub received_at: Timestamp,
}

impl WebhookReceipt {
    fn new(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        disposition: WebhookDisposition,
        detail: Option<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_type: event_type.into(),
            disposition,
            detail,
            payload,
            received_at: Timestamp::now(),
        }
    }

    /// Receipt for a successfully reconciled event.
    pub fn processed(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self::new(event_id, event_type, WebhookDisposition::Processed, None, payload)
    }

    /// Receipt for an event that was deliberately not acted on.
    pub fn ignored(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        reason: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self::new(
            event_id,
            event_type,
            WebhookDisposition::Ignored,
            Some(reason.into()),
            payload,
        )
    }

    /// Receipt for an event that exposed ledger/gateway divergence.
    pub fn integrity_gap(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        detail: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self::new(
            event_id,
            event_type,
            WebhookDisposition::IntegrityGap,
            Some(detail.into()),
            payload,
        )
    }

    /// Receipt for an event whose processing failed.
    pub fn failed(
        event_id: impl Into<String>,
        event_type: impl Into<String>,
        error: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self::new(
            event_id,
            event_type,
            WebhookDisposition::Failed,
            Some(error.into()),
            payload,
        )
    }
}

/// Result of attempting to record a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptInsert {
    /// First delivery of this event id.
    Recorded,
    /// A receipt for this event id already exists (duplicate delivery).
    Duplicate,
}

/// Port for the receipt trail.
///
/// Implementations resolve concurrent deliveries of the same event id with
/// a uniqueness guarantee on the id (primary key or equivalent): exactly
/// one caller observes `Recorded`.
#[async_trait]
pub trait ProcessedWebhookStore: Send + Sync {
    /// Finds a receipt by provider event id.
    async fn find(&self, event_id: &str) -> Result<Option<WebhookReceipt>, DomainError>;

    /// Records a receipt, reporting whether this was the first delivery.
    async fn record(&self, receipt: WebhookReceipt) -> Result<ReceiptInsert, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn constructors_set_dispositions() {
        let p = WebhookReceipt::processed("evt_1", "checkout.session.completed", json!({}));
        assert_eq!(p.disposition, WebhookDisposition::Processed);
        assert!(p.detail.is_none());

        let i = WebhookReceipt::ignored("evt_2", "invoice.paid", "unhandled", json!({}));
        assert_eq!(i.disposition, WebhookDisposition::Ignored);
        assert_eq!(i.detail.as_deref(), Some("unhandled"));

        let g = WebhookReceipt::integrity_gap(
            "evt_3",
            "checkout.session.completed",
            "no purchase abc",
            json!({}),
        );
        assert_eq!(g.disposition, WebhookDisposition::IntegrityGap);

        let f = WebhookReceipt::failed("evt_4", "checkout.session.expired", "db down", json!({}));
        assert_eq!(f.disposition, WebhookDisposition::Failed);
    }

    #[test]
    fn disposition_strings_are_stable() {
        assert_eq!(WebhookDisposition::Processed.as_str(), "processed");
        assert_eq!(WebhookDisposition::Ignored.as_str(), "ignored");
        assert_eq!(WebhookDisposition::IntegrityGap.as_str(), "integrity_gap");
        assert_eq!(WebhookDisposition::Failed.as_str(), "failed");
    }
}
