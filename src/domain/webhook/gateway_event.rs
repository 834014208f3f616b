//! Payment gateway webhook event types.
//!
//! Structures for parsing gateway notification payloads after signature
//! verification. Only fields relevant to reconciliation are captured.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::PurchaseId;

use super::WebhookError;

/// A verified gateway notification.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayEvent {
    /// Provider-assigned event id (used for delivery deduplication).
    pub id: String,

    /// Event type string (e.g. "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix timestamp the provider created the event at.
    pub created: i64,

    /// Event-specific payload.
    pub data: GatewayEventData,

    /// Whether this is a live mode event (vs test mode).
    #[serde(default)]
    pub livemode: bool,
}

/// Container for the event-specific object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayEventData {
    /// Polymorphic object, decoded per event type.
    pub object: serde_json::Value,
}

impl GatewayEvent {
    /// Parses the event type into a known variant.
    pub fn parsed_type(&self) -> GatewayEventType {
        GatewayEventType::from_type_str(&self.event_type)
    }

    /// Decodes the data object as a checkout session.
    pub fn checkout_session(&self) -> Result<CheckoutSessionObject, WebhookError> {
        serde_json::from_value(self.data.object.clone())
            .map_err(|e| WebhookError::ParseError(format!("invalid checkout session: {}", e)))
    }

    /// Decodes the data object as a payment intent.
    pub fn payment_intent(&self) -> Result<PaymentIntentObject, WebhookError> {
        serde_json::from_value(self.data.object.clone())
            .map_err(|e| WebhookError::ParseError(format!("invalid payment intent: {}", e)))
    }
}

/// Gateway event types the reconciler understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayEventType {
    /// Checkout session completed: payment confirmed.
    CheckoutCompleted,
    /// Checkout session lapsed without payment.
    CheckoutExpired,
    /// A payment attempt failed.
    PaymentFailed,
    /// Anything else; logged and acknowledged without processing.
    Unknown,
}

impl GatewayEventType {
    /// Parses a provider event type string.
    pub fn from_type_str(s: &str) -> Self {
        match s {
            "checkout.session.completed" => Self::CheckoutCompleted,
            "checkout.session.expired" => Self::CheckoutExpired,
            "payment_intent.payment_failed" => Self::PaymentFailed,
            _ => Self::Unknown,
        }
    }
}

/// Checkout session object carried by session events.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckoutSessionObject {
    /// Gateway session id.
    pub id: String,

    /// Opaque metadata we attached at session creation.
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Payment intent backing this session, if one exists yet.
    #[serde(default)]
    pub payment_intent: Option<String>,
}

impl CheckoutSessionObject {
    /// Metadata key under which the purchase id travels.
    pub const PURCHASE_ID_KEY: &'static str = "purchase_id";

    /// Extracts the purchase id embedded at session creation.
    ///
    /// # Errors
    ///
    /// `MissingMetadata` if the key is absent, `ParseError` if it is not a
    /// valid purchase id.
    pub fn purchase_id(&self) -> Result<PurchaseId, WebhookError> {
        let raw = self
            .metadata
            .get(Self::PURCHASE_ID_KEY)
            .ok_or(WebhookError::MissingMetadata(Self::PURCHASE_ID_KEY))?;
        raw.parse()
            .map_err(|_| WebhookError::ParseError(format!("invalid purchase id: {}", raw)))
    }
}

/// Payment intent object carried by payment failure events.
///
/// Failure events reference the payment intent, not the session, so the
/// reconciler resolves the session (and the embedded purchase id) with a
/// follow-up gateway query.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentIntentObject {
    /// Gateway payment intent id.
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(event_type: &str, object: serde_json::Value) -> GatewayEvent {
        GatewayEvent {
            id: "evt_test_1".to_string(),
            event_type: event_type.to_string(),
            created: 1704067200,
            data: GatewayEventData { object },
            livemode: false,
        }
    }

    #[test]
    fn deserialize_minimal_event() {
        let json = r#"{
            "id": "evt_1234567890",
            "type": "checkout.session.completed",
            "created": 1704067200,
            "data": { "object": {} },
            "livemode": false
        }"#;

        let event: GatewayEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.id, "evt_1234567890");
        assert_eq!(event.parsed_type(), GatewayEventType::CheckoutCompleted);
        assert!(!event.livemode);
    }

    #[test]
    fn event_types_parse_to_known_variants() {
        assert_eq!(
            GatewayEventType::from_type_str("checkout.session.completed"),
            GatewayEventType::CheckoutCompleted
        );
        assert_eq!(
            GatewayEventType::from_type_str("checkout.session.expired"),
            GatewayEventType::CheckoutExpired
        );
        assert_eq!(
            GatewayEventType::from_type_str("payment_intent.payment_failed"),
            GatewayEventType::PaymentFailed
        );
        assert_eq!(
            GatewayEventType::from_type_str("invoice.paid"),
            GatewayEventType::Unknown
        );
    }

    #[test]
    fn checkout_session_extracts_purchase_id() {
        let purchase_id = PurchaseId::new();
        let e = event(
            "checkout.session.completed",
            json!({
                "id": "cs_test_1",
                "metadata": { "purchase_id": purchase_id.to_string() }
            }),
        );

        let session = e.checkout_session().unwrap();
        assert_eq!(session.purchase_id().unwrap(), purchase_id);
    }

    #[test]
    fn checkout_session_without_metadata_key_fails() {
        let e = event(
            "checkout.session.completed",
            json!({ "id": "cs_test_1", "metadata": {} }),
        );

        let session = e.checkout_session().unwrap();
        assert!(matches!(
            session.purchase_id(),
            Err(WebhookError::MissingMetadata("purchase_id"))
        ));
    }

    #[test]
    fn checkout_session_with_garbage_purchase_id_fails() {
        let e = event(
            "checkout.session.completed",
            json!({ "id": "cs_test_1", "metadata": { "purchase_id": "not-a-uuid" } }),
        );

        let session = e.checkout_session().unwrap();
        assert!(matches!(
            session.purchase_id(),
            Err(WebhookError::ParseError(_))
        ));
    }

    #[test]
    fn payment_intent_object_decodes() {
        let e = event("payment_intent.payment_failed", json!({ "id": "pi_123" }));

        let intent = e.payment_intent().unwrap();
        assert_eq!(intent.id, "pi_123");
    }

    #[test]
    fn wrong_object_shape_is_a_parse_error() {
        let e = event("payment_intent.payment_failed", json!({ "amount": 100 }));
        assert!(matches!(
            e.payment_intent(),
            Err(WebhookError::ParseError(_))
        ));
    }
}
