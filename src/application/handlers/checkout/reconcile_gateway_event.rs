//! ReconcileGatewayEventHandler - maps verified gateway events onto the
//! purchase ledger.
//!
//! The gateway delivers at-least-once and in no particular order, so every
//! transition is guarded twice: a receipt-trail lookup drops exact
//! redeliveries (same event id), and the conditional pending→terminal write
//! makes replays and out-of-order contradictions no-ops (a `checkout
//! expired` arriving after `checkout completed` finds the record terminal
//! and does nothing).
//!
//! Ordering on the success path: enrollment is applied (idempotently)
//! before the ledger transition is committed, so a success status is never
//! observable without its enrollment. A replayed completed event against an
//! already-success record re-asserts enrollment before acknowledging, which
//! heals a crash between the two steps.
//!
//! An event referencing a purchase the ledger does not know means the
//! ledger and the gateway have diverged. That is not a client error and
//! redelivery cannot fix it: the event is recorded as an integrity gap for
//! operator follow-up and acknowledged.

use std::sync::Arc;

use crate::application::handlers::enrollment::EnrollmentApplier;
use crate::domain::purchase::{Purchase, PurchaseStatus};
use crate::domain::webhook::{
    GatewayEvent, GatewayEventType, SignatureVerifier, WebhookError,
};
use crate::ports::{
    PaymentGateway, ProcessedWebhookStore, PurchaseRepository, TransitionOutcome, WebhookReceipt,
};

/// How a delivery was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A ledger transition was applied.
    Processed,

    /// The referenced purchase was already terminal; acknowledged as an
    /// idempotent replay.
    Replayed,

    /// The event type is not one we act on, or a lookup matched nothing.
    Ignored,

    /// Ledger/gateway divergence, recorded for operator follow-up and
    /// acknowledged.
    IntegrityGap,

    /// This event id was already handled by an earlier delivery.
    AlreadyProcessed,
}

/// Handler for the payment gateway notification endpoint.
pub struct ReconcileGatewayEventHandler {
    verifier: SignatureVerifier,
    purchases: Arc<dyn PurchaseRepository>,
    applier: Arc<EnrollmentApplier>,
    gateway: Arc<dyn PaymentGateway>,
    receipts: Arc<dyn ProcessedWebhookStore>,
}

impl ReconcileGatewayEventHandler {
    pub fn new(
        verifier: SignatureVerifier,
        purchases: Arc<dyn PurchaseRepository>,
        applier: Arc<EnrollmentApplier>,
        gateway: Arc<dyn PaymentGateway>,
        receipts: Arc<dyn ProcessedWebhookStore>,
    ) -> Self {
        Self {
            verifier,
            purchases,
            applier,
            gateway,
            receipts,
        }
    }

    /// Verifies and reconciles one delivery.
    ///
    /// The signature is checked over the exact bytes received before the
    /// payload is parsed and before any store is touched. Errors map to the
    /// HTTP status that drives the gateway's redelivery behavior.
    pub async fn handle(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<ReconcileOutcome, WebhookError> {
        // Authentication precedes everything: no parse, no store access.
        self.verifier.verify(payload, signature_header)?;

        let event: GatewayEvent = serde_json::from_slice(payload)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        // Delivery dedup by provider event id.
        if self
            .receipts
            .find(&event.id)
            .await
            .map_err(store_err)?
            .is_some()
        {
            tracing::debug!(event_id = %event.id, "Duplicate delivery, already handled");
            return Ok(ReconcileOutcome::AlreadyProcessed);
        }

        let result = self.dispatch(&event).await;
        self.record_receipt(&event, &result).await?;

        match result {
            Ok(outcome) => Ok(outcome),
            // Divergence is acknowledged after being recorded above.
            Err(WebhookError::LedgerDiverged { purchase_id }) => {
                tracing::error!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    purchase_id = %purchase_id,
                    "Gateway event references unknown purchase; recorded for reconciliation"
                );
                Ok(ReconcileOutcome::IntegrityGap)
            }
            Err(e) => Err(e),
        }
    }

    /// Routes a verified, novel event to its transition.
    async fn dispatch(&self, event: &GatewayEvent) -> Result<ReconcileOutcome, WebhookError> {
        match event.parsed_type() {
            GatewayEventType::CheckoutCompleted => {
                let session = event.checkout_session()?;
                let purchase_id = session.purchase_id()?;
                self.complete_checkout(&purchase_id.to_string()).await
            }
            GatewayEventType::CheckoutExpired => {
                let session = event.checkout_session()?;
                let purchase_id = session.purchase_id()?;
                self.settle(&purchase_id.to_string(), PurchaseStatus::Expired)
                    .await
            }
            GatewayEventType::PaymentFailed => self.fail_via_intent(event).await,
            GatewayEventType::Unknown => {
                tracing::info!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    "Unhandled gateway event type, acknowledging"
                );
                Ok(ReconcileOutcome::Ignored)
            }
        }
    }

    /// Success path: enrollment first, then the conditional transition.
    async fn complete_checkout(&self, purchase_id: &str) -> Result<ReconcileOutcome, WebhookError> {
        let purchase = self.load_purchase(purchase_id).await?;

        if purchase.is_terminal() {
            if purchase.status == PurchaseStatus::Success {
                // Replay against a settled record: re-assert enrollment so a
                // crash between apply and transition converges on redelivery.
                self.applier
                    .apply(&purchase.user_id, &purchase.course_id)
                    .await
                    .map_err(store_err)?;
            }
            tracing::debug!(
                purchase_id = %purchase.id,
                status = %purchase.status,
                "Replayed completion for terminal purchase, no-op"
            );
            return Ok(ReconcileOutcome::Replayed);
        }

        self.applier
            .apply(&purchase.user_id, &purchase.course_id)
            .await
            .map_err(store_err)?;

        match self
            .purchases
            .transition(&purchase.id, PurchaseStatus::Success)
            .await
            .map_err(store_err)?
        {
            TransitionOutcome::Applied(settled) => {
                tracing::info!(
                    purchase_id = %settled.id,
                    user_id = %settled.user_id,
                    course_id = %settled.course_id,
                    "Purchase settled as success"
                );
                Ok(ReconcileOutcome::Processed)
            }
            TransitionOutcome::AlreadyTerminal(status) => {
                if status != PurchaseStatus::Success {
                    // A contradicting event won the race after our guard.
                    tracing::warn!(
                        purchase_id = %purchase.id,
                        status = %status,
                        "Completion lost race to a contradicting transition"
                    );
                }
                Ok(ReconcileOutcome::Replayed)
            }
            TransitionOutcome::NotFound => Err(WebhookError::LedgerDiverged {
                purchase_id: purchase_id.to_string(),
            }),
        }
    }

    /// Failure/expiry path: conditional transition only, no enrollment.
    async fn settle(
        &self,
        purchase_id: &str,
        to: PurchaseStatus,
    ) -> Result<ReconcileOutcome, WebhookError> {
        let purchase = self.load_purchase(purchase_id).await?;

        if purchase.is_terminal() {
            tracing::debug!(
                purchase_id = %purchase.id,
                status = %purchase.status,
                target = %to,
                "Replayed settlement for terminal purchase, no-op"
            );
            return Ok(ReconcileOutcome::Replayed);
        }

        match self
            .purchases
            .transition(&purchase.id, to)
            .await
            .map_err(store_err)?
        {
            TransitionOutcome::Applied(settled) => {
                tracing::info!(purchase_id = %settled.id, status = %settled.status, "Purchase settled");
                Ok(ReconcileOutcome::Processed)
            }
            TransitionOutcome::AlreadyTerminal(_) => Ok(ReconcileOutcome::Replayed),
            TransitionOutcome::NotFound => Err(WebhookError::LedgerDiverged {
                purchase_id: purchase_id.to_string(),
            }),
        }
    }

    /// Failure events carry a payment intent, not a session: resolve the
    /// session at the gateway, then settle by the embedded purchase id.
    async fn fail_via_intent(&self, event: &GatewayEvent) -> Result<ReconcileOutcome, WebhookError> {
        let intent = event.payment_intent()?;

        let session = self
            .gateway
            .find_session_by_payment_intent(&intent.id)
            .await
            .map_err(|e| WebhookError::Gateway(e.to_string()))?;

        let Some(session) = session else {
            tracing::info!(
                payment_intent = %intent.id,
                "Payment failure matches no checkout session, acknowledging"
            );
            return Ok(ReconcileOutcome::Ignored);
        };

        let Some(purchase_id) = session.purchase_id else {
            return Err(WebhookError::MissingMetadata("purchase_id"));
        };

        self.settle(&purchase_id.to_string(), PurchaseStatus::Failed)
            .await
    }

    async fn load_purchase(&self, purchase_id: &str) -> Result<Purchase, WebhookError> {
        let id = purchase_id
            .parse()
            .map_err(|_| WebhookError::ParseError(format!("invalid purchase id: {}", purchase_id)))?;
        self.purchases
            .find_by_id(&id)
            .await
            .map_err(store_err)?
            .ok_or_else(|| WebhookError::LedgerDiverged {
                purchase_id: purchase_id.to_string(),
            })
    }

    /// Writes the receipt for this delivery.
    ///
    /// Retryable failures are NOT recorded: the sender will redeliver under
    /// the same event id, and a receipt would wrongly short-circuit that
    /// redelivery as already-processed.
    async fn record_receipt(
        &self,
        event: &GatewayEvent,
        result: &Result<ReconcileOutcome, WebhookError>,
    ) -> Result<(), WebhookError> {
        if let Err(e) = result {
            if e.is_retryable() {
                return Ok(());
            }
        }

        let payload = serde_json::to_value(event)
            .map_err(|e| WebhookError::ParseError(format!("failed to serialize event: {}", e)))?;

        let receipt = match result {
            Ok(ReconcileOutcome::Ignored) => WebhookReceipt::ignored(
                &event.id,
                &event.event_type,
                "no action for event",
                payload,
            ),
            Ok(_) => WebhookReceipt::processed(&event.id, &event.event_type, payload),
            Err(WebhookError::LedgerDiverged { purchase_id }) => WebhookReceipt::integrity_gap(
                &event.id,
                &event.event_type,
                format!("no purchase {}", purchase_id),
                payload,
            ),
            Err(e) => WebhookReceipt::failed(&event.id, &event.event_type, e.to_string(), payload),
        };

        self.receipts.record(receipt).await.map_err(store_err)?;
        Ok(())
    }
}

fn store_err(e: crate::domain::foundation::DomainError) -> WebhookError {
    WebhookError::Store(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryEnrollmentStore, InMemoryPurchaseStore, InMemoryWebhookReceipts,
    };
    use crate::adapters::stripe::MockGateway;
    use crate::domain::foundation::{CourseId, Money, PurchaseId, UserId};
    use crate::domain::webhook::sign_payload;
    use crate::ports::{EnrollmentStore, GatewaySession, WebhookDisposition};
    use crate::ports::PurchaseRepository as _;
    use secrecy::SecretString;
    use serde_json::json;

    const SECRET: &str = "whsec_reconciler_tests";

    struct Fixture {
        purchases: Arc<InMemoryPurchaseStore>,
        enrollments: Arc<InMemoryEnrollmentStore>,
        gateway: Arc<MockGateway>,
        receipts: Arc<InMemoryWebhookReceipts>,
        handler: ReconcileGatewayEventHandler,
    }

    fn fixture() -> Fixture {
        let purchases = Arc::new(InMemoryPurchaseStore::new());
        let enrollments = Arc::new(InMemoryEnrollmentStore::new());
        let gateway = Arc::new(MockGateway::new());
        let receipts = Arc::new(InMemoryWebhookReceipts::new());
        let handler = ReconcileGatewayEventHandler::new(
            SignatureVerifier::new(SecretString::new(SECRET.to_string())),
            purchases.clone(),
            Arc::new(EnrollmentApplier::new(enrollments.clone())),
            gateway.clone(),
            receipts.clone(),
        );
        Fixture {
            purchases,
            enrollments,
            gateway,
            receipts,
            handler,
        }
    }

    async fn seed_pending(f: &Fixture) -> Purchase {
        let purchase = Purchase::pending(
            PurchaseId::new(),
            UserId::new("alice").unwrap(),
            CourseId::new(),
            Money::from_major(80),
        );
        f.purchases.create(&purchase).await.unwrap();
        purchase
    }

    fn completed_event(event_id: &str, purchase_id: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": event_id,
            "type": "checkout.session.completed",
            "created": 1704067200,
            "data": { "object": {
                "id": "cs_1",
                "metadata": { "purchase_id": purchase_id }
            }},
            "livemode": false
        }))
        .unwrap()
    }

    fn expired_event(event_id: &str, purchase_id: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": event_id,
            "type": "checkout.session.expired",
            "created": 1704067200,
            "data": { "object": {
                "id": "cs_1",
                "metadata": { "purchase_id": purchase_id }
            }},
            "livemode": false
        }))
        .unwrap()
    }

    fn failed_event(event_id: &str, payment_intent: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": event_id,
            "type": "payment_intent.payment_failed",
            "created": 1704067200,
            "data": { "object": { "id": payment_intent } },
            "livemode": false
        }))
        .unwrap()
    }

    fn header_for(payload: &[u8]) -> String {
        let timestamp = chrono::Utc::now().timestamp();
        format!("t={},v1={}", timestamp, sign_payload(SECRET, timestamp, payload))
    }

    async fn deliver(f: &Fixture, payload: &[u8]) -> Result<ReconcileOutcome, WebhookError> {
        f.handler.handle(payload, &header_for(payload)).await
    }

    // ══════════════════════════════════════════════════════════════
    // Success Path
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn completed_event_settles_and_enrolls() {
        let f = fixture();
        let purchase = seed_pending(&f).await;
        let payload = completed_event("evt_1", &purchase.id.to_string());

        let outcome = deliver(&f, &payload).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Processed);
        let settled = f.purchases.find_by_id(&purchase.id).await.unwrap().unwrap();
        assert_eq!(settled.status, PurchaseStatus::Success);
        assert!(f
            .enrollments
            .is_enrolled(&purchase.user_id, &purchase.course_id)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn redelivered_event_id_is_deduplicated() {
        let f = fixture();
        let purchase = seed_pending(&f).await;
        let payload = completed_event("evt_1", &purchase.id.to_string());

        deliver(&f, &payload).await.unwrap();
        let outcome = deliver(&f, &payload).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::AlreadyProcessed);
        assert_eq!(f.enrollments.pair_count(), 1);
        assert_eq!(f.receipts.len(), 1);
    }

    #[tokio::test]
    async fn replayed_completion_under_fresh_event_id_is_a_noop() {
        let f = fixture();
        let purchase = seed_pending(&f).await;

        deliver(&f, &completed_event("evt_1", &purchase.id.to_string()))
            .await
            .unwrap();
        let outcome = deliver(&f, &completed_event("evt_2", &purchase.id.to_string()))
            .await
            .unwrap();

        assert_eq!(outcome, ReconcileOutcome::Replayed);
        assert_eq!(f.enrollments.pair_count(), 1);
        let settled = f.purchases.find_by_id(&purchase.id).await.unwrap().unwrap();
        assert_eq!(settled.status, PurchaseStatus::Success);
    }

    #[tokio::test]
    async fn concurrent_completions_settle_exactly_once() {
        let f = fixture();
        let purchase = seed_pending(&f).await;
        let handler = Arc::new(f.handler);

        let tasks: Vec<_> = (0..8)
            .map(|n| {
                let handler = handler.clone();
                let payload =
                    completed_event(&format!("evt_{}", n), &purchase.id.to_string());
                let header = header_for(&payload);
                tokio::spawn(async move { handler.handle(&payload, &header).await })
            })
            .collect();

        let outcomes: Vec<ReconcileOutcome> = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|r| r.unwrap().unwrap())
            .collect();

        let processed = outcomes
            .iter()
            .filter(|o| **o == ReconcileOutcome::Processed)
            .count();
        assert_eq!(processed, 1);
        assert_eq!(f.enrollments.pair_count(), 1);
        let settled = f.purchases.find_by_id(&purchase.id).await.unwrap().unwrap();
        assert_eq!(settled.status, PurchaseStatus::Success);
    }

    // ══════════════════════════════════════════════════════════════
    // Expiry and Out-of-order Delivery
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn expired_event_settles_without_enrollment() {
        let f = fixture();
        let purchase = seed_pending(&f).await;

        let outcome = deliver(&f, &expired_event("evt_1", &purchase.id.to_string()))
            .await
            .unwrap();

        assert_eq!(outcome, ReconcileOutcome::Processed);
        let settled = f.purchases.find_by_id(&purchase.id).await.unwrap().unwrap();
        assert_eq!(settled.status, PurchaseStatus::Expired);
        assert_eq!(f.enrollments.pair_count(), 0);
    }

    #[tokio::test]
    async fn expiry_after_completion_leaves_success() {
        let f = fixture();
        let purchase = seed_pending(&f).await;

        deliver(&f, &completed_event("evt_1", &purchase.id.to_string()))
            .await
            .unwrap();
        let outcome = deliver(&f, &expired_event("evt_2", &purchase.id.to_string()))
            .await
            .unwrap();

        assert_eq!(outcome, ReconcileOutcome::Replayed);
        let settled = f.purchases.find_by_id(&purchase.id).await.unwrap().unwrap();
        assert_eq!(settled.status, PurchaseStatus::Success);
        assert!(f
            .enrollments
            .is_enrolled(&purchase.user_id, &purchase.course_id)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn completion_after_expiry_does_not_enroll() {
        let f = fixture();
        let purchase = seed_pending(&f).await;

        deliver(&f, &expired_event("evt_1", &purchase.id.to_string()))
            .await
            .unwrap();
        let outcome = deliver(&f, &completed_event("evt_2", &purchase.id.to_string()))
            .await
            .unwrap();

        assert_eq!(outcome, ReconcileOutcome::Replayed);
        let settled = f.purchases.find_by_id(&purchase.id).await.unwrap().unwrap();
        assert_eq!(settled.status, PurchaseStatus::Expired);
        assert_eq!(f.enrollments.pair_count(), 0);
    }

    // ══════════════════════════════════════════════════════════════
    // Payment Failure (indirect lookup)
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn failure_event_resolves_purchase_via_session_lookup() {
        let f = fixture();
        let purchase = seed_pending(&f).await;
        f.gateway.register_intent(
            "pi_1",
            GatewaySession {
                id: "cs_1".to_string(),
                url: String::new(),
                purchase_id: Some(purchase.id),
            },
        );

        let outcome = deliver(&f, &failed_event("evt_1", "pi_1")).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Processed);
        let settled = f.purchases.find_by_id(&purchase.id).await.unwrap().unwrap();
        assert_eq!(settled.status, PurchaseStatus::Failed);
        assert_eq!(f.enrollments.pair_count(), 0);
    }

    #[tokio::test]
    async fn failure_event_without_matching_session_is_ignored() {
        let f = fixture();
        seed_pending(&f).await;

        let outcome = deliver(&f, &failed_event("evt_1", "pi_unknown"))
            .await
            .unwrap();

        assert_eq!(outcome, ReconcileOutcome::Ignored);
    }

    #[tokio::test]
    async fn failure_after_completion_is_a_noop() {
        let f = fixture();
        let purchase = seed_pending(&f).await;
        f.gateway.register_intent(
            "pi_1",
            GatewaySession {
                id: "cs_1".to_string(),
                url: String::new(),
                purchase_id: Some(purchase.id),
            },
        );

        deliver(&f, &completed_event("evt_1", &purchase.id.to_string()))
            .await
            .unwrap();
        let outcome = deliver(&f, &failed_event("evt_2", "pi_1")).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Replayed);
        let settled = f.purchases.find_by_id(&purchase.id).await.unwrap().unwrap();
        assert_eq!(settled.status, PurchaseStatus::Success);
    }

    // ══════════════════════════════════════════════════════════════
    // Authentication Precedes Everything
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn tampered_signature_touches_no_store() {
        let f = fixture();
        let purchase = seed_pending(&f).await;

        let original = completed_event("evt_1", &purchase.id.to_string());
        let header = header_for(&original);
        let tampered = completed_event("evt_1_other", &purchase.id.to_string());

        let result = f.handler.handle(&tampered, &header).await;

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
        assert!(f.receipts.is_empty());
        assert_eq!(f.enrollments.pair_count(), 0);
        let untouched = f.purchases.find_by_id(&purchase.id).await.unwrap().unwrap();
        assert_eq!(untouched.status, PurchaseStatus::Pending);
    }

    #[tokio::test]
    async fn unparseable_payload_after_valid_signature_is_rejected() {
        let f = fixture();
        let payload = b"not json at all";
        let header = header_for(payload);

        let result = f.handler.handle(payload, &header).await;

        assert!(matches!(result, Err(WebhookError::ParseError(_))));
        assert!(f.receipts.is_empty());
    }

    // ══════════════════════════════════════════════════════════════
    // Integrity Gap and Unknown Types
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn unknown_purchase_is_acknowledged_and_recorded() {
        let f = fixture();
        let phantom = PurchaseId::new();
        let payload = completed_event("evt_1", &phantom.to_string());

        let outcome = deliver(&f, &payload).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::IntegrityGap);
        assert_eq!(f.enrollments.pair_count(), 0);

        let receipts = f.receipts.all();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].disposition, WebhookDisposition::IntegrityGap);
        assert!(receipts[0]
            .detail
            .as_deref()
            .unwrap()
            .contains(&phantom.to_string()));
    }

    #[tokio::test]
    async fn unknown_event_type_is_acknowledged() {
        let f = fixture();
        let payload = serde_json::to_vec(&json!({
            "id": "evt_1",
            "type": "invoice.payment_succeeded",
            "created": 1704067200,
            "data": { "object": {} },
            "livemode": false
        }))
        .unwrap();

        let outcome = deliver(&f, &payload).await.unwrap();

        assert_eq!(outcome, ReconcileOutcome::Ignored);
        let receipts = f.receipts.all();
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].disposition, WebhookDisposition::Ignored);
    }

    #[tokio::test]
    async fn completed_event_without_purchase_metadata_is_bad_request() {
        let f = fixture();
        let payload = serde_json::to_vec(&json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "created": 1704067200,
            "data": { "object": { "id": "cs_1", "metadata": {} } },
            "livemode": false
        }))
        .unwrap();

        let result = deliver(&f, &payload).await;

        assert!(matches!(
            result,
            Err(WebhookError::MissingMetadata("purchase_id"))
        ));
        // The failure is recorded so the delivery trail stays complete.
        assert_eq!(f.receipts.len(), 1);
    }
}
