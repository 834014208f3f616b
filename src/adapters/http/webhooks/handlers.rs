//! HTTP handlers for the webhook endpoints.
//!
//! Both endpoints read the raw body bytes — signature verification runs
//! over exactly what arrived on the wire, never a re-serialized form. A 2xx
//! is returned only after successful verification and processing (or an
//! idempotent no-op); non-2xx responses trigger sender redelivery.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use crate::domain::webhook::WebhookError;

use super::super::{AppState, ErrorResponse};

/// Header carrying the payment gateway's signature.
const PAYMENT_SIGNATURE_HEADER: &str = "Stripe-Signature";

/// Header carrying the identity provider's signature.
const IDENTITY_SIGNATURE_HEADER: &str = "Identity-Signature";

/// Acknowledgment body for accepted deliveries.
#[derive(Debug, Serialize)]
struct Acknowledged {
    received: bool,
}

fn signature_header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, WebhookApiError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookApiError(WebhookError::MissingSignature))
}

/// POST /webhooks/payment - gateway notification endpoint.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = signature_header(&headers, PAYMENT_SIGNATURE_HEADER)?;

    let handler = state.reconcile_handler();
    let outcome = handler.handle(&body, signature).await?;

    tracing::debug!(?outcome, "Payment webhook acknowledged");
    Ok(Json(Acknowledged { received: true }))
}

/// POST /webhooks/identity - identity provider notification endpoint.
pub async fn identity_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = signature_header(&headers, IDENTITY_SIGNATURE_HEADER)?;

    let handler = state.sync_identity_handler();
    let outcome = handler.handle(&body, signature).await?;

    tracing::debug!(?outcome, "Identity webhook acknowledged");
    Ok(Json(Acknowledged { received: true }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error wrapper mapping webhook errors to sender-facing statuses.
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Webhook processing failed, sender will retry");
        } else if status != StatusCode::OK {
            tracing::warn!(error = %self.0, "Webhook rejected");
        }

        let body = ErrorResponse::new("WEBHOOK_ERROR", self.0.to_string());
        (status, Json(body)).into_response()
    }
}
