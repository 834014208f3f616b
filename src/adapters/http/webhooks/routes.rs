//! Axum router for the webhook endpoints.
//!
//! Separate from the authenticated API surface: these routes carry no
//! caller identity and are authenticated by signature instead.

use axum::routing::post;
use axum::Router;

use super::super::AppState;
use super::handlers::{identity_webhook, payment_webhook};

/// Webhook routes.
///
/// - `POST /payment` - payment gateway notifications
/// - `POST /identity` - identity provider lifecycle notifications
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payment", post(payment_webhook))
        .route("/identity", post(identity_webhook))
}
