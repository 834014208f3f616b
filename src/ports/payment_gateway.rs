//! PaymentGateway port - the external hosted-checkout provider.
//!
//! The Checkout Initiator asks the gateway for a hosted session; the
//! reconciler queries it to correlate failure events back to a session.
//! Calls use a bounded timeout and are never silently retried — a retry
//! could create a second gateway session for one purchase.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::PurchaseId;

/// Request to create a hosted checkout session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    /// Ledger entry this session pays for; embedded as opaque session
    /// metadata so webhook events can be correlated back.
    pub purchase_id: PurchaseId,

    /// Line item description shown to the buyer.
    pub description: String,

    /// Amount in minor currency units (cents).
    pub unit_amount_minor: i64,

    /// ISO currency code, lowercase.
    pub currency: String,

    /// Redirect target after successful payment.
    pub success_url: String,

    /// Redirect target after cancelled checkout.
    pub cancel_url: String,
}

/// A hosted checkout session at the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySession {
    /// Gateway session id.
    pub id: String,

    /// URL the buyer is redirected to.
    pub url: String,

    /// Purchase id recovered from session metadata, when present.
    pub purchase_id: Option<PurchaseId>,
}

/// Categories of gateway failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayErrorCode {
    /// Could not reach the gateway.
    Network,
    /// The bounded call timeout elapsed.
    Timeout,
    /// The gateway rejected the request.
    Api,
    /// The gateway answered with something we could not decode.
    InvalidResponse,
}

impl GatewayErrorCode {
    /// Whether the caller may safely retry the whole operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayErrorCode::Network | GatewayErrorCode::Timeout)
    }
}

/// Error from a gateway call.
#[derive(Debug, Clone, Error)]
#[error("gateway {code:?}: {message}")]
pub struct GatewayError {
    pub code: GatewayErrorCode,
    pub message: String,
}

impl GatewayError {
    pub fn new(code: GatewayErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Timeout, message)
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::Api, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorCode::InvalidResponse, message)
    }

    /// Whether the operation may be retried by the caller.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

/// Port for the payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a hosted checkout session and returns its redirect target.
    async fn create_checkout_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<GatewaySession, GatewayError>;

    /// Looks up the checkout session backed by a payment intent.
    ///
    /// Used to correlate `payment failed` events, which carry only the
    /// payment intent id, back to a ledger entry.
    async fn find_session_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<GatewaySession>, GatewayError>;
}
