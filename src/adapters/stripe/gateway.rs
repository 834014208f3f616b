//! Stripe payment gateway adapter.
//!
//! Implements the `PaymentGateway` port against the Stripe REST API using
//! form-encoded requests. Calls carry a bounded timeout; a timed-out
//! session creation is surfaced to the caller and never retried here,
//! because a blind retry could mint two gateway sessions for one purchase.
//!
//! # Security
//!
//! The API key is held as a `secrecy::SecretString` and only exposed at the
//! point of use.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::ports::{CreateSessionRequest, GatewayError, GatewaySession, PaymentGateway};

use super::wire::{WireCheckoutSession, WireErrorEnvelope, WireList};

/// Default bound on a single gateway call.
const DEFAULT_CALL_TIMEOUT_SECS: u64 = 10;

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for the Stripe API.
    api_base_url: String,

    /// Bound on each outbound call.
    call_timeout: Duration,
}

impl StripeConfig {
    /// Creates a new Stripe configuration.
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            api_base_url: "https://api.stripe.com".to_string(),
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
        }
    }

    /// Overrides the API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Overrides the per-call timeout.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

/// Stripe implementation of the `PaymentGateway` port.
pub struct StripeGateway {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeGateway {
    /// Creates a new gateway adapter.
    pub fn new(config: StripeConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.call_timeout)
            .build()
            .unwrap_or_default();
        Self {
            config,
            http_client,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    fn map_transport_error(e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::timeout(e.to_string())
        } else {
            GatewayError::network(e.to_string())
        }
    }

    async fn read_api_error(response: reqwest::Response) -> GatewayError {
        let status = response.status();
        let message = match response.json::<WireErrorEnvelope>().await {
            Ok(envelope) => envelope
                .error
                .message
                .unwrap_or_else(|| format!("HTTP {}", status)),
            Err(_) => format!("HTTP {}", status),
        };
        GatewayError::api(message)
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<GatewaySession, GatewayError> {
        let purchase_id = request.purchase_id.to_string();
        let form: Vec<(&str, String)> = vec![
            ("mode", "payment".to_string()),
            ("line_items[0][price_data][currency]", request.currency),
            (
                "line_items[0][price_data][product_data][name]",
                request.description,
            ),
            (
                "line_items[0][price_data][unit_amount]",
                request.unit_amount_minor.to_string(),
            ),
            ("line_items[0][quantity]", "1".to_string()),
            ("success_url", request.success_url),
            ("cancel_url", request.cancel_url),
            ("metadata[purchase_id]", purchase_id.clone()),
        ];

        let response = self
            .http_client
            .post(self.endpoint("/v1/checkout/sessions"))
            .bearer_auth(self.config.api_key.expose_secret())
            .form(&form)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if !response.status().is_success() {
            let err = Self::read_api_error(response).await;
            tracing::warn!(purchase_id = %purchase_id, error = %err, "Checkout session creation rejected");
            return Err(err);
        }

        let wire: WireCheckoutSession = response
            .json()
            .await
            .map_err(|e| GatewayError::invalid_response(e.to_string()))?;

        tracing::info!(
            purchase_id = %purchase_id,
            session_id = %wire.id,
            "Checkout session created"
        );
        Ok(wire.into_session())
    }

    async fn find_session_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<GatewaySession>, GatewayError> {
        let response = self
            .http_client
            .get(self.endpoint("/v1/checkout/sessions"))
            .bearer_auth(self.config.api_key.expose_secret())
            .query(&[("payment_intent", payment_intent_id)])
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if !response.status().is_success() {
            return Err(Self::read_api_error(response).await);
        }

        let list: WireList<WireCheckoutSession> = response
            .json()
            .await
            .map_err(|e| GatewayError::invalid_response(e.to_string()))?;

        Ok(list.data.into_iter().next().map(WireCheckoutSession::into_session))
    }
}
