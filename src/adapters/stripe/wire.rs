//! Wire types for the Stripe REST API.
//!
//! Only the response fields we read are modeled; Stripe sends far more.

use serde::Deserialize;
use std::collections::HashMap;

use crate::domain::webhook::CheckoutSessionObject;
use crate::ports::GatewaySession;

/// Checkout session as returned by the sessions API.
#[derive(Debug, Clone, Deserialize)]
pub struct WireCheckoutSession {
    pub id: String,

    /// Hosted checkout URL. Absent on expired/completed sessions.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl WireCheckoutSession {
    /// Converts to the port-level session representation.
    pub fn into_session(self) -> GatewaySession {
        let purchase_id = self
            .metadata
            .get(CheckoutSessionObject::PURCHASE_ID_KEY)
            .and_then(|raw| raw.parse().ok());
        GatewaySession {
            id: self.id,
            url: self.url.unwrap_or_default(),
            purchase_id,
        }
    }
}

/// Paged list envelope used by Stripe list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct WireList<T> {
    pub data: Vec<T>,
}

/// Error envelope Stripe returns on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct WireErrorEnvelope {
    pub error: WireError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireError {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}
