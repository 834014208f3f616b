//! Webhook module - notification-channel authentication and event types.
//!
//! Two independent channels deliver notifications: the payment gateway
//! (checkout outcomes) and the identity provider (user lifecycle). Both use
//! the same signing scheme with separate secrets, and both obey the same
//! invariant: the signature is verified over the exact bytes received before
//! the payload is parsed or any store is touched.

mod errors;
mod gateway_event;
mod identity_event;
mod signature;

pub use errors::WebhookError;
pub use gateway_event::{
    CheckoutSessionObject, GatewayEvent, GatewayEventType, PaymentIntentObject,
};
pub use identity_event::{IdentityEvent, IdentityEventType, IdentityUserObject};
pub use signature::{sign_payload, SignatureHeader, SignatureVerifier};
