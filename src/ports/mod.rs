//! Ports - interfaces between the application core and the outside world.
//!
//! All mutable shared state sits behind these traits. Store handles are
//! created once at process start and passed by reference into each
//! component; no component reaches around them.

mod authorizer;
mod course_repository;
mod enrollment_store;
mod payment_gateway;
mod purchase_repository;
mod user_repository;
mod webhook_receipts;

pub use authorizer::{Authorizer, Capability};
pub use course_repository::CourseRepository;
pub use enrollment_store::{EnrollmentOutcome, EnrollmentStore};
pub use payment_gateway::{
    CreateSessionRequest, GatewayError, GatewayErrorCode, GatewaySession, PaymentGateway,
};
pub use purchase_repository::{PurchaseRepository, TransitionOutcome};
pub use user_repository::UserRepository;
pub use webhook_receipts::{
    ProcessedWebhookStore, ReceiptInsert, WebhookDisposition, WebhookReceipt,
};
