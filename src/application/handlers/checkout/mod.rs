//! Checkout handlers - purchase initiation and gateway-event reconciliation.

mod errors;
mod purchase_course;
mod reconcile_gateway_event;

pub use errors::CheckoutError;
pub use purchase_course::{PurchaseCourseCommand, PurchaseCourseHandler, PurchaseOutcome};
pub use reconcile_gateway_event::{ReconcileGatewayEventHandler, ReconcileOutcome};
