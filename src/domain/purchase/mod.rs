//! Purchase module - the checkout ledger.

mod ledger;

pub use ledger::{Purchase, PurchaseError, PurchaseStatus};
