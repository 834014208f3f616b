//! PurchaseRepository port - the checkout ledger store.
//!
//! Purchase records are append-only plus a single conditional status
//! transition. The conditional transition is the concurrency primitive the
//! reconciler relies on: of any number of concurrent attempts to settle the
//! same purchase, exactly one observes `Applied`.

use async_trait::async_trait;

use crate::domain::foundation::{CourseId, DomainError, PurchaseId, UserId};
use crate::domain::purchase::{Purchase, PurchaseStatus};

/// Result of a conditional status transition.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// The record was pending and has been moved to the target status.
    Applied(Purchase),

    /// The record was already terminal; nothing was written. Carries the
    /// status it was found in.
    AlreadyTerminal(PurchaseStatus),

    /// No record with this id exists.
    NotFound,
}

/// Port for the purchase ledger.
///
/// Implementations must make `transition` atomic with respect to concurrent
/// invocations for the same purchase id (a conditional write keyed on the
/// pending status, or an equivalent store primitive). Records are never
/// deleted.
#[async_trait]
pub trait PurchaseRepository: Send + Sync {
    /// Appends a new ledger record.
    async fn create(&self, purchase: &Purchase) -> Result<(), DomainError>;

    /// Finds a record by id.
    async fn find_by_id(&self, id: &PurchaseId) -> Result<Option<Purchase>, DomainError>;

    /// Finds any record (pending or terminal) a user holds for a course.
    ///
    /// Used as the duplicate-checkout guard.
    async fn find_by_user_and_course(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<Option<Purchase>, DomainError>;

    /// Conditionally moves a pending record to a terminal status.
    ///
    /// The write only happens if the record is currently pending; otherwise
    /// the current status is reported without mutation.
    async fn transition(
        &self,
        id: &PurchaseId,
        to: PurchaseStatus,
    ) -> Result<TransitionOutcome, DomainError>;
}
