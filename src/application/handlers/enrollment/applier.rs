//! EnrollmentApplier - the single choke-point for enrollment writes.
//!
//! Every enrollment in the system goes through `apply`: the free-course
//! path synchronously, the paid path via the gateway-event reconciler. No
//! other component writes the enrollment relation, and nothing in this
//! subsystem ever removes a pair — enrollment is monotonic.
//!
//! Idempotency and mutual exclusion come from the store's `add_if_absent`
//! contract: concurrent applications of the same (user, course) pair (for
//! example a replayed webhook racing the original delivery) produce exactly
//! one net insertion, and every caller observes success.

use std::sync::Arc;

use crate::domain::foundation::{CourseId, DomainError, UserId};
use crate::ports::{EnrollmentOutcome, EnrollmentStore};

/// Applies enrollments idempotently.
pub struct EnrollmentApplier {
    enrollments: Arc<dyn EnrollmentStore>,
}

impl EnrollmentApplier {
    pub fn new(enrollments: Arc<dyn EnrollmentStore>) -> Self {
        Self { enrollments }
    }

    /// Ensures the (user, course) pair is enrolled.
    ///
    /// Safe to call any number of times, from any number of concurrent
    /// callers. Returns the outcome of this particular call; both outcomes
    /// are success from the caller's perspective.
    pub async fn apply(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<EnrollmentOutcome, DomainError> {
        let outcome = self.enrollments.add_if_absent(user_id, course_id).await?;
        match outcome {
            EnrollmentOutcome::Inserted => {
                tracing::info!(user_id = %user_id, course_id = %course_id, "Enrollment applied");
            }
            EnrollmentOutcome::AlreadyEnrolled => {
                tracing::debug!(
                    user_id = %user_id,
                    course_id = %course_id,
                    "Enrollment already present, no-op"
                );
            }
        }
        Ok(outcome)
    }

    /// Read-only check whether the pair is already enrolled.
    pub async fn is_enrolled(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<bool, DomainError> {
        self.enrollments.is_enrolled(user_id, course_id).await
    }
}
