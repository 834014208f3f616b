//! EnrollmentStore port - the user↔course enrollment relation.
//!
//! The relation is stored as one logical collection of (user, course)
//! pairs; the mirrored per-user and per-course sets are projections of it,
//! so they can never diverge. Enrollment is monotonic: this port has no
//! removal operation, by design.

use async_trait::async_trait;

use crate::domain::foundation::{CourseId, DomainError, UserId};

/// Result of an add-if-absent enrollment write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentOutcome {
    /// The pair was not present and has been inserted.
    Inserted,
    /// The pair was already present; nothing was written.
    AlreadyEnrolled,
}

/// Port for the enrollment relation.
///
/// `add_if_absent` must be atomic with respect to concurrent invocations
/// for the same (user, course) pair — two racing calls yield exactly one
/// net insertion and both succeed. Do not assume the backing store
/// serializes conditional updates unless it documents that it does;
/// implementations provide the guarantee themselves (unique constraint,
/// single-lock check-and-insert, or equivalent).
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    /// Idempotently ensures the (user, course) pair is enrolled.
    async fn add_if_absent(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<EnrollmentOutcome, DomainError>;

    /// Returns true if the pair is enrolled.
    async fn is_enrolled(&self, user_id: &UserId, course_id: &CourseId)
        -> Result<bool, DomainError>;

    /// Courses a user is enrolled in.
    async fn courses_of(&self, user_id: &UserId) -> Result<Vec<CourseId>, DomainError>;

    /// Students enrolled in a course.
    async fn students_of(&self, course_id: &CourseId) -> Result<Vec<UserId>, DomainError>;
}
