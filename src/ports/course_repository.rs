//! CourseRepository port - catalog persistence.

use async_trait::async_trait;

use crate::domain::catalog::Course;
use crate::domain::foundation::{CourseId, DomainError};

/// Port for course storage.
///
/// Note that the enrolled-students set is NOT stored here; it lives in the
/// enrollment store and is only ever written through the enrollment applier.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Stores a new course.
    async fn create(&self, course: &Course) -> Result<(), DomainError>;

    /// Replaces an existing course (used for rating updates).
    async fn update(&self, course: &Course) -> Result<(), DomainError>;

    /// Finds a course by id.
    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, DomainError>;

    /// Lists all published courses.
    async fn list_published(&self) -> Result<Vec<Course>, DomainError>;
}
