//! Catalog read handlers.

use std::sync::Arc;

use crate::domain::catalog::Course;
use crate::domain::foundation::{CourseId, DomainError};
use crate::ports::CourseRepository;

/// Lists courses visible in the public catalog.
pub struct ListCoursesHandler {
    courses: Arc<dyn CourseRepository>,
}

impl ListCoursesHandler {
    pub fn new(courses: Arc<dyn CourseRepository>) -> Self {
        Self { courses }
    }

    pub async fn handle(&self) -> Result<Vec<Course>, DomainError> {
        self.courses.list_published().await
    }
}

/// Fetches a single course by id.
pub struct GetCourseHandler {
    courses: Arc<dyn CourseRepository>,
}

impl GetCourseHandler {
    pub fn new(courses: Arc<dyn CourseRepository>) -> Self {
        Self { courses }
    }

    pub async fn handle(&self, id: &CourseId) -> Result<Option<Course>, DomainError> {
        self.courses.find_by_id(id).await
    }
}
