//! CreateCourseHandler - educator course creation.
//!
//! The educator capability check happens at the route layer through the
//! `Authorizer` port; this handler assumes an authorized caller.

use std::sync::Arc;
use thiserror::Error;

use crate::domain::catalog::{Course, CourseError};
use crate::domain::foundation::{CourseId, DomainError, Money, Percentage, UserId};
use crate::ports::CourseRepository;

/// Command to create a course.
#[derive(Debug, Clone)]
pub struct CreateCourseCommand {
    pub educator_id: UserId,
    pub title: String,
    pub description: String,
    pub price: Money,
    pub discount: Percentage,
    pub publish: bool,
}

/// Errors from course creation.
#[derive(Debug, Error)]
pub enum CreateCourseError {
    #[error(transparent)]
    Invalid(#[from] CourseError),

    #[error(transparent)]
    Infrastructure(#[from] DomainError),
}

/// Handler for course creation.
pub struct CreateCourseHandler {
    courses: Arc<dyn CourseRepository>,
}

impl CreateCourseHandler {
    pub fn new(courses: Arc<dyn CourseRepository>) -> Self {
        Self { courses }
    }

    pub async fn handle(&self, cmd: CreateCourseCommand) -> Result<Course, CreateCourseError> {
        let mut course = Course::new(
            CourseId::new(),
            cmd.educator_id,
            cmd.title,
            cmd.description,
            cmd.price,
            cmd.discount,
        )?;
        if cmd.publish {
            course.publish();
        }

        self.courses.create(&course).await?;
        tracing::info!(course_id = %course.id, educator_id = %course.educator_id, "Course created");
        Ok(course)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryCourseStore;
    use crate::ports::CourseRepository as _;
    use rust_decimal_macros::dec;

    fn command() -> CreateCourseCommand {
        CreateCourseCommand {
            educator_id: UserId::new("edu").unwrap(),
            title: "Practical Rust".to_string(),
            description: "Ownership without tears".to_string(),
            price: Money::new(dec!(49.99)).unwrap(),
            discount: Percentage::new(10),
            publish: true,
        }
    }

    #[tokio::test]
    async fn creates_and_stores_a_course() {
        let store = Arc::new(InMemoryCourseStore::new());
        let handler = CreateCourseHandler::new(store.clone());

        let course = handler.handle(command()).await.unwrap();

        assert!(course.is_published);
        assert!(store.find_by_id(&course.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn empty_title_is_rejected() {
        let handler = CreateCourseHandler::new(Arc::new(InMemoryCourseStore::new()));
        let cmd = CreateCourseCommand {
            title: "  ".to_string(),
            ..command()
        };

        let result = handler.handle(cmd).await;
        assert!(matches!(result, Err(CreateCourseError::Invalid(_))));
    }
}
