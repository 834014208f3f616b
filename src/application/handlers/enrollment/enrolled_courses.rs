//! EnrolledCoursesHandler - query for a user's enrolled courses.

use std::sync::Arc;

use crate::domain::catalog::Course;
use crate::domain::foundation::{DomainError, UserId};
use crate::ports::{CourseRepository, EnrollmentStore};

/// Query for the courses a user is enrolled in.
#[derive(Debug, Clone)]
pub struct EnrolledCoursesQuery {
    pub user_id: UserId,
}

/// Handler resolving enrollment ids into course records.
pub struct EnrolledCoursesHandler {
    enrollments: Arc<dyn EnrollmentStore>,
    courses: Arc<dyn CourseRepository>,
}

impl EnrolledCoursesHandler {
    pub fn new(enrollments: Arc<dyn EnrollmentStore>, courses: Arc<dyn CourseRepository>) -> Self {
        Self {
            enrollments,
            courses,
        }
    }

    pub async fn handle(&self, query: EnrolledCoursesQuery) -> Result<Vec<Course>, DomainError> {
        let course_ids = self.enrollments.courses_of(&query.user_id).await?;

        let mut enrolled = Vec::with_capacity(course_ids.len());
        for id in course_ids {
            // An id with no catalog record means the course was unpublished
            // upstream; the enrollment itself is never removed.
            if let Some(course) = self.courses.find_by_id(&id).await? {
                enrolled.push(course);
            }
        }
        Ok(enrolled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryCourseStore, InMemoryEnrollmentStore};
    use crate::domain::foundation::{CourseId, Money, Percentage};
    use crate::ports::EnrollmentStore as _;

    fn course(title: &str) -> Course {
        Course::new(
            CourseId::new(),
            UserId::new("edu").unwrap(),
            title,
            "",
            Money::ZERO,
            Percentage::ZERO,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn returns_only_the_users_courses() {
        let enrollments = Arc::new(InMemoryEnrollmentStore::new());
        let courses = Arc::new(InMemoryCourseStore::new());
        let alice = UserId::new("alice").unwrap();
        let bob = UserId::new("bob").unwrap();

        let a = course("A");
        let b = course("B");
        courses.seed(a.clone());
        courses.seed(b.clone());
        enrollments.add_if_absent(&alice, &a.id).await.unwrap();
        enrollments.add_if_absent(&bob, &b.id).await.unwrap();

        let handler = EnrolledCoursesHandler::new(enrollments, courses);
        let result = handler
            .handle(EnrolledCoursesQuery { user_id: alice })
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "A");
    }

    #[tokio::test]
    async fn empty_for_unknown_user() {
        let handler = EnrolledCoursesHandler::new(
            Arc::new(InMemoryEnrollmentStore::new()),
            Arc::new(InMemoryCourseStore::new()),
        );

        let result = handler
            .handle(EnrolledCoursesQuery {
                user_id: UserId::new("nobody").unwrap(),
            })
            .await
            .unwrap();

        assert!(result.is_empty());
    }
}
