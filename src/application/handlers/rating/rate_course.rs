//! RateCourseHandler - stores a student's course rating.
//!
//! Only enrolled students may rate, and re-submitting replaces the prior
//! rating (last write wins, no versioning).

use std::sync::Arc;
use thiserror::Error;

use crate::domain::foundation::{CourseId, DomainError, Rating, UserId};
use crate::ports::{CourseRepository, EnrollmentStore};

/// Command to rate a course.
#[derive(Debug, Clone)]
pub struct RateCourseCommand {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub rating: Rating,
}

/// Errors from rating a course.
#[derive(Debug, Error)]
pub enum RateCourseError {
    #[error("Course {0} not found")]
    CourseNotFound(CourseId),

    #[error("User is not enrolled in course {0}")]
    NotEnrolled(CourseId),

    #[error(transparent)]
    Infrastructure(#[from] DomainError),
}

/// Handler for course ratings.
pub struct RateCourseHandler {
    courses: Arc<dyn CourseRepository>,
    enrollments: Arc<dyn EnrollmentStore>,
}

impl RateCourseHandler {
    pub fn new(courses: Arc<dyn CourseRepository>, enrollments: Arc<dyn EnrollmentStore>) -> Self {
        Self {
            courses,
            enrollments,
        }
    }

    pub async fn handle(&self, cmd: RateCourseCommand) -> Result<(), RateCourseError> {
        let mut course = self
            .courses
            .find_by_id(&cmd.course_id)
            .await?
            .ok_or(RateCourseError::CourseNotFound(cmd.course_id))?;

        if !self
            .enrollments
            .is_enrolled(&cmd.user_id, &cmd.course_id)
            .await?
        {
            return Err(RateCourseError::NotEnrolled(cmd.course_id));
        }

        course.rate(cmd.user_id, cmd.rating);
        self.courses.update(&course).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryCourseStore, InMemoryEnrollmentStore};
    use crate::domain::catalog::Course;
    use crate::domain::foundation::{Money, Percentage};
    use crate::ports::{CourseRepository, EnrollmentStore};

    struct Fixture {
        courses: Arc<InMemoryCourseStore>,
        enrollments: Arc<InMemoryEnrollmentStore>,
        handler: RateCourseHandler,
    }

    fn fixture() -> Fixture {
        let courses = Arc::new(InMemoryCourseStore::new());
        let enrollments = Arc::new(InMemoryEnrollmentStore::new());
        let handler = RateCourseHandler::new(courses.clone(), enrollments.clone());
        Fixture {
            courses,
            enrollments,
            handler,
        }
    }

    fn seed_course(f: &Fixture) -> Course {
        let course = Course::new(
            CourseId::new(),
            UserId::new("edu").unwrap(),
            "Rust",
            "",
            Money::ZERO,
            Percentage::ZERO,
        )
        .unwrap();
        f.courses.seed(course.clone());
        course
    }

    #[tokio::test]
    async fn enrolled_student_can_rate() {
        let f = fixture();
        let course = seed_course(&f);
        let alice = UserId::new("alice").unwrap();
        f.enrollments.add_if_absent(&alice, &course.id).await.unwrap();

        f.handler
            .handle(RateCourseCommand {
                user_id: alice.clone(),
                course_id: course.id,
                rating: Rating::Four,
            })
            .await
            .unwrap();

        let stored = f.courses.find_by_id(&course.id).await.unwrap().unwrap();
        assert_eq!(stored.rating_of(&alice), Some(Rating::Four));
    }

    #[tokio::test]
    async fn resubmission_overwrites_prior_rating() {
        let f = fixture();
        let course = seed_course(&f);
        let alice = UserId::new("alice").unwrap();
        f.enrollments.add_if_absent(&alice, &course.id).await.unwrap();

        for rating in [Rating::Two, Rating::Five] {
            f.handler
                .handle(RateCourseCommand {
                    user_id: alice.clone(),
                    course_id: course.id,
                    rating,
                })
                .await
                .unwrap();
        }

        let stored = f.courses.find_by_id(&course.id).await.unwrap().unwrap();
        assert_eq!(stored.ratings.len(), 1);
        assert_eq!(stored.rating_of(&alice), Some(Rating::Five));
    }

    #[tokio::test]
    async fn unenrolled_student_is_rejected() {
        let f = fixture();
        let course = seed_course(&f);

        let result = f
            .handler
            .handle(RateCourseCommand {
                user_id: UserId::new("stranger").unwrap(),
                course_id: course.id,
                rating: Rating::One,
            })
            .await;

        assert!(matches!(result, Err(RateCourseError::NotEnrolled(_))));
        let stored = f.courses.find_by_id(&course.id).await.unwrap().unwrap();
        assert!(stored.ratings.is_empty());
    }

    #[tokio::test]
    async fn unknown_course_is_not_found() {
        let f = fixture();
        let result = f
            .handler
            .handle(RateCourseCommand {
                user_id: UserId::new("alice").unwrap(),
                course_id: CourseId::new(),
                rating: Rating::Three,
            })
            .await;

        assert!(matches!(result, Err(RateCourseError::CourseNotFound(_))));
    }
}
