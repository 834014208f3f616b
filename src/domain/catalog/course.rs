//! Course aggregate entity.
//!
//! The view of a course relevant to checkout and enrollment: pricing,
//! discount, publication state, and per-student ratings. Course content
//! (chapters, lectures, media) lives with an external collaborator and is
//! not modeled here.
//!
//! # Design Decisions
//!
//! - **Enrollment lives elsewhere**: the enrolled-students set is owned by
//!   the enrollment store and mutated only through the enrollment applier;
//!   the Course aggregate never carries or writes it.
//! - **Ratings are last-write-wins**: at most one rating per student,
//!   re-submitting replaces the prior value.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::foundation::{CourseId, Money, Percentage, Rating, Timestamp, UserId};

/// Errors raised by Course operations.
#[derive(Debug, Clone, Error)]
pub enum CourseError {
    /// Course title was empty.
    #[error("Course title cannot be empty")]
    EmptyTitle,
}

/// Course aggregate - a sellable catalog entry.
///
/// # Invariants
///
/// - `price` is non-negative (enforced by [`Money`])
/// - `discount` is 0-100 (enforced by [`Percentage`])
/// - `ratings` holds at most one entry per student
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Unique identifier for this course.
    pub id: CourseId,

    /// The educator who published the course.
    pub educator_id: UserId,

    /// Course title shown at checkout.
    pub title: String,

    /// Short description for the catalog listing.
    pub description: String,

    /// List price in major currency units.
    pub price: Money,

    /// Discount applied at checkout.
    pub discount: Percentage,

    /// Whether the course appears in the public catalog.
    pub is_published: bool,

    /// Star ratings keyed by student, latest write wins.
    pub ratings: HashMap<UserId, Rating>,

    /// When the course was created.
    pub created_at: Timestamp,

    /// When the course was last updated.
    pub updated_at: Timestamp,
}

impl Course {
    /// Creates a new unpublished course.
    pub fn new(
        id: CourseId,
        educator_id: UserId,
        title: impl Into<String>,
        description: impl Into<String>,
        price: Money,
        discount: Percentage,
    ) -> Result<Self, CourseError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CourseError::EmptyTitle);
        }
        let now = Timestamp::now();
        Ok(Self {
            id,
            educator_id,
            title,
            description: description.into(),
            price,
            discount,
            is_published: false,
            ratings: HashMap::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns true if the course can be enrolled in without payment.
    pub fn is_free(&self) -> bool {
        self.price.is_zero()
    }

    /// The amount actually charged: price minus discount, rounded half-up
    /// to currency minor-unit precision.
    pub fn final_price(&self) -> Money {
        self.price.apply_discount(self.discount)
    }

    /// Makes the course visible in the public catalog.
    pub fn publish(&mut self) {
        self.is_published = true;
        self.updated_at = Timestamp::now();
    }

    /// Records a student's rating, replacing any prior rating they gave.
    pub fn rate(&mut self, student: UserId, rating: Rating) {
        self.ratings.insert(student, rating);
        self.updated_at = Timestamp::now();
    }

    /// Returns the rating a student gave, if any.
    pub fn rating_of(&self, student: &UserId) -> Option<Rating> {
        self.ratings.get(student).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn student(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn paid_course() -> Course {
        Course::new(
            CourseId::new(),
            student("edu_1"),
            "Practical Rust",
            "Ownership without tears",
            Money::new(dec!(100)).unwrap(),
            Percentage::new(20),
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_empty_title() {
        let result = Course::new(
            CourseId::new(),
            student("edu_1"),
            "   ",
            "",
            Money::ZERO,
            Percentage::ZERO,
        );
        assert!(matches!(result, Err(CourseError::EmptyTitle)));
    }

    #[test]
    fn zero_price_course_is_free() {
        let course = Course::new(
            CourseId::new(),
            student("edu_1"),
            "Intro",
            "",
            Money::ZERO,
            Percentage::ZERO,
        )
        .unwrap();
        assert!(course.is_free());
        assert!(course.final_price().is_zero());
    }

    #[test]
    fn final_price_applies_discount() {
        let course = paid_course();
        assert_eq!(course.final_price().amount(), dec!(80.00));
        assert_eq!(course.final_price().minor_units(), 8000);
    }

    #[test]
    fn new_course_starts_unpublished() {
        let mut course = paid_course();
        assert!(!course.is_published);
        course.publish();
        assert!(course.is_published);
    }

    #[test]
    fn rate_stores_one_rating_per_student() {
        let mut course = paid_course();
        let alice = student("alice");

        course.rate(alice.clone(), Rating::Three);
        course.rate(alice.clone(), Rating::Five);

        assert_eq!(course.ratings.len(), 1);
        assert_eq!(course.rating_of(&alice), Some(Rating::Five));
    }

    #[test]
    fn ratings_for_different_students_accumulate() {
        let mut course = paid_course();
        course.rate(student("alice"), Rating::Four);
        course.rate(student("bob"), Rating::Two);

        assert_eq!(course.ratings.len(), 2);
    }
}
