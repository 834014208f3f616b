//! HTTP DTOs for the catalog endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::Course;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to create a course (educator only).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// List price in major currency units; must not be negative.
    pub price: Decimal,

    /// Discount percentage, 0-100.
    #[serde(default)]
    pub discount: u8,

    /// Publish immediately.
    #[serde(default)]
    pub publish: bool,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Course summary for catalog listings.
#[derive(Debug, Clone, Serialize)]
pub struct CourseSummaryResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    /// List price as a decimal string.
    pub price: Decimal,
    /// Discount percentage.
    pub discount: u8,
    /// Price after discount, rounded to cents.
    pub final_price: Decimal,
    /// Mean star rating, if any ratings exist.
    pub average_rating: Option<f64>,
    pub rating_count: usize,
}

impl From<&Course> for CourseSummaryResponse {
    fn from(course: &Course) -> Self {
        let rating_count = course.ratings.len();
        let average_rating = if rating_count == 0 {
            None
        } else {
            let sum: u32 = course.ratings.values().map(|r| u32::from(r.value())).sum();
            Some(f64::from(sum) / rating_count as f64)
        };

        Self {
            id: course.id.to_string(),
            title: course.title.clone(),
            description: course.description.clone(),
            price: course.price.amount(),
            discount: course.discount.value(),
            final_price: course.final_price().amount(),
            average_rating,
            rating_count,
        }
    }
}

/// Course detail view.
#[derive(Debug, Clone, Serialize)]
pub struct CourseDetailResponse {
    #[serde(flatten)]
    pub summary: CourseSummaryResponse,
    pub educator_id: String,
    pub is_published: bool,
    /// Number of enrolled students.
    pub enrolled_count: usize,
    /// ISO 8601.
    pub created_at: String,
}

impl CourseDetailResponse {
    pub fn new(course: &Course, enrolled_count: usize) -> Self {
        Self {
            summary: CourseSummaryResponse::from(course),
            educator_id: course.educator_id.to_string(),
            is_published: course.is_published,
            enrolled_count,
            created_at: course.created_at.as_datetime().to_rfc3339(),
        }
    }
}

/// Catalog listing.
#[derive(Debug, Clone, Serialize)]
pub struct CourseListResponse {
    pub courses: Vec<CourseSummaryResponse>,
}
