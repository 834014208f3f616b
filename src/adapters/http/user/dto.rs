//! HTTP DTOs for the user endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::purchase::Purchase;
use crate::domain::user::UserProfile;

use super::super::catalog::CourseSummaryResponse;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to purchase a course.
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseRequest {
    /// The course to buy.
    pub course_id: String,
}

/// Request to rate a course.
#[derive(Debug, Clone, Deserialize)]
pub struct RatingRequest {
    pub course_id: String,
    /// Star rating, 1-5.
    pub rating: u8,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response to a purchase request.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PurchaseResponse {
    /// Free course: enrollment applied immediately.
    Enrolled { message: String, purchase_id: String },

    /// Paid course: buyer continues at the gateway.
    Checkout { session_url: String },
}

impl PurchaseResponse {
    pub fn enrolled(purchase: &Purchase) -> Self {
        Self::Enrolled {
            message: "Enrolled in free course".to_string(),
            purchase_id: purchase.id.to_string(),
        }
    }

    pub fn checkout(session_url: String) -> Self {
        Self::Checkout { session_url }
    }
}

/// User profile view.
#[derive(Debug, Clone, Serialize)]
pub struct UserDataResponse {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
    /// ISO 8601.
    pub created_at: String,
}

impl From<UserProfile> for UserDataResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id.to_string(),
            name: profile.name,
            email: profile.email,
            image_url: profile.image_url,
            created_at: profile.created_at.as_datetime().to_rfc3339(),
        }
    }
}

/// The caller's enrolled courses.
#[derive(Debug, Clone, Serialize)]
pub struct EnrolledCoursesResponse {
    pub enrolled_courses: Vec<CourseSummaryResponse>,
}

/// Acknowledgment for a stored rating.
#[derive(Debug, Clone, Serialize)]
pub struct RatingResponse {
    pub message: String,
}
