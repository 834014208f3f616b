//! HTTP handlers for the user endpoints.

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::handlers::checkout::{
    CheckoutError, PurchaseCourseCommand, PurchaseOutcome,
};
use crate::application::handlers::enrollment::EnrolledCoursesQuery;
use crate::application::handlers::rating::{RateCourseCommand, RateCourseError};
use crate::domain::foundation::{CourseId, DomainError, Rating};

use super::super::catalog::CourseSummaryResponse;
use super::super::middleware::AuthenticatedUser;
use super::super::{AppState, ErrorResponse};
use super::dto::{
    EnrolledCoursesResponse, PurchaseRequest, PurchaseResponse, RatingRequest, RatingResponse,
    UserDataResponse,
};

/// GET /api/user/data - the caller's profile, created on first sight.
pub async fn get_user_data(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, UserApiError> {
    let profile = state.users.upsert_default(&user.user_id).await?;
    Ok(Json(UserDataResponse::from(profile)))
}

/// GET /api/user/enrolled-courses - the caller's enrollments.
pub async fn enrolled_courses(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, UserApiError> {
    let handler = state.enrolled_courses_handler();
    let courses = handler
        .handle(EnrolledCoursesQuery {
            user_id: user.user_id,
        })
        .await?;

    let response = EnrolledCoursesResponse {
        enrolled_courses: courses.iter().map(CourseSummaryResponse::from).collect(),
    };
    Ok(Json(response))
}

/// POST /api/user/purchase - free-path enrollment or hosted checkout.
pub async fn purchase_course(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<PurchaseRequest>,
) -> Result<impl IntoResponse, UserApiError> {
    let course_id: CourseId = request
        .course_id
        .parse()
        .map_err(|_| UserApiError::invalid_course_id(&request.course_id))?;

    let handler = state.purchase_course_handler();
    let outcome = handler
        .handle(PurchaseCourseCommand {
            user_id: user.user_id,
            course_id,
            success_url: state.checkout_success_url.clone(),
            cancel_url: format!(
                "{}/{}",
                state.checkout_cancel_url.trim_end_matches('/'),
                course_id
            ),
        })
        .await?;

    let response = match outcome {
        PurchaseOutcome::EnrolledFree { purchase } => PurchaseResponse::enrolled(&purchase),
        PurchaseOutcome::CheckoutStarted { session_url, .. } => {
            PurchaseResponse::checkout(session_url)
        }
    };
    Ok(Json(response))
}

/// POST /api/user/rating - rate an enrolled course (last write wins).
pub async fn rate_course(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<RatingRequest>,
) -> Result<impl IntoResponse, UserApiError> {
    let course_id: CourseId = request
        .course_id
        .parse()
        .map_err(|_| UserApiError::invalid_course_id(&request.course_id))?;
    let rating = Rating::try_from_u8(request.rating)
        .map_err(|e| UserApiError::validation("rating", e.to_string()))?;

    let handler = state.rate_course_handler();
    handler
        .handle(RateCourseCommand {
            user_id: user.user_id,
            course_id,
            rating,
        })
        .await?;

    Ok(Json(RatingResponse {
        message: "Rating saved".to_string(),
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error for the user endpoints.
pub struct UserApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl UserApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn invalid_course_id(raw: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "INVALID_COURSE_ID",
            format!("'{}' is not a valid course id", raw),
        )
    }

    fn validation(field: &str, message: String) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_FAILED",
            format!("{}: {}", field, message),
        )
    }
}

impl From<CheckoutError> for UserApiError {
    fn from(err: CheckoutError) -> Self {
        let (status, code) = match &err {
            CheckoutError::CourseNotFound(_) => (StatusCode::NOT_FOUND, "COURSE_NOT_FOUND"),
            CheckoutError::AlreadyEnrolled(_) => (StatusCode::CONFLICT, "ALREADY_ENROLLED"),
            CheckoutError::DuplicatePurchase(_) => (StatusCode::CONFLICT, "DUPLICATE_PURCHASE"),
            CheckoutError::GatewayUnavailable { .. } => {
                (StatusCode::BAD_GATEWAY, "GATEWAY_UNAVAILABLE")
            }
            CheckoutError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };
        Self::new(status, code, err.to_string())
    }
}

impl From<RateCourseError> for UserApiError {
    fn from(err: RateCourseError) -> Self {
        let (status, code) = match &err {
            RateCourseError::CourseNotFound(_) => (StatusCode::NOT_FOUND, "COURSE_NOT_FOUND"),
            RateCourseError::NotEnrolled(_) => (StatusCode::BAD_REQUEST, "NOT_ENROLLED"),
            RateCourseError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };
        Self::new(status, code, err.to_string())
    }
}

impl From<DomainError> for UserApiError {
    fn from(err: DomainError) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            err.to_string(),
        )
    }
}

impl IntoResponse for UserApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse::new(self.code, self.message);
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::CourseId;

    #[test]
    fn checkout_errors_map_to_expected_statuses() {
        let id = CourseId::new();

        let err: UserApiError = CheckoutError::CourseNotFound(id).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err: UserApiError = CheckoutError::AlreadyEnrolled(id).into();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err: UserApiError = CheckoutError::DuplicatePurchase(id).into();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err: UserApiError = CheckoutError::GatewayUnavailable {
            message: "down".to_string(),
            retryable: true,
        }
        .into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn rating_errors_map_to_expected_statuses() {
        let id = CourseId::new();

        let err: UserApiError = RateCourseError::CourseNotFound(id).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err: UserApiError = RateCourseError::NotEnrolled(id).into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_course_id_is_bad_request() {
        let err = UserApiError::invalid_course_id("garbage");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, "INVALID_COURSE_ID");
    }
}
