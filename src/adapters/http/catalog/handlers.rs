//! HTTP handlers for the catalog endpoints.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::handlers::catalog::{CreateCourseCommand, CreateCourseError};
use crate::domain::foundation::{CourseId, DomainError, Money, Percentage};
use crate::ports::Capability;

use super::super::middleware::AuthenticatedUser;
use super::super::{AppState, ErrorResponse};
use super::dto::{
    CourseDetailResponse, CourseListResponse, CourseSummaryResponse, CreateCourseRequest,
};

/// GET /api/course - published courses.
pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, CatalogApiError> {
    let handler = state.list_courses_handler();
    let courses = handler.handle().await?;

    let response = CourseListResponse {
        courses: courses.iter().map(CourseSummaryResponse::from).collect(),
    };
    Ok(Json(response))
}

/// GET /api/course/{id} - course detail.
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CatalogApiError> {
    let course_id: CourseId = id
        .parse()
        .map_err(|_| CatalogApiError::invalid_course_id(&id))?;

    let handler = state.get_course_handler();
    let course = handler
        .handle(&course_id)
        .await?
        .ok_or_else(|| CatalogApiError::not_found(course_id))?;

    let enrolled_count = state.enrollments.students_of(&course_id).await?.len();
    Ok(Json(CourseDetailResponse::new(&course, enrolled_count)))
}

/// POST /api/educator/courses - create a course.
///
/// The educator capability is checked against the identity provider's role
/// metadata through the `Authorizer` port before the handler runs.
pub async fn create_course(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, CatalogApiError> {
    let allowed = state
        .authorizer
        .allows(&user.user_id, Capability::PublishCourses)
        .await?;
    if !allowed {
        return Err(CatalogApiError::educator_required());
    }

    let price = Money::new(request.price)
        .map_err(|e| CatalogApiError::validation("price", e.to_string()))?;
    let discount = Percentage::try_new(request.discount)
        .map_err(|e| CatalogApiError::validation("discount", e.to_string()))?;

    let handler = state.create_course_handler();
    let course = handler
        .handle(CreateCourseCommand {
            educator_id: user.user_id,
            title: request.title,
            description: request.description,
            price,
            discount,
            publish: request.publish,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CourseDetailResponse::new(&course, 0)),
    ))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error for the catalog endpoints.
pub struct CatalogApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl CatalogApiError {
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

    fn not_found(id: CourseId) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "COURSE_NOT_FOUND",
            format!("Course {} not found", id),
        )
    }

    fn educator_required() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            "EDUCATOR_REQUIRED",
            "Educator role required",
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

impl From<DomainError> for CatalogApiError {
    fn from(err: DomainError) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            err.to_string(),
        )
    }
}

impl From<CreateCourseError> for CatalogApiError {
    fn from(err: CreateCourseError) -> Self {
        match err {
            CreateCourseError::Invalid(e) => {
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", e.to_string())
            }
            CreateCourseError::Infrastructure(e) => e.into(),
        }
    }
}

impl IntoResponse for CatalogApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse::new(self.code, self.message);
        (self.status, Json(body)).into_response()
    }
}
