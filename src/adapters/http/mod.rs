//! HTTP adapter - axum routers, handlers, and DTOs.

pub mod catalog;
pub mod middleware;
pub mod user;
pub mod webhooks;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use secrecy::SecretString;
use serde::Serialize;

use crate::application::handlers::catalog::{
    CreateCourseHandler, GetCourseHandler, ListCoursesHandler,
};
use crate::application::handlers::checkout::{PurchaseCourseHandler, ReconcileGatewayEventHandler};
use crate::application::handlers::enrollment::{EnrolledCoursesHandler, EnrollmentApplier};
use crate::application::handlers::identity::SyncIdentityHandler;
use crate::application::handlers::rating::RateCourseHandler;
use crate::domain::webhook::SignatureVerifier;
use crate::ports::{
    Authorizer, CourseRepository, EnrollmentStore, PaymentGateway, ProcessedWebhookStore,
    PurchaseRepository, UserRepository,
};

/// Shared application state.
///
/// Store handles are created once at process start and cloned (as Arcs)
/// into each request; application handlers are constructed on demand.
#[derive(Clone)]
pub struct AppState {
    pub courses: Arc<dyn CourseRepository>,
    pub users: Arc<dyn UserRepository>,
    pub purchases: Arc<dyn PurchaseRepository>,
    pub enrollments: Arc<dyn EnrollmentStore>,
    pub receipts: Arc<dyn ProcessedWebhookStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub authorizer: Arc<dyn Authorizer>,
    pub applier: Arc<EnrollmentApplier>,

    pub payment_webhook_secret: SecretString,
    pub identity_webhook_secret: SecretString,
    pub currency: String,
    pub checkout_success_url: String,
    pub checkout_cancel_url: String,
}

impl AppState {
    pub fn purchase_course_handler(&self) -> PurchaseCourseHandler {
        PurchaseCourseHandler::new(
            self.courses.clone(),
            self.users.clone(),
            self.purchases.clone(),
            self.applier.clone(),
            self.gateway.clone(),
            self.currency.clone(),
        )
    }

    pub fn reconcile_handler(&self) -> ReconcileGatewayEventHandler {
        ReconcileGatewayEventHandler::new(
            SignatureVerifier::new(self.payment_webhook_secret.clone()),
            self.purchases.clone(),
            self.applier.clone(),
            self.gateway.clone(),
            self.receipts.clone(),
        )
    }

    pub fn sync_identity_handler(&self) -> SyncIdentityHandler {
        SyncIdentityHandler::new(
            SignatureVerifier::new(self.identity_webhook_secret.clone()),
            self.users.clone(),
        )
    }

    pub fn enrolled_courses_handler(&self) -> EnrolledCoursesHandler {
        EnrolledCoursesHandler::new(self.enrollments.clone(), self.courses.clone())
    }

    pub fn rate_course_handler(&self) -> RateCourseHandler {
        RateCourseHandler::new(self.courses.clone(), self.enrollments.clone())
    }

    pub fn list_courses_handler(&self) -> ListCoursesHandler {
        ListCoursesHandler::new(self.courses.clone())
    }

    pub fn get_course_handler(&self) -> GetCourseHandler {
        GetCourseHandler::new(self.courses.clone())
    }

    pub fn create_course_handler(&self) -> CreateCourseHandler {
        CreateCourseHandler::new(self.courses.clone())
    }
}

/// Standard JSON error body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// Builds the complete API router.
///
/// Webhook routes sit outside the authenticated API surface; they carry no
/// caller identity and are authenticated by signature instead.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/user", user::routes())
        .nest("/api/course", catalog::course_routes())
        .nest("/api/educator", catalog::educator_routes())
        .nest("/webhooks", webhooks::routes())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}
