//! PurchaseCourseHandler - the checkout initiator.
//!
//! Decides the free-vs-paid path for a purchase request. Free courses are
//! enrolled synchronously with a settled zero-amount ledger record; paid
//! courses get a pending ledger record and a hosted gateway session whose
//! metadata carries the purchase id for later reconciliation.
//!
//! The duplicate-purchase guard here is best-effort — it closes the common
//! double-click window but race windows remain. The enrollment applier's
//! idempotency is what actually guarantees exactly-once enrollment.

use std::sync::Arc;

use crate::application::handlers::enrollment::EnrollmentApplier;
use crate::domain::catalog::Course;
use crate::domain::foundation::{CourseId, PurchaseId, UserId};
use crate::domain::purchase::Purchase;
use crate::ports::{CourseRepository, CreateSessionRequest, PaymentGateway, PurchaseRepository,
    UserRepository};

use super::CheckoutError;

/// Command to purchase a course for the calling user.
#[derive(Debug, Clone)]
pub struct PurchaseCourseCommand {
    pub user_id: UserId,
    pub course_id: CourseId,

    /// Redirect target after successful payment.
    pub success_url: String,

    /// Redirect target after cancelled checkout.
    pub cancel_url: String,
}

/// Result of a purchase request.
#[derive(Debug, Clone)]
pub enum PurchaseOutcome {
    /// Free course: enrollment applied synchronously, settled audit record
    /// written, no gateway involved.
    EnrolledFree { purchase: Purchase },

    /// Paid course: pending ledger entry created, buyer redirected to the
    /// hosted checkout session.
    CheckoutStarted {
        purchase: Purchase,
        session_url: String,
    },
}

/// Handler for checkout initiation.
pub struct PurchaseCourseHandler {
    courses: Arc<dyn CourseRepository>,
    users: Arc<dyn UserRepository>,
    purchases: Arc<dyn PurchaseRepository>,
    applier: Arc<EnrollmentApplier>,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
}

impl PurchaseCourseHandler {
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        users: Arc<dyn UserRepository>,
        purchases: Arc<dyn PurchaseRepository>,
        applier: Arc<EnrollmentApplier>,
        gateway: Arc<dyn PaymentGateway>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            courses,
            users,
            purchases,
            applier,
            gateway,
            currency: currency.into(),
        }
    }

    pub async fn handle(
        &self,
        cmd: PurchaseCourseCommand,
    ) -> Result<PurchaseOutcome, CheckoutError> {
        // 1. The course must exist.
        let course = self
            .courses
            .find_by_id(&cmd.course_id)
            .await?
            .ok_or(CheckoutError::CourseNotFound(cmd.course_id))?;

        // 2. First interaction creates a placeholder user record.
        let user = self.users.upsert_default(&cmd.user_id).await?;

        // 3. Reject if already enrolled.
        if self
            .applier
            .is_enrolled(&user.id, &course.id)
            .await?
        {
            return Err(CheckoutError::AlreadyEnrolled(course.id));
        }

        if course.is_free() {
            return self.enroll_free(&user.id, &course).await;
        }
        self.start_paid_checkout(&user.id, &course, cmd).await
    }

    /// Free path: one atomic success, returned immediately.
    async fn enroll_free(
        &self,
        user_id: &UserId,
        course: &Course,
    ) -> Result<PurchaseOutcome, CheckoutError> {
        self.applier.apply(user_id, &course.id).await?;

        let purchase = Purchase::settled_free(PurchaseId::new(), user_id.clone(), course.id);
        self.purchases.create(&purchase).await?;

        tracing::info!(
            user_id = %user_id,
            course_id = %course.id,
            purchase_id = %purchase.id,
            "Free course enrollment completed"
        );
        Ok(PurchaseOutcome::EnrolledFree { purchase })
    }

    /// Paid path: pending ledger entry, then a hosted gateway session.
    async fn start_paid_checkout(
        &self,
        user_id: &UserId,
        course: &Course,
        cmd: PurchaseCourseCommand,
    ) -> Result<PurchaseOutcome, CheckoutError> {
        // Best-effort guard against duplicate checkout sessions.
        if self
            .purchases
            .find_by_user_and_course(user_id, &course.id)
            .await?
            .is_some()
        {
            return Err(CheckoutError::DuplicatePurchase(course.id));
        }

        let amount = course.final_price();
        let purchase = Purchase::pending(PurchaseId::new(), user_id.clone(), course.id, amount);
        self.purchases.create(&purchase).await?;

        let session = self
            .gateway
            .create_checkout_session(CreateSessionRequest {
                purchase_id: purchase.id,
                description: course.title.clone(),
                unit_amount_minor: amount.minor_units(),
                currency: self.currency.clone(),
                success_url: cmd.success_url,
                cancel_url: cmd.cancel_url,
            })
            .await
            .map_err(|e| {
                // The pending record stays: a session may or may not exist
                // on the gateway side, and the expiry event (or operator
                // review of the receipt trail) resolves it. Retrying here
                // could mint a second session for the same purchase.
                tracing::warn!(
                    purchase_id = %purchase.id,
                    error = %e,
                    "Gateway session creation failed; leaving purchase pending"
                );
                CheckoutError::GatewayUnavailable {
                    message: e.message.clone(),
                    retryable: e.is_retryable(),
                }
            })?;

        tracing::info!(
            user_id = %user_id,
            course_id = %course.id,
            purchase_id = %purchase.id,
            session_id = %session.id,
            amount_minor = amount.minor_units(),
            "Checkout session started"
        );
        Ok(PurchaseOutcome::CheckoutStarted {
            purchase,
            session_url: session.url,
        })
    }
}
