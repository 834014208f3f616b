//! Checkout initiation errors.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | CourseNotFound | 404 |
//! | AlreadyEnrolled | 409 |
//! | DuplicatePurchase | 409 |
//! | GatewayUnavailable | 502 |
//! | Infrastructure | 500 |

use thiserror::Error;

use crate::domain::foundation::{CourseId, DomainError};

/// Errors from the checkout initiator.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The requested course does not exist.
    #[error("Course {0} not found")]
    CourseNotFound(CourseId),

    /// The caller is already enrolled in this course.
    #[error("Already enrolled in course {0}")]
    AlreadyEnrolled(CourseId),

    /// The caller already holds a purchase (pending or settled) for this
    /// course; a second checkout session is not opened.
    #[error("A purchase for course {0} already exists")]
    DuplicatePurchase(CourseId),

    /// The payment gateway could not create a session. The pending ledger
    /// entry, if already written, is left in place for later expiry.
    #[error("Payment gateway unavailable: {message}")]
    GatewayUnavailable { message: String, retryable: bool },

    /// A store operation failed.
    #[error(transparent)]
    Infrastructure(#[from] DomainError),
}
