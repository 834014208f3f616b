//! HTTP middleware - caller identity extraction.

mod auth;

pub use auth::{AuthenticatedUser, AuthenticationRequired};
