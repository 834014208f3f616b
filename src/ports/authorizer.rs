//! Authorizer port - capability checks backed by the identity provider.
//!
//! Role metadata lives at the identity provider, not in our stores. The
//! route layer consults this port before invoking a handler; the core
//! itself never calls the identity provider.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};

/// Capabilities the route layer may require of a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Create and publish courses (the educator role).
    PublishCourses,
}

/// Port for capability checks.
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Returns true if the user holds the capability.
    async fn allows(&self, user_id: &UserId, capability: Capability) -> Result<bool, DomainError>;
}
