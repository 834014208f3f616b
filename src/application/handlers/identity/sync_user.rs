//! SyncIdentityHandler - applies identity-provider lifecycle events.
//!
//! A parallel, independently-authenticated webhook channel. It shares the
//! verify-before-mutate invariant with the payment channel but writes only
//! to the user store — never the purchase ledger or the enrollment
//! relation. Deleting a user removes their profile; their enrollments
//! remain (enrollment is monotonic in this subsystem).

use std::sync::Arc;

use crate::domain::webhook::{IdentityEvent, IdentityEventType, SignatureVerifier, WebhookError};
use crate::ports::UserRepository;

/// How a lifecycle event was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Profile inserted or replaced.
    Upserted,
    /// Profile deleted.
    Deleted,
    /// Event type is not one we act on.
    Ignored,
}

/// Handler for the identity provider notification endpoint.
pub struct SyncIdentityHandler {
    verifier: SignatureVerifier,
    users: Arc<dyn UserRepository>,
}

impl SyncIdentityHandler {
    pub fn new(verifier: SignatureVerifier, users: Arc<dyn UserRepository>) -> Self {
        Self { verifier, users }
    }

    /// Verifies and applies one delivery.
    ///
    /// The signature is checked over the exact bytes received before the
    /// payload is parsed and before the user store is touched.
    pub async fn handle(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<SyncOutcome, WebhookError> {
        self.verifier.verify(payload, signature_header)?;

        let event: IdentityEvent = serde_json::from_slice(payload)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        match event.parsed_type() {
            IdentityEventType::UserCreated | IdentityEventType::UserUpdated => {
                let profile = event
                    .user_object()?
                    .into_profile()
                    .map_err(|e| WebhookError::ParseError(e.to_string()))?;
                let user_id = profile.id.clone();
                self.users
                    .upsert(&profile)
                    .await
                    .map_err(|e| WebhookError::Store(e.to_string()))?;
                tracing::info!(user_id = %user_id, "User profile synced");
                Ok(SyncOutcome::Upserted)
            }
            IdentityEventType::UserDeleted => {
                let user = event.user_object()?;
                let user_id = user
                    .user_id()
                    .map_err(|e| WebhookError::ParseError(e.to_string()))?;
                self.users
                    .delete(&user_id)
                    .await
                    .map_err(|e| WebhookError::Store(e.to_string()))?;
                tracing::info!(user_id = %user_id, "User profile deleted");
                Ok(SyncOutcome::Deleted)
            }
            IdentityEventType::Unknown => {
                tracing::info!(event_type = %event.event_type, "Unhandled identity event type");
                Ok(SyncOutcome::Ignored)
            }
        }
    }
}
