//! UserRepository port - user profile persistence.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::user::UserProfile;

/// Port for user profiles.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts or replaces a profile (identity-provider sync).
    async fn upsert(&self, profile: &UserProfile) -> Result<(), DomainError>;

    /// Finds a profile by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, DomainError>;

    /// Returns the existing profile, or creates and returns a placeholder
    /// if this is the user's first interaction.
    ///
    /// The conflict policy is explicit: an existing profile is returned
    /// untouched; racing creations resolve to a single stored record.
    async fn upsert_default(&self, id: &UserId) -> Result<UserProfile, DomainError>;

    /// Deletes a profile (identity-provider account deletion).
    ///
    /// Deleting a profile never touches the enrollment relation.
    async fn delete(&self, id: &UserId) -> Result<(), DomainError>;
}
