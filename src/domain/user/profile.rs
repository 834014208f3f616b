//! User profile entity.
//!
//! Identity (subject id) comes from the external identity provider; the
//! profile fields are synced in by its lifecycle webhook. A profile may also
//! be created as a placeholder on a user's first interaction, before any
//! webhook has arrived.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};

/// Locally stored view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Identity-provider subject.
    pub id: UserId,

    /// Display name, if the identity provider supplied one.
    pub name: Option<String>,

    /// Primary email address.
    pub email: Option<String>,

    /// Avatar URL.
    pub image_url: Option<String>,

    /// When the profile was first stored.
    pub created_at: Timestamp,

    /// When the profile was last updated.
    pub updated_at: Timestamp,
}

impl UserProfile {
    /// Creates a full profile from identity-provider data.
    pub fn new(
        id: UserId,
        name: Option<String>,
        email: Option<String>,
        image_url: Option<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            name,
            email,
            image_url,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates an empty placeholder profile for a first-time caller.
    pub fn placeholder(id: UserId) -> Self {
        Self::new(id, None, None, None)
    }
}
