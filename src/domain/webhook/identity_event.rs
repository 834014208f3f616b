//! Identity provider lifecycle event types.
//!
//! The identity provider notifies us when users are created, updated, or
//! deleted. This channel only ever touches the user store; it has no access
//! to the purchase ledger or the enrollment relation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{UserId, ValidationError};
use crate::domain::user::UserProfile;

use super::WebhookError;

/// A verified identity-provider notification.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdentityEvent {
    /// Event type string (e.g. "user.created").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Event payload.
    pub data: serde_json::Value,
}

impl IdentityEvent {
    /// Parses the event type into a known variant.
    pub fn parsed_type(&self) -> IdentityEventType {
        match self.event_type.as_str() {
            "user.created" => IdentityEventType::UserCreated,
            "user.updated" => IdentityEventType::UserUpdated,
            "user.deleted" => IdentityEventType::UserDeleted,
            _ => IdentityEventType::Unknown,
        }
    }

    /// Decodes the payload as a user object.
    pub fn user_object(&self) -> Result<IdentityUserObject, WebhookError> {
        serde_json::from_value(self.data.clone())
            .map_err(|e| WebhookError::ParseError(format!("invalid user object: {}", e)))
    }
}

/// Identity event types we react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityEventType {
    UserCreated,
    UserUpdated,
    UserDeleted,
    Unknown,
}

/// User object as the identity provider ships it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdentityUserObject {
    /// Subject id.
    pub id: String,

    #[serde(default)]
    pub first_name: Option<String>,

    #[serde(default)]
    pub last_name: Option<String>,

    /// Email addresses on the account; the first is treated as primary.
    #[serde(default)]
    pub email_addresses: Vec<IdentityEmailAddress>,

    #[serde(default)]
    pub image_url: Option<String>,
}

/// One email address entry on an identity account.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdentityEmailAddress {
    pub email_address: String,
}

impl IdentityUserObject {
    /// The subject as a validated UserId.
    pub fn user_id(&self) -> Result<UserId, ValidationError> {
        UserId::new(self.id.clone())
    }

    /// Full display name, if any name parts are present.
    pub fn display_name(&self) -> Option<String> {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (None, None) => None,
            (first, last) => Some(
                [first, last]
                    .iter()
                    .flatten()
                    .copied()
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        }
    }

    /// Primary email address, if present.
    pub fn primary_email(&self) -> Option<String> {
        self.email_addresses
            .first()
            .map(|e| e.email_address.clone())
    }

    /// Builds the local profile this object maps to.
    pub fn into_profile(self) -> Result<UserProfile, ValidationError> {
        let id = self.user_id()?;
        let name = self.display_name();
        let email = self.primary_email();
        Ok(UserProfile::new(id, name, email, self.image_url))
    }
}
