//! Identity provider implementation of the `Authorizer` port.
//!
//! Role metadata lives on the identity provider's user record; this adapter
//! fetches it on demand. The check fails closed: any transport or decode
//! problem denies the capability rather than surfacing an error to the
//! route layer.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::foundation::{DomainError, UserId};
use crate::ports::{Authorizer, Capability};

/// Role value granting the publish-courses capability.
const EDUCATOR_ROLE: &str = "educator";

/// Default bound on a role lookup.
const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 5;

/// Identity provider API configuration.
#[derive(Clone)]
pub struct IdentityProviderConfig {
    api_url: String,
    api_key: SecretString,
    lookup_timeout: Duration,
}

impl IdentityProviderConfig {
    /// Creates a new configuration.
    pub fn new(api_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            api_url: api_url.into(),
            api_key,
            lookup_timeout: Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
        }
    }

    /// Overrides the lookup timeout.
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }
}

/// User record fields we read from the identity provider.
#[derive(Debug, Deserialize)]
struct ProviderUser {
    #[serde(default)]
    public_metadata: HashMap<String, serde_json::Value>,
}

impl ProviderUser {
    fn has_role(&self, role: &str) -> bool {
        self.public_metadata
            .get("role")
            .and_then(|v| v.as_str())
            .map(|r| r == role)
            .unwrap_or(false)
    }
}

/// `Authorizer` backed by the identity provider's user API.
pub struct IdentityProviderAuthorizer {
    config: IdentityProviderConfig,
    http_client: reqwest::Client,
}

impl IdentityProviderAuthorizer {
    /// Creates a new authorizer.
    pub fn new(config: IdentityProviderConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.lookup_timeout)
            .build()
            .unwrap_or_default();
        Self {
            config,
            http_client,
        }
    }

    async fn fetch_user(&self, user_id: &UserId) -> Option<ProviderUser> {
        let url = format!(
            "{}/users/{}",
            self.config.api_url.trim_end_matches('/'),
            user_id
        );

        let response = match self
            .http_client
            .get(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Role lookup failed, denying");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(
                user_id = %user_id,
                status = %response.status(),
                "Role lookup rejected, denying"
            );
            return None;
        }

        match response.json::<ProviderUser>().await {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Role decode failed, denying");
                None
            }
        }
    }
}

#[async_trait]
impl Authorizer for IdentityProviderAuthorizer {
    async fn allows(&self, user_id: &UserId, capability: Capability) -> Result<bool, DomainError> {
        match capability {
            Capability::PublishCourses => {
                let allowed = self
                    .fetch_user(user_id)
                    .await
                    .map(|u| u.has_role(EDUCATOR_ROLE))
                    .unwrap_or(false);
                Ok(allowed)
            }
        }
    }
}
