//! Identity provider configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Identity provider configuration
///
/// Covers the webhook channel secret and the synchronous user API used for
/// role metadata lookups.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityConfig {
    /// Signing secret for the identity provider's webhook channel
    pub webhook_secret: String,

    /// Base URL of the identity provider's user API
    pub api_url: String,

    /// API key for synchronous lookups
    pub api_key: String,
}

impl IdentityConfig {
    /// Validate identity configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("IDENTITY_WEBHOOK_SECRET"));
        }
        if self.api_url.is_empty() {
            return Err(ValidationError::MissingRequired("IDENTITY_API_URL"));
        }
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("IDENTITY_API_KEY"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> IdentityConfig {
        IdentityConfig {
            webhook_secret: "whsec_identity".to_string(),
            api_url: "https://api.identity.test/v1".to_string(),
            api_key: "idk_test_123".to_string(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn each_missing_field_fails() {
        let mut c = valid();
        c.webhook_secret.clear();
        assert!(c.validate().is_err());

        let mut c = valid();
        c.api_url.clear();
        assert!(c.validate().is_err());

        let mut c = valid();
        c.api_key.clear();
        assert!(c.validate().is_err());
    }
}
