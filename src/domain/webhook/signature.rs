//! Webhook signature verification.
//!
//! Verifies HMAC-SHA256 signatures over the exact bytes received (never a
//! re-serialized form, which can change byte layout and break verification),
//! comparing in constant time. Includes timestamp validation to prevent
//! replay of captured deliveries.
//!
//! One verifier instance is built per notification channel, each with its
//! own signing secret.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::WebhookError;

/// Maximum allowed age for webhook events (5 minutes).
const MAX_EVENT_AGE_SECS: i64 = 300;

/// Maximum allowed clock skew for future events (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Parsed components from the signature header.
///
/// Format: `t=<unix timestamp>,v1=<hex hmac>`; unknown fields are ignored
/// for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp when the signature was generated.
    pub timestamp: i64,
    /// The HMAC-SHA256 signature bytes.
    pub signature: Vec<u8>,
}

impl SignatureHeader {
    /// Parses a signature header string.
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::ParseError` if the header format is invalid.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut signature: Option<Vec<u8>> = None;

        for part in header.split(',') {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| WebhookError::ParseError("invalid header format".to_string()))?;

            match key {
                "t" => {
                    timestamp = Some(
                        value
                            .parse()
                            .map_err(|_| WebhookError::ParseError("invalid timestamp".to_string()))?,
                    );
                }
                "v1" => {
                    signature = Some(hex::decode(value).map_err(|_| {
                        WebhookError::ParseError("invalid signature hex".to_string())
                    })?);
                }
                _ => {
                    // Ignore unknown fields for forward compatibility
                }
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| WebhookError::ParseError("missing timestamp".to_string()))?;
        let signature =
            signature.ok_or_else(|| WebhookError::ParseError("missing v1 signature".to_string()))?;

        Ok(SignatureHeader {
            timestamp,
            signature,
        })
    }
}

/// Verifier for one notification channel's webhook signatures.
pub struct SignatureVerifier {
    secret: SecretString,
}

impl SignatureVerifier {
    /// Creates a verifier with the channel's signing secret.
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Verifies a signature over the exact payload bytes received.
    ///
    /// # Verification Steps
    ///
    /// 1. Parse the signature header
    /// 2. Validate the timestamp window
    /// 3. Compute the expected signature over `{timestamp}.{payload}`
    /// 4. Compare in constant time
    ///
    /// Parsing of the payload itself is deliberately NOT done here: callers
    /// verify first, then parse.
    ///
    /// # Errors
    ///
    /// - `MissingSecret` - no secret is configured for this channel
    /// - `InvalidSignature` - signature mismatch
    /// - `TimestampOutOfRange` / `InvalidTimestamp` - outside the window
    /// - `ParseError` - malformed header
    pub fn verify(&self, payload: &[u8], signature_header: &str) -> Result<(), WebhookError> {
        if self.secret.expose_secret().is_empty() {
            return Err(WebhookError::MissingSecret);
        }

        let header = SignatureHeader::parse(signature_header)?;
        self.validate_timestamp(header.timestamp)?;

        let expected = compute_signature(self.secret.expose_secret(), header.timestamp, payload);
        if !constant_time_compare(&expected, &header.signature) {
            return Err(WebhookError::InvalidSignature);
        }

        Ok(())
    }

    /// Validates that the timestamp is within acceptable bounds.
    fn validate_timestamp(&self, timestamp: i64) -> Result<(), WebhookError> {
        let now = chrono::Utc::now().timestamp();
        let age = now - timestamp;

        if age > MAX_EVENT_AGE_SECS {
            return Err(WebhookError::TimestampOutOfRange);
        }
        if age < -MAX_CLOCK_SKEW_SECS {
            return Err(WebhookError::InvalidTimestamp);
        }

        Ok(())
    }
}

/// Computes the HMAC-SHA256 signature bytes for `{timestamp}.{payload}`.
fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Vec<u8> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac.finalize().into_bytes().to_vec()
}

/// Performs constant-time comparison of two byte slices.
///
/// This prevents timing attacks that could leak information about the
/// expected signature.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Computes the hex signature a sender would attach for the given payload.
///
/// Used by test fixtures to produce valid deliveries.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    hex::encode(compute_signature(secret, timestamp, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "whsec_test_secret_12345";

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(SecretString::new(TEST_SECRET.to_string()))
    }

    fn signed_header(secret: &str, payload: &[u8]) -> String {
        let timestamp = chrono::Utc::now().timestamp();
        format!("t={},v1={}", timestamp, sign_payload(secret, timestamp, payload))
    }

    // ══════════════════════════════════════════════════════════════
    // SignatureHeader Parsing Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn parse_header_with_timestamp_and_signature() {
        let header_str = format!("t=1234567890,v1={}", "a".repeat(64));

        let header = SignatureHeader::parse(&header_str).unwrap();

        assert_eq!(header.timestamp, 1234567890);
        assert_eq!(header.signature.len(), 32);
    }

    #[test]
    fn parse_header_ignores_unknown_fields() {
        let header_str = format!("t=1234567890,v1={},v0=legacy,scheme=hmac", "a".repeat(64));

        let header = SignatureHeader::parse(&header_str).unwrap();

        assert_eq!(header.timestamp, 1234567890);
    }

    #[test]
    fn parse_header_missing_timestamp_fails() {
        let result = SignatureHeader::parse(&format!("v1={}", "a".repeat(64)));
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn parse_header_missing_signature_fails() {
        let result = SignatureHeader::parse("t=1234567890");
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn parse_header_invalid_timestamp_fails() {
        let result = SignatureHeader::parse(&format!("t=soon,v1={}", "a".repeat(64)));
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn parse_header_invalid_hex_fails() {
        let result = SignatureHeader::parse("t=1234567890,v1=not_valid_hex");
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn parse_header_without_equals_fails() {
        let result = SignatureHeader::parse("t1234567890");
        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    // ══════════════════════════════════════════════════════════════
    // Signature Verification Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn verify_accepts_valid_signature() {
        let payload = br#"{"id":"evt_1","type":"checkout.session.completed"}"#;
        let header = signed_header(TEST_SECRET, payload);

        assert!(verifier().verify(payload, &header).is_ok());
    }

    #[test]
    fn verify_rejects_forged_signature() {
        let payload = br#"{"id":"evt_1"}"#;
        let timestamp = chrono::Utc::now().timestamp();
        let header = format!("t={},v1={}", timestamp, "a".repeat(64));

        let result = verifier().verify(payload, &header);
        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let payload = br#"{"id":"evt_1"}"#;
        let header = signed_header("some_other_secret", payload);

        let result = verifier().verify(payload, &header);
        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_rejects_signature_over_different_bytes() {
        let original = br#"{"id":"evt_1","amount":100}"#;
        let tampered = br#"{"id":"evt_1","amount":1}"#;
        let header = signed_header(TEST_SECRET, original);

        let result = verifier().verify(tampered, &header);
        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_rejects_empty_secret() {
        let v = SignatureVerifier::new(SecretString::new(String::new()));
        let payload = b"{}";
        let header = signed_header("", payload);

        let result = v.verify(payload, &header);
        assert!(matches!(result, Err(WebhookError::MissingSecret)));
    }

    // ══════════════════════════════════════════════════════════════
    // Timestamp Validation Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn verify_rejects_stale_timestamp() {
        let payload = b"{}";
        let timestamp = chrono::Utc::now().timestamp() - 600;
        let header = format!(
            "t={},v1={}",
            timestamp,
            sign_payload(TEST_SECRET, timestamp, payload)
        );

        let result = verifier().verify(payload, &header);
        assert!(matches!(result, Err(WebhookError::TimestampOutOfRange)));
    }

    #[test]
    fn verify_accepts_timestamp_at_age_boundary() {
        let payload = b"{}";
        let timestamp = chrono::Utc::now().timestamp() - MAX_EVENT_AGE_SECS;
        let header = format!(
            "t={},v1={}",
            timestamp,
            sign_payload(TEST_SECRET, timestamp, payload)
        );

        assert!(verifier().verify(payload, &header).is_ok());
    }

    #[test]
    fn verify_tolerates_small_clock_skew() {
        let payload = b"{}";
        let timestamp = chrono::Utc::now().timestamp() + 30;
        let header = format!(
            "t={},v1={}",
            timestamp,
            sign_payload(TEST_SECRET, timestamp, payload)
        );

        assert!(verifier().verify(payload, &header).is_ok());
    }

    #[test]
    fn verify_rejects_timestamp_far_in_future() {
        let payload = b"{}";
        let timestamp = chrono::Utc::now().timestamp() + 120;
        let header = format!(
            "t={},v1={}",
            timestamp,
            sign_payload(TEST_SECRET, timestamp, payload)
        );

        let result = verifier().verify(payload, &header);
        assert!(matches!(result, Err(WebhookError::InvalidTimestamp)));
    }

    // ══════════════════════════════════════════════════════════════
    // Constant Time Comparison Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn constant_time_compare_equal_values() {
        assert!(constant_time_compare(&[1, 2, 3], &[1, 2, 3]));
    }

    #[test]
    fn constant_time_compare_different_values() {
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2, 4]));
    }

    #[test]
    fn constant_time_compare_different_lengths() {
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2, 3, 4]));
    }
}
