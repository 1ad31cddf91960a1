//! Bearer-token authentication gate.
//!
//! The gate pulls a token out of the `Authorization` header and hands it
//! to a pluggable [`TokenValidator`]. A missing header, a wrong scheme and
//! a rejected token all produce `None`; nothing here returns an error.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use http::header::AUTHORIZATION;
use http::HeaderMap;
use itemgate_core::Principal;

/// Scheme prefix accepted by [`AuthGate::extract_token`].
pub const BEARER_PREFIX: &str = "Bearer ";

/// Subject used when a structurally valid token carries no `sub` claim.
pub const DEFAULT_SUBJECT: &str = "user-123";

/// Turns a raw bearer token into a principal.
#[async_trait]
pub trait TokenValidator: Send + Sync + 'static {
    /// Returns the principal for `token`, or `None` if it is not accepted.
    async fn validate(&self, token: &str) -> Option<Principal>;
}

/// Accepts any token shaped like a JWT without checking its signature.
///
/// The token must have exactly three non-empty dot-separated segments. If
/// the middle segment decodes (base64url) to a JSON object with a string
/// `sub`, that is the subject; otherwise the fallback subject is used.
#[derive(Debug, Clone)]
pub struct UnverifiedJwtValidator {
    fallback_subject: String,
}

impl UnverifiedJwtValidator {
    /// Creates a validator with the given fallback subject.
    #[must_use]
    pub fn new(fallback_subject: impl Into<String>) -> Self {
        Self {
            fallback_subject: fallback_subject.into(),
        }
    }

    fn subject_claim(payload: &str) -> Option<String> {
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
        claims
            .get("sub")?
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

impl Default for UnverifiedJwtValidator {
    fn default() -> Self {
        Self::new(DEFAULT_SUBJECT)
    }
}

#[async_trait]
impl TokenValidator for UnverifiedJwtValidator {
    async fn validate(&self, token: &str) -> Option<Principal> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
            tracing::debug!(segments = segments.len(), "rejecting malformed token");
            return None;
        }

        let subject =
            Self::subject_claim(segments[1]).unwrap_or_else(|| self.fallback_subject.clone());
        Some(Principal::new(subject))
    }
}

/// Accepts only tokens from a fixed table.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenValidator {
    tokens: HashMap<String, String>,
}

impl StaticTokenValidator {
    /// Creates a validator from a token to subject table.
    #[must_use]
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }

    /// Adds a token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, subject: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), subject.into());
        self
    }
}

#[async_trait]
impl TokenValidator for StaticTokenValidator {
    async fn validate(&self, token: &str) -> Option<Principal> {
        self.tokens.get(token).map(Principal::new)
    }
}

/// Extracts and validates bearer credentials.
#[derive(Clone)]
pub struct AuthGate {
    validator: Arc<dyn TokenValidator>,
}

impl AuthGate {
    /// Creates a gate backed by `validator`.
    pub fn new(validator: impl TokenValidator) -> Self {
        Self {
            validator: Arc::new(validator),
        }
    }

    /// Creates a gate from a shared validator.
    #[must_use]
    pub fn from_shared(validator: Arc<dyn TokenValidator>) -> Self {
        Self { validator }
    }

    /// Returns the bearer token from `headers`, if any.
    ///
    /// The header name is matched case-insensitively; the `Bearer ` prefix
    /// is matched exactly. Non-UTF-8 header values are treated as absent.
    #[must_use]
    pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
        headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix(BEARER_PREFIX)
    }

    /// Returns the principal for the request, or `None` to reject it.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Option<Principal> {
        let Some(token) = Self::extract_token(headers) else {
            tracing::debug!("no bearer token presented");
            return None;
        };
        self.validator.validate(token).await
    }
}

impl Default for AuthGate {
    fn default() -> Self {
        Self::new(UnverifiedJwtValidator::default())
    }
}

impl fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGate").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use itemgate_core::fixtures::jwt_for;

    fn headers(name: &str, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
        headers
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(
            AuthGate::extract_token(&headers("Authorization", "Bearer abc")),
            Some("abc")
        );
        assert_eq!(
            AuthGate::extract_token(&headers("authorization", "Bearer abc")),
            Some("abc")
        );
    }

    #[test]
    fn test_extract_token_rejects_other_schemes() {
        assert_eq!(AuthGate::extract_token(&HeaderMap::new()), None);
        assert_eq!(
            AuthGate::extract_token(&headers("Authorization", "bearer abc")),
            None
        );
        assert_eq!(
            AuthGate::extract_token(&headers("Authorization", "Basic dXNlcjpwYXNz")),
            None
        );
        assert_eq!(
            AuthGate::extract_token(&headers("Authorization", "Bearerabc")),
            None
        );
    }

    #[test]
    fn test_extract_token_non_utf8() {
        let mut map = HeaderMap::new();
        map.insert(
            AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xff\xfe").unwrap(),
        );
        assert_eq!(AuthGate::extract_token(&map), None);
    }

    #[tokio::test]
    async fn test_unverified_jwt_reads_sub() {
        let validator = UnverifiedJwtValidator::default();
        let principal = validator.validate(&jwt_for("alice")).await.unwrap();
        assert_eq!(principal.subject(), "alice");
    }

    #[tokio::test]
    async fn test_unverified_jwt_falls_back_without_sub() {
        let validator = UnverifiedJwtValidator::default();
        let principal = validator.validate("aaa.bbb.ccc").await.unwrap();
        assert_eq!(principal.subject(), DEFAULT_SUBJECT);

        let custom = UnverifiedJwtValidator::new("someone");
        let principal = custom.validate("aaa.bbb.ccc").await.unwrap();
        assert_eq!(principal.subject(), "someone");
    }

    #[tokio::test]
    async fn test_unverified_jwt_rejects_malformed() {
        let validator = UnverifiedJwtValidator::default();
        for token in ["", "abc", "a.b", "a.b.c.d", "a..c", ".b.c", "a.b."] {
            assert!(validator.validate(token).await.is_none(), "{token:?}");
        }
    }

    #[tokio::test]
    async fn test_static_validator() {
        let validator = StaticTokenValidator::default().with_token("secret", "svc");
        assert_eq!(
            validator.validate("secret").await.unwrap().subject(),
            "svc"
        );
        assert!(validator.validate("other").await.is_none());
    }

    #[tokio::test]
    async fn test_gate_authenticate() {
        let gate = AuthGate::new(StaticTokenValidator::default().with_token("t1", "bob"));
        let principal = gate
            .authenticate(&headers("Authorization", "Bearer t1"))
            .await
            .unwrap();
        assert_eq!(principal.subject(), "bob");

        assert!(gate.authenticate(&HeaderMap::new()).await.is_none());
        assert!(gate
            .authenticate(&headers("Authorization", "Bearer t2"))
            .await
            .is_none());
    }
}
