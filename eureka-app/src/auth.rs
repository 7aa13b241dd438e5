use eureka_config::AuthConfig;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("unauthorized")]
    Unauthorized,
}

/// Shared-secret check for the search endpoint.
///
/// Accepts `Authorization: Bearer <token>` or a `token` query parameter.
/// With no token configured every request passes.
#[derive(Clone, Default)]
pub struct Authorizer {
    token: Option<String>,
}

impl fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorizer")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl Authorizer {
    pub fn new(token: Option<&str>) -> Self {
        Self {
            token: token
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        }
    }

    pub fn from_config(cfg: &AuthConfig) -> Self {
        Self::new(cfg.token())
    }

    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    pub fn check(&self, authorization: Option<&str>, token_query: Option<&str>) -> Result<(), AuthError> {
        let Some(expected) = self.token.as_deref() else {
            return Ok(());
        };
        let from_header = authorization
            .and_then(|h| h.strip_prefix("Bearer "))
            .is_some_and(|t| constant_time_eq(t.as_bytes(), expected.as_bytes()));
        let from_query =
            token_query.is_some_and(|t| constant_time_eq(t.as_bytes(), expected.as_bytes()));
        if from_header || from_query {
            Ok(())
        } else {
            Err(AuthError::Unauthorized)
        }
    }
}

/// Constant-time comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_without_token() {
        let auth = Authorizer::new(None);
        assert!(!auth.is_enabled());
        assert_eq!(auth.check(None, None), Ok(()));
        assert!(!Authorizer::new(Some("   ")).is_enabled());
    }

    #[test]
    fn bearer_header_or_query_token() {
        let auth = Authorizer::new(Some("s3cret"));
        assert_eq!(auth.check(Some("Bearer s3cret"), None), Ok(()));
        assert_eq!(auth.check(None, Some("s3cret")), Ok(()));
        assert_eq!(auth.check(Some("Bearer wrong"), Some("s3cret")), Ok(()));
    }

    #[test]
    fn rejects_anything_else() {
        let auth = Authorizer::new(Some("s3cret"));
        assert_eq!(auth.check(None, None), Err(AuthError::Unauthorized));
        assert_eq!(auth.check(Some("s3cret"), None), Err(AuthError::Unauthorized));
        assert_eq!(auth.check(Some("bearer s3cret"), None), Err(AuthError::Unauthorized));
        assert_eq!(auth.check(Some("Bearer s3cret "), None), Err(AuthError::Unauthorized));
        assert_eq!(auth.check(None, Some("s3cre")), Err(AuthError::Unauthorized));
    }

    #[test]
    fn debug_hides_token() {
        let auth = Authorizer::new(Some("s3cret"));
        assert!(!format!("{auth:?}").contains("s3cret"));
    }
}
