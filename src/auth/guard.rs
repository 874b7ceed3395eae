//! Identity extraction and ownership rules.
//!
//! Every function here is stateless per call. Callers must act on a
//! [`Identity::Anonymous`] or [`Access::Denied`] outcome before touching any
//! protected data.

use axum::http::{header, HeaderMap};

use crate::auth::jwt::TokenService;
use crate::types::{AppError, Character, NewCharacter};

/// Result of authenticating a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// A valid token for this username.
    Authenticated(String),
    /// No token, or one that failed validation.
    Anonymous,
}

/// Result of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The caller may proceed.
    Allowed,
    /// The caller must be refused.
    Denied,
}

impl Access {
    /// `true` for [`Access::Allowed`].
    pub fn is_allowed(self) -> bool {
        matches!(self, Access::Allowed)
    }

    /// `Denied` becomes [`AppError::Forbidden`].
    pub fn require(self) -> Result<(), AppError> {
        match self {
            Access::Allowed => Ok(()),
            Access::Denied => Err(AppError::Forbidden),
        }
    }
}

/// Anything bound to exactly one owning player.
pub trait Owned {
    /// Username of the owning player.
    fn owner(&self) -> &str;
}

impl Owned for Character {
    fn owner(&self) -> &str {
        &self.owner
    }
}

impl Owned for NewCharacter {
    fn owner(&self) -> &str {
        &self.owner
    }
}

/// A bare owner username, as resolved by the access facade.
impl Owned for str {
    fn owner(&self) -> &str {
        self
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolves the caller's identity from request headers.
///
/// Any failure yields `Anonymous`; the precise reason only reaches the
/// debug log.
pub fn authenticate(tokens: &TokenService, headers: &HeaderMap) -> Identity {
    let Some(token) = bearer_token(headers) else {
        tracing::debug!("no bearer token on request");
        return Identity::Anonymous;
    };

    match tokens.validate(token) {
        Ok(username) => Identity::Authenticated(username),
        Err(reason) => {
            tracing::debug!(%reason, "rejected bearer token");
            Identity::Anonymous
        }
    }
}

/// A player may only act on their own profile.
pub fn authorize_self(requested_owner: &str, authenticated: &str) -> Access {
    if requested_owner == authenticated {
        Access::Allowed
    } else {
        Access::Denied
    }
}

/// The resource's owner must be the authenticated player.
pub fn authorize_ownership<R: Owned + ?Sized>(resource: &R, authenticated: &str) -> Access {
    if resource.owner() == authenticated {
        Access::Allowed
    } else {
        Access::Denied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use rstest::rstest;

    fn character(owner: &str) -> Character {
        Character {
            id: 7,
            owner: owner.to_string(),
            name: "Thorin".to_string(),
            class: "Warrior".to_string(),
            race: "Dwarf".to_string(),
        }
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn create_test_tokens() -> TokenService {
        TokenService::new(b"guard-test-secret-that-is-32-chars-long", 900)
    }

    #[rstest]
    #[case("alice", "alice", Access::Allowed)]
    #[case("alice", "bob", Access::Denied)]
    #[case("bob", "alice", Access::Denied)]
    #[case("alice", "Alice", Access::Denied)]
    #[case("alice", "alice ", Access::Denied)]
    #[case("", "alice", Access::Denied)]
    fn test_authorize_ownership(
        #[case] owner: &str,
        #[case] caller: &str,
        #[case] expected: Access,
    ) {
        assert_eq!(authorize_ownership(&character(owner), caller), expected);
        assert_eq!(authorize_ownership(owner, caller), expected);
        assert_eq!(authorize_self(owner, caller), expected);
    }

    #[test]
    fn test_denied_requires_forbidden() {
        assert!(Access::Allowed.require().is_ok());
        assert!(matches!(Access::Denied.require(), Err(AppError::Forbidden)));
        assert!(!Access::Denied.is_allowed());
    }

    #[test]
    fn test_authenticate_valid_token() {
        let tokens = create_test_tokens();
        let token = tokens.issue("alice").unwrap();
        let headers = headers_with(&format!("Bearer {}", token));

        assert_eq!(
            authenticate(&tokens, &headers),
            Identity::Authenticated("alice".to_string())
        );
    }

    #[rstest]
    #[case("")]
    #[case("Bearer ")]
    #[case("Basic YWxpY2U6cEBzczE=")]
    #[case("Bearer not-a-token")]
    fn test_authenticate_rejects_bad_headers(#[case] value: &str) {
        let tokens = create_test_tokens();
        assert_eq!(
            authenticate(&tokens, &headers_with(value)),
            Identity::Anonymous
        );
    }

    #[test]
    fn test_authenticate_without_header_is_anonymous() {
        let tokens = create_test_tokens();
        assert_eq!(authenticate(&tokens, &HeaderMap::new()), Identity::Anonymous);
    }

    #[test]
    fn test_authenticate_foreign_token_is_anonymous() {
        let tokens = create_test_tokens();
        let other = TokenService::new(b"another-secret-that-is-32-chars-long", 900);
        let token = other.issue("alice").unwrap();

        assert_eq!(
            authenticate(&tokens, &headers_with(&format!("Bearer {}", token))),
            Identity::Anonymous
        );
    }
}
