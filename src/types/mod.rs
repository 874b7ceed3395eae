use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::access::AccessError;
use crate::auth::jwt::TokenError;
use crate::auth::password::CredentialError;
use crate::db::DbError;

// ============= Validation Limits =============

/// Maximum username length, in characters.
pub const MAX_USERNAME_LEN: usize = 32;
/// Maximum raw password length, in bytes.
pub const MAX_PASSWORD_LEN: usize = 128;
/// Maximum display name / character name length, in characters.
pub const MAX_NAME_LEN: usize = 64;

// ============= Player Types =============

/// Body of `POST /api/players`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Unique, case-sensitive login name
    pub username: String,
    /// Plain password, hashed before storage
    pub password: String,
    /// Display name
    pub name: String,
}

impl RegisterRequest {
    /// Checks field formats and lengths.
    pub fn validate(&self) -> Result<()> {
        validate_username(&self.username)?;
        validate_password(&self.password)?;
        validate_name("name", &self.name)
    }
}

/// Public view of a player. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Player {
    /// Login name
    pub username: String,
    /// Display name
    pub name: String,
}

/// Body of `PUT /api/players/{username}/password`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    /// Must match the stored password
    pub current_password: String,
    /// Replacement password
    pub new_password: String,
}

impl ChangePasswordRequest {
    /// Checks both password lengths.
    pub fn validate(&self) -> Result<()> {
        validate_password(&self.current_password)?;
        validate_password(&self.new_password)
    }
}

// ============= Authentication Types =============

/// Body of `POST /api/login`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login name
    pub username: String,
    /// Plain password
    pub password: String,
}

impl LoginRequest {
    /// Checks field formats and lengths.
    pub fn validate(&self) -> Result<()> {
        validate_username(&self.username)?;
        validate_password(&self.password)
    }
}

/// Successful login response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Signed session token
    pub access_token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Token validity in seconds
    pub expires_in: i64,
    /// The authenticated player
    pub username: String,
}

/// JWT claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username the token was issued to
    pub sub: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

// ============= Character Types =============

/// A stored character. `owner` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Character {
    /// Storage-assigned id
    pub id: i64,
    /// Username of the owning player
    pub owner: String,
    /// Character name
    pub name: String,
    /// Character class
    pub class: String,
    /// Character race
    pub race: String,
}

/// Character attributes prior to storage assigning an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCharacter {
    /// Username of the owning player, taken from the token
    pub owner: String,
    /// Character name
    pub name: String,
    /// Character class
    pub class: String,
    /// Character race
    pub race: String,
}

/// Body of `POST /api/characters`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCharacterRequest {
    /// Character name
    pub name: String,
    /// Character class
    pub class: String,
    /// Character race
    pub race: String,
    /// Accepted for compatibility with older clients and ignored: the owner
    /// is always the authenticated player.
    #[serde(default)]
    pub owner: Option<String>,
}

impl CreateCharacterRequest {
    /// Checks that every attribute is present and short enough.
    pub fn validate(&self) -> Result<()> {
        validate_name("name", &self.name)?;
        validate_name("class", &self.class)?;
        validate_name("race", &self.race)
    }

    /// Binds the request to `owner`, discarding any client-supplied owner.
    pub fn into_new_character(self, owner: &str) -> NewCharacter {
        NewCharacter {
            owner: owner.to_string(),
            name: self.name,
            class: self.class,
            race: self.race,
        }
    }
}

// ============= Input Validation =============

/// 1 to 32 characters of `[A-Za-z0-9_-]`.
pub fn validate_username(username: &str) -> Result<()> {
    let len = username.chars().count();
    if len == 0 || len > MAX_USERNAME_LEN {
        return Err(AppError::InvalidInput(format!(
            "username must be 1-{} characters",
            MAX_USERNAME_LEN
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AppError::InvalidInput(
            "username may only contain letters, digits, '_' and '-'".to_string(),
        ));
    }
    Ok(())
}

/// 1 to 128 bytes.
pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() || password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "password must be 1-{} bytes",
            MAX_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn validate_name(field: &str, value: &str) -> Result<()> {
    let len = value.trim().chars().count();
    if len == 0 || value.chars().count() > MAX_NAME_LEN {
        return Err(AppError::InvalidInput(format!(
            "{} must be 1-{} characters",
            field, MAX_NAME_LEN
        )));
    }
    Ok(())
}

// ============= Error Types =============

/// Errors surfaced by HTTP handlers, each mapped to one status code.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request body failed validation (422).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Registration with a taken username (409).
    #[error("Username already taken")]
    DuplicateUsername,

    /// The target resource does not exist (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing, invalid or expired token, or failed login. The precise
    /// reason is logged where it is known and never returned.
    #[error("Authentication failed")]
    Unauthorized,

    /// Authenticated, but not the owner (403).
    #[error("Access denied")]
    Forbidden,

    /// Storage failure (500, detail only logged).
    #[error("Database error: {0}")]
    Database(String),

    /// Token could not be signed (500, detail only logged).
    #[error("Signing error: {0}")]
    Signing(String),

    /// Any other server-side failure (500, detail only logged).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::DuplicateUsername => AppError::DuplicateUsername,
            DbError::NoRecord => AppError::NotFound("record not found".to_string()),
            DbError::Backend(msg) => AppError::Database(msg),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::DuplicateUsername => AppError::DuplicateUsername,
            CredentialError::NoSuchAccount | CredentialError::BadPassword => {
                AppError::Unauthorized
            }
            CredentialError::Storage(e) => AppError::from(e),
            CredentialError::Hashing(msg) => AppError::Internal(msg),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::SigningFailure(msg) => AppError::Signing(msg),
            TokenError::Malformed | TokenError::SignatureInvalid | TokenError::Expired => {
                AppError::Unauthorized
            }
        }
    }
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NotFound => AppError::NotFound("character not found".to_string()),
            AccessError::Storage(e) => AppError::from(e),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let (status, message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::DuplicateUsername => {
                (StatusCode::CONFLICT, "username already taken".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "authentication failed".to_string())
            }
            AppError::Forbidden => (StatusCode::FORBIDDEN, "access denied".to_string()),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "storage failure");
                internal_error()
            }
            AppError::Signing(msg) => {
                tracing::error!(error = %msg, "token signing failure, check the signing secret");
                internal_error()
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal failure");
                internal_error()
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal_error() -> (axum::http::StatusCode, String) {
    (
        axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        "internal server error".to_string(),
    )
}

/// Result alias for handler-level operations.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("dark_knight-99").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"a".repeat(MAX_USERNAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_short_passwords_are_accepted() {
        assert!(validate_password("p@ss1").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password(&"x".repeat(MAX_PASSWORD_LEN + 1)).is_err());
    }

    #[test]
    fn test_client_owner_is_discarded() {
        let req = CreateCharacterRequest {
            name: "Thorin".to_string(),
            class: "Warrior".to_string(),
            race: "Dwarf".to_string(),
            owner: Some("mallory".to_string()),
        };

        let character = req.into_new_character("alice");
        assert_eq!(character.owner, "alice");
    }

    #[test]
    fn test_credential_failures_collapse_to_unauthorized() {
        let no_account = AppError::from(CredentialError::NoSuchAccount).into_response();
        let bad_password = AppError::from(CredentialError::BadPassword).into_response();

        assert_eq!(no_account.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(bad_password.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::InvalidInput("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::DuplicateUsername, StatusCode::CONFLICT),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Forbidden, StatusCode::FORBIDDEN),
            (AppError::Database("disk on fire".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Signing("bad key".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
