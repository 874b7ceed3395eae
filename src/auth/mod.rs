//! Authentication and authorization core
//!
//! # Module Structure
//!
//! - [`auth::password`](crate::auth::password) - credential store (Argon2id hashing and verification)
//! - [`auth::jwt`](crate::auth::jwt) - session token issuance and validation
//! - [`auth::guard`](crate::auth::guard) - identity extraction and ownership rules
//! - [`auth::access`](crate::auth::access) - ownership lookups over storage
//! - [`auth::middleware`](crate::auth::middleware) - Axum layer and extractor for protected routes
//!
//! # Security Features
//!
//! - **Password Hashing**: Argon2id with fixed, documented cost parameters
//! - **Tokens**: HS256 JWTs (`sub`, `iat`, `exp`); stateless, no revocation before expiry
//! - **Uniform failures**: unknown account, wrong password and every token
//!   rejection reach clients as the same 401
//!
//! # Usage
//!
//! ```ignore
//! use draco::auth::{jwt::TokenService, password::CredentialStore};
//!
//! let credentials = CredentialStore::new(db.clone());
//! let tokens = TokenService::new(secret.as_bytes(), 3600);
//!
//! let username = credentials.verify("alice", "p@ss1").await?;
//! let token = tokens.issue(&username)?;
//! assert_eq!(tokens.validate(&token)?, "alice");
//! ```
//!
//! ## Extracting the caller in handlers
//!
//! ```ignore
//! async fn protected_handler(user: AuthUser) -> impl IntoResponse {
//!     format!("Hello, {}!", user.username())
//! }
//! ```

/// Ownership lookups used by the guard and handlers.
pub mod access;
/// Identity extraction and authorization rules.
pub mod guard;
/// Session token issuance and validation.
pub mod jwt;
/// Authentication middleware and extractors for protected routes.
pub mod middleware;
/// Password hashing and the credential store.
pub mod password;
