use crate::auth::guard::{authenticate, Identity};
use crate::auth::jwt::TokenService;
use crate::types::AppError;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Rejects requests without a valid bearer token and stores the caller's
/// [`AuthUser`] in the request extensions.
pub async fn auth_middleware(
    State(tokens): State<Arc<TokenService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    match authenticate(&tokens, req.headers()) {
        Identity::Authenticated(username) => {
            req.extensions_mut().insert(AuthUser(username));
            Ok(next.run(req).await)
        }
        Identity::Anonymous => {
            tracing::info!(path = %req.uri().path(), "unauthenticated request rejected");
            Err(AppError::Unauthorized)
        }
    }
}

/// Extractor for the authenticated player, holding their username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

impl AuthUser {
    /// The caller's username.
    pub fn username(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
