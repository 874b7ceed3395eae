use crate::{
    auth::password::CredentialError,
    types::{AppError, LoginRequest, Result, TokenResponse},
    AppState,
};
use axum::{extract::State, Json};

/// Login with username and password
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 422, description = "Invalid input")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    payload.validate()?;

    let username = match state
        .credentials
        .verify(&payload.username, &payload.password)
        .await
    {
        Ok(username) => username,
        Err(e @ (CredentialError::NoSuchAccount | CredentialError::BadPassword)) => {
            // Same outward record for both kinds; the reason stays at debug.
            tracing::warn!(username = %payload.username, "login failed");
            tracing::debug!(username = %payload.username, reason = %e, "login failure reason");
            return Err(AppError::Unauthorized);
        }
        Err(e) => return Err(e.into()),
    };

    let access_token = state.tokens.issue(&username)?;
    tracing::info!(%username, "player logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.tokens.ttl_secs(),
        username,
    }))
}
