//! Player account handlers.
//!
//! Everything except registration is restricted to the player named in the
//! path.

use crate::{
    api::handlers::enforce,
    auth::{
        guard::{authorize_ownership, authorize_self},
        middleware::AuthUser,
        password::CredentialError,
    },
    types::{AppError, ChangePasswordRequest, Character, Player, RegisterRequest, Result},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

/// Register a new player
#[utoipa::path(
    post,
    path = "/api/players",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Player created", body = Player),
        (status = 409, description = "Username already taken"),
        (status = 422, description = "Invalid input")
    ),
    tag = "players"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Player>)> {
    payload.validate()?;

    state
        .credentials
        .register(&payload.username, &payload.password, &payload.name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Player {
            username: payload.username,
            name: payload.name,
        }),
    ))
}

/// Get the caller's own profile
#[utoipa::path(
    get,
    path = "/api/players/{username}",
    params(("username" = String, Path, description = "Player username")),
    responses(
        (status = 200, description = "Player profile", body = Player),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not the caller's profile"),
        (status = 404, description = "Player not found")
    ),
    security(("bearer_auth" = [])),
    tag = "players"
)]
pub async fn get_player(
    State(state): State<AppState>,
    user: AuthUser,
    Path(username): Path<String>,
) -> Result<Json<Player>> {
    enforce(authorize_self(&username, user.username()), user.username(), &username)?;

    let player = state
        .db
        .lookup_player(&username)
        .await?
        .ok_or_else(|| AppError::NotFound("player not found".to_string()))?;

    Ok(Json(player))
}

/// Change the caller's password
#[utoipa::path(
    put,
    path = "/api/players/{username}/password",
    params(("username" = String, Path, description = "Player username")),
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 401, description = "Missing token or wrong current password"),
        (status = 403, description = "Not the caller's account")
    ),
    security(("bearer_auth" = [])),
    tag = "players"
)]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Path(username): Path<String>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<StatusCode> {
    enforce(authorize_self(&username, user.username()), user.username(), &username)?;
    payload.validate()?;

    state
        .credentials
        .change_password(&username, &payload.current_password, &payload.new_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete the caller's account and all of its characters
#[utoipa::path(
    delete,
    path = "/api/players/{username}",
    params(("username" = String, Path, description = "Player username")),
    responses(
        (status = 204, description = "Player deleted"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not the caller's account"),
        (status = 404, description = "Player not found")
    ),
    security(("bearer_auth" = [])),
    tag = "players"
)]
pub async fn delete_player(
    State(state): State<AppState>,
    user: AuthUser,
    Path(username): Path<String>,
) -> Result<StatusCode> {
    enforce(authorize_self(&username, user.username()), user.username(), &username)?;

    state
        .credentials
        .delete_account(&username)
        .await
        .map_err(|e| match e {
            CredentialError::NoSuchAccount => AppError::NotFound("player not found".to_string()),
            other => other.into(),
        })?;

    Ok(StatusCode::NO_CONTENT)
}

/// List the caller's characters
#[utoipa::path(
    get,
    path = "/api/players/{username}/characters",
    params(("username" = String, Path, description = "Player username")),
    responses(
        (status = 200, description = "Characters owned by the player", body = [Character]),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Not the caller's characters")
    ),
    security(("bearer_auth" = [])),
    tag = "players"
)]
pub async fn list_characters(
    State(state): State<AppState>,
    user: AuthUser,
    Path(username): Path<String>,
) -> Result<Json<Vec<Character>>> {
    enforce(authorize_self(&username, user.username()), user.username(), &username)?;

    let characters = state
        .db
        .lookup_characters_by_owner(&username)
        .await?
        .into_iter()
        .filter(|c| authorize_ownership(c, user.username()).is_allowed())
        .collect();

    Ok(Json(characters))
}
