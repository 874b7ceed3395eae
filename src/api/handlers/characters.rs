use crate::{
    api::handlers::enforce,
    auth::{guard::authorize_ownership, middleware::AuthUser},
    types::{AppError, Character, CreateCharacterRequest, Result},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

/// Create a character owned by the caller
///
/// Any `owner` in the body is ignored.
#[utoipa::path(
    post,
    path = "/api/characters",
    request_body = CreateCharacterRequest,
    responses(
        (status = 201, description = "Character created", body = Character),
        (status = 401, description = "Missing or invalid token"),
        (status = 422, description = "Invalid input")
    ),
    security(("bearer_auth" = [])),
    tag = "characters"
)]
pub async fn create_character(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCharacterRequest>,
) -> Result<(StatusCode, Json<Character>)> {
    payload.validate()?;

    if let Some(ref claimed) = payload.owner {
        if claimed != user.username() {
            tracing::debug!(caller = %user.username(), %claimed, "ignoring client-supplied owner");
        }
    }

    // The token outlives account deletion.
    if !state.access.player_exists(user.username()).await? {
        tracing::warn!(caller = %user.username(), "token for a deleted account");
        return Err(AppError::Unauthorized);
    }

    let new_character = payload.into_new_character(user.username());
    enforce(
        authorize_ownership(&new_character, user.username()),
        user.username(),
        "new character",
    )?;

    let id = state.db.insert_character(&new_character).await?;
    tracing::info!(owner = %new_character.owner, character_id = id, "character created");

    Ok((
        StatusCode::CREATED,
        Json(Character {
            id,
            owner: new_character.owner,
            name: new_character.name,
            class: new_character.class,
            race: new_character.race,
        }),
    ))
}

/// Get one of the caller's characters
#[utoipa::path(
    get,
    path = "/api/characters/{id}",
    params(("id" = i64, Path, description = "Character id")),
    responses(
        (status = 200, description = "Character", body = Character),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Character belongs to another player"),
        (status = 404, description = "Character not found")
    ),
    security(("bearer_auth" = [])),
    tag = "characters"
)]
pub async fn get_character(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Character>> {
    let owner = state.access.character_owner(id).await?;
    enforce(
        authorize_ownership(owner.as_str(), user.username()),
        user.username(),
        &format!("character {}", id),
    )?;

    let character = state
        .db
        .lookup_character(id)
        .await?
        .ok_or_else(|| AppError::NotFound("character not found".to_string()))?;

    Ok(Json(character))
}
