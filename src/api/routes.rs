use crate::AppState;
use crate::api::handlers::{auth, characters, players};
use crate::auth::jwt::TokenService;
use crate::auth::middleware::auth_middleware;
use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use std::sync::Arc;

/// Routes mounted under `/api`; protected ones go through `auth_middleware`.
pub fn create_router(tokens: Arc<TokenService>) -> Router<AppState> {
    let public_routes = Router::new()
        // Public routes (no auth required)
        .route("/players", post(players::register))
        .route("/login", post(auth::login));

    let protected_routes = Router::new()
        // Player routes, caller must be the named player
        .route(
            "/players/{username}",
            get(players::get_player).delete(players::delete_player),
        )
        .route(
            "/players/{username}/password",
            put(players::change_password),
        )
        .route(
            "/players/{username}/characters",
            get(players::list_characters),
        )
        // Character routes, caller must own the character
        .route("/characters", post(characters::create_character))
        .route("/characters/{id}", get(characters::get_character))
        .route_layer(middleware::from_fn_with_state(tokens, auth_middleware));

    public_routes.merge(protected_routes)
}

/// Health check plus the API under `/api`, with state applied.
///
/// Transport layers (tracing, CORS, body limits) are added by the caller.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api", create_router(state.tokens.clone()))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}
