//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer for Draco, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//!
//! # API Endpoints
//!
//! ## Accounts (`/api/players`, `/api/login`)
//! - `POST /api/players` - Register a new player
//! - `POST /api/login` - Login and receive a session token
//! - `GET /api/players/{username}` - Get own profile
//! - `PUT /api/players/{username}/password` - Change own password
//! - `DELETE /api/players/{username}` - Delete own account and characters
//! - `GET /api/players/{username}/characters` - List own characters
//!
//! ## Characters (`/api/characters`)
//! - `POST /api/characters` - Create a character owned by the caller
//! - `GET /api/characters/{id}` - Get one of the caller's characters
//!
//! ## Health
//! - `GET /health` - Health check endpoint
//!
//! # Authentication
//!
//! Everything except registration, login and health requires a session token
//! in the `Authorization` header:
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! # OpenAPI Documentation
//!
//! When the `swagger-ui` feature is enabled, interactive API documentation
//! is available at `/swagger-ui/`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

/// OpenAPI document for every endpoint under `/api`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::players::register,
        handlers::auth::login,
        handlers::players::get_player,
        handlers::players::change_password,
        handlers::players::delete_player,
        handlers::players::list_characters,
        handlers::characters::create_character,
        handlers::characters::get_character,
    ),
    components(schemas(
        crate::types::RegisterRequest,
        crate::types::LoginRequest,
        crate::types::ChangePasswordRequest,
        crate::types::TokenResponse,
        crate::types::Player,
        crate::types::Character,
        crate::types::CreateCharacterRequest,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Session tokens"),
        (name = "players", description = "Player accounts"),
        (name = "characters", description = "Player-owned characters"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();

        for path in [
            "/api/players",
            "/api/login",
            "/api/players/{username}",
            "/api/players/{username}/password",
            "/api/players/{username}/characters",
            "/api/characters",
            "/api/characters/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }

        let schemes = doc.components.expect("components").security_schemes;
        assert!(schemes.contains_key("bearer_auth"));
    }
}
