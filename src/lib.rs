//! # Draco - Game Backend Authentication Server
//!
//! Player accounts, password login with signed session tokens, and
//! ownership-checked access to player-owned characters.
//!
//! ## Overview
//!
//! Draco can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `draco-server` binary
//! 2. **As a library** - Mount the router or use the auth components directly
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use draco::{AppState, DatabaseProvider, TokenService};
//! use std::sync::Arc;
//!
//! let db = DatabaseProvider::Memory.create_client().await?;
//! let tokens = TokenService::new(secret.as_bytes(), 3600);
//! let state = AppState::new(db, tokens);
//!
//! let app = draco::api::routes::build_app(state);
//! ```
//!
//! ### Checking credentials and tokens
//!
//! ```rust,ignore
//! let username = state.credentials.verify("alice", "pw1").await?;
//! let token = state.tokens.issue(&username)?;
//! assert_eq!(state.tokens.validate(&token)?, "alice");
//! ```
//!
//! ## Feature Flags
//!
//! Local SQLite (file or `:memory:`) is always available.
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `turso` | Remote Turso database |
//! | `swagger-ui` | Interactive API docs at `/swagger-ui` |
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`auth`] - Credentials, session tokens and authorization rules
//! - [`db`] - Persistence (SQLite/Turso, in-memory)
//! - [`types`] - Common types and error handling
//! - [`utils`] - TOML configuration

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Credential hashing, session tokens, and authorization.
pub mod auth;
/// Command-line interface for the server binary.
pub mod cli;
/// Database clients (Turso/SQLite, in-memory).
pub mod db;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities (TOML).
pub mod utils;

// Re-export commonly used types
pub use auth::access::AccessFacade;
pub use auth::jwt::TokenService;
pub use auth::password::CredentialStore;
pub use db::{DatabaseClient, DatabaseProvider, InMemoryStore, TursoClient};
pub use types::{AppError, Result};
pub use utils::toml_config::DracoConfig;

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Persistence layer
    pub db: Arc<dyn DatabaseClient>,
    /// Player registration and password checks
    pub credentials: Arc<CredentialStore>,
    /// Session token issuing and validation
    pub tokens: Arc<TokenService>,
    /// Minimal lookups for authorization decisions
    pub access: Arc<AccessFacade>,
}

impl AppState {
    /// Wire every service to one storage client.
    pub fn new(db: Arc<dyn DatabaseClient>, tokens: TokenService) -> Self {
        Self {
            credentials: Arc::new(CredentialStore::new(db.clone())),
            access: Arc::new(AccessFacade::new(db.clone())),
            tokens: Arc::new(tokens),
            db,
        }
    }
}
