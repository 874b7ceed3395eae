//! Database abstraction traits
//!
//! This module provides the `DatabaseClient` trait that abstracts over the
//! storage backends (in-memory SQLite, file-based SQLite, remote Turso, and
//! the pure in-memory [`InMemoryStore`](super::memory::InMemoryStore)).
//!
//! # Example
//!
//! ```rust,ignore
//! use draco::db::{DatabaseClient, DatabaseProvider};
//!
//! // Use in-memory database (default for development/testing)
//! let db = DatabaseProvider::Memory.create_client().await?;
//!
//! // Use file-based SQLite
//! let db = DatabaseProvider::SQLite { path: "data/draco.db".into() }.create_client().await?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::types::{Character, NewCharacter, Player};
use crate::utils::toml_config::{ConfigError, DatabaseConfig};

/// Storage-level failures.
///
/// "No such record" and uniqueness violations are kept apart from generic
/// backend failures so callers can answer with a specific message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DbError {
    /// An update or delete matched no row.
    #[error("no such record")]
    NoRecord,

    /// The username primary key is already taken.
    #[error("username already taken")]
    DuplicateUsername,

    /// Any other backend failure.
    #[error("database failure: {0}")]
    Backend(String),
}

pub type DbResult<T> = std::result::Result<T, DbError>;

/// Stored credentials of a player. Only the credential store reads these.
#[derive(Clone)]
pub struct PlayerCredentials {
    pub username: String,
    /// PHC-formatted password hash
    pub password_hash: String,
}

impl std::fmt::Debug for PlayerCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerCredentials")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Database provider configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DatabaseProvider {
    /// In-memory SQLite database (ephemeral, lost on restart)
    #[default]
    Memory,
    /// File-based SQLite database
    SQLite {
        /// Path to the SQLite database file
        path: String,
    },
    /// Remote Turso database (requires network access)
    #[cfg(feature = "turso")]
    Turso {
        /// The Turso database URL (e.g., `libsql://your-db.turso.io`)
        url: String,
        /// Authentication token for the Turso database
        auth_token: String,
    },
}

impl DatabaseProvider {
    /// Create a database client from this provider configuration
    pub async fn create_client(&self) -> DbResult<Arc<dyn DatabaseClient>> {
        match self {
            DatabaseProvider::Memory => {
                let client = super::turso::TursoClient::new_memory().await?;
                Ok(Arc::new(client))
            }
            DatabaseProvider::SQLite { path } => {
                let client = super::turso::TursoClient::new_local(path).await?;
                Ok(Arc::new(client))
            }
            #[cfg(feature = "turso")]
            DatabaseProvider::Turso { url, auth_token } => {
                let client =
                    super::turso::TursoClient::new_remote(url.clone(), auth_token.clone()).await?;
                Ok(Arc::new(client))
            }
        }
    }

    /// Pick a provider from the `[database]` section.
    ///
    /// Turso wins when both of its env vars are configured (and the `turso`
    /// feature is enabled), then a file path, then in-memory.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, ConfigError> {
        #[cfg(feature = "turso")]
        {
            if let (Some(url_env), Some(token_env)) =
                (&config.turso_url_env, &config.turso_token_env)
            {
                let url = std::env::var(url_env)
                    .map_err(|_| ConfigError::MissingEnvVar(url_env.clone()))?;
                let auth_token = std::env::var(token_env)
                    .map_err(|_| ConfigError::MissingEnvVar(token_env.clone()))?;
                return Ok(DatabaseProvider::Turso { url, auth_token });
            }
        }

        if config.url.is_empty() || config.url == ":memory:" {
            Ok(DatabaseProvider::Memory)
        } else {
            Ok(DatabaseProvider::SQLite {
                path: config.url.clone(),
            })
        }
    }
}

/// Abstract trait for the persistence operations the core depends on.
///
/// Lookups return `Ok(None)` when the record does not exist; updates and
/// deletes that match nothing return [`DbError::NoRecord`].
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    // ============== Player Operations ==============

    /// Insert a new player. Fails with [`DbError::DuplicateUsername`] if the
    /// username exists.
    async fn insert_player(&self, username: &str, password_hash: &str, name: &str)
        -> DbResult<()>;

    /// Get the stored credentials of a player
    async fn lookup_player_credentials(&self, username: &str)
        -> DbResult<Option<PlayerCredentials>>;

    /// Get the public profile of a player
    async fn lookup_player(&self, username: &str) -> DbResult<Option<Player>>;

    /// Replace a player's password hash
    async fn update_player_password(&self, username: &str, password_hash: &str) -> DbResult<()>;

    /// Delete a player and every character they own
    async fn delete_player(&self, username: &str) -> DbResult<()>;

    // ============== Character Operations ==============

    /// Insert a character and return its storage-assigned id
    async fn insert_character(&self, character: &NewCharacter) -> DbResult<i64>;

    /// Get a character by id
    async fn lookup_character(&self, id: i64) -> DbResult<Option<Character>>;

    /// Get all characters owned by `owner`, ordered by id
    async fn lookup_characters_by_owner(&self, owner: &str) -> DbResult<Vec<Character>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_config() {
        let mut config = DatabaseConfig::default();

        config.url = ":memory:".to_string();
        assert_eq!(
            DatabaseProvider::from_config(&config).unwrap(),
            DatabaseProvider::Memory
        );

        config.url = "./data/draco.db".to_string();
        assert_eq!(
            DatabaseProvider::from_config(&config).unwrap(),
            DatabaseProvider::SQLite {
                path: "./data/draco.db".to_string()
            }
        );
    }

    #[test]
    fn test_credentials_debug_redacts_hash() {
        let creds = PlayerCredentials {
            username: "alice".to_string(),
            password_hash: "$argon2id$secret".to_string(),
        };

        let printed = format!("{:?}", creds);
        assert!(printed.contains("alice"));
        assert!(!printed.contains("argon2id"));
    }
}
