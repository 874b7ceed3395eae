use std::sync::Arc;

use crate::db::{DatabaseClient, DbError};

/// Lookup failures of the access facade.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    /// The character does not exist.
    #[error("not found")]
    NotFound,

    /// The storage backend failed.
    #[error("storage failure: {0}")]
    Storage(DbError),
}

/// Read-only ownership queries over the persistence layer.
///
/// Makes no authorization decisions; the guard does.
#[derive(Clone)]
pub struct AccessFacade {
    db: Arc<dyn DatabaseClient>,
}

impl AccessFacade {
    /// Creates a facade over `db`.
    pub fn new(db: Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }

    /// Username owning character `id`.
    pub async fn character_owner(&self, id: i64) -> Result<String, AccessError> {
        self.db
            .lookup_character(id)
            .await
            .map_err(AccessError::Storage)?
            .map(|c| c.owner)
            .ok_or(AccessError::NotFound)
    }

    /// Whether an account named `username` exists.
    pub async fn player_exists(&self, username: &str) -> Result<bool, AccessError> {
        self.db
            .lookup_player(username)
            .await
            .map(|p| p.is_some())
            .map_err(AccessError::Storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;
    use crate::types::NewCharacter;

    #[tokio::test]
    async fn test_character_owner() {
        let db = Arc::new(InMemoryStore::new());
        db.insert_player("alice", "h", "Alice").await.unwrap();
        let id = db
            .insert_character(&NewCharacter {
                owner: "alice".to_string(),
                name: "Thorin".to_string(),
                class: "Warrior".to_string(),
                race: "Dwarf".to_string(),
            })
            .await
            .unwrap();

        let facade = AccessFacade::new(db);
        assert_eq!(facade.character_owner(id).await.unwrap(), "alice");
        assert_eq!(facade.character_owner(id + 100).await, Err(AccessError::NotFound));
    }

    #[tokio::test]
    async fn test_player_exists() {
        let db = Arc::new(InMemoryStore::new());
        db.insert_player("alice", "h", "Alice").await.unwrap();

        let facade = AccessFacade::new(db.clone());
        assert!(facade.player_exists("alice").await.unwrap());
        assert!(!facade.player_exists("bob").await.unwrap());

        db.set_unavailable(true);
        assert!(matches!(
            facade.player_exists("alice").await,
            Err(AccessError::Storage(_))
        ));
    }
}
