use async_trait::async_trait;
use chrono::Utc;
use libsql::{Builder, Connection, Database, Row};

use super::traits::{DatabaseClient, DbError, DbResult, PlayerCredentials};
use crate::types::{Character, NewCharacter, Player};

/// libsql-backed persistence for players and characters.
///
/// Holds a single connection: an in-memory SQLite database only lives as
/// long as the connection that created it.
pub struct TursoClient {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

impl TursoClient {
    /// Create a client over a fresh in-memory database
    pub async fn new_memory() -> DbResult<Self> {
        Self::new_local(":memory:").await
    }

    /// Create a client over a local SQLite file (created if missing)
    pub async fn new_local(path: &str) -> DbResult<Self> {
        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| backend("Failed to open local database", e))?;

        Self::from_database(db).await
    }

    /// Create a client over a remote Turso database
    #[cfg(feature = "turso")]
    pub async fn new_remote(url: String, auth_token: String) -> DbResult<Self> {
        let db = Builder::new_remote(url, auth_token)
            .build()
            .await
            .map_err(|e| backend("Failed to connect to Turso", e))?;

        Self::from_database(db).await
    }

    async fn from_database(db: Database) -> DbResult<Self> {
        let conn = db
            .connect()
            .map_err(|e| backend("Failed to get connection", e))?;

        let client = Self { db, conn };
        client.initialize_schema().await?;

        Ok(client)
    }

    pub fn connection(&self) -> DbResult<Connection> {
        Ok(self.conn.clone())
    }

    async fn initialize_schema(&self) -> DbResult<()> {
        let conn = self.connection()?;

        // Character ownership and the delete cascade depend on this
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| backend("Failed to enable foreign key enforcement", e))?;

        // Players table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS players (
                username TEXT PRIMARY KEY,
                password_hash TEXT NOT NULL,
                name TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            (),
        )
        .await
        .map_err(|e| backend("Failed to create players table", e))?;

        // Characters table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS characters (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner TEXT NOT NULL,
                name TEXT NOT NULL,
                class TEXT NOT NULL,
                race TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                FOREIGN KEY (owner) REFERENCES players(username) ON DELETE CASCADE
            )",
            (),
        )
        .await
        .map_err(|e| backend("Failed to create characters table", e))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_characters_owner ON characters(owner)",
            (),
        )
        .await
        .map_err(|e| backend("Failed to create characters index", e))?;

        Ok(())
    }
}

#[async_trait]
impl DatabaseClient for TursoClient {
    async fn insert_player(
        &self,
        username: &str,
        password_hash: &str,
        name: &str,
    ) -> DbResult<()> {
        let conn = self.connection()?;
        let now = Utc::now().timestamp();

        conn.execute(
            "INSERT INTO players (username, password_hash, name, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            (username, password_hash, name, now, now),
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::DuplicateUsername
            } else {
                backend("Failed to create player", e)
            }
        })?;

        Ok(())
    }

    async fn lookup_player_credentials(
        &self,
        username: &str,
    ) -> DbResult<Option<PlayerCredentials>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT username, password_hash FROM players WHERE username = ?",
                [username],
            )
            .await
            .map_err(|e| backend("Failed to query player credentials", e))?;

        if let Some(row) = rows.next().await.map_err(|e| backend("Failed to read row", e))? {
            Ok(Some(PlayerCredentials {
                username: text(&row, 0)?,
                password_hash: text(&row, 1)?,
            }))
        } else {
            Ok(None)
        }
    }

    async fn lookup_player(&self, username: &str) -> DbResult<Option<Player>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT username, name FROM players WHERE username = ?",
                [username],
            )
            .await
            .map_err(|e| backend("Failed to query player", e))?;

        if let Some(row) = rows.next().await.map_err(|e| backend("Failed to read row", e))? {
            Ok(Some(Player {
                username: text(&row, 0)?,
                name: text(&row, 1)?,
            }))
        } else {
            Ok(None)
        }
    }

    async fn update_player_password(&self, username: &str, password_hash: &str) -> DbResult<()> {
        let conn = self.connection()?;
        let now = Utc::now().timestamp();

        let affected = conn
            .execute(
                "UPDATE players SET password_hash = ?, updated_at = ? WHERE username = ?",
                (password_hash, now, username),
            )
            .await
            .map_err(|e| backend("Failed to update password", e))?;

        if affected != 1 {
            return Err(DbError::NoRecord);
        }

        Ok(())
    }

    async fn delete_player(&self, username: &str) -> DbResult<()> {
        let conn = self.connection()?;

        // Both deletes land together or not at all; dropping an uncommitted
        // transaction rolls it back.
        let tx = conn
            .transaction()
            .await
            .map_err(|e| backend("Failed to begin transaction", e))?;

        tx.execute("DELETE FROM characters WHERE owner = ?", [username])
            .await
            .map_err(|e| backend("Failed to delete player characters", e))?;

        let affected = tx
            .execute("DELETE FROM players WHERE username = ?", [username])
            .await
            .map_err(|e| backend("Failed to delete player", e))?;

        if affected != 1 {
            tx.rollback()
                .await
                .map_err(|e| backend("Failed to roll back", e))?;
            return Err(DbError::NoRecord);
        }

        tx.commit()
            .await
            .map_err(|e| backend("Failed to commit player deletion", e))?;

        Ok(())
    }

    async fn insert_character(&self, character: &NewCharacter) -> DbResult<i64> {
        let conn = self.connection()?;
        let now = Utc::now().timestamp();

        let mut rows = conn
            .query(
                "INSERT INTO characters (owner, name, class, race, created_at)
                 VALUES (?, ?, ?, ?, ?)
                 RETURNING id",
                (
                    character.owner.as_str(),
                    character.name.as_str(),
                    character.class.as_str(),
                    character.race.as_str(),
                    now,
                ),
            )
            .await
            .map_err(|e| backend("Failed to create character", e))?;

        let row = rows
            .next()
            .await
            .map_err(|e| backend("Failed to read row", e))?
            .ok_or_else(|| DbError::Backend("insert returned no id".to_string()))?;

        integer(&row, 0)
    }

    async fn lookup_character(&self, id: i64) -> DbResult<Option<Character>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, owner, name, class, race FROM characters WHERE id = ?",
                [id],
            )
            .await
            .map_err(|e| backend("Failed to query character", e))?;

        if let Some(row) = rows.next().await.map_err(|e| backend("Failed to read row", e))? {
            Ok(Some(character_from_row(&row)?))
        } else {
            Ok(None)
        }
    }

    async fn lookup_characters_by_owner(&self, owner: &str) -> DbResult<Vec<Character>> {
        let conn = self.connection()?;

        let mut rows = conn
            .query(
                "SELECT id, owner, name, class, race FROM characters
                 WHERE owner = ? ORDER BY id ASC",
                [owner],
            )
            .await
            .map_err(|e| backend("Failed to query characters", e))?;

        let mut characters = Vec::new();
        while let Some(row) = rows.next().await.map_err(|e| backend("Failed to read row", e))? {
            characters.push(character_from_row(&row)?);
        }

        Ok(characters)
    }
}

fn character_from_row(row: &Row) -> DbResult<Character> {
    Ok(Character {
        id: integer(row, 0)?,
        owner: text(row, 1)?,
        name: text(row, 2)?,
        class: text(row, 3)?,
        race: text(row, 4)?,
    })
}

fn text(row: &Row, idx: i32) -> DbResult<String> {
    row.get::<String>(idx)
        .map_err(|e| DbError::Backend(e.to_string()))
}

fn integer(row: &Row, idx: i32) -> DbResult<i64> {
    row.get::<i64>(idx)
        .map_err(|e| DbError::Backend(e.to_string()))
}

fn backend(context: &str, err: libsql::Error) -> DbError {
    DbError::Backend(format!("{}: {}", context, err))
}

fn is_unique_violation(err: &libsql::Error) -> bool {
    let msg = err.to_string();
    msg.contains("UNIQUE constraint failed") || msg.contains("PRIMARY KEY")
}
