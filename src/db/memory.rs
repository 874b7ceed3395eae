//! Pure in-memory [`DatabaseClient`] used by tests and embedders that do not
//! want SQLite.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::traits::{DatabaseClient, DbError, DbResult, PlayerCredentials};
use crate::types::{Character, NewCharacter, Player};

#[derive(Debug, Clone)]
struct StoredPlayer {
    password_hash: String,
    name: String,
}

/// `HashMap`/`BTreeMap` store behind `parking_lot` locks.
///
/// Locks are always taken players-then-characters.
#[derive(Debug)]
pub struct InMemoryStore {
    players: RwLock<HashMap<String, StoredPlayer>>,
    characters: RwLock<BTreeMap<i64, Character>>,
    next_character_id: AtomicI64,
    unavailable: AtomicBool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            players: RwLock::new(HashMap::new()),
            characters: RwLock::new(BTreeMap::new()),
            next_character_id: AtomicI64::new(1),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make every subsequent operation fail with [`DbError::Backend`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> DbResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DbError::Backend("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DatabaseClient for InMemoryStore {
    async fn insert_player(
        &self,
        username: &str,
        password_hash: &str,
        name: &str,
    ) -> DbResult<()> {
        self.check_available()?;

        let mut players = self.players.write();
        if players.contains_key(username) {
            return Err(DbError::DuplicateUsername);
        }
        players.insert(
            username.to_string(),
            StoredPlayer {
                password_hash: password_hash.to_string(),
                name: name.to_string(),
            },
        );
        Ok(())
    }

    async fn lookup_player_credentials(
        &self,
        username: &str,
    ) -> DbResult<Option<PlayerCredentials>> {
        self.check_available()?;

        Ok(self
            .players
            .read()
            .get(username)
            .map(|p| PlayerCredentials {
                username: username.to_string(),
                password_hash: p.password_hash.clone(),
            }))
    }

    async fn lookup_player(&self, username: &str) -> DbResult<Option<Player>> {
        self.check_available()?;

        Ok(self.players.read().get(username).map(|p| Player {
            username: username.to_string(),
            name: p.name.clone(),
        }))
    }

    async fn update_player_password(&self, username: &str, password_hash: &str) -> DbResult<()> {
        self.check_available()?;

        let mut players = self.players.write();
        let player = players.get_mut(username).ok_or(DbError::NoRecord)?;
        player.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn delete_player(&self, username: &str) -> DbResult<()> {
        self.check_available()?;

        let mut players = self.players.write();
        if players.remove(username).is_none() {
            return Err(DbError::NoRecord);
        }
        self.characters
            .write()
            .retain(|_, character| character.owner != username);
        Ok(())
    }

    async fn insert_character(&self, character: &NewCharacter) -> DbResult<i64> {
        self.check_available()?;

        let players = self.players.read();
        if !players.contains_key(&character.owner) {
            return Err(DbError::Backend(format!(
                "foreign key violation: no player '{}'",
                character.owner
            )));
        }

        let id = self.next_character_id.fetch_add(1, Ordering::SeqCst);
        self.characters.write().insert(
            id,
            Character {
                id,
                owner: character.owner.clone(),
                name: character.name.clone(),
                class: character.class.clone(),
                race: character.race.clone(),
            },
        );
        Ok(id)
    }

    async fn lookup_character(&self, id: i64) -> DbResult<Option<Character>> {
        self.check_available()?;

        Ok(self.characters.read().get(&id).cloned())
    }

    async fn lookup_characters_by_owner(&self, owner: &str) -> DbResult<Vec<Character>> {
        self.check_available()?;

        Ok(self
            .characters
            .read()
            .values()
            .filter(|c| c.owner == owner)
            .cloned()
            .collect())
    }
}
