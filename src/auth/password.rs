use std::sync::{Arc, OnceLock};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::db::{DatabaseClient, DbError};

/// Argon2id memory cost in KiB.
pub const ARGON2_MEMORY_KIB: u32 = 19_456;
/// Argon2id iteration count.
pub const ARGON2_ITERATIONS: u32 = 2;
/// Argon2id lane count.
pub const ARGON2_PARALLELISM: u32 = 1;

/// Credential failures.
///
/// `NoSuchAccount` and `BadPassword` must be reported to clients identically;
/// they stay distinct here for logs and tests.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The username is already registered.
    #[error("username already taken")]
    DuplicateUsername,

    /// No account with that username.
    #[error("no such account")]
    NoSuchAccount,

    /// The password does not match.
    #[error("password mismatch")]
    BadPassword,

    /// The storage backend failed.
    #[error("storage failure: {0}")]
    Storage(DbError),

    /// Argon2 hashing or hash parsing failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Hashes a password with Argon2id using the fixed cost parameters.
///
/// Returns a PHC-formatted hash string. Blocks for tens of milliseconds; call
/// through [`CredentialStore`] from async code.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let params = Params::new(ARGON2_MEMORY_KIB, ARGON2_ITERATIONS, ARGON2_PARALLELISM, None)
        .map_err(|e| CredentialError::Hashing(format!("invalid Argon2 parameters: {}", e)))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hashing(format!("Failed to hash password: {}", e)))
}

/// Verifies a password against a PHC hash.
///
/// Cost parameters are read from the hash itself, so hashes written with
/// older parameters keep verifying. The digest comparison is constant-time.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, CredentialError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| CredentialError::Hashing(format!("Invalid password hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(CredentialError::Hashing(e.to_string())),
    }
}

/// Hash compared against when the account does not exist, so that both
/// login failures cost one Argon2 verification.
fn dummy_hash() -> Option<&'static str> {
    static DUMMY: OnceLock<Option<String>> = OnceLock::new();
    DUMMY
        .get_or_init(|| hash_password("draco-dummy-password").ok())
        .as_deref()
}

async fn hash_blocking(password: &str) -> Result<String, CredentialError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| CredentialError::Hashing(format!("hashing task failed: {}", e)))?
}

async fn verify_blocking(password: &str, hash: String) -> Result<bool, CredentialError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| CredentialError::Hashing(format!("verification task failed: {}", e)))?
}

/// Registers and verifies player credentials.
///
/// Hashing runs on tokio's blocking pool so concurrent logins do not stall
/// the request workers. The raw password is never stored or logged.
#[derive(Clone)]
pub struct CredentialStore {
    db: Arc<dyn DatabaseClient>,
}

impl CredentialStore {
    /// Creates a store over `db`.
    pub fn new(db: Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }

    /// Creates a player account.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        name: &str,
    ) -> Result<(), CredentialError> {
        let password_hash = hash_blocking(password).await?;

        self.db
            .insert_player(username, &password_hash, name)
            .await
            .map_err(|e| match e {
                DbError::DuplicateUsername => CredentialError::DuplicateUsername,
                other => CredentialError::Storage(other),
            })?;

        tracing::info!(%username, "player registered");
        Ok(())
    }

    /// Checks `password` against the stored hash and returns the stored
    /// username on success.
    pub async fn verify(&self, username: &str, password: &str) -> Result<String, CredentialError> {
        let credentials = self
            .db
            .lookup_player_credentials(username)
            .await
            .map_err(CredentialError::Storage)?;

        let Some(credentials) = credentials else {
            let password = password.to_owned();
            let _ = tokio::task::spawn_blocking(move || {
                dummy_hash().map(|hash| verify_password(&password, hash))
            })
            .await;
            return Err(CredentialError::NoSuchAccount);
        };

        if verify_blocking(password, credentials.password_hash).await? {
            Ok(credentials.username)
        } else {
            Err(CredentialError::BadPassword)
        }
    }

    /// Replaces the password after re-checking the current one.
    pub async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), CredentialError> {
        self.verify(username, current_password).await?;

        let password_hash = hash_blocking(new_password).await?;
        self.db
            .update_player_password(username, &password_hash)
            .await
            .map_err(|e| match e {
                DbError::NoRecord => CredentialError::NoSuchAccount,
                other => CredentialError::Storage(other),
            })?;

        tracing::info!(%username, "password changed");
        Ok(())
    }

    /// Deletes the account and, through storage, every character it owns.
    pub async fn delete_account(&self, username: &str) -> Result<(), CredentialError> {
        self.db.delete_player(username).await.map_err(|e| match e {
            DbError::NoRecord => CredentialError::NoSuchAccount,
            other => CredentialError::Storage(other),
        })?;

        tracing::info!(%username, "player deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryStore;

    fn create_test_store() -> (Arc<InMemoryStore>, CredentialStore) {
        let db = Arc::new(InMemoryStore::new());
        let store = CredentialStore::new(db.clone());
        (db, store)
    }

    #[test]
    fn test_hash_uses_fixed_argon2id_parameters() {
        let hash = hash_password("p@ss1").expect("should hash password");

        assert!(
            hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"),
            "unexpected hash format: {}",
            hash
        );
        assert!(!hash.contains("p@ss1"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same").expect("should hash");
        let b = hash_password("same").expect("should hash");
        assert_ne!(a, b, "two hashes of one password should differ by salt");
    }

    #[test]
    fn test_hash_with_other_parameters_still_verifies() {
        let params = Params::new(8_192, 1, 1, None).unwrap();
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let salt = SaltString::generate(&mut OsRng);
        let old_hash = argon2
            .hash_password(b"legacy", &salt)
            .unwrap()
            .to_string();

        assert!(verify_password("legacy", &old_hash).unwrap());
        assert!(!verify_password("other", &old_hash).unwrap());
    }

    #[test]
    fn test_corrupt_hash_is_an_error_not_a_mismatch() {
        let result = verify_password("anything", "not-a-phc-string");
        assert!(matches!(result, Err(CredentialError::Hashing(_))));
    }

    #[tokio::test]
    async fn test_register_then_verify() {
        let (_, store) = create_test_store();
        store.register("alice", "p@ss1", "Alice").await.unwrap();

        let username = store.verify("alice", "p@ss1").await.unwrap();
        assert_eq!(username, "alice");
    }

    #[tokio::test]
    async fn test_wrong_password_is_bad_password() {
        let (_, store) = create_test_store();
        store.register("alice", "p@ss1", "Alice").await.unwrap();

        let result = store.verify("alice", "wrong").await;
        assert!(matches!(result, Err(CredentialError::BadPassword)));
    }

    #[tokio::test]
    async fn test_unknown_account_is_distinct_from_bad_password() {
        let (_, store) = create_test_store();
        store.register("alice", "p@ss1", "Alice").await.unwrap();

        let unknown = store.verify("nobody", "p@ss1").await;
        let wrong = store.verify("alice", "nope").await;

        assert!(matches!(unknown, Err(CredentialError::NoSuchAccount)));
        assert!(matches!(wrong, Err(CredentialError::BadPassword)));
    }

    #[tokio::test]
    async fn test_duplicate_register_keeps_first_hash() {
        let (db, store) = create_test_store();
        store.register("alice", "first", "Alice").await.unwrap();
        let before = db.lookup_player_credentials("alice").await.unwrap().unwrap();

        let result = store.register("alice", "second", "Alice Again").await;
        assert!(matches!(result, Err(CredentialError::DuplicateUsername)));

        let after = db.lookup_player_credentials("alice").await.unwrap().unwrap();
        assert_eq!(before.password_hash, after.password_hash);
        assert!(store.verify("alice", "first").await.is_ok());
    }

    #[tokio::test]
    async fn test_raw_password_is_never_stored() {
        let (db, store) = create_test_store();
        store.register("alice", "hunter2", "Alice").await.unwrap();

        let creds = db.lookup_player_credentials("alice").await.unwrap().unwrap();
        assert_ne!(creds.password_hash, "hunter2");
        assert!(!creds.password_hash.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_storage_failure_is_not_a_credential_failure() {
        let (db, store) = create_test_store();
        store.register("alice", "p@ss1", "Alice").await.unwrap();
        db.set_unavailable(true);

        let result = store.verify("alice", "p@ss1").await;
        assert!(matches!(result, Err(CredentialError::Storage(_))));
    }

    #[tokio::test]
    async fn test_change_password() {
        let (_, store) = create_test_store();
        store.register("alice", "old", "Alice").await.unwrap();

        let wrong = store.change_password("alice", "not-old", "new").await;
        assert!(matches!(wrong, Err(CredentialError::BadPassword)));

        store.change_password("alice", "old", "new").await.unwrap();
        assert!(matches!(
            store.verify("alice", "old").await,
            Err(CredentialError::BadPassword)
        ));
        assert!(store.verify("alice", "new").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_account() {
        let (_, store) = create_test_store();
        store.register("alice", "p@ss1", "Alice").await.unwrap();

        store.delete_account("alice").await.unwrap();

        assert!(matches!(
            store.verify("alice", "p@ss1").await,
            Err(CredentialError::NoSuchAccount)
        ));
        assert!(matches!(
            store.delete_account("alice").await,
            Err(CredentialError::NoSuchAccount)
        ));
    }
}
