//! Persistence for players and characters.
//!
//! - **Turso/SQLite** ([`TursoClient`]): the production backend, in-memory,
//!   file-based or remote.
//! - **In-memory** ([`InMemoryStore`]): lock-protected maps for tests.
//!
//! Both implement [`DatabaseClient`], the only storage surface the
//! authentication core sees.

#![allow(missing_docs)]

pub mod memory;
pub mod traits;
pub mod turso;

// Re-exports
pub use memory::InMemoryStore;
pub use traits::{DatabaseClient, DatabaseProvider, DbError, DbResult, PlayerCredentials};
pub use turso::TursoClient;
