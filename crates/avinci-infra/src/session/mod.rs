//! Session store backends and runtime selection between them.

pub mod memory;

use std::time::Duration;

use avinci_core::chat::session_store::SessionStore;
use avinci_types::chat::{ConversationTurn, SessionKey};
use avinci_types::config::{SessionBackend, SessionConfig};
use avinci_types::error::RepositoryError;

use self::memory::InMemorySessionStore;
use crate::sqlite::pool::DatabasePool;
use crate::sqlite::session::SqliteSessionStore;

/// The configured session backend.
///
/// `SessionStore` uses RPITIT, so runtime selection goes through this enum
/// rather than a trait object.
pub enum AnySessionStore {
    Memory(InMemorySessionStore),
    Sqlite(SqliteSessionStore),
}

impl AnySessionStore {
    /// Build the backend named in `config`. The pool is only used for `sqlite`.
    pub fn from_config(config: &SessionConfig, pool: &DatabasePool) -> Self {
        let ttl = Duration::from_secs(config.ttl_secs);
        match config.backend {
            SessionBackend::Memory => Self::Memory(InMemorySessionStore::new(ttl)),
            SessionBackend::Sqlite => Self::Sqlite(SqliteSessionStore::new(pool.clone(), ttl)),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Sqlite(_) => "sqlite",
        }
    }

    /// Drop expired sessions. Returns how many were removed.
    pub async fn purge_expired(&self) -> Result<u64, RepositoryError> {
        match self {
            Self::Memory(store) => Ok(store.purge_expired() as u64),
            Self::Sqlite(store) => store.purge_expired().await,
        }
    }
}

impl SessionStore for AnySessionStore {
    async fn append(&self, key: &SessionKey, turn: &ConversationTurn) -> Result<(), RepositoryError> {
        match self {
            Self::Memory(store) => store.append(key, turn).await,
            Self::Sqlite(store) => store.append(key, turn).await,
        }
    }

    async fn append_all(
        &self,
        key: &SessionKey,
        turns: &[ConversationTurn],
    ) -> Result<(), RepositoryError> {
        match self {
            Self::Memory(store) => store.append_all(key, turns).await,
            Self::Sqlite(store) => store.append_all(key, turns).await,
        }
    }

    async fn read_all(&self, key: &SessionKey) -> Result<Vec<ConversationTurn>, RepositoryError> {
        match self {
            Self::Memory(store) => store.read_all(key).await,
            Self::Sqlite(store) => store.read_all(key).await,
        }
    }

    async fn clear(&self, key: &SessionKey) -> Result<(), RepositoryError> {
        match self {
            Self::Memory(store) => store.clear(key).await,
            Self::Sqlite(store) => store.clear(key).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::test_pool;

    #[tokio::test]
    async fn test_from_config_selects_backend() {
        let (_dir, pool) = test_pool().await;

        let memory = AnySessionStore::from_config(&SessionConfig::default(), &pool);
        assert_eq!(memory.backend_name(), "memory");

        let config = SessionConfig {
            backend: SessionBackend::Sqlite,
            ttl_secs: 60,
        };
        let sqlite = AnySessionStore::from_config(&config, &pool);
        assert_eq!(sqlite.backend_name(), "sqlite");

        let key = SessionKey::new("agent-1", "cli");
        let turn = ConversationTurn::user("agent-1", "persisted");
        sqlite.append(&key, &turn).await.unwrap();
        assert_eq!(sqlite.read_all(&key).await.unwrap(), vec![turn]);
        assert!(memory.read_all(&key).await.unwrap().is_empty());
    }
}
