//! In-process session store backed by DashMap.
//!
//! Expiry deadlines use `tokio::time::Instant` so tests can drive the TTL
//! with paused time. Expired entries are dropped lazily on access and in
//! bulk by [`InMemorySessionStore::purge_expired`].

use std::time::Duration;

use avinci_core::chat::session_store::SessionStore;
use avinci_types::chat::{ConversationTurn, SessionKey};
use avinci_types::error::RepositoryError;
use dashmap::DashMap;
use tokio::time::Instant;

struct SessionEntry {
    /// Oldest first.
    turns: Vec<ConversationTurn>,
    expires_at: Instant,
}

pub struct InMemorySessionStore {
    sessions: DashMap<SessionKey, SessionEntry>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Drop every expired session. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.sessions.len())
    }

    /// Number of sessions currently held, expired or not.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn push(&self, key: &SessionKey, turns: &[ConversationTurn]) {
        let now = Instant::now();
        let mut entry = self
            .sessions
            .entry(key.clone())
            .or_insert_with(|| SessionEntry {
                turns: Vec::new(),
                expires_at: now,
            });
        if entry.expires_at <= now {
            entry.turns.clear();
        }
        entry.turns.extend_from_slice(turns);
        entry.expires_at = now + self.ttl;
    }
}

impl SessionStore for InMemorySessionStore {
    async fn append(&self, key: &SessionKey, turn: &ConversationTurn) -> Result<(), RepositoryError> {
        self.push(key, std::slice::from_ref(turn));
        Ok(())
    }

    async fn append_all(
        &self,
        key: &SessionKey,
        turns: &[ConversationTurn],
    ) -> Result<(), RepositoryError> {
        // One shard lock covers the whole batch.
        self.push(key, turns);
        Ok(())
    }

    async fn read_all(&self, key: &SessionKey) -> Result<Vec<ConversationTurn>, RepositoryError> {
        let now = Instant::now();
        if let Some(entry) = self.sessions.get(key)
            && entry.expires_at > now
        {
            return Ok(entry.turns.clone());
        }
        self.sessions.remove_if(key, |_, entry| entry.expires_at <= now);
        Ok(Vec::new())
    }

    async fn clear(&self, key: &SessionKey) -> Result<(), RepositoryError> {
        self.sessions.remove(key);
        Ok(())
    }
}
