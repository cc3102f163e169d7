//! SQLite session store.
//!
//! One `chat_sessions` row per `(agent_id, caller)` pair carries the expiry
//! deadline; each turn is a `chat_turns` row holding the serialized turn,
//! ordered by its autoincrement sequence. Appends run in a transaction that
//! also resets an expired session and refreshes the deadline, so a batch
//! lands all-or-nothing.

use std::sync::Arc;
use std::time::Duration;

use avinci_core::chat::session_store::SessionStore;
use avinci_types::chat::{ConversationTurn, SessionKey};
use avinci_types::error::RepositoryError;
use chrono::Utc;
use sqlx::Row;

use super::pool::DatabasePool;

/// Current time in epoch milliseconds.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// SQLite-backed implementation of `SessionStore`.
pub struct SqliteSessionStore {
    pool: DatabasePool,
    ttl: Duration,
    clock: Clock,
}

impl SqliteSessionStore {
    pub fn new(pool: DatabasePool, ttl: Duration) -> Self {
        Self {
            pool,
            ttl,
            clock: Arc::new(|| Utc::now().timestamp_millis()),
        }
    }

    /// Replace the wall clock used for expiry, e.g. with a manual one in tests.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Delete every expired session and its turns. Returns how many sessions were removed.
    pub async fn purge_expired(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM chat_sessions WHERE expires_at <= ?")
            .bind(self.now_millis())
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(result.rows_affected())
    }

    fn now_millis(&self) -> i64 {
        (self.clock)()
    }

    fn ttl_millis(&self) -> i64 {
        i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
    }
}

impl SessionStore for SqliteSessionStore {
    async fn append(&self, key: &SessionKey, turn: &ConversationTurn) -> Result<(), RepositoryError> {
        self.append_all(key, std::slice::from_ref(turn)).await
    }

    async fn append_all(
        &self,
        key: &SessionKey,
        turns: &[ConversationTurn],
    ) -> Result<(), RepositoryError> {
        let now = self.now_millis();

        let encoded = turns
            .iter()
            .map(|turn| {
                serde_json::to_string(turn).map_err(|e| RepositoryError::Serialization(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        // An expired session restarts empty; cascades to its turns.
        sqlx::query(
            "DELETE FROM chat_sessions WHERE agent_id = ? AND caller = ? AND expires_at <= ?",
        )
        .bind(&key.agent_id)
        .bind(&key.caller)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        sqlx::query(
            "INSERT INTO chat_sessions (agent_id, caller, expires_at) VALUES (?, ?, ?)
             ON CONFLICT(agent_id, caller) DO UPDATE SET expires_at = excluded.expires_at",
        )
        .bind(&key.agent_id)
        .bind(&key.caller)
        .bind(now.saturating_add(self.ttl_millis()))
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        for (turn, json) in turns.iter().zip(&encoded) {
            sqlx::query(
                "INSERT INTO chat_turns (agent_id, caller, turn_json, created_at)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(&key.agent_id)
            .bind(&key.caller)
            .bind(json)
            .bind(turn.timestamp.to_rfc3339())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn read_all(&self, key: &SessionKey) -> Result<Vec<ConversationTurn>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT t.turn_json FROM chat_turns t
             JOIN chat_sessions s ON s.agent_id = t.agent_id AND s.caller = t.caller
             WHERE t.agent_id = ? AND t.caller = ? AND s.expires_at > ?
             ORDER BY t.seq ASC",
        )
        .bind(&key.agent_id)
        .bind(&key.caller)
        .bind(self.now_millis())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                let json: String = row
                    .try_get("turn_json")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                serde_json::from_str(&json).map_err(|e| RepositoryError::Serialization(e.to_string()))
            })
            .collect()
    }

    async fn clear(&self, key: &SessionKey) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM chat_sessions WHERE agent_id = ? AND caller = ?")
            .bind(&key.agent_id)
            .bind(&key.caller)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(())
    }
}
