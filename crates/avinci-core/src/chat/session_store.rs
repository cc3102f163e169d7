//! SessionStore trait definition.
//!
//! A session is the ordered list of turns for one (agent, caller) pair. Its
//! lifetime is bounded by a TTL that every append refreshes. Expired keys are
//! indistinguishable from absent ones.

use avinci_types::chat::{ConversationTurn, SessionKey};
use avinci_types::error::RepositoryError;

/// Trait for TTL-bounded conversation session storage.
///
/// `read_all` must return turns oldest-first in append order, never dropping
/// or duplicating a turn before expiry. There is no per-key lock: concurrent
/// appends to one key land in whatever order they complete.
///
/// Implementations live in avinci-infra (`InMemorySessionStore`, `SqliteSessionStore`).
pub trait SessionStore: Send + Sync {
    /// Append one turn, creating the session if absent or expired, and refresh its expiry.
    fn append(
        &self,
        key: &SessionKey,
        turn: &ConversationTurn,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Append several turns in order.
    ///
    /// The default appends one at a time. Backends that can should override
    /// this so the batch lands all-or-nothing.
    fn append_all(
        &self,
        key: &SessionKey,
        turns: &[ConversationTurn],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send {
        async move {
            for turn in turns {
                self.append(key, turn).await?;
            }
            Ok(())
        }
    }

    /// All live turns for the key, oldest first. Empty when absent or expired.
    fn read_all(
        &self,
        key: &SessionKey,
    ) -> impl std::future::Future<Output = Result<Vec<ConversationTurn>, RepositoryError>> + Send;

    /// Delete the session. Clearing an absent key succeeds.
    fn clear(
        &self,
        key: &SessionKey,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
