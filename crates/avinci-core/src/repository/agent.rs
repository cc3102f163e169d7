//! AgentRepository trait definition.
//!
//! Agent records are created and edited by another part of the product; the
//! dialogue engine only ever reads them.

use avinci_types::agent::AgentProfile;
use avinci_types::error::RepositoryError;

/// Read-only lookup of persona agent profiles.
///
/// Implementations live in avinci-infra (e.g., `SqliteAgentRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait AgentRepository: Send + Sync {
    /// Get an agent profile by its identifier. Returns None if it does not exist.
    fn get_agent(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<AgentProfile>, RepositoryError>> + Send;
}
