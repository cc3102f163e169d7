use thiserror::Error;

use crate::llm::LlmError;

/// Errors surfaced by a chat turn, history read, or history clear.
///
/// Display strings carry internal detail for logs. Callers facing the
/// network should map the variant to a generic message instead of echoing it.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Malformed request: missing fields, unsupported or oversized image.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("agent not found")]
    NotFound,

    /// The captioning or generation backend failed, timed out, or returned garbage.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// The session store could not be reached.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<LlmError> for ChatError {
    fn from(e: LlmError) -> Self {
        ChatError::Upstream(e.to_string())
    }
}

impl From<RepositoryError> for ChatError {
    fn from(e: RepositoryError) -> Self {
        ChatError::Storage(e.to_string())
    }
}

/// Errors from repository operations (used by trait definitions in avinci-core).
///
/// A missing agent is not an error here: lookups return `Option` and the
/// engine turns `None` into [`ChatError::NotFound`].
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
