//! LlmProvider and VisionProvider trait definitions.
//!
//! These are the two external model capabilities the dialogue engine consumes.
//! Both use native async fn in traits (RPITIT); see `box_provider` for the
//! object-safe wrappers used for runtime injection.

use avinci_types::llm::{CompletionRequest, CompletionResponse, LlmError, VisionRequest};

/// Trait for text-generation backends (OpenAI-compatible APIs, test doubles).
///
/// Implementations live in avinci-infra (e.g., `OpenAiCompatibleProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}

/// Trait for multimodal backends that describe an image in text.
pub trait VisionProvider: Send + Sync {
    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Describe the attached image following the request's instruction.
    fn describe_image(
        &self,
        request: &VisionRequest<'_>,
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;
}
