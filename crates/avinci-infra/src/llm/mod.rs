//! LLM provider implementations.
//!
//! Contains the concrete implementation of the [`LlmProvider`] and
//! [`VisionProvider`] traits defined in `avinci-core`, and a factory
//! ([`create_providers`]) that builds both boxed providers from an [`LlmConfig`].
//!
//! [`LlmProvider`]: avinci_core::llm::provider::LlmProvider
//! [`VisionProvider`]: avinci_core::llm::provider::VisionProvider

pub mod openai_compat;

use secrecy::{ExposeSecret, SecretString};

use avinci_core::llm::box_provider::{BoxLlmProvider, BoxVisionProvider};
use avinci_core::llm::provider::{LlmProvider, VisionProvider};
use avinci_types::config::LlmConfig;
use avinci_types::llm::{CompletionRequest, CompletionResponse, LlmError, VisionRequest};

use self::openai_compat::OpenAiCompatibleProvider;
use self::openai_compat::config::OpenAiCompatConfig;

/// Build the generation and captioning providers from configuration.
///
/// Both are backed by one OpenAI-compatible client. A configured `base_url`
/// wins; otherwise well-known provider names pick their endpoint and anything
/// else falls back to OpenAI.
///
/// # Errors
///
/// Returns [`LlmError::AuthenticationFailed`] when no API key is available.
pub fn create_providers(
    config: &LlmConfig,
    api_key: Option<&SecretString>,
) -> Result<(BoxLlmProvider, BoxVisionProvider), LlmError> {
    let key = api_key.ok_or(LlmError::AuthenticationFailed)?.expose_secret();

    let provider = match config.base_url.as_deref() {
        Some(base_url) => OpenAiCompatibleProvider::new(OpenAiCompatConfig {
            provider_name: config.provider_name.clone(),
            base_url: base_url.to_string(),
            api_key: key.to_string(),
            model: config.model.clone(),
            vision_model: config.vision_model.clone(),
        }),
        None => match config.provider_name.as_str() {
            "gemini" => OpenAiCompatibleProvider::gemini(key, &config.model, &config.vision_model),
            "mistral" => {
                OpenAiCompatibleProvider::mistral(key, &config.model, &config.vision_model)
            }
            _ => OpenAiCompatibleProvider::openai(key, &config.model, &config.vision_model),
        },
    };

    tracing::debug!(provider = %config.provider_name, model = %config.model, "model providers created");

    Ok((
        BoxLlmProvider::new(provider.clone()),
        BoxVisionProvider::new(provider),
    ))
}

/// Stand-in for a backend whose API key is missing. Every call fails with
/// [`LlmError::AuthenticationFailed`].
struct OfflineProvider {
    provider_name: String,
}

impl LlmProvider for OfflineProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Err(LlmError::AuthenticationFailed)
    }
}

impl VisionProvider for OfflineProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn describe_image(&self, _request: &VisionRequest<'_>) -> Result<String, LlmError> {
        Err(LlmError::AuthenticationFailed)
    }
}

/// Providers for commands that only read or clear stored sessions and so
/// must not demand an API key.
pub fn offline_providers(config: &LlmConfig) -> (BoxLlmProvider, BoxVisionProvider) {
    tracing::debug!(provider = %config.provider_name, "no API key; model providers offline");
    (
        BoxLlmProvider::new(OfflineProvider {
            provider_name: config.provider_name.clone(),
        }),
        BoxVisionProvider::new(OfflineProvider {
            provider_name: config.provider_name.clone(),
        }),
    )
}
