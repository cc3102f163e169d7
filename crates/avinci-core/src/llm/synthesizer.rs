//! ResponseSynthesizer: the single generation call of a chat turn.
//!
//! Sampling parameters are fixed; callers only choose the messages. Wall-clock
//! latency is measured around the provider call and reported back with the text.

use std::time::{Duration, Instant};

use avinci_types::error::ChatError;
use avinci_types::llm::{CompletionRequest, Message, Usage};
use tracing::{Instrument, debug, info_span, warn};

use super::box_provider::BoxLlmProvider;

/// Sampling temperature for every persona reply.
pub const GENERATION_TEMPERATURE: f64 = 0.7;

/// Output token ceiling for every persona reply.
pub const GENERATION_MAX_TOKENS: u32 = 1000;

/// Raw model output plus the metadata recorded on the agent turn.
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub text: String,
    /// Model reported by the backend, or the requested model when it reports none.
    pub model: String,
    pub usage: Usage,
    pub processing_time_ms: u64,
}

pub struct ResponseSynthesizer {
    provider: BoxLlmProvider,
    model: String,
    timeout: Duration,
}

impl ResponseSynthesizer {
    pub fn new(provider: BoxLlmProvider, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            provider,
            model: model.into(),
            timeout,
        }
    }

    /// Run one completion over `messages`.
    ///
    /// Provider failures, timeouts, and blank output all surface as
    /// [`ChatError::Upstream`].
    pub async fn synthesize(&self, messages: Vec<Message>) -> Result<Synthesis, ChatError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: GENERATION_MAX_TOKENS,
            temperature: Some(GENERATION_TEMPERATURE),
        };

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = self.provider.name(),
            gen_ai.request.model = %request.model,
            gen_ai.request.max_tokens = request.max_tokens,
            gen_ai.request.temperature = ?request.temperature,
            gen_ai.request.message_count = request.messages.len(),
        );

        let started = Instant::now();
        let outcome = tokio::time::timeout(self.timeout, self.provider.complete(&request))
            .instrument(span)
            .await;
        let processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(error = %e, "generation call failed");
                return Err(e.into());
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "generation call timed out");
                return Err(ChatError::Upstream(format!(
                    "generation timed out after {}s",
                    self.timeout.as_secs()
                )));
            }
        };

        if response.content.trim().is_empty() {
            return Err(ChatError::Upstream("generation returned no text".to_string()));
        }

        debug!(
            model = %response.model,
            output_tokens = response.usage.output_tokens,
            processing_time_ms,
            "generation complete"
        );

        let model = if response.model.is_empty() {
            request.model
        } else {
            response.model
        };

        Ok(Synthesis {
            text: response.content,
            model,
            usage: response.usage,
            processing_time_ms,
        })
    }
}
