//! VisionGrounding: one captioning call per attached image, no retry.
//!
//! The instruction is constant and profile-independent. Payload checks run
//! before the backend is contacted, so a rejected image never costs a call.

use std::time::Duration;

use avinci_types::chat::ImageAttachment;
use avinci_types::error::ChatError;
use avinci_types::llm::VisionRequest;
use tracing::{Instrument, debug, info_span, warn};

use crate::llm::box_provider::BoxVisionProvider;

/// Largest accepted image payload, in decoded bytes.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Output token ceiling for the caption.
pub const CAPTION_MAX_TOKENS: u32 = 500;

/// Fixed captioning instruction sent with every image.
pub const ANALYSIS_INSTRUCTION: &str = "Analyze this image from a UX research perspective. \
Describe what you see, identify potential usability issues, accessibility concerns, and user \
experience considerations. Be specific and detailed.";

pub struct VisionGrounding {
    provider: BoxVisionProvider,
    timeout: Duration,
}

impl VisionGrounding {
    pub fn new(provider: BoxVisionProvider, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Reject payloads the captioning backend must never see.
    pub fn validate(image: &ImageAttachment) -> Result<(), ChatError> {
        if !image.mime_type.starts_with("image/") {
            return Err(ChatError::Validation(format!(
                "unsupported attachment type '{}'",
                image.mime_type
            )));
        }
        if image.data.is_empty() {
            return Err(ChatError::Validation("image payload is empty".to_string()));
        }
        if image.data.len() > MAX_IMAGE_BYTES {
            return Err(ChatError::Validation(format!(
                "image is {} bytes, limit is {MAX_IMAGE_BYTES}",
                image.data.len()
            )));
        }
        Ok(())
    }

    /// Caption `image` for grounding the current turn.
    pub async fn ground(&self, image: &ImageAttachment) -> Result<String, ChatError> {
        Self::validate(image)?;

        let request = VisionRequest {
            image,
            instruction: ANALYSIS_INSTRUCTION,
            max_tokens: CAPTION_MAX_TOKENS,
        };

        let span = info_span!(
            "gen_ai.describe_image",
            gen_ai.system = self.provider.name(),
            gen_ai.request.max_tokens = CAPTION_MAX_TOKENS,
            image.mime_type = %image.mime_type,
            image.bytes = image.data.len(),
        );

        let caption = match tokio::time::timeout(self.timeout, self.provider.describe_image(&request))
            .instrument(span)
            .await
        {
            Ok(Ok(caption)) => caption,
            Ok(Err(e)) => {
                warn!(error = %e, "image captioning failed");
                return Err(e.into());
            }
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs(), "image captioning timed out");
                return Err(ChatError::Upstream(format!(
                    "captioning timed out after {}s",
                    self.timeout.as_secs()
                )));
            }
        };

        if caption.trim().is_empty() {
            return Err(ChatError::Upstream("captioning returned no text".to_string()));
        }

        debug!(caption_len = caption.len(), "image grounded");
        Ok(caption)
    }
}
