//! OpenAI-compatible LLM provider implementation.
//!
//! A single [`OpenAiCompatibleProvider`] serves OpenAI, Google Gemini, and
//! Mistral via configurable base URLs and factory functions. It implements
//! both capabilities the dialogue engine needs: role-tagged chat completion
//! and image description.
//!
//! Uses [`async_openai`] for type-safe request/response handling.

pub mod config;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::error::{ApiError, OpenAIError};
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
    ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
    CreateChatCompletionRequest, ImageUrl,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use avinci_core::llm::provider::{LlmProvider, VisionProvider};
use avinci_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, MessageRole, Usage, VisionRequest,
};

use self::config::OpenAiCompatConfig;

/// Unified provider for any OpenAI-compatible API.
///
/// # API Key Security
///
/// Does NOT derive Debug to prevent accidental exposure of the API key
/// stored inside the `async_openai::Client`.
#[derive(Clone)]
pub struct OpenAiCompatibleProvider {
    client: Client<OpenAIConfig>,
    provider_name: String,
    model: String,
    vision_model: String,
}

impl OpenAiCompatibleProvider {
    /// Create a new OpenAI-compatible provider from a configuration.
    pub fn new(config: OpenAiCompatConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(&config.base_url);

        Self {
            client: Client::with_config(openai_config),
            provider_name: config.provider_name,
            model: config.model,
            vision_model: config.vision_model,
        }
    }

    /// Create an OpenAI provider.
    pub fn openai(api_key: &str, model: &str, vision_model: &str) -> Self {
        Self::new(config::openai_defaults(api_key, model, vision_model))
    }

    /// Create a Google Gemini provider (OpenAI-compatible beta endpoint).
    pub fn gemini(api_key: &str, model: &str, vision_model: &str) -> Self {
        Self::new(config::gemini_defaults(api_key, model, vision_model))
    }

    /// Create a Mistral AI provider.
    pub fn mistral(api_key: &str, model: &str, vision_model: &str) -> Self {
        Self::new(config::mistral_defaults(api_key, model, vision_model))
    }

    /// Build a [`CreateChatCompletionRequest`] from a generic [`CompletionRequest`].
    fn build_request(&self, request: &CompletionRequest) -> CreateChatCompletionRequest {
        let messages = request
            .messages
            .iter()
            .map(|msg| match msg.role {
                MessageRole::System => {
                    ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                        content: ChatCompletionRequestSystemMessageContent::Text(
                            msg.content.clone(),
                        ),
                        name: None,
                    })
                }
                MessageRole::User => {
                    ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                        content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
                        name: None,
                    })
                }
                MessageRole::Assistant => {
                    #[allow(deprecated)]
                    ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                        content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                            msg.content.clone(),
                        )),
                        refusal: None,
                        name: None,
                        audio: None,
                        tool_calls: None,
                        function_call: None,
                    })
                }
            })
            .collect();

        // Use the model from the request if set, otherwise fall back to config default
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        CreateChatCompletionRequest {
            model,
            messages,
            max_completion_tokens: Some(request.max_tokens),
            temperature: request.temperature.map(|t| t as f32),
            ..Default::default()
        }
    }

    /// Build a single-message captioning request: instruction text plus inline image.
    fn build_vision_request(&self, request: &VisionRequest<'_>) -> CreateChatCompletionRequest {
        let data_url = format!(
            "data:{};base64,{}",
            request.image.mime_type,
            STANDARD.encode(&request.image.data)
        );

        let parts = vec![
            ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartText {
                    text: request.instruction.to_string(),
                },
            ),
            ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImage {
                    image_url: ImageUrl {
                        url: data_url,
                        detail: None,
                    },
                },
            ),
        ];

        CreateChatCompletionRequest {
            model: self.vision_model.clone(),
            messages: vec![ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessage {
                    content: ChatCompletionRequestUserMessageContent::Array(parts),
                    name: None,
                },
            )],
            max_completion_tokens: Some(request.max_tokens),
            ..Default::default()
        }
    }
}

// OpenAiCompatibleProvider intentionally does NOT derive Debug to prevent
// accidental exposure of internal state including the API key inside the
// async-openai Client.

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let oai_request = self.build_request(request);

        let response = self
            .client
            .chat()
            .create(oai_request)
            .await
            .map_err(map_openai_error)?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or(LlmError::EmptyResponse)?;

        let usage = response
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: response.id,
            content,
            model: response.model,
            usage,
        })
    }
}

impl VisionProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.provider_name
    }

    async fn describe_image(&self, request: &VisionRequest<'_>) -> Result<String, LlmError> {
        let oai_request = self.build_vision_request(request);

        let response = self
            .client
            .chat()
            .create(oai_request)
            .await
            .map_err(map_openai_error)?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyResponse)
    }
}

/// Translate an `async_openai` failure into the provider-neutral [`LlmError`].
///
/// OpenAI, Gemini and Mistral share the error envelope but not the
/// vocabulary: some fill `code`, some only `type`, Gemini uses upper-case
/// gRPC status names. Both fields are matched case-insensitively.
fn map_openai_error(err: OpenAIError) -> LlmError {
    match err {
        OpenAIError::ApiError(api_err) => map_api_error(api_err),
        OpenAIError::Reqwest(e) => match e.status().map(|s| s.as_u16()) {
            Some(401 | 403) => LlmError::AuthenticationFailed,
            Some(429) => LlmError::RateLimited {
                retry_after_ms: None,
            },
            Some(500..=599) => LlmError::Overloaded(e.to_string()),
            _ if e.is_timeout() => LlmError::Provider {
                message: format!("request timed out: {e}"),
            },
            _ => LlmError::Provider {
                message: e.to_string(),
            },
        },
        // The raw body can hold the whole completion; keep only the parse error.
        OpenAIError::JSONDeserialize(e, _) => LlmError::Deserialization(e.to_string()),
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg),
        other => LlmError::Provider {
            message: other.to_string(),
        },
    }
}

fn map_api_error(api_err: ApiError) -> LlmError {
    let tags: Vec<String> = [&api_err.code, &api_err.r#type]
        .into_iter()
        .flatten()
        .map(|t| t.to_ascii_lowercase())
        .collect();
    let tagged = |wanted: &[&str]| tags.iter().any(|t| wanted.contains(&t.as_str()));

    if tagged(&[
        "invalid_api_key",
        "authentication_error",
        "unauthenticated",
        "permission_denied",
    ]) {
        LlmError::AuthenticationFailed
    } else if tagged(&["rate_limit_exceeded", "rate_limit_error", "resource_exhausted"]) {
        LlmError::RateLimited {
            retry_after_ms: None,
        }
    } else if tagged(&["server_error", "overloaded_error", "unavailable", "internal"]) {
        LlmError::Overloaded(api_err.message)
    } else if tagged(&[
        "context_length_exceeded",
        "invalid_image_format",
        "image_parse_error",
        "invalid_request_error",
        "invalid_argument",
    ]) {
        // Persona prompt plus a full history window overflowed the model, or
        // the captioner rejected the image bytes.
        LlmError::InvalidRequest(api_err.message)
    } else {
        LlmError::Provider {
            message: api_err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avinci_types::chat::ImageAttachment;
    use avinci_types::llm::Message;

    #[test]
    fn test_openai_factory() {
        let provider = OpenAiCompatibleProvider::openai("sk-test", "gpt-4o", "gpt-4o-mini");
        assert_eq!(LlmProvider::name(&provider), "openai");
        assert_eq!(VisionProvider::name(&provider), "openai");
        assert_eq!(provider.model, "gpt-4o");
        assert_eq!(provider.vision_model, "gpt-4o-mini");
    }

    #[test]
    fn test_gemini_factory() {
        let provider =
            OpenAiCompatibleProvider::gemini("gemini-key", "gemini-2.5-pro", "gemini-2.5-flash");
        assert_eq!(LlmProvider::name(&provider), "gemini");
        assert_eq!(provider.model, "gemini-2.5-pro");
    }

    #[test]
    fn test_mistral_factory() {
        let provider = OpenAiCompatibleProvider::mistral(
            "mistral-key",
            "mistral-large-latest",
            "pixtral-large-latest",
        );
        assert_eq!(LlmProvider::name(&provider), "mistral");
        assert_eq!(provider.vision_model, "pixtral-large-latest");
    }

    #[test]
    fn test_build_request_messages() {
        let provider = OpenAiCompatibleProvider::openai("sk-test", "gpt-4o", "gpt-4o");
        let request = CompletionRequest {
            model: "gpt-4o".to_string(),
            messages: vec![
                Message::system("You are Dana."),
                Message::user("Hello"),
                Message::assistant("Hi there!"),
            ],
            max_tokens: 1000,
            temperature: Some(0.7),
        };

        let oai_req = provider.build_request(&request);
        assert_eq!(oai_req.model, "gpt-4o");
        assert_eq!(oai_req.messages.len(), 3);
        assert!(matches!(
            oai_req.messages[0],
            ChatCompletionRequestMessage::System(_)
        ));
        assert!(matches!(
            oai_req.messages[2],
            ChatCompletionRequestMessage::Assistant(_)
        ));
        assert_eq!(oai_req.max_completion_tokens, Some(1000));
        assert_eq!(oai_req.temperature, Some(0.7));
    }

    #[test]
    fn test_build_request_empty_model_uses_default() {
        let provider = OpenAiCompatibleProvider::openai("sk-test", "gpt-4o", "gpt-4o");
        let request = CompletionRequest {
            model: String::new(),
            messages: vec![],
            max_tokens: 1000,
            temperature: None,
        };

        let oai_req = provider.build_request(&request);
        assert_eq!(oai_req.model, "gpt-4o");
    }

    #[test]
    fn test_build_vision_request_inlines_image() {
        let provider = OpenAiCompatibleProvider::openai("sk-test", "gpt-4o", "gpt-4o-mini");
        let image = ImageAttachment::new(b"abc".to_vec(), "image/png");
        let request = VisionRequest {
            image: &image,
            instruction: "Describe it.",
            max_tokens: 500,
        };

        let oai_req = provider.build_vision_request(&request);
        assert_eq!(oai_req.model, "gpt-4o-mini");
        assert_eq!(oai_req.max_completion_tokens, Some(500));
        assert_eq!(oai_req.messages.len(), 1);

        let ChatCompletionRequestMessage::User(user) = &oai_req.messages[0] else {
            panic!("expected a user message");
        };
        let ChatCompletionRequestUserMessageContent::Array(parts) = &user.content else {
            panic!("expected content parts");
        };
        assert_eq!(parts.len(), 2);
        match &parts[1] {
            ChatCompletionRequestUserMessageContentPart::ImageUrl(part) => {
                assert_eq!(part.image_url.url, "data:image/png;base64,YWJj");
            }
            _ => panic!("expected an image part"),
        }
    }

    fn api_error(code: Option<&str>, kind: Option<&str>, message: &str) -> OpenAIError {
        OpenAIError::ApiError(ApiError {
            message: message.to_string(),
            r#type: kind.map(str::to_string),
            param: None,
            code: code.map(str::to_string),
        })
    }

    #[test]
    fn test_auth_error_by_type() {
        let err = map_openai_error(api_error(
            None,
            Some("authentication_error"),
            "Incorrect API key provided",
        ));
        assert!(matches!(err, LlmError::AuthenticationFailed));
    }

    #[test]
    fn test_gemini_status_names_are_matched() {
        let err = map_openai_error(api_error(Some("RESOURCE_EXHAUSTED"), None, "Quota exceeded"));
        assert!(matches!(err, LlmError::RateLimited { .. }));

        let err = map_openai_error(api_error(None, Some("UNAUTHENTICATED"), "API key not valid"));
        assert!(matches!(err, LlmError::AuthenticationFailed));
    }

    #[test]
    fn test_context_overflow_keeps_provider_message() {
        let err = map_openai_error(api_error(
            Some("context_length_exceeded"),
            Some("invalid_request_error"),
            "This model's maximum context length is 8192 tokens",
        ));
        assert!(matches!(err, LlmError::InvalidRequest(ref msg) if msg.contains("8192")));
    }

    #[test]
    fn test_rejected_image_is_invalid_request() {
        let err = map_openai_error(api_error(Some("invalid_image_format"), None, "bad image"));
        assert!(matches!(err, LlmError::InvalidRequest(_)));
    }

    #[test]
    fn test_overloaded() {
        let err = map_openai_error(api_error(None, Some("overloaded_error"), "try later"));
        assert!(matches!(err, LlmError::Overloaded(ref msg) if msg == "try later"));
    }

    #[test]
    fn test_unknown_api_error_is_provider() {
        let err = map_openai_error(api_error(Some("3051"), Some("mystery"), "odd failure"));
        assert!(matches!(err, LlmError::Provider { ref message } if message.contains("odd failure")));
    }

    #[test]
    fn test_deserialization_drops_body() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = map_openai_error(OpenAIError::JSONDeserialize(
            parse_err,
            "{\"secret\": \"completion text\"".to_string(),
        ));
        assert!(matches!(err, LlmError::Deserialization(ref msg) if !msg.contains("completion text")));
    }

    #[test]
    fn test_invalid_argument() {
        let err = map_openai_error(OpenAIError::InvalidArgument("bad arg".to_string()));
        assert!(matches!(err, LlmError::InvalidRequest(ref msg) if msg == "bad arg"));
    }
}
