//! Chat turn HTTP handler.
//!
//! Endpoint:
//! - POST /api/chat - Run one persona-conditioned chat turn
//!
//! Images arrive base64-encoded in the JSON body, optionally as a full
//! `data:<mime>;base64,` URL. The size ceiling applies to the decoded bytes.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use avinci_types::chat::{ChatTurnRequest, ChatTurnResponse, HistoryEntry, ImageAttachment};
use avinci_types::error::ChatError;

use crate::http::error::AppError;
use crate::http::extractors::caller::Caller;
use crate::state::AppState;

/// Request body for a chat turn.
///
/// `agentId` and `text` default to empty so that missing fields surface as
/// validation errors from the engine rather than as decode failures.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    #[serde(default)]
    pub agent_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub conversation_history: Vec<HistoryEntry>,
    #[serde(default)]
    pub image: Option<ImagePayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    /// Base64 payload or a `data:` URL.
    pub data: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// POST /api/chat - Run one chat turn.
pub async fn chat_turn(
    State(state): State<AppState>,
    Caller(caller): Caller,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Json<ChatTurnResponse>, AppError> {
    let Json(body) = body?;

    let image = body.image.map(decode_image).transpose()?;
    let request = ChatTurnRequest {
        agent_id: body.agent_id,
        text: body.text,
        conversation_history: body.conversation_history,
        image,
    };

    let response = state.chat_engine.chat_turn(request, &caller).await?;
    Ok(Json(response))
}

/// Decode an inline image. A `data:` URL supplies the mime type when the
/// payload does not name one.
pub fn decode_image(payload: ImagePayload) -> Result<ImageAttachment, ChatError> {
    let (url_mime, encoded) = split_data_url(&payload.data);

    let mime_type = payload
        .mime_type
        .filter(|mime| !mime.trim().is_empty())
        .or(url_mime)
        .ok_or_else(|| ChatError::Validation("image mimeType is required".to_string()))?;

    let data = STANDARD
        .decode(encoded.trim())
        .map_err(|_| ChatError::Validation("image data is not valid base64".to_string()))?;

    Ok(ImageAttachment::new(data, mime_type))
}

fn split_data_url(data: &str) -> (Option<String>, &str) {
    if let Some(rest) = data.strip_prefix("data:")
        && let Some((header, encoded)) = rest.split_once(',')
        && let Some(mime) = header.strip_suffix(";base64")
    {
        let mime = (!mime.is_empty()).then(|| mime.to_string());
        return (mime, encoded);
    }
    (None, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(data: &str, mime_type: Option<&str>) -> ImagePayload {
        ImagePayload {
            data: data.to_string(),
            mime_type: mime_type.map(str::to_string),
        }
    }

    #[test]
    fn test_decode_plain_base64() {
        let image = decode_image(payload("YWJj", Some("image/png"))).unwrap();
        assert_eq!(image.data, b"abc");
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn test_decode_data_url_supplies_mime() {
        let image = decode_image(payload("data:image/jpeg;base64,YWJj", None)).unwrap();
        assert_eq!(image.data, b"abc");
        assert_eq!(image.mime_type, "image/jpeg");
    }

    #[test]
    fn test_explicit_mime_wins_over_data_url() {
        let image = decode_image(payload("data:image/jpeg;base64,YWJj", Some("image/webp"))).unwrap();
        assert_eq!(image.mime_type, "image/webp");
    }

    #[test]
    fn test_invalid_base64_is_validation_error() {
        let err = decode_image(payload("not base64!!", Some("image/png"))).unwrap_err();
        assert!(matches!(err, ChatError::Validation(_)));
    }

    #[test]
    fn test_missing_mime_is_validation_error() {
        let err = decode_image(payload("YWJj", None)).unwrap_err();
        assert!(matches!(err, ChatError::Validation(ref msg) if msg.contains("mimeType")));
    }

    #[test]
    fn test_body_defaults_missing_fields() {
        let body: ChatBody = serde_json::from_str(r#"{"text":"hi"}"#).unwrap();
        assert!(body.agent_id.is_empty());
        assert!(body.conversation_history.is_empty());
        assert!(body.image.is_none());
    }
}
