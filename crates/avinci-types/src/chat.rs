//! Conversation turn, session key, and chat request/response types for Avinci.
//!
//! These types model a conversation between an operator and a persona agent:
//! immutable turns, the (agent, caller) session key, and the wire shapes of a
//! chat turn request and response. Field names serialize in camelCase to match
//! the public chat API.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generation metadata attached to agent-authored turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnMetadata {
    /// Wall-clock latency of the generation call in milliseconds.
    pub processing_time: u64,
    /// Completion tokens reported by the backend.
    pub tokens: u32,
    /// Model that produced the text.
    pub model: String,
}

/// A single immutable turn within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    pub id: String,
    pub text: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
    pub agent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TurnMetadata>,
}

impl ConversationTurn {
    /// A turn authored by the operator.
    pub fn user(agent_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: new_turn_id(),
            text: text.into(),
            is_user: true,
            timestamp: Utc::now(),
            agent_id: agent_id.into(),
            metadata: None,
        }
    }

    /// A turn authored by the persona agent.
    pub fn agent(
        agent_id: impl Into<String>,
        text: impl Into<String>,
        metadata: TurnMetadata,
    ) -> Self {
        Self {
            id: new_turn_id(),
            text: text.into(),
            is_user: false,
            timestamp: Utc::now(),
            agent_id: agent_id.into(),
            metadata: Some(metadata),
        }
    }
}

fn new_turn_id() -> String {
    format!("msg_{}", Uuid::now_v7().simple())
}

/// A prior turn supplied by the caller alongside a chat request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub text: String,
    #[serde(default)]
    pub is_user: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Anything that can stand in the context window as a prior turn.
pub trait DialogueTurn {
    fn text(&self) -> &str;
    fn is_user(&self) -> bool;
}

impl DialogueTurn for ConversationTurn {
    fn text(&self) -> &str {
        &self.text
    }

    fn is_user(&self) -> bool {
        self.is_user
    }
}

impl DialogueTurn for HistoryEntry {
    fn text(&self) -> &str {
        &self.text
    }

    fn is_user(&self) -> bool {
        self.is_user
    }
}

/// Addresses one conversation session: a persona agent and the caller talking to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub agent_id: String,
    pub caller: String,
}

impl SessionKey {
    pub fn new(agent_id: impl Into<String>, caller: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            caller: caller.into(),
        }
    }
}

/// Log label only. Underscores in either part make it ambiguous, so stores
/// key on the two fields, never on this string.
impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chat_session_{}_{}", self.agent_id, self.caller)
    }
}

/// An image attached to a chat turn, already decoded to raw bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl ImageAttachment {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }
}

// Payloads can be megabytes; keep them out of logs.
impl fmt::Debug for ImageAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAttachment")
            .field("mime_type", &self.mime_type)
            .field("len", &self.data.len())
            .finish()
    }
}

/// A single chat turn request from the operator.
#[derive(Debug, Clone, Default)]
pub struct ChatTurnRequest {
    pub agent_id: String,
    pub text: String,
    /// Prior turns supplied by the caller; when empty the stored session is used.
    pub conversation_history: Vec<HistoryEntry>,
    pub image: Option<ImageAttachment>,
}

/// The engine's answer to a chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurnResponse {
    pub message: ConversationTurn,
    pub agent_id: String,
    pub processing_time: u64,
    pub tokens: u32,
}
