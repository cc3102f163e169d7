//! Conversation history HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/chat/history/{agentId} - Stored turns, oldest first
//! - DELETE /api/chat/history/{agentId} - Drop the stored conversation

use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};

use crate::http::error::AppError;
use crate::http::extractors::caller::Caller;
use crate::state::AppState;

/// GET /api/chat/history/{agentId} - Read the caller's conversation with an agent.
pub async fn get_history(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(agent_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let conversation = state.chat_engine.history(&agent_id, &caller).await?;
    Ok(Json(json!({ "conversation": conversation })))
}

/// DELETE /api/chat/history/{agentId} - Clear the caller's conversation with an agent.
pub async fn clear_history(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(agent_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.chat_engine.clear_history(&agent_id, &caller).await?;
    Ok(Json(json!({ "success": true })))
}
