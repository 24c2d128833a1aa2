use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::session::{HistoryEntry, Role};
use crate::store::{ChatRecord, MessageRecord};

use super::AppState;

/// Incoming body of `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<IncomingMessage>,
    #[serde(default, rename = "chatId")]
    pub chat_id: Option<Uuid>,
}

/// One `{role, content}` entry from the UI.
#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub role: Role,
    pub content: String,
}

/// Response body of `POST /api/chat`.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
    #[serde(rename = "chatId")]
    pub chat_id: Uuid,
}

/// Boundary-layer failures, mapped onto HTTP statuses.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    BadRequest(&'static str),
    Internal(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": msg })),
            )
                .into_response(),
        }
    }
}

/// `POST /api/chat` — one user message in, one assistant reply out.
///
/// Persists the user message before running the turn; on turn failure
/// the reply is never partially returned (the saved user message stays
/// for retry).
pub async fn chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let user_id = state
        .auth
        .resolve(&headers)
        .await
        .ok_or(ApiError::Unauthorized)?;

    let Some(last) = request.messages.last() else {
        return Err(ApiError::BadRequest("No messages provided"));
    };
    if last.role != Role::User {
        return Err(ApiError::BadRequest("Last message must be from user"));
    }
    let user_text = last.content.clone();

    let chat_id = state
        .store
        .get_or_create_chat(&user_id, request.chat_id, &user_text)
        .await
        .map_err(|e| {
            error!("Failed to resolve chat: {e}");
            ApiError::Internal("Failed to create chat")
        })?;

    state
        .store
        .append_message(chat_id, Role::User, &user_text)
        .await
        .map_err(|e| {
            error!("Failed to save user message: {e}");
            ApiError::Internal("Failed to save user message")
        })?;

    let history: Vec<HistoryEntry> = request.messages[..request.messages.len() - 1]
        .iter()
        .map(|msg| HistoryEntry::new(msg.role, msg.content.clone()))
        .collect();

    let reply = state
        .runner
        .run_turn(&user_text, &history)
        .await
        .map_err(|e| {
            error!("Turn failed: {e}");
            ApiError::Internal("Failed to generate AI response")
        })?;

    // The reply still goes back to the user if persisting it fails.
    if let Err(e) = state
        .store
        .append_message(chat_id, Role::Assistant, &reply)
        .await
    {
        error!("Failed to save assistant message: {e}");
    }

    Ok(Json(ChatResponse {
        message: reply,
        chat_id,
    }))
}

/// `GET /api/chats` — the caller's chats, most recent first.
pub async fn list_chats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ChatRecord>>, ApiError> {
    let user_id = state
        .auth
        .resolve(&headers)
        .await
        .ok_or(ApiError::Unauthorized)?;

    let chats = state.store.list_chats(&user_id).await.map_err(|e| {
        error!("Failed to list chats: {e}");
        ApiError::Internal("Internal server error")
    })?;

    Ok(Json(chats))
}

/// `GET /api/chats/{chat_id}/messages` — a chat's messages in order.
pub async fn list_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(chat_id): Path<Uuid>,
) -> Result<Json<Vec<MessageRecord>>, ApiError> {
    state
        .auth
        .resolve(&headers)
        .await
        .ok_or(ApiError::Unauthorized)?;

    let messages = state.store.list_messages(chat_id).await.map_err(|e| {
        error!("Failed to list messages: {e}");
        ApiError::Internal("Internal server error")
    })?;

    Ok(Json(messages))
}
