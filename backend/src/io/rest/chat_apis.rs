//! # REST API for the Chat Assistant

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use log::info;
use serde::Deserialize;

use super::mappers::to_send_message_response;
use super::{error_response, validate_days, SignedInUser};
use crate::domain::commands::chat::SendMessageCommand;
use crate::domain::history::RECENT_QUERY_DAYS;
use crate::AppState;
use shared::{ChatHistoryResponse, GreetingResponse, SendMessageRequest};

/// Longest look-back for the recent questions list
pub const MAX_RECENT_DAYS: i64 = 366;

#[derive(Debug, Deserialize)]
pub struct GreetingQuery {
    /// Greet for a fresh topic instead of a fresh session
    #[serde(default)]
    pub new_topic: bool,
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub days: Option<i64>,
}

pub async fn get_greeting(
    State(state): State<AppState>,
    SignedInUser(user): SignedInUser,
    Query(query): Query<GreetingQuery>,
) -> impl IntoResponse {
    info!("GET /api/chat/greeting - user: {}, new_topic: {}", user.uid, query.new_topic);

    let now = Utc::now();
    let message = if query.new_topic {
        state.assistant_service.new_topic_greeting(now)
    } else {
        state.assistant_service.greeting(user.display_name.as_deref(), now)
    };
    (StatusCode::OK, Json(GreetingResponse { message }))
}

pub async fn get_chat_history(
    State(state): State<AppState>,
    SignedInUser(user): SignedInUser,
) -> impl IntoResponse {
    info!("GET /api/chat/history - user: {}", user.uid);

    match state.assistant_service.chat_history(&user.uid).await {
        Ok(messages) => (StatusCode::OK, Json(ChatHistoryResponse { messages })).into_response(),
        Err(e) => error_response("Failed to load chat history", e),
    }
}

/// Store the question, ask the assistant, store the reply.
///
/// A failed assistant call still answers `200`; `reply` is then `null`.
pub async fn send_message(
    State(state): State<AppState>,
    SignedInUser(user): SignedInUser,
    Json(request): Json<SendMessageRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/chat/messages - user: {}, {} context messages",
        user.uid,
        request.context.len()
    );

    let command = SendMessageCommand {
        user_id: user.uid,
        content: request.content,
        context: request.context,
    };
    match state.assistant_service.send_message(command, Utc::now()).await {
        Ok(result) => (StatusCode::OK, Json(to_send_message_response(result))).into_response(),
        Err(e) => error_response("Failed to send message", e),
    }
}

pub async fn get_recent_queries(
    State(state): State<AppState>,
    SignedInUser(user): SignedInUser,
    Query(query): Query<RecentQuery>,
) -> impl IntoResponse {
    info!("GET /api/chat/recent - user: {}, query: {:?}", user.uid, query);

    let days = match validate_days(query.days.unwrap_or(RECENT_QUERY_DAYS), 0, MAX_RECENT_DAYS) {
        Ok(days) => days,
        Err(e) => return error_response("Rejected look-back window", e.into()),
    };

    match state.assistant_service.recent_queries(&user.uid, days, Utc::now()).await {
        Ok(messages) => (StatusCode::OK, Json(ChatHistoryResponse { messages })).into_response(),
        Err(e) => error_response("Failed to load recent queries", e),
    }
}
