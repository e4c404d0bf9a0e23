//! # Assistant Service
//!
//! Owns the persisted chat transcript. A question is saved before the
//! backend is asked, so it survives a failed call; the reply is appended in a
//! second locked read-modify-write once it arrives.

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{error, info};
use shared::{ChatMessage, ChatRole};
use std::sync::Arc;

use super::assistant::AssistantBackend;
use super::commands::chat::{SendMessageCommand, SendMessageResult};
use super::error::ProfileValidationError;
use super::history::{append_entry_capped, latest_entries, recent_by_role};
use super::write_locks::KeyedWriteLocks;
use crate::storage::{load_list, save_typed, CloudStore, StoreKey};

/// Reply used when the backend answers with nothing but formatting
pub const EMPTY_REPLY_FALLBACK: &str = "對不起，我現在無法回答這個問題。";

pub const NEW_TOPIC_GREETING: &str = "好的！我們開始一個新的話題。請問有什麼我可以幫妳的嗎？";

const NAME_PREFIX: &str = "準媽媽";

#[derive(Clone)]
pub struct AssistantService {
    store: Arc<dyn CloudStore>,
    backend: Arc<dyn AssistantBackend>,
    locks: KeyedWriteLocks,
    history_cap: Option<usize>,
}

impl AssistantService {
    pub fn new(
        store: Arc<dyn CloudStore>,
        backend: Arc<dyn AssistantBackend>,
        locks: KeyedWriteLocks,
        history_cap: Option<usize>,
    ) -> Self {
        Self { store, backend, locks, history_cap }
    }

    /// Opening message addressed to the user's given name
    pub fn greeting(&self, display_name: Option<&str>, now: DateTime<Utc>) -> ChatMessage {
        let salutation = match given_name(display_name) {
            Some(name) => format!("{} {} 妳好！", NAME_PREFIX, name),
            None => format!("{}妳好！", NAME_PREFIX),
        };
        ChatMessage::assistant(
            format!("{}我是小達 🐻‍❄️ 很高興能為妳服務，今天想聊聊什麼呢？", salutation),
            now,
        )
    }

    pub fn new_topic_greeting(&self, now: DateTime<Utc>) -> ChatMessage {
        ChatMessage::assistant(NEW_TOPIC_GREETING, now)
    }

    pub async fn send_message(&self, command: SendMessageCommand, now: DateTime<Utc>) -> Result<SendMessageResult> {
        let SendMessageCommand { user_id, content, context } = command;
        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(ProfileValidationError::EmptyMessage.into());
        }

        let user_message = ChatMessage::user(content.clone(), now);
        self.append(&user_id, user_message.clone()).await?;
        info!("Stored question from user {} ({} chars)", user_id, content.chars().count());

        let reply_text = match self.backend.generate_reply(&context, &content).await {
            Ok(text) => text,
            Err(e) => {
                error!("Assistant backend '{}' failed for user {}: {}", self.backend.name(), user_id, e);
                return Ok(SendMessageResult { user_message, reply: None });
            }
        };

        let reply = ChatMessage::assistant(sanitize_reply(&reply_text), now);
        self.append(&user_id, reply.clone()).await?;
        info!("Stored reply from '{}' for user {}", self.backend.name(), user_id);

        Ok(SendMessageResult { user_message, reply: Some(reply) })
    }

    pub async fn chat_history(&self, user_id: &str) -> Result<Vec<ChatMessage>> {
        load_list(self.store.as_ref(), user_id, StoreKey::ChatHistory).await
    }

    /// Questions asked within the last `days` days, newest first
    pub async fn recent_queries(&self, user_id: &str, days: i64, now: DateTime<Utc>) -> Result<Vec<ChatMessage>> {
        let history = self.chat_history(user_id).await?;
        Ok(recent_by_role(&history, ChatRole::User, days, now).cloned().collect())
    }

    /// Questions among the last `count` messages, newest first
    pub async fn recent_interactions(&self, user_id: &str, count: usize) -> Result<Vec<ChatMessage>> {
        let history = self.chat_history(user_id).await?;
        Ok(latest_entries(&history, count)
            .into_iter()
            .filter(|message| message.role == ChatRole::User)
            .collect())
    }

    async fn append(&self, user_id: &str, message: ChatMessage) -> Result<()> {
        let _guard = self.locks.acquire(user_id, StoreKey::ChatHistory).await;
        let history = self.chat_history(user_id).await?;
        let history = append_entry_capped(history, message, self.history_cap);
        save_typed(self.store.as_ref(), user_id, StoreKey::ChatHistory, &history).await
    }
}

/// First word of the display name, skipping the 準媽媽 prefix
fn given_name(display_name: Option<&str>) -> Option<&str> {
    display_name?
        .trim()
        .trim_start_matches(NAME_PREFIX)
        .split_whitespace()
        .next()
}

fn sanitize_reply(text: &str) -> String {
    let cleaned = text.replace('*', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        EMPTY_REPLY_FALLBACK.to_string()
    } else {
        cleaned.to_string()
    }
}
