//! # Gemini Assistant Backend
//!
//! Calls the Gemini `generateContent` REST endpoint with the full
//! conversation. Any transport, status, or payload problem surfaces as
//! [`TrackerError::AssistantUnavailable`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared::{ChatMessage, ChatRole};
use std::time::Duration;

use crate::domain::assistant::{AssistantBackend, SYSTEM_INSTRUCTION};
use crate::domain::error::TrackerError;

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Connection settings, read from `assistant:` in the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Clone)]
pub struct GeminiBackend {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiBackend {
    pub fn new(config: &GeminiConfig, api_key: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

/// Request body: earlier turns, then the new question
pub fn build_payload(history: &[ChatMessage], message: &str) -> Value {
    let mut contents: Vec<Value> = history
        .iter()
        .map(|m| {
            let role = match m.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "model",
            };
            json!({ "role": role, "parts": [{ "text": m.content }] })
        })
        .collect();
    contents.push(json!({ "role": "user", "parts": [{ "text": message }] }));

    json!({
        "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
        "contents": contents,
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// Concatenated text of the first candidate
pub fn extract_reply(body: &Value) -> Option<String> {
    let response: GenerateContentResponse = serde_json::from_value(body.clone()).ok()?;
    let parts = response.candidates.into_iter().next()?.content?.parts;
    let text: String = parts.into_iter().filter_map(|p| p.text).collect();
    Some(text)
}

fn unavailable(message: impl Into<String>) -> anyhow::Error {
    TrackerError::AssistantUnavailable(message.into()).into()
}

#[async_trait]
impl AssistantBackend for GeminiBackend {
    async fn generate_reply(&self, history: &[ChatMessage], message: &str) -> Result<String> {
        let payload = build_payload(history, message);
        debug!("Sending {} turns to {}", history.len() + 1, self.model);

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .map_err(|e| unavailable(format!("request failed: {}", e)))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| unavailable(format!("unreadable response ({}): {}", status, e)))?;

        if !status.is_success() {
            let detail = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("no error message");
            return Err(unavailable(format!("{} returned {}: {}", self.model, status, detail)));
        }

        extract_reply(&body).ok_or_else(|| unavailable(format!("unexpected payload: {}", body)))
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
