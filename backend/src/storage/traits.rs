//! # Storage Traits
//!
//! Abstractions over the mocked cloud backend so services can run against
//! files on disk or in-memory maps without modification.

use anyhow::Result;
use async_trait::async_trait;
use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared::User;
use std::fmt;

use crate::domain::error::TrackerError;

/// Logical keys stored per user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// `{startDate?, dueDate?, updatedAt}`
    ProfileSettings,
    /// Latest selected mood label
    DailyMood,
    /// Up to 14 `{date, mood}` entries
    MoodHistory,
    /// Full chat transcript
    ChatHistory,
}

impl StoreKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::ProfileSettings => "profile_settings",
            StoreKey::DailyMood => "daily_mood",
            StoreKey::MoodHistory => "mood_history",
            StoreKey::ChatHistory => "chat_history",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Key-value gateway keyed by (user id, logical key).
///
/// `save` overwrites unconditionally (last write wins). `load` returns
/// `None` for keys never written. Implementations report transport problems
/// as [`TrackerError::PersistenceUnavailable`].
#[async_trait]
pub trait CloudStore: Send + Sync {
    async fn save(&self, user_id: &str, key: &str, value: Value) -> Result<()>;

    async fn load(&self, user_id: &str, key: &str) -> Result<Option<Value>>;
}

/// Persisted signed-in user, restored at startup
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn load_user(&self) -> Result<Option<User>>;

    async fn store_user(&self, user: &User) -> Result<()>;

    async fn clear_user(&self) -> Result<()>;
}

/// Load and decode a value.
///
/// A stored `null` or a value that no longer matches `T` reads as absent, so
/// a damaged record degrades to defaults instead of failing the request.
pub async fn load_typed<T: DeserializeOwned>(
    store: &dyn CloudStore,
    user_id: &str,
    key: StoreKey,
) -> Result<Option<T>> {
    let value = match store.load(user_id, key.as_str()).await? {
        Some(Value::Null) | None => return Ok(None),
        Some(value) => value,
    };

    match serde_json::from_value(value) {
        Ok(decoded) => Ok(Some(decoded)),
        Err(e) => {
            warn!("Ignoring unreadable '{}' for user {}: {}", key, user_id, e);
            Ok(None)
        }
    }
}

/// Load a stored list, decoding entry by entry.
///
/// Entries that no longer decode are dropped with a warning while the rest
/// survive, so the next read-modify-write keeps them.
pub async fn load_list<T: DeserializeOwned>(
    store: &dyn CloudStore,
    user_id: &str,
    key: StoreKey,
) -> Result<Vec<T>> {
    let items = match store.load(user_id, key.as_str()).await? {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => return Ok(Vec::new()),
        Some(other) => {
            warn!("Ignoring non-list '{}' for user {}: {}", key, user_id, other);
            return Ok(Vec::new());
        }
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!("Dropping unreadable '{}' entry {} for user {}: {}", key, index, user_id, e);
                None
            }
        })
        .collect())
}

pub async fn save_typed<T: Serialize + ?Sized>(
    store: &dyn CloudStore,
    user_id: &str,
    key: StoreKey,
    value: &T,
) -> Result<()> {
    let value = serde_json::to_value(value)?;
    store.save(user_id, key.as_str(), value).await
}

/// Wrap a transport failure so the REST layer can recognise it
pub(crate) fn unavailable(context: &str, error: impl fmt::Display) -> anyhow::Error {
    anyhow::Error::new(TrackerError::PersistenceUnavailable(format!("{}: {}", context, error)))
}
