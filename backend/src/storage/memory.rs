//! In-memory backends.
//!
//! Behave like the file store (overwrite semantics, latency, failure
//! reporting) without touching disk. Tests can flip a store offline to
//! exercise the `PersistenceUnavailable` path.

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serde_json::{Map, Value};
use shared::User;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::latency::LatencyProfile;
use super::traits::{unavailable, CloudStore, SessionStorage};

#[derive(Clone, Default)]
pub struct InMemoryStore {
    documents: Arc<RwLock<HashMap<String, Map<String, Value>>>>,
    latency: LatencyProfile,
    offline: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: LatencyProfile) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Make every following call fail as if the backend were unreachable
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(unavailable("in-memory store", "backend offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl CloudStore for InMemoryStore {
    async fn save(&self, user_id: &str, key: &str, value: Value) -> Result<()> {
        self.latency.before_save().await;
        self.check_online()?;

        let mut documents = self.documents.write().await;
        documents
            .entry(user_id.to_string())
            .or_default()
            .insert(key.to_string(), value);

        debug!("Stored '{}' for user {} in memory", key, user_id);
        Ok(())
    }

    async fn load(&self, user_id: &str, key: &str) -> Result<Option<Value>> {
        self.latency.before_load().await;
        self.check_online()?;

        let documents = self.documents.read().await;
        Ok(documents
            .get(user_id)
            .and_then(|document| document.get(key))
            .cloned())
    }
}

#[derive(Clone, Default)]
pub struct InMemorySessionStorage {
    user: Arc<RwLock<Option<User>>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: User) -> Self {
        Self {
            user: Arc::new(RwLock::new(Some(user))),
        }
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn load_user(&self) -> Result<Option<User>> {
        Ok(self.user.read().await.clone())
    }

    async fn store_user(&self, user: &User) -> Result<()> {
        *self.user.write().await = Some(user.clone());
        Ok(())
    }

    async fn clear_user(&self) -> Result<()> {
        *self.user.write().await = None;
        Ok(())
    }
}
