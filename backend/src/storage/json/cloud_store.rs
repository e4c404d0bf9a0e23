//! # JSON Cloud Store
//!
//! Stands in for the hosted key-value backend. All keys of one user share a
//! single JSON object on disk; a save rewrites that object through a temp
//! file and rename so a crash never leaves half a document behind.

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use serde_json::{Map, Value};
use std::path::Path;
use tokio::fs;
use tokio::sync::Mutex;

use super::connection::JsonConnection;
use crate::storage::latency::LatencyProfile;
use crate::storage::traits::{unavailable, CloudStore};

pub struct JsonFileStore {
    connection: JsonConnection,
    latency: LatencyProfile,
    /// Serialises the read-modify-write of user documents
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(connection: JsonConnection) -> Self {
        Self::with_latency(connection, LatencyProfile::none())
    }

    pub fn with_latency(connection: JsonConnection, latency: LatencyProfile) -> Self {
        info!(
            "JSON cloud store at {} (save latency {:?}, load latency {:?})",
            connection.base_directory().display(),
            latency.save,
            latency.load
        );
        Self {
            connection,
            latency,
            write_lock: Mutex::new(()),
        }
    }

    async fn read_document(path: &Path) -> Result<Map<String, Value>> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(unavailable(&path.display().to_string(), e)),
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        serde_json::from_str(&content).map_err(|e| unavailable(&path.display().to_string(), e))
    }

    async fn write_document(path: &Path, document: &Map<String, Value>) -> Result<()> {
        let content = serde_json::to_string_pretty(document)?;
        let temp_path = path.with_extension("json.tmp");

        fs::write(&temp_path, content)
            .await
            .map_err(|e| unavailable(&temp_path.display().to_string(), e))?;
        fs::rename(&temp_path, path)
            .await
            .map_err(|e| unavailable(&path.display().to_string(), e))?;
        Ok(())
    }
}

#[async_trait]
impl CloudStore for JsonFileStore {
    async fn save(&self, user_id: &str, key: &str, value: Value) -> Result<()> {
        self.latency.before_save().await;

        let path = self.connection.user_document_path(user_id);
        let _guard = self.write_lock.lock().await;

        let mut document = Self::read_document(&path).await?;
        document.insert(key.to_string(), value);
        Self::write_document(&path, &document).await?;

        debug!("Synced '{}' for user {} to {:?}", key, user_id, path);
        Ok(())
    }

    async fn load(&self, user_id: &str, key: &str) -> Result<Option<Value>> {
        self.latency.before_load().await;

        let path = self.connection.user_document_path(user_id);
        let document = Self::read_document(&path).await?;
        Ok(document.get(key).cloned())
    }
}
