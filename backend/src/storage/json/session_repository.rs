use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use shared::User;
use tokio::fs;

use super::connection::JsonConnection;
use crate::storage::traits::SessionStorage;

/// Keeps the signed-in user in `session.yaml`
#[derive(Debug, Clone)]
pub struct YamlSessionRepository {
    connection: JsonConnection,
}

impl YamlSessionRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl SessionStorage for YamlSessionRepository {
    async fn load_user(&self) -> Result<Option<User>> {
        let path = self.connection.session_path();
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
        };

        match serde_yaml::from_str::<User>(&content) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!("Ignoring unreadable session file {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    async fn store_user(&self, user: &User) -> Result<()> {
        let path = self.connection.session_path();
        let yaml_content = serde_yaml::to_string(user)?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, yaml_content).await?;
        fs::rename(&temp_path, &path).await?;

        debug!("Saved session for user {} to {:?}", user.uid, path);
        Ok(())
    }

    async fn clear_user(&self) -> Result<()> {
        let path = self.connection.session_path();
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}
