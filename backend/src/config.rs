//! # Server Configuration
//!
//! Read from a YAML file, then overridden by environment variables:
//!
//! | Variable                        | Field                      |
//! |---------------------------------|----------------------------|
//! | `PREGNANCY_TRACKER_CONFIG`      | path of the YAML file      |
//! | `PREGNANCY_TRACKER_DATA_DIR`    | `data_dir`                 |
//! | `PREGNANCY_TRACKER_BIND`        | `bind_address`             |
//! | `PREGNANCY_TRACKER_TIMEZONE`    | `timezone`                 |
//! | `GEMINI_API_KEY`                | `assistant.api_key`        |
//!
//! Every field has a default, so an absent file is not an error.

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::domain::{AuthLatency, DayBoundary};
use crate::io::gemini::GeminiConfig;
use crate::storage::{JsonConnection, LatencyProfile};

pub const CONFIG_PATH_ENV: &str = "PREGNANCY_TRACKER_CONFIG";
pub const DATA_DIR_ENV: &str = "PREGNANCY_TRACKER_DATA_DIR";
pub const BIND_ENV: &str = "PREGNANCY_TRACKER_BIND";
pub const TIMEZONE_ENV: &str = "PREGNANCY_TRACKER_TIMEZONE";
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

pub const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where user documents and the session file live
    pub data_dir: Option<PathBuf>,
    pub bind_address: String,
    pub cors_origin: String,
    /// Day boundary for day keys and gestational age
    pub timezone: DayBoundary,
    pub store_latency: LatencyProfile,
    pub auth_latency: AuthLatency,
    /// Keep only the newest N chat messages; unbounded when absent
    pub chat_history_cap: Option<usize>,
    pub assistant: GeminiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            bind_address: "127.0.0.1:3000".to_string(),
            cors_origin: "http://localhost:8080".to_string(),
            timezone: DayBoundary::Utc,
            store_latency: LatencyProfile::none(),
            auth_latency: AuthLatency::default(),
            chat_history_cap: None,
            assistant: GeminiConfig::default(),
        }
    }
}

impl AppConfig {
    /// File named by `PREGNANCY_TRACKER_CONFIG`, else `config.yaml` in the
    /// default data directory if present, then environment overrides
    pub fn load() -> Result<Self> {
        let path = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Some(PathBuf::from(path)),
            Err(_) => JsonConnection::default_data_directory()
                .ok()
                .map(|dir| dir.join(CONFIG_FILE_NAME))
                .filter(|candidate| candidate.exists()),
        };

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => {
                info!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply overrides from `lookup`, usually the process environment
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(bind) = lookup(BIND_ENV).filter(|v| !v.trim().is_empty()) {
            self.bind_address = bind;
        }
        if let Some(timezone) = lookup(TIMEZONE_ENV) {
            self.timezone = DayBoundary::parse(&timezone)
                .with_context(|| format!("{} is not a valid timezone", TIMEZONE_ENV))?;
        }
        if let Some(key) = lookup(GEMINI_API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.assistant.api_key = Some(key);
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_address
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", self.bind_address))
    }

    pub fn data_directory(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => JsonConnection::default_data_directory(),
        }
    }

    /// API key when one is configured and non-blank
    pub fn gemini_api_key(&self) -> Option<&str> {
        let key = self.assistant.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty());
        if key.is_none() {
            warn!("No Gemini API key configured, the assistant will use scripted replies");
        }
        key
    }
}
