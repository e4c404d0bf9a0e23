use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIRECTORY: &str = "Pregnancy Companion";
const USERS_DIRECTORY: &str = "users";
const SESSION_FILE: &str = "session.yaml";

/// JsonConnection resolves where each user's document and the session file live
#[derive(Debug, Clone)]
pub struct JsonConnection {
    base_directory: PathBuf,
}

impl JsonConnection {
    /// Create a connection rooted at `base_directory`, creating it if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();
        fs::create_dir_all(base_path.join(USERS_DIRECTORY))
            .with_context(|| format!("Failed to create data directory {}", base_path.display()))?;

        Ok(Self {
            base_directory: base_path,
        })
    }

    /// Platform data directory, e.g. `~/.local/share/Pregnancy Companion`
    pub fn new_default() -> Result<Self> {
        let directory = Self::default_data_directory()?;
        info!("Using default data directory: {}", directory.display());
        Self::new(directory)
    }

    pub fn default_data_directory() -> Result<PathBuf> {
        let root = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| anyhow::anyhow!("Could not determine a data directory"))?;
        Ok(root.join(APP_DIRECTORY))
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Path of the JSON document holding every key for `user_id`
    pub fn user_document_path(&self, user_id: &str) -> PathBuf {
        self.base_directory
            .join(USERS_DIRECTORY)
            .join(format!("{}.json", Self::safe_file_stem(user_id)))
    }

    pub fn session_path(&self) -> PathBuf {
        self.base_directory.join(SESSION_FILE)
    }

    /// Reduce an id to characters that are safe in a file name.
    ///
    /// ASCII letters, digits and `-` pass through; every other byte becomes
    /// `_` plus two hex digits, so distinct ids never share a file.
    /// "google-mock-id-ab12" stays as is, "a.b" becomes "a_2eb".
    pub fn safe_file_stem(user_id: &str) -> String {
        if user_id.is_empty() {
            return "_".to_string();
        }

        let mut stem = String::with_capacity(user_id.len());
        for byte in user_id.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                stem.push(char::from(byte));
            } else {
                stem.push_str(&format!("_{:02x}", byte));
            }
        }
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_creates_users_directory() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("nested").join("data");
        let connection = JsonConnection::new(&base).unwrap();

        assert!(base.join("users").is_dir());
        assert_eq!(connection.base_directory(), base.as_path());
        assert_eq!(connection.session_path(), base.join("session.yaml"));
    }

    #[test]
    fn test_user_document_path_is_sanitised() {
        let temp_dir = TempDir::new().unwrap();
        let connection = JsonConnection::new(temp_dir.path()).unwrap();

        let path = connection.user_document_path("google-mock-id-ab12cd34e");
        assert!(path.ends_with("users/google-mock-id-ab12cd34e.json"));

        let path = connection.user_document_path("../escape");
        assert!(path.ends_with("users/_2e_2e_2fescape.json"));

        assert_eq!(JsonConnection::safe_file_stem(""), "_");
    }

    #[test]
    fn test_distinct_ids_get_distinct_files() {
        assert_eq!(JsonConnection::safe_file_stem("a.b"), "a_2eb");
        assert_eq!(JsonConnection::safe_file_stem("a_b"), "a_5fb");
        assert_ne!(
            JsonConnection::safe_file_stem("a.b"),
            JsonConnection::safe_file_stem("a_b")
        );
        assert_eq!(JsonConnection::safe_file_stem("媽"), "_e5_aa_bd");
    }
}
