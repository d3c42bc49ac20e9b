use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::core::auth::{Credential, CredentialStore, StoreError};

/// Keeps the cached credential as a single JSON file.
///
/// A missing file means "nothing cached". A file that can't be read or
/// parsed is reported as an error and the provider falls back to a fresh
/// authorization, which then overwrites it.
pub struct JsonCredentialStore {
    path: PathBuf,
}

impl JsonCredentialStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl CredentialStore for JsonCredentialStore {
    async fn load(&self) -> Result<Option<Credential>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let text = fs::read_to_string(&self.path).await?;
        let credential: Credential = serde_json::from_str(&text)?;
        Ok(Some(credential))
    }

    async fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let text = serde_json::to_string_pretty(credential)?;
        fs::write(&self.path, text).await?;
        Ok(())
    }
}
