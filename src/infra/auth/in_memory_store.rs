// IN-MEMORY implementation of CredentialStore.
//
// Nothing survives the process, so every run starts from a fresh
// authorization. Useful for `--no-cache` runs and for exercising the
// provider against a real store in tests.

use crate::core::auth::{Credential, CredentialStore, StoreError};
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryCredentialStore {
    credential: RwLock<Option<Credential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential: RwLock::new(Some(credential)),
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn load(&self) -> Result<Option<Credential>, StoreError> {
        Ok(self.credential.read().await.clone())
    }

    async fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        *self.credential.write().await = Some(credential.clone());
        Ok(())
    }
}
