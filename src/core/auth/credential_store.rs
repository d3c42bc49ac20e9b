use super::credential::Credential;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Where the single cached credential lives between runs.
///
/// `load` distinguishes "nothing cached" (`Ok(None)`) from "something is
/// there but unusable" (`Err`). The provider treats both the same way, but
/// only the second one is worth a warning.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self) -> Result<Option<Credential>, StoreError>;
    async fn save(&self, credential: &Credential) -> Result<(), StoreError>;
}

// Lets the composition root choose the backing store at runtime.
#[async_trait]
impl CredentialStore for Box<dyn CredentialStore> {
    async fn load(&self) -> Result<Option<Credential>, StoreError> {
        (**self).load().await
    }

    async fn save(&self, credential: &Credential) -> Result<(), StoreError> {
        (**self).save(credential).await
    }
}
