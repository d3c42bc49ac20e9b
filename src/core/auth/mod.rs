pub mod credential;
pub mod credential_provider;
pub mod credential_store;

pub use credential::Credential;
pub use credential_provider::{
    AuthError, AuthorizationFlow, CredentialProvider, CredentialSource, RefreshError,
    TokenRefresher,
};
pub use credential_store::{CredentialStore, StoreError};
