use super::client_registration::ClientRegistration;
use super::installed_app_flow::InstalledAppFlow;
use super::service_account::ServiceAccountFlow;
use crate::core::auth::{AuthError, AuthorizationFlow, Credential};
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

/// Scopes the curriculum pipeline needs: create/edit its own Drive files
/// and write Docs.
pub const GOOGLE_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/drive.file",
    "https://www.googleapis.com/auth/documents",
];

/// The interactive step of the credential chain.
///
/// The registration file is read on every authorization, not at startup, so
/// the server can run (and serve the form) before the user has downloaded
/// it.
pub struct GoogleAuthorizationFlow {
    client: Client,
    registration_path: PathBuf,
    scopes: Vec<String>,
    redirect_port: u16,
    timeout: Duration,
}

impl GoogleAuthorizationFlow {
    pub fn new(
        client: Client,
        registration_path: PathBuf,
        redirect_port: u16,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            registration_path,
            scopes: GOOGLE_SCOPES.iter().map(|s| s.to_string()).collect(),
            redirect_port,
            timeout,
        }
    }
}

#[async_trait]
impl AuthorizationFlow for GoogleAuthorizationFlow {
    async fn authorize(&self) -> Result<Credential, AuthError> {
        match ClientRegistration::load(&self.registration_path).await? {
            ClientRegistration::OAuthClient(secrets) => {
                tracing::info!("Starting browser authorization");
                InstalledAppFlow::new(
                    self.client.clone(),
                    secrets,
                    self.scopes.clone(),
                    self.redirect_port,
                    self.timeout,
                )
                .run()
                .await
            }
            ClientRegistration::ServiceAccount(key) => {
                tracing::info!("Authorizing as service account");
                ServiceAccountFlow::new(self.client.clone(), key, self.scopes.clone())
                    .run()
                    .await
            }
        }
    }
}
