// This is the credential module's business logic: decide which credential
// to hand out. It knows nothing about Google, HTTP or files. The cache, the
// refresh call and the interactive consent flow are all injected, so the
// priority chain below can be tested with in-memory fakes.

use super::credential::Credential;
use super::credential_store::CredentialStore;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::Mutex;

// ============================================================================
// ERRORS
// ============================================================================

/// Fatal authentication failures. Any of these aborts the current run.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(
        "Client registration file not found at {0}. Download it from Google Cloud Console \
         and place it next to the app."
    )]
    ClientRegistrationMissing(PathBuf),

    #[error("Client registration file is invalid: {0}")]
    InvalidClientRegistration(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),
}

/// The refresh token was rejected or could not be used. Not fatal: the
/// provider falls back to the interactive flow.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Credential has no refresh token")]
    MissingRefreshToken,

    #[error("Credential lacks client information needed to refresh: {0}")]
    MissingClientInfo(&'static str),

    #[error("Refresh rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Refresh request failed: {0}")]
    Transport(String),
}

// ============================================================================
// PORTS
// ============================================================================

/// Exchanges a credential's refresh token for a fresh access token.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, credential: &Credential) -> Result<Credential, RefreshError>;
}

/// Obtains a brand-new credential, usually with the user's help (browser
/// consent).
#[async_trait]
pub trait AuthorizationFlow: Send + Sync {
    async fn authorize(&self) -> Result<Credential, AuthError>;
}

/// Anything that can hand the pipeline a usable credential.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn acquire(&self) -> Result<Credential, AuthError>;
}

#[async_trait]
impl CredentialSource for Box<dyn CredentialSource> {
    async fn acquire(&self) -> Result<Credential, AuthError> {
        (**self).acquire().await
    }
}

// ============================================================================
// PROVIDER
// ============================================================================

/// Produces a valid credential using, in order: the cached one, a refreshed
/// one, or a freshly authorized one.
pub struct CredentialProvider<S, R, F>
where
    S: CredentialStore,
    R: TokenRefresher,
    F: AuthorizationFlow,
{
    store: S,
    refresher: R,
    flow: F,
    // Serializes acquisitions inside this process so two form submissions
    // don't both open a consent page and race on the cache file.
    in_flight: Mutex<()>,
}

impl<S, R, F> CredentialProvider<S, R, F>
where
    S: CredentialStore,
    R: TokenRefresher,
    F: AuthorizationFlow,
{
    pub fn new(store: S, refresher: R, flow: F) -> Self {
        Self {
            store,
            refresher,
            flow,
            in_flight: Mutex::new(()),
        }
    }

    pub async fn acquire(&self) -> Result<Credential, AuthError> {
        let _guard = self.in_flight.lock().await;

        let cached = match self.store.load().await {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!("Ignoring unreadable credential cache: {}", e);
                None
            }
        };

        let credential = match cached {
            Some(cached) if cached.is_valid() => {
                tracing::debug!("Using cached credential");
                cached
            }
            Some(cached) if cached.can_refresh() => self.refresh_or_authorize(&cached).await?,
            Some(_) => {
                tracing::info!("Cached credential expired and cannot be refreshed");
                self.authorize().await?
            }
            None => self.authorize().await?,
        };

        if let Err(e) = self.store.save(&credential).await {
            tracing::warn!("Failed to persist credential cache: {}", e);
        }

        Ok(credential)
    }

    async fn refresh_or_authorize(&self, cached: &Credential) -> Result<Credential, AuthError> {
        tracing::info!("Cached credential expired, refreshing");
        match self.refresher.refresh(cached).await {
            Ok(refreshed) => Ok(refreshed),
            Err(e) => {
                // The old refresh token is dropped here without being revoked.
                tracing::warn!("Failed to refresh token: {}. Re-authenticating.", e);
                self.authorize().await
            }
        }
    }

    async fn authorize(&self) -> Result<Credential, AuthError> {
        tracing::info!("Starting interactive authorization");
        self.flow.authorize().await
    }
}

#[async_trait]
impl<S, R, F> CredentialSource for CredentialProvider<S, R, F>
where
    S: CredentialStore,
    R: TokenRefresher,
    F: AuthorizationFlow,
{
    async fn acquire(&self) -> Result<Credential, AuthError> {
        CredentialProvider::acquire(self).await
    }
}
