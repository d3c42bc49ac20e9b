// =============================================================================
// CLIENT REGISTRATION FILE
// =============================================================================
//
// The file downloaded from Google Cloud Console ("credentials.json"). Two
// shapes are accepted:
//
// 1. **OAuth client (Desktop app or Web app):**
//    `{ "installed": { "client_id", "client_secret", "auth_uri", "token_uri", ... } }`
//    (or the same under `"web"`). Used for the browser consent flow.
//
// 2. **Service account key:**
//    `{ "type": "service_account", "client_email", "private_key", "token_uri", ... }`
//    No browser needed, but the created documents belong to the service
//    account, not to a person.

use crate::core::auth::AuthError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

#[derive(Clone, Deserialize)]
pub struct OAuthClientSecrets {
    pub client_id: String,

    #[serde(default)]
    pub client_secret: Option<String>,

    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,

    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for OAuthClientSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthClientSecrets")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("auth_uri", &self.auth_uri)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Service account credentials from the JSON key file.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// The service account email (used as issuer in JWT).
    pub client_email: String,

    /// The private key in PEM format.
    pub private_key: String,

    /// Where to exchange the signed JWT for an access token.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum ClientRegistration {
    OAuthClient(OAuthClientSecrets),
    ServiceAccount(ServiceAccountKey),
}

#[derive(Deserialize)]
struct SecretsFile {
    installed: Option<OAuthClientSecrets>,
    web: Option<OAuthClientSecrets>,
}

impl ClientRegistration {
    /// Reads the registration file. A missing file is its own error because
    /// the user has to go and download it.
    pub async fn load(path: &Path) -> Result<Self, AuthError> {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AuthError::ClientRegistrationMissing(path.to_path_buf()));
            }
            Err(e) => {
                return Err(AuthError::InvalidClientRegistration(format!(
                    "{}: {}",
                    path.display(),
                    e
                )));
            }
        };

        Self::from_json(&text)
    }

    pub fn from_json(json: &str) -> Result<Self, AuthError> {
        let invalid = |e: serde_json::Error| AuthError::InvalidClientRegistration(e.to_string());

        let value: serde_json::Value = serde_json::from_str(json).map_err(invalid)?;

        if value.get("type").and_then(|t| t.as_str()) == Some("service_account") {
            let key: ServiceAccountKey = serde_json::from_value(value).map_err(invalid)?;
            return Ok(Self::ServiceAccount(key));
        }

        let file: SecretsFile = serde_json::from_value(value).map_err(invalid)?;
        file.installed
            .or(file.web)
            .map(Self::OAuthClient)
            .ok_or_else(|| {
                AuthError::InvalidClientRegistration(
                    "expected an \"installed\" or \"web\" OAuth client, or a service account key"
                        .to_string(),
                )
            })
    }
}
