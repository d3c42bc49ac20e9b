use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;

/// Response from Google's token endpoint, shared by every grant type.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    #[serde(default)]
    pub expires_in: Option<i64>,

    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Space-separated list of granted scopes.
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    pub fn expires_at(&self, issued_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_in
            .map(|seconds| issued_at + Duration::seconds(seconds))
    }

    pub fn scopes(&self) -> Option<Vec<String>> {
        self.scope
            .as_ref()
            .map(|s| s.split_whitespace().map(str::to_string).collect())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenEndpointError {
    #[error("token endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("{0}")]
    Transport(String),
}

/// POSTs a form-encoded grant to `token_uri`.
pub async fn request_token(
    client: &Client,
    token_uri: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse, TokenEndpointError> {
    let response = client
        .post(token_uri)
        .form(form)
        .send()
        .await
        .map_err(|e| TokenEndpointError::Transport(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TokenEndpointError::Transport(e.to_string()))?;
        return Err(TokenEndpointError::Rejected { status, body });
    }

    response
        .json::<TokenResponse>()
        .await
        .map_err(|e| TokenEndpointError::Transport(e.to_string()))
}
