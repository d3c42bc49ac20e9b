use super::token_endpoint::{request_token, TokenEndpointError};
use crate::core::auth::{Credential, RefreshError, TokenRefresher};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;

/// Refreshes Google OAuth credentials with the `refresh_token` grant.
///
/// Everything it needs (token URI, client id/secret) is read from the
/// credential itself, so a cached credential can be refreshed without the
/// client-registration file.
pub struct GoogleTokenRefresher {
    client: Client,
}

impl GoogleTokenRefresher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TokenRefresher for GoogleTokenRefresher {
    async fn refresh(&self, credential: &Credential) -> Result<Credential, RefreshError> {
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(RefreshError::MissingRefreshToken)?;
        let token_uri = credential
            .token_uri
            .as_deref()
            .ok_or(RefreshError::MissingClientInfo("token_uri"))?;
        let client_id = credential
            .client_id
            .as_deref()
            .ok_or(RefreshError::MissingClientInfo("client_id"))?;

        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", client_id),
        ];
        if let Some(secret) = credential.client_secret.as_deref() {
            form.push(("client_secret", secret));
        }

        let issued_at = Utc::now();
        let response = request_token(&self.client, token_uri, &form)
            .await
            .map_err(|e| match e {
                TokenEndpointError::Rejected { status, body } => {
                    RefreshError::Rejected { status, body }
                }
                TokenEndpointError::Transport(message) => RefreshError::Transport(message),
            })?;

        tracing::info!("Access token refreshed");

        Ok(Credential {
            expires_at: response.expires_at(issued_at),
            scopes: response.scopes().unwrap_or_else(|| credential.scopes.clone()),
            // Google usually omits the refresh token on refresh; keep ours.
            refresh_token: response
                .refresh_token
                .or_else(|| credential.refresh_token.clone()),
            access_token: response.access_token,
            token_uri: credential.token_uri.clone(),
            client_id: credential.client_id.clone(),
            client_secret: credential.client_secret.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn stale(token_uri: String) -> Credential {
        Credential {
            access_token: "old".to_string(),
            refresh_token: Some("1//keep-me".to_string()),
            expires_at: Some(Utc::now() - chrono::Duration::hours(1)),
            token_uri: Some(token_uri),
            client_id: Some("client-id".to_string()),
            client_secret: Some("client-secret".to_string()),
            scopes: vec!["https://www.googleapis.com/auth/documents".to_string()],
        }
    }

    #[tokio::test]
    async fn test_refresh_keeps_existing_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=1%2F%2Fkeep-me"))
            .and(body_string_contains("client_secret=client-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.new",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let refresher = GoogleTokenRefresher::new(Client::new());
        let refreshed = refresher
            .refresh(&stale(format!("{}/token", server.uri())))
            .await
            .unwrap();

        assert_eq!(refreshed.access_token, "ya29.new");
        assert_eq!(refreshed.refresh_token.as_deref(), Some("1//keep-me"));
        assert!(refreshed.is_valid());
        assert_eq!(
            refreshed.scopes,
            vec!["https://www.googleapis.com/auth/documents".to_string()]
        );
    }

    #[tokio::test]
    async fn test_rejected_refresh_reports_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"error": "invalid_grant", "error_description": "Token has been expired or revoked."}"#),
            )
            .mount(&server)
            .await;

        let refresher = GoogleTokenRefresher::new(Client::new());
        let err = refresher
            .refresh(&stale(format!("{}/token", server.uri())))
            .await
            .unwrap_err();

        match err {
            RefreshError::Rejected { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("invalid_grant"));
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_client_id_fails_without_network() {
        let mut credential = stale("http://127.0.0.1:9/token".to_string());
        credential.client_id = None;

        let err = GoogleTokenRefresher::new(Client::new())
            .refresh(&credential)
            .await
            .unwrap_err();

        assert!(matches!(err, RefreshError::MissingClientInfo("client_id")));
    }
}
