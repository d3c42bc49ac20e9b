// =============================================================================
// INSTALLED-APP OAUTH FLOW (browser consent + loopback redirect)
// =============================================================================
//
// **How it works:**
// 1. Bind a listener on 127.0.0.1 (ephemeral port unless configured).
// 2. Build the consent URL with a random `state` and a PKCE S256 challenge,
//    and show it to the user.
// 3. The user approves in the browser; Google redirects to
//    `http://127.0.0.1:<port>/?code=...&state=...`.
// 4. A one-route axum server on the listener hands the query back to us and
//    shuts down.
// 5. Exchange the code (plus the PKCE verifier) for tokens.
//
// The user must be on the same machine as the process. There is no
// copy/paste fallback.

use super::client_registration::OAuthClientSecrets;
use super::token_endpoint::request_token;
use crate::core::auth::{AuthError, Credential};
use axum::extract::Query;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use reqwest::{Client, Url};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};

const REDIRECT_PAGE: &str = "<!doctype html><html><body>\
    <h3>Authentication complete.</h3>\
    <p>You can close this tab and return to the application.</p>\
    </body></html>";

const VERIFIER_LEN: usize = 64;
const STATE_LEN: usize = 32;

/// Called with the consent URL. Defaults to printing it.
pub type UrlPresenter = Arc<dyn Fn(&Url) + Send + Sync>;

#[derive(Debug, Default, Deserialize)]
struct RedirectParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

pub struct InstalledAppFlow {
    client: Client,
    secrets: OAuthClientSecrets,
    scopes: Vec<String>,
    redirect_port: u16,
    timeout: Duration,
    presenter: UrlPresenter,
}

impl InstalledAppFlow {
    pub fn new(
        client: Client,
        secrets: OAuthClientSecrets,
        scopes: Vec<String>,
        redirect_port: u16,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            secrets,
            scopes,
            redirect_port,
            timeout,
            presenter: Arc::new(|url: &Url| {
                println!(
                    "Please visit this URL to authorize this application:\n{}",
                    url
                );
            }),
        }
    }

    pub fn with_presenter(mut self, presenter: UrlPresenter) -> Self {
        self.presenter = presenter;
        self
    }

    pub async fn run(&self) -> Result<Credential, AuthError> {
        let listener = TcpListener::bind(("127.0.0.1", self.redirect_port))
            .await
            .map_err(|e| AuthError::Authorization(format!("cannot bind redirect listener: {}", e)))?;
        let port = listener
            .local_addr()
            .map_err(|e| AuthError::Authorization(e.to_string()))?
            .port();
        let redirect_uri = format!("http://127.0.0.1:{}/", port);

        let state = random_token(STATE_LEN);
        let (verifier, challenge) = pkce_pair();
        let url = self.authorization_url(&redirect_uri, &state, &challenge)?;

        tracing::info!(
            "Waiting up to {}s for browser consent on {}",
            self.timeout.as_secs(),
            redirect_uri
        );
        (self.presenter)(&url);

        let params = wait_for_redirect(listener, self.timeout).await?;

        if let Some(error) = params.error {
            return Err(AuthError::Authorization(format!(
                "consent was not granted: {}",
                error
            )));
        }
        if params.state.as_deref() != Some(state.as_str()) {
            return Err(AuthError::Authorization(
                "state mismatch in redirect, possible CSRF".to_string(),
            ));
        }
        let code = params
            .code
            .ok_or_else(|| AuthError::Authorization("redirect carried no code".to_string()))?;

        self.exchange_code(&code, &redirect_uri, &verifier).await
    }

    fn authorization_url(
        &self,
        redirect_uri: &str,
        state: &str,
        challenge: &str,
    ) -> Result<Url, AuthError> {
        let scope = self.scopes.join(" ");
        Url::parse_with_params(
            &self.secrets.auth_uri,
            &[
                ("response_type", "code"),
                ("client_id", self.secrets.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("scope", scope.as_str()),
                ("state", state),
                ("code_challenge", challenge),
                ("code_challenge_method", "S256"),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| AuthError::InvalidClientRegistration(format!("bad auth_uri: {}", e)))
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        verifier: &str,
    ) -> Result<Credential, AuthError> {
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", self.secrets.client_id.as_str()),
            ("code_verifier", verifier),
        ];
        if let Some(secret) = self.secrets.client_secret.as_deref() {
            form.push(("client_secret", secret));
        }

        let issued_at = Utc::now();
        let response = request_token(&self.client, &self.secrets.token_uri, &form)
            .await
            .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

        tracing::info!("Browser authorization completed");

        Ok(Credential {
            expires_at: response.expires_at(issued_at),
            scopes: response.scopes().unwrap_or_else(|| self.scopes.clone()),
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            token_uri: Some(self.secrets.token_uri.clone()),
            client_id: Some(self.secrets.client_id.clone()),
            client_secret: self.secrets.client_secret.clone(),
        })
    }
}

/// Serves the redirect route until one request carrying `code` or `error`
/// arrives, then shuts the listener down.
async fn wait_for_redirect(
    listener: TcpListener,
    timeout: Duration,
) -> Result<RedirectParams, AuthError> {
    let (params_tx, params_rx) = oneshot::channel::<RedirectParams>();
    let params_tx = Arc::new(Mutex::new(Some(params_tx)));
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let app = Router::new().route(
        "/",
        get(move |Query(params): Query<RedirectParams>| {
            let params_tx = Arc::clone(&params_tx);
            async move {
                if params.code.is_some() || params.error.is_some() {
                    if let Some(tx) = params_tx.lock().await.take() {
                        let _ = tx.send(params);
                    }
                }
                Html(REDIRECT_PAGE)
            }
        }),
    );

    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });
    let server_abort = server.abort_handle();

    let outcome = tokio::time::timeout(timeout, params_rx).await;

    let _ = shutdown_tx.send(());
    if tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .is_err()
    {
        server_abort.abort();
    }

    match outcome {
        Ok(Ok(params)) => Ok(params),
        Ok(Err(_)) => Err(AuthError::Authorization(
            "redirect listener stopped before consent completed".to_string(),
        )),
        Err(_) => Err(AuthError::Authorization(format!(
            "no consent received within {}s",
            timeout.as_secs()
        ))),
    }
}

fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Returns a fresh `(code_verifier, code_challenge)` pair.
fn pkce_pair() -> (String, String) {
    let verifier = random_token(VERIFIER_LEN);
    let challenge = pkce_challenge(&verifier);
    (verifier, challenge)
}

fn pkce_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn secrets(token_uri: String) -> OAuthClientSecrets {
        OAuthClientSecrets {
            client_id: "client-id".to_string(),
            client_secret: Some("client-secret".to_string()),
            auth_uri: "https://accounts.example.test/o/oauth2/auth".to_string(),
            token_uri,
        }
    }

    fn flow(token_uri: String) -> InstalledAppFlow {
        InstalledAppFlow::new(
            Client::new(),
            secrets(token_uri),
            vec![
                "https://www.googleapis.com/auth/drive.file".to_string(),
                "https://www.googleapis.com/auth/documents".to_string(),
            ],
            0,
            Duration::from_secs(10),
        )
    }

    fn query(url: &Url) -> HashMap<String, String> {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    #[test]
    fn test_pkce_challenge_matches_rfc_7636_example() {
        assert_eq!(
            pkce_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_random_tokens_differ() {
        let (a, _) = pkce_pair();
        let (b, _) = pkce_pair();
        assert_eq!(a.len(), VERIFIER_LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn test_authorization_url_requests_offline_access() {
        let flow = flow("https://oauth2.googleapis.com/token".to_string());
        let url = flow
            .authorization_url("http://127.0.0.1:4242/", "state-1", "challenge-1")
            .unwrap();
        let params = query(&url);

        assert!(url.as_str().starts_with("https://accounts.example.test/o/oauth2/auth?"));
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["client_id"], "client-id");
        assert_eq!(params["redirect_uri"], "http://127.0.0.1:4242/");
        assert_eq!(
            params["scope"],
            "https://www.googleapis.com/auth/drive.file https://www.googleapis.com/auth/documents"
        );
        assert_eq!(params["state"], "state-1");
        assert_eq!(params["code_challenge_method"], "S256");
        assert_eq!(params["access_type"], "offline");
    }

    #[tokio::test]
    async fn test_full_flow_exchanges_redirect_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=auth-code"))
            .and(body_string_contains("code_verifier="))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.fresh",
                "refresh_token": "1//fresh",
                "expires_in": 3599,
                "scope": "https://www.googleapis.com/auth/documents",
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (url_tx, mut url_rx) = tokio::sync::mpsc::unbounded_channel::<Url>();
        let flow = flow(format!("{}/token", server.uri())).with_presenter(Arc::new(
            move |url: &Url| {
                let _ = url_tx.send(url.clone());
            },
        ));

        let task = tokio::spawn(async move { flow.run().await });

        // Play the browser: follow the consent URL's redirect with a code.
        let consent = url_rx.recv().await.unwrap();
        let params = query(&consent);
        let redirect = format!(
            "{}?code=auth-code&state={}",
            params["redirect_uri"], params["state"]
        );
        let page = reqwest::get(&redirect).await.unwrap().text().await.unwrap();
        assert!(page.contains("Authentication complete"));

        let credential = task.await.unwrap().unwrap();
        assert_eq!(credential.access_token, "ya29.fresh");
        assert_eq!(credential.refresh_token.as_deref(), Some("1//fresh"));
        assert_eq!(credential.client_id.as_deref(), Some("client-id"));
        assert_eq!(
            credential.token_uri,
            Some(format!("{}/token", server.uri()))
        );
        assert!(credential.is_valid());
    }

    #[tokio::test]
    async fn test_state_mismatch_is_rejected() {
        let (url_tx, mut url_rx) = tokio::sync::mpsc::unbounded_channel::<Url>();
        let flow = flow("http://127.0.0.1:9/token".to_string()).with_presenter(Arc::new(
            move |url: &Url| {
                let _ = url_tx.send(url.clone());
            },
        ));

        let task = tokio::spawn(async move { flow.run().await });

        let consent = url_rx.recv().await.unwrap();
        let params = query(&consent);
        let redirect = format!("{}?code=auth-code&state=forged", params["redirect_uri"]);
        reqwest::get(&redirect).await.unwrap();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, AuthError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_denied_consent_is_an_auth_error() {
        let (url_tx, mut url_rx) = tokio::sync::mpsc::unbounded_channel::<Url>();
        let flow = flow("http://127.0.0.1:9/token".to_string()).with_presenter(Arc::new(
            move |url: &Url| {
                let _ = url_tx.send(url.clone());
            },
        ));

        let task = tokio::spawn(async move { flow.run().await });

        let consent = url_rx.recv().await.unwrap();
        let params = query(&consent);
        let redirect = format!("{}?error=access_denied", params["redirect_uri"]);
        reqwest::get(&redirect).await.unwrap();

        match task.await.unwrap().unwrap_err() {
            AuthError::Authorization(message) => assert!(message.contains("access_denied")),
            other => panic!("expected authorization error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_redirect_wait_times_out() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();

        let err = wait_for_redirect(listener, Duration::from_millis(50))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Authorization(_)));
    }
}
