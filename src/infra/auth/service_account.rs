// =============================================================================
// SERVICE ACCOUNT FLOW
// =============================================================================
//
// Signs a JWT with the key file's private key and trades it for an access
// token. No browser and no refresh token: when the token expires the
// provider simply runs this flow again.
//
// Documents created this way live in the service account's Drive. They are
// still reachable through the public view link.

use super::client_registration::ServiceAccountKey;
use super::token_endpoint::request_token;
use crate::core::auth::{AuthError, Credential};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::Serialize;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// JWT claims for Google OAuth2.
#[derive(Debug, Serialize)]
struct JwtClaims {
    /// Issuer (service account email).
    iss: String,

    /// Space-separated scopes.
    scope: String,

    /// Audience (token endpoint).
    aud: String,

    iat: i64,

    /// Max 1 hour from iat.
    exp: i64,
}

pub struct ServiceAccountFlow {
    client: Client,
    key: ServiceAccountKey,
    scopes: Vec<String>,
}

impl ServiceAccountFlow {
    pub fn new(client: Client, key: ServiceAccountKey, scopes: Vec<String>) -> Self {
        Self {
            client,
            key,
            scopes,
        }
    }

    pub async fn run(&self) -> Result<Credential, AuthError> {
        let issued_at = Utc::now();
        let jwt = self.signed_assertion(issued_at.timestamp())?;

        let response = request_token(
            &self.client,
            &self.key.token_uri,
            &[("grant_type", JWT_BEARER_GRANT), ("assertion", &jwt)],
        )
        .await
        .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

        tracing::info!("Service account {} authorized", self.key.client_email);

        Ok(Credential {
            expires_at: response.expires_at(issued_at),
            scopes: response.scopes().unwrap_or_else(|| self.scopes.clone()),
            access_token: response.access_token,
            refresh_token: None,
            token_uri: Some(self.key.token_uri.clone()),
            client_id: None,
            client_secret: None,
        })
    }

    fn claims(&self, now: i64) -> JwtClaims {
        JwtClaims {
            iss: self.key.client_email.clone(),
            scope: self.scopes.join(" "),
            aud: self.key.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        }
    }

    fn signed_assertion(&self, now: i64) -> Result<String, AuthError> {
        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes()).map_err(|e| {
            AuthError::InvalidClientRegistration(format!("service account private key: {}", e))
        })?;

        encode(&Header::new(Algorithm::RS256), &self.claims(now), &key)
            .map_err(|e| AuthError::TokenExchange(format!("could not sign assertion: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow(private_key: &str) -> ServiceAccountFlow {
        ServiceAccountFlow::new(
            Client::new(),
            ServiceAccountKey {
                client_email: "docs@project.iam.gserviceaccount.com".to_string(),
                private_key: private_key.to_string(),
                token_uri: "https://oauth2.googleapis.com/token".to_string(),
            },
            vec![
                "https://www.googleapis.com/auth/drive.file".to_string(),
                "https://www.googleapis.com/auth/documents".to_string(),
            ],
        )
    }

    #[test]
    fn test_claims_cover_all_scopes_for_one_hour() {
        let claims = flow("unused").claims(1_700_000_000);

        assert_eq!(claims.iss, "docs@project.iam.gserviceaccount.com");
        assert_eq!(claims.aud, "https://oauth2.googleapis.com/token");
        assert_eq!(
            claims.scope,
            "https://www.googleapis.com/auth/drive.file https://www.googleapis.com/auth/documents"
        );
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[tokio::test]
    async fn test_malformed_private_key_is_a_registration_error() {
        let err = flow("not a pem").run().await.unwrap_err();

        assert!(matches!(err, AuthError::InvalidClientRegistration(_)));
    }
}
