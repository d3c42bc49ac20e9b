// =============================================================================
// GOOGLE DOCS + DRIVE CLIENT
// =============================================================================
//
// Implements `DocumentService` with three REST endpoints:
//
// 1. **Docs `documents.create`** - `POST {docs}/documents` with `{title}`.
// 2. **Docs `documents.batchUpdate`** - one `insertText` request at the given
//    index.
// 3. **Drive `permissions.create`** - `anyone`/`reader`, followed by
//    `files.get?fields=webViewLink` to read back the share link.
//
// Every request carries the caller's OAuth access token as a Bearer header.
// Base URLs are overridable so tests can point them at a mock server.
//
// **Setup Instructions:**
// 1. Go to Google Cloud Console: https://console.cloud.google.com/
// 2. Enable the Google Docs API and the Google Drive API under
//    "APIs & Services" > "Library".
// 3. Create an OAuth client ID of type "Desktop app" (or a service account
//    key) and save the JSON as `credentials.json`.

use crate::core::auth::Credential;
use crate::core::publishing::DocumentService;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::error::Error;

pub const DEFAULT_DOCS_BASE_URL: &str = "https://docs.googleapis.com/v1";
pub const DEFAULT_DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

// =============================================================================
// API STRUCTURES
// =============================================================================

#[derive(Debug, Serialize)]
struct CreateDocumentRequest<'a> {
    title: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedDocument {
    document_id: String,
}

#[derive(Debug, Serialize)]
struct BatchUpdateRequest<'a> {
    requests: Vec<DocsRequest<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DocsRequest<'a> {
    insert_text: InsertText<'a>,
}

#[derive(Debug, Serialize)]
struct InsertText<'a> {
    location: Location,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Location {
    index: u32,
}

#[derive(Debug, Serialize)]
struct Permission {
    #[serde(rename = "type")]
    grantee: &'static str,
    role: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    web_view_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorResponse {
    error: GoogleErrorDetail,
}

// =============================================================================
// GOOGLE DOCS CLIENT
// =============================================================================

pub struct GoogleDocsClient {
    client: Client,
    docs_base_url: String,
    drive_base_url: String,
}

impl GoogleDocsClient {
    pub fn new(client: Client) -> Self {
        Self::with_endpoints(client, DEFAULT_DOCS_BASE_URL, DEFAULT_DRIVE_BASE_URL)
    }

    pub fn with_endpoints(client: Client, docs_base_url: &str, drive_base_url: &str) -> Self {
        Self {
            client,
            docs_base_url: docs_base_url.trim_end_matches('/').to_string(),
            drive_base_url: drive_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn authorized(request: RequestBuilder, credential: &Credential) -> RequestBuilder {
        request.header("Authorization", credential.authorization_header())
    }

    /// Turns a non-2xx response into an error carrying Google's message.
    async fn check(response: Response, api: &str) -> Result<Response, Box<dyn Error + Send + Sync>> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let text = response.text().await?;
        if let Ok(error) = serde_json::from_str::<GoogleErrorResponse>(&text) {
            return Err(format!("{} API error ({}): {}", api, status, error.error.message).into());
        }
        Err(format!("{} API error: {} - {}", api, status, text).into())
    }
}

#[async_trait]
impl DocumentService for GoogleDocsClient {
    async fn create_document(
        &self,
        credential: &Credential,
        title: &str,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let url = format!("{}/documents", self.docs_base_url);

        let response = Self::authorized(self.client.post(&url), credential)
            .json(&CreateDocumentRequest { title })
            .send()
            .await?;
        let created: CreatedDocument = Self::check(response, "Docs").await?.json().await?;

        tracing::debug!("Created document {}", created.document_id);
        Ok(created.document_id)
    }

    async fn insert_text(
        &self,
        credential: &Credential,
        document_id: &str,
        index: u32,
        text: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let url = format!("{}/documents/{}:batchUpdate", self.docs_base_url, document_id);
        let body = BatchUpdateRequest {
            requests: vec![DocsRequest {
                insert_text: InsertText {
                    location: Location { index },
                    text,
                },
            }],
        };

        let response = Self::authorized(self.client.post(&url), credential)
            .json(&body)
            .send()
            .await?;
        Self::check(response, "Docs").await?;

        Ok(())
    }

    async fn share_publicly(
        &self,
        credential: &Credential,
        document_id: &str,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let permissions_url = format!("{}/files/{}/permissions", self.drive_base_url, document_id);
        let response = Self::authorized(self.client.post(&permissions_url), credential)
            .query(&[("fields", "id")])
            .json(&Permission {
                grantee: "anyone",
                role: "reader",
            })
            .send()
            .await?;
        Self::check(response, "Drive").await?;

        let file_url = format!("{}/files/{}", self.drive_base_url, document_id);
        let response = Self::authorized(self.client.get(&file_url), credential)
            .query(&[("fields", "webViewLink")])
            .send()
            .await?;
        let file: DriveFile = Self::check(response, "Drive").await?.json().await?;

        file.web_view_link
            .ok_or_else(|| format!("Drive returned no webViewLink for {}", document_id).into())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credential() -> Credential {
        Credential::bearer("ya29.token")
    }

    fn client_for(server: &MockServer) -> GoogleDocsClient {
        GoogleDocsClient::with_endpoints(
            Client::new(),
            &format!("{}/docs/", server.uri()),
            &format!("{}/drive", server.uri()),
        )
    }

    #[tokio::test]
    async fn test_create_document_sends_title_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/docs/documents"))
            .and(header("Authorization", "Bearer ya29.token"))
            .and(body_json(serde_json::json!({"title": "Curriculum: Python"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "documentId": "doc-123",
                "title": "Curriculum: Python"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let id = client_for(&server)
            .create_document(&credential(), "Curriculum: Python")
            .await
            .unwrap();

        assert_eq!(id, "doc-123");
    }

    #[tokio::test]
    async fn test_insert_text_targets_given_index() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/docs/documents/doc-123:batchUpdate"))
            .and(header("Authorization", "Bearer ya29.token"))
            .and(body_json(serde_json::json!({
                "requests": [{
                    "insertText": {"location": {"index": 1}, "text": "Intro to X\nWeek 1: ..."}
                }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "documentId": "doc-123",
                "replies": [{}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .insert_text(&credential(), "doc-123", 1, "Intro to X\nWeek 1: ...")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_share_grants_anyone_reader_and_returns_view_link() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/drive/files/doc-123/permissions"))
            .and(query_param("fields", "id"))
            .and(body_json(serde_json::json!({"type": "anyone", "role": "reader"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "anyoneWithLink"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/drive/files/doc-123"))
            .and(query_param("fields", "webViewLink"))
            .and(header("Authorization", "Bearer ya29.token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "webViewLink": "https://docs.google.com/document/d/doc-123/edit?usp=drivesdk"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let link = client_for(&server)
            .share_publicly(&credential(), "doc-123")
            .await
            .unwrap();

        assert_eq!(link, "https://docs.google.com/document/d/doc-123/edit?usp=drivesdk");
    }

    #[tokio::test]
    async fn test_missing_view_link_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/drive/files/doc-123/permissions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "p"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/drive/files/doc-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .share_publicly(&credential(), "doc-123")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("webViewLink"));
    }

    #[tokio::test]
    async fn test_google_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/docs/documents"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
                "error": {
                    "code": 403,
                    "message": "Google Docs API has not been used in project 42 before or it is disabled.",
                    "status": "PERMISSION_DENIED"
                }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_document(&credential(), "Curriculum: Python")
            .await
            .unwrap_err()
            .to_string();

        assert!(err.contains("403"));
        assert!(err.contains("has not been used"));
    }
}
