use crate::core::auth::Credential;
use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Body text is inserted right after the document's implicit first
/// paragraph marker.
pub const DOCUMENT_START_INDEX: u32 = 1;

/// Which of the three remote calls failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStep {
    Create,
    InsertText,
    Share,
}

impl fmt::Display for PublishStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PublishStep::Create => "creating the document",
            PublishStep::InsertText => "inserting text into the document",
            PublishStep::Share => "sharing the document",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("Failed while {step}: {message}")]
pub struct PublishError {
    pub step: PublishStep,
    pub message: String,
}

impl PublishError {
    fn at(step: PublishStep, source: Box<dyn Error + Send + Sync>) -> Self {
        Self {
            step,
            message: source.to_string(),
        }
    }
}

/// A remote document platform (Google Docs + Drive in production).
///
/// Every call is authorized with the credential handed in; implementations
/// don't cache tokens themselves.
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Creates an empty document and returns its identifier.
    async fn create_document(
        &self,
        credential: &Credential,
        title: &str,
    ) -> Result<String, Box<dyn Error + Send + Sync>>;

    async fn insert_text(
        &self,
        credential: &Credential,
        document_id: &str,
        index: u32,
        text: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Grants public read access and returns the document's view link.
    async fn share_publicly(
        &self,
        credential: &Credential,
        document_id: &str,
    ) -> Result<String, Box<dyn Error + Send + Sync>>;
}

#[async_trait]
impl DocumentService for Box<dyn DocumentService> {
    async fn create_document(
        &self,
        credential: &Credential,
        title: &str,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        (**self).create_document(credential, title).await
    }

    async fn insert_text(
        &self,
        credential: &Credential,
        document_id: &str,
        index: u32,
        text: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        (**self).insert_text(credential, document_id, index, text).await
    }

    async fn share_publicly(
        &self,
        credential: &Credential,
        document_id: &str,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        (**self).share_publicly(credential, document_id).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedDocument {
    pub document_id: String,
    pub title: String,
    pub view_link: String,
}

pub struct DocumentPublisher<D: DocumentService> {
    service: D,
}

impl<D: DocumentService> DocumentPublisher<D> {
    pub fn new(service: D) -> Self {
        Self { service }
    }

    #[cfg(test)]
    pub(crate) fn service(&self) -> &D {
        &self.service
    }

    /// Create, fill and share a document. Stops at the first failing step.
    /// Nothing is rolled back: a document created before a later failure
    /// stays where it is.
    pub async fn publish(
        &self,
        credential: &Credential,
        title: &str,
        body: &str,
    ) -> Result<PublishedDocument, PublishError> {
        tracing::info!("Creating document '{}'", title);
        let document_id = self
            .service
            .create_document(credential, title)
            .await
            .map_err(|e| PublishError::at(PublishStep::Create, e))?;

        tracing::info!(
            "Inserting {} chars into document {}",
            body.len(),
            document_id
        );
        self.service
            .insert_text(credential, &document_id, DOCUMENT_START_INDEX, body)
            .await
            .map_err(|e| PublishError::at(PublishStep::InsertText, e))?;

        tracing::info!("Sharing document {}", document_id);
        let view_link = self
            .service
            .share_publicly(credential, &document_id)
            .await
            .map_err(|e| PublishError::at(PublishStep::Share, e))?;

        Ok(PublishedDocument {
            document_id,
            title: title.to_string(),
            view_link,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every call and fails at a chosen step.
    struct MockDocumentService {
        fail_at: Option<PublishStep>,
        calls: Mutex<Vec<PublishStep>>,
        inserted: Mutex<Vec<(String, u32, String)>>,
    }

    impl MockDocumentService {
        fn failing_at(fail_at: Option<PublishStep>) -> Self {
            Self {
                fail_at,
                calls: Mutex::new(Vec::new()),
                inserted: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, step: PublishStep) -> Result<(), Box<dyn Error + Send + Sync>> {
            self.calls.lock().unwrap().push(step);
            if self.fail_at == Some(step) {
                return Err(format!("{:?} rejected (403)", step).into());
            }
            Ok(())
        }
    }

    #[async_trait]
    impl DocumentService for MockDocumentService {
        async fn create_document(
            &self,
            _credential: &Credential,
            _title: &str,
        ) -> Result<String, Box<dyn Error + Send + Sync>> {
            self.record(PublishStep::Create)?;
            Ok("doc-123".to_string())
        }

        async fn insert_text(
            &self,
            _credential: &Credential,
            document_id: &str,
            index: u32,
            text: &str,
        ) -> Result<(), Box<dyn Error + Send + Sync>> {
            self.record(PublishStep::InsertText)?;
            self.inserted
                .lock()
                .unwrap()
                .push((document_id.to_string(), index, text.to_string()));
            Ok(())
        }

        async fn share_publicly(
            &self,
            _credential: &Credential,
            document_id: &str,
        ) -> Result<String, Box<dyn Error + Send + Sync>> {
            self.record(PublishStep::Share)?;
            Ok(format!("https://docs.example.com/{}/view", document_id))
        }
    }

    fn credential() -> Credential {
        Credential::bearer("token")
    }

    #[tokio::test]
    async fn test_publish_runs_all_steps_in_order() {
        let publisher = DocumentPublisher::new(MockDocumentService::failing_at(None));

        let published = publisher
            .publish(&credential(), "Curriculum: Rust", "Week 1: Ownership")
            .await
            .unwrap();

        assert_eq!(published.document_id, "doc-123");
        assert_eq!(published.view_link, "https://docs.example.com/doc-123/view");
        assert_eq!(
            *publisher.service.calls.lock().unwrap(),
            vec![
                PublishStep::Create,
                PublishStep::InsertText,
                PublishStep::Share
            ]
        );
        assert_eq!(
            *publisher.service.inserted.lock().unwrap(),
            vec![(
                "doc-123".to_string(),
                DOCUMENT_START_INDEX,
                "Week 1: Ownership".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_create_failure_stops_before_insert() {
        let publisher =
            DocumentPublisher::new(MockDocumentService::failing_at(Some(PublishStep::Create)));

        let err = publisher
            .publish(&credential(), "t", "body")
            .await
            .unwrap_err();

        assert_eq!(err.step, PublishStep::Create);
        assert!(err.message.contains("403"));
        assert_eq!(
            *publisher.service.calls.lock().unwrap(),
            vec![PublishStep::Create]
        );
    }

    #[tokio::test]
    async fn test_insert_failure_never_shares() {
        let publisher = DocumentPublisher::new(MockDocumentService::failing_at(Some(
            PublishStep::InsertText,
        )));

        let err = publisher
            .publish(&credential(), "t", "body")
            .await
            .unwrap_err();

        assert_eq!(err.step, PublishStep::InsertText);
        assert_eq!(
            *publisher.service.calls.lock().unwrap(),
            vec![PublishStep::Create, PublishStep::InsertText]
        );
    }

    #[tokio::test]
    async fn test_share_failure_is_tagged() {
        let publisher =
            DocumentPublisher::new(MockDocumentService::failing_at(Some(PublishStep::Share)));

        let err = publisher
            .publish(&credential(), "t", "body")
            .await
            .unwrap_err();

        assert_eq!(err.step, PublishStep::Share);
        assert_eq!(
            err.to_string(),
            "Failed while sharing the document: Share rejected (403)"
        );
    }
}
