// The curriculum pipeline: check the form, get a credential, generate the
// text, publish it. Each stage returns its own tagged error and `?` stops the
// run at the first failure. There are no retries and no clean-up of
// documents created before a later stage failed.

use super::curriculum_models::{FormParameters, PublishedCurriculum};
use super::prompt::{build_prompt, document_title};
use super::text_generator::{GenerationError, TextGenerator};
use crate::core::auth::{AuthError, CredentialSource};
use crate::core::publishing::{DocumentPublisher, DocumentService, PublishError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CurriculumError {
    #[error("Please enter your Gemini API key.")]
    MissingApiKey,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

impl CurriculumError {
    /// Short name of the stage that failed, for the user surface.
    pub fn stage(&self) -> &'static str {
        match self {
            CurriculumError::MissingApiKey => "input",
            CurriculumError::Auth(_) => "authentication",
            CurriculumError::Generation(_) => "generation",
            CurriculumError::Publish(_) => "publishing",
        }
    }
}

pub struct CurriculumService<A, D>
where
    A: CredentialSource,
    D: DocumentService,
{
    credentials: A,
    publisher: DocumentPublisher<D>,
}

impl<A, D> CurriculumService<A, D>
where
    A: CredentialSource,
    D: DocumentService,
{
    pub fn new(credentials: A, documents: D) -> Self {
        Self {
            credentials,
            publisher: DocumentPublisher::new(documents),
        }
    }

    /// Runs one submission end to end.
    ///
    /// The generator is passed per call because it is bound to the API key
    /// the user typed into this particular submission.
    pub async fn run<G>(
        &self,
        params: &FormParameters,
        generator: &G,
    ) -> Result<PublishedCurriculum, CurriculumError>
    where
        G: TextGenerator + ?Sized,
    {
        if !params.has_api_key() {
            return Err(CurriculumError::MissingApiKey);
        }

        tracing::info!("Authenticating with Google");
        let credential = self.credentials.acquire().await?;

        tracing::info!("Generating curriculum for '{}'", params.subject.trim());
        let prompt = build_prompt(params);
        let body = generator
            .generate(&prompt)
            .await
            .map_err(GenerationError::from)?;
        tracing::info!("Curriculum content generated ({} chars)", body.len());

        let title = document_title(&params.subject);
        let published = self.publisher.publish(&credential, &title, &body).await?;
        tracing::info!(
            "Published '{}' at {}",
            published.title,
            published.view_link
        );

        Ok(PublishedCurriculum {
            title: published.title,
            document_id: published.document_id,
            view_link: published.view_link,
            body,
        })
    }
}
