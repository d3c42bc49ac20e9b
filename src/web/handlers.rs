use super::pages;
use crate::core::auth::CredentialSource;
use crate::core::curriculum::{CurriculumError, CurriculumService, FormParameters, TextGenerator};
use crate::core::publishing::DocumentService;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use std::sync::Arc;

/// The curriculum pipeline with its Google dependencies chosen at startup.
pub type CurriculumPipeline =
    CurriculumService<Box<dyn CredentialSource>, Box<dyn DocumentService>>;

/// Builds a text generator for the API key typed into one submission.
pub type GeneratorFactory = Arc<dyn Fn(&str) -> Box<dyn TextGenerator> + Send + Sync>;

/// Shared across all requests.
pub struct AppState {
    pub pipeline: CurriculumPipeline,
    pub generators: GeneratorFactory,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(show_form))
        .route("/generate", get(show_form).post(generate))
        .route("/health", get(health))
        .with_state(state)
}

async fn show_form() -> Html<String> {
    Html(pages::form_page(&FormParameters::default(), None))
}

async fn health() -> &'static str {
    "ok"
}

async fn generate(
    State(state): State<Arc<AppState>>,
    Form(params): Form<FormParameters>,
) -> Response {
    tracing::info!("Curriculum requested for '{}'", params.subject.trim());

    let generator = (state.generators)(params.api_key.trim());

    match state.pipeline.run(&params, generator.as_ref()).await {
        Ok(published) => Html(pages::result_page(&published)).into_response(),
        Err(e) => {
            tracing::error!("Curriculum run failed during {}: {}", e.stage(), e);
            let status = match e {
                CurriculumError::MissingApiKey => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::BAD_GATEWAY,
            };
            (status, Html(pages::form_page(&params, Some(&e)))).into_response()
        }
    }
}
