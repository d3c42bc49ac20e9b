use async_trait::async_trait;
use std::error::Error;
use thiserror::Error;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends one prompt to the text-generation service and returns its reply
    /// unmodified.
    async fn generate(&self, prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>>;
}

// Blanket implementation for Box<dyn TextGenerator> so callers can pick the
// provider at runtime.
#[async_trait]
impl TextGenerator for Box<dyn TextGenerator> {
    async fn generate(&self, prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        (**self).generate(prompt).await
    }
}

/// The generation call was rejected (quota, bad key) or never reached the
/// service. Carries the service's own message.
#[derive(Debug, Error)]
#[error("Text generation failed: {message}")]
pub struct GenerationError {
    pub message: String,
}

impl From<Box<dyn Error + Send + Sync>> for GenerationError {
    fn from(source: Box<dyn Error + Send + Sync>) -> Self {
        Self {
            message: source.to_string(),
        }
    }
}
