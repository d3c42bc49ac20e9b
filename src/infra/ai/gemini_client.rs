// =============================================================================
// GEMINI CLIENT - Google AI Studio API Integration
// =============================================================================
//
// Implements `TextGenerator` against Google's Gemini API
// (https://ai.google.dev/gemini-api/docs).
//
// **Request shape:**
// - Authentication: API key is passed as a query parameter (`?key=API_KEY`)
//   rather than a Bearer token in the Authorization header.
// - Body: `contents[]` with nested `parts`, plus a `generationConfig`.
// - Response: text lives in `candidates[0].content.parts[*].text`.
//
// **Supported Models:**
// - `gemini-2.5-flash` - Fast, balanced model (the default)
// - `gemini-2.5-flash-lite` - Fastest, most cost-efficient
// - `gemini-2.5-pro` - Most capable for complex reasoning
//
// The key arrives with each form submission, so a client is built per run.
// It is never logged, and transport errors have their URL stripped because
// the URL carries the key.

use crate::core::curriculum::TextGenerator;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

// =============================================================================
// GEMINI API DATA STRUCTURES
// =============================================================================
//
// See: https://ai.google.dev/api/generate-content

/// A single part of content. Gemini uses a "parts" array to support
/// multimodal content; only text is used here.
#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    /// Set on reasoning parts when the model returns its thoughts.
    #[serde(skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    /// "user" or "model"
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

/// Generation configuration options that control the model's output.
/// See: https://ai.google.dev/api/generate-content#generationconfig
#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    /// Controls randomness. Range: [0.0, 2.0]. Higher = more creative.
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,

    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,

    /// Why the model stopped generating (e.g., "STOP", "MAX_TOKENS").
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    /// List of candidate responses. Usually just one.
    candidates: Option<Vec<Candidate>>,

    prompt_feedback: Option<PromptFeedback>,
}

/// Error response from the Gemini API.
#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorDetail,
}

// =============================================================================
// GEMINI CLIENT IMPLEMENTATION
// =============================================================================

/// Model and endpoint settings, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            temperature: None,
            max_output_tokens: None,
        }
    }
}

/// Client for Google's Gemini API, bound to one API key.
///
/// # Example
/// ```ignore
/// let gemini = GeminiClient::new(client, api_key, GeminiSettings::default());
/// let text = gemini.generate("Write a course outline").await?;
/// ```
pub struct GeminiClient {
    client: Client,
    api_key: String,
    settings: GeminiSettings,
}

impl GeminiClient {
    pub fn new(client: Client, api_key: String, settings: GeminiSettings) -> Self {
        Self {
            client,
            api_key,
            settings,
        }
    }

    fn build_request(&self, prompt: &str) -> GenerateContentRequest {
        let generation_config =
            if self.settings.temperature.is_some() || self.settings.max_output_tokens.is_some() {
                Some(GenerationConfig {
                    temperature: self.settings.temperature,
                    max_output_tokens: self.settings.max_output_tokens,
                })
            } else {
                None
            };

        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                    thought: None,
                }],
            }],
            generation_config,
        }
    }

    /// Joins the non-thought text parts of the first candidate.
    fn extract_text(
        response: GenerateContentResponse,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let candidate = match response.candidates.and_then(|c| c.into_iter().next()) {
            Some(candidate) => candidate,
            None => {
                let reason = response
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .map(|r| format!(" ({})", r))
                    .unwrap_or_default();
                return Err(format!(
                    "No content in Gemini response - the model may have been blocked by safety filters{}",
                    reason
                )
                .into());
            }
        };

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter(|p| p.thought != Some(true))
            .filter_map(|p| p.text)
            .collect();

        if text.is_empty() {
            return Err(format!(
                "Gemini returned no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )
            .into());
        }

        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        // Format: {base}/models/{model}:generateContent
        let url = format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        );

        let request = self.build_request(prompt);

        // Log request for debugging (be careful not to log the API key!)
        tracing::debug!(
            "Gemini request to model {}: {} prompt chars",
            self.settings.model,
            prompt.len()
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| e.without_url())?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.map_err(|e| e.without_url())?;

            // Try to parse as Gemini error response for better error messages
            if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(&error_text) {
                return Err(format!(
                    "Gemini API error ({}): {}",
                    status, error_response.error.message
                )
                .into());
            }

            return Err(format!("Gemini API error: {} - {}", status, error_text).into());
        }

        let response_json: GenerateContentResponse =
            response.json().await.map_err(|e| e.without_url())?;
        let text = Self::extract_text(response_json)?;

        tracing::debug!("Gemini response received: {} chars", text.len());

        Ok(text)
    }
}

// =============================================================================
// TESTS
// =============================================================================
