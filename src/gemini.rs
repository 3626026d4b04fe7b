//! Gemini generative text client
//!
//! The planner depends on the `TextModel` trait rather than the concrete
//! client, so tests can swap in a stub. The Gemini implementation walks a
//! preference list of models and uses the first one that produces output.

use crate::config::GeminiConfig;
use crate::{ErrorCode, GoTravelError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// A text generation backend
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Generate text for a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Name of the backend for status reporting
    fn name(&self) -> &str;
}

/// Gemini API client
pub struct GeminiClient {
    http: ClientWithMiddleware,
    api_key: String,
    base_url: String,
    models: Vec<String>,
}

/// Gemini generateContent request body
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

/// Gemini generateContent response body
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentRequest {
    fn for_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        }
    }
}

/// Pull the first candidate's text out of a response
fn extract_text(response: GenerateContentResponse) -> Option<String> {
    let text = response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .filter_map(|part| part.text)
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() { None } else { Some(text) }
}

impl GeminiClient {
    /// Create a new client; fails without an API key
    pub fn new(config: &GeminiConfig, timeout_seconds: u32, max_retries: u32) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| GoTravelError::config("Gemini API key is not configured"))?;

        let http = crate::http::build_client(timeout_seconds, max_retries)?;

        Ok(Self {
            http,
            api_key,
            base_url: config.base_url.clone(),
            models: config.models.clone(),
        })
    }

    /// Run one generateContent call against a specific model
    async fn generate_with_model(&self, model: &str, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let body = GenerateContentRequest::for_prompt(prompt);

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Gemini request to model '{model}' failed"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GoTravelError::api_with_context(
                format!("Gemini model '{model}' returned status {status}"),
                match status.as_u16() {
                    401 | 403 => ErrorCode::ApiUnauthorized,
                    429 => ErrorCode::ApiRateLimit,
                    _ => ErrorCode::ApiNetworkError,
                },
                HashMap::from([("model".to_string(), model.to_string())]),
            )
            .into());
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .with_context(|| "Failed to parse Gemini response")?;

        extract_text(parsed).ok_or_else(|| {
            GoTravelError::api_with_context(
                format!("Gemini model '{model}' returned an empty response"),
                ErrorCode::ApiInvalidResponse,
                HashMap::from([("model".to_string(), model.to_string())]),
            )
            .into()
        })
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    /// Generate text, falling through the model preference list
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Generating text ({} chars of prompt)", prompt.len());

        for model in &self.models {
            match self.generate_with_model(model, prompt).await {
                Ok(text) => {
                    info!("Model '{}' produced {} chars", model, text.len());
                    return Ok(text);
                }
                Err(e) => {
                    warn!("Model '{}' failed: {}", model, e);
                }
            }
        }

        Err(GoTravelError::api_with_context(
            "No Gemini models available",
            ErrorCode::ModelUnavailable,
            HashMap::from([("models_tried".to_string(), self.models.join(", "))]),
        )
        .into())
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
