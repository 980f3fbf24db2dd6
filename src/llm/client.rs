//! Ollama API client
//!
//! Non-streaming completions against `POST /api/generate`, used both to
//! draft answers and, with the grounding prompt, as the judge.

use crate::errors::{DocuMindError, Result};
use crate::llm::prompts;
use crate::rag::services::{Generator, Judge};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default model
pub const DEFAULT_MODEL: &str = "qwen2.5:7b-instruct";

/// Transport-level ceiling. Pipeline stages apply their own, shorter timeouts.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Ollama completion client
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OllamaClient {
    /// Create new Ollama client with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(DEFAULT_OLLAMA_URL, DEFAULT_MODEL)
    }

    /// Create Ollama client with custom configuration
    pub fn with_config(base_url: &str, model: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(DocuMindError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature: 0.0,
        })
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Generate a full completion for a prompt
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let request = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: Some(json!({ "temperature": self.temperature })),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| DocuMindError::OllamaApiError(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DocuMindError::OllamaApiError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| DocuMindError::OllamaApiError(format!("Failed to parse response: {}", e)))?;

        debug!(model = %self.model, chars = body.response.len(), "Completion received");
        Ok(body.response)
    }

    /// Check if Ollama is available
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/version", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Get current model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Generator for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.generate(prompt).await
    }
}

/// Grounding judge backed by an Ollama model
#[derive(Debug, Clone)]
pub struct OllamaJudge {
    client: OllamaClient,
}

impl OllamaJudge {
    pub fn new(client: OllamaClient) -> Self {
        // Verdicts must be deterministic
        Self {
            client: client.with_temperature(0.0),
        }
    }
}

#[async_trait]
impl Judge for OllamaJudge {
    async fn evaluate(&self, question: &str, answer: &str, context: &str) -> Result<String> {
        let prompt = prompts::grounding_prompt(question, answer, context);
        self.client.generate(&prompt).await
    }
}

/// Ollama generate request
#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<serde_json::Value>,
}

/// Ollama generate response (non-streaming)
#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}
