//! # Ollama Client
//!
//! Language-model collaborator talking to a local Ollama server over HTTP.
//! The pipeline's timeout wraps the whole call, so this client only maps
//! transport failures; a server that cannot be reached surfaces as
//! `ModelUnavailable` and degrades the pipeline instead of aborting it.

use crate::errors::EstimateError;
use crate::estimator::MacroEstimator;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "qwen3:0.6b";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for a local Ollama model
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(model: &str, base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL, DEFAULT_BASE_URL)
    }
}

impl MacroEstimator for OllamaClient {
    async fn estimate(&self, prompt: &str) -> Result<String, EstimateError> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        log::debug!("Prompting {} at {}", self.model, self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EstimateError::ModelUnavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| EstimateError::ModelUnavailable(e.to_string()))?;

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| EstimateError::ModelUnavailable(e.to_string()))?;

        Ok(generated.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let request = GenerateRequest {
            model: "qwen3:0.6b",
            prompt: "estimate this",
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "qwen3:0.6b");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{"model": "qwen3:0.6b", "response": "calories: 100, protein: 5, fat: 3, carbs: 10", "done": true}"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.response.starts_with("calories:"));
    }
}
