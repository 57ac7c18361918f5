//! Ollama generation client.
//!
//! Talks to a local or remote Ollama server over its native HTTP API.
//! Every call is bounded by the configured timeout; a timeout or
//! transport error surfaces as a recoverable `Generation` error.

use crate::config::OllamaConfig;
use crate::error::{RagEvalError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The generation collaborator: answers one prompt with one completion.
///
/// No retries are performed by implementations or callers; a failed call
/// is reported once.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

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

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// Client for the Ollama `/api/generate` endpoint.
pub struct OllamaClient {
    client: Client,
    config: OllamaConfig,
}

impl OllamaClient {
    /// Create a client with the given per-request timeout.
    pub fn new(config: OllamaConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RagEvalError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.host.trim_end_matches('/'), path)
    }

    /// Check that the server answers and the configured model is present.
    pub async fn check_connection(&self) -> Result<()> {
        let response = self
            .client
            .get(self.endpoint("/api/tags"))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| {
                RagEvalError::Config(format!(
                    "Ollama server at {} is unreachable: {}",
                    self.config.host, e
                ))
            })?;

        if !response.status().is_success() {
            return Err(RagEvalError::Config(format!(
                "Ollama server at {} answered {}",
                self.config.host,
                response.status()
            )));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| RagEvalError::Parse(e.to_string()))?;

        let available = tags
            .models
            .iter()
            .any(|m| m.name.starts_with(&self.config.model));
        if !available {
            return Err(RagEvalError::Config(format!(
                "Model '{}' is not installed on {} (run: ollama pull {})",
                self.config.model, self.config.host, self.config.model
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Generator for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(self.endpoint("/api/generate"))
            .json(&request)
            .send()
            .await
            .map_err(|e| RagEvalError::Generation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RagEvalError::Generation(format!(
                "generation request failed ({}): {}",
                status, body
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| RagEvalError::Generation(format!("malformed response: {}", e)))?;

        Ok(parsed.response.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_construction() {
        let config = OllamaConfig {
            host: "http://localhost:11434/".to_string(),
            ..Default::default()
        };
        let client = OllamaClient::new(config, Duration::from_secs(30)).unwrap();
        assert_eq!(client.endpoint("/api/generate"), "http://localhost:11434/api/generate");

        let config2 = OllamaConfig {
            host: "http://ollama:11435".to_string(),
            ..Default::default()
        };
        let client2 = OllamaClient::new(config2, Duration::from_secs(30)).unwrap();
        assert_eq!(client2.endpoint("/api/tags"), "http://ollama:11435/api/tags");
    }

    #[test]
    fn test_generate_request_shape() {
        let request = GenerateRequest {
            model: "llama3",
            prompt: "hello",
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama3");
        assert_eq!(json["stream"], false);
    }
}
