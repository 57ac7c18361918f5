//! Embedding provider interface and the Ollama-backed implementation.
//!
//! The provider is constructed once and passed by reference into the
//! retriever and scorer; there is no process-wide model state. The
//! dimensionality is probed at construction and constant for a run.

use crate::error::{RagEvalError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A provider that turns text into fixed-dimension vectors.
///
/// Implementations must be deterministic for identical input so that
/// ranking is reproducible. The default [`encode_batch`] calls
/// [`encode`] sequentially; backends with native batching should
/// override it.
///
/// [`encode`]: EmbeddingProvider::encode
/// [`encode_batch`]: EmbeddingProvider::encode_batch
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn encode(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    async fn encode_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.encode(text).await?);
        }
        Ok(results)
    }

    /// Dimensionality of the vectors this provider produces.
    fn dimension(&self) -> usize;
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched lengths or zero-magnitude input.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Embedding provider backed by the Ollama `/api/embeddings` endpoint.
#[derive(Debug)]
pub struct OllamaEmbeddings {
    client: Client,
    host: String,
    model: String,
    dimension: usize,
}

impl OllamaEmbeddings {
    /// Connect to the Ollama server and probe the model's dimensionality.
    ///
    /// Every request the provider makes is bounded by `timeout`. An
    /// unreachable server or a model returning zero-dimension vectors is
    /// a configuration error, surfaced before any question runs.
    pub async fn connect(host: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RagEvalError::Config(format!("Failed to build HTTP client: {}", e)))?;

        let mut provider = Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimension: 0,
        };

        let probe = provider.request_embedding("dimension probe").await.map_err(|e| {
            RagEvalError::Config(format!(
                "Embedding model '{}' at {} is unreachable: {}",
                model, host, e
            ))
        })?;

        if probe.is_empty() {
            return Err(RagEvalError::Config(format!(
                "Embedding model '{}' returned zero-dimension vectors",
                model
            )));
        }

        provider.dimension = probe.len();
        Ok(provider)
    }

    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(format!("{}/api/embeddings", self.host))
            .json(&request)
            .send()
            .await
            .map_err(|e| RagEvalError::Embedding(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RagEvalError::Embedding(format!(
                "embedding request failed ({}): {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RagEvalError::Parse(e.to_string()))?;

        Ok(parsed.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddings {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.request_embedding(text).await?;
        if embedding.len() != self.dimension {
            return Err(RagEvalError::Embedding(format!(
                "expected {}-dimension embedding, got {}",
                self.dimension,
                embedding.len()
            )));
        }
        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockEmbedding;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);

        let c = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &c).abs() < 1e-6);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_degenerate_input() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    }

    #[tokio::test]
    async fn test_default_batch_matches_single() {
        let provider = MockEmbedding::new();
        let single = provider.encode("tariff costs").await.unwrap();
        let batch = provider.encode_batch(&["tariff costs", "other"]).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], single);
    }

    #[tokio::test]
    async fn test_unresponsive_server_fails_connect() {
        // A server that accepts connections but never answers: the
        // request must be cut off by the client timeout, not hang.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let err = OllamaEmbeddings::connect(
            &format!("http://{}", addr),
            "nomic-embed-text",
            Duration::from_millis(200),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RagEvalError::Config(_)));
        assert!(err.is_fatal());
        drop(listener);
    }

    #[tokio::test]
    async fn test_mock_is_deterministic() {
        let provider = MockEmbedding::new();
        let a = provider.encode("How much does Tariff X cost?").await.unwrap();
        let b = provider.encode("How much does Tariff X cost?").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), provider.dimension());
    }
}
