//! Elasticsearch vector-index collaborator.
//!
//! The remote retriever delegates ranking to an Elasticsearch index
//! holding pre-embedded chunks (`text`, `source`, `embedding` fields).
//! Any transport failure here is a `BackendUnavailable` error: the
//! index is gone for every remaining question, so the batch aborts.

use crate::config::ElasticConfig;
use crate::error::{RagEvalError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One hit returned by the index, with the backend's raw score.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub text: String,
    pub source: String,
    pub raw_score: f32,
}

#[derive(Debug, Serialize)]
struct KnnSearchRequest<'a> {
    knn: KnnClause<'a>,
    _source: [&'a str; 2],
    size: usize,
}

#[derive(Debug, Serialize)]
struct KnnClause<'a> {
    field: &'a str,
    query_vector: &'a [f32],
    k: usize,
    num_candidates: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_score")]
    score: f32,
    #[serde(rename = "_source")]
    source: HitSource,
}

#[derive(Debug, Deserialize)]
struct HitSource {
    #[serde(default)]
    text: String,
    #[serde(default)]
    source: String,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

/// Thin client for the Elasticsearch search API.
pub struct ElasticClient {
    client: Client,
    config: ElasticConfig,
}

impl ElasticClient {
    /// Create a client. Every request is bounded by `timeout`; a search
    /// that exceeds it surfaces as `BackendUnavailable` and aborts the
    /// batch rather than stalling it.
    pub fn new(config: ElasticConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RagEvalError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Name of the configured index.
    pub fn index(&self) -> &str {
        &self.config.index
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    /// Check that the cluster answers at all.
    pub async fn ping(&self) -> Result<()> {
        let response = self
            .client
            .get(self.endpoint("/"))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| {
                RagEvalError::BackendUnavailable(format!(
                    "Elasticsearch at {}: {}",
                    self.config.url, e
                ))
            })?;

        if !response.status().is_success() {
            return Err(RagEvalError::BackendUnavailable(format!(
                "Elasticsearch at {} answered {}",
                self.config.url,
                response.status()
            )));
        }
        Ok(())
    }

    /// Number of documents in the configured index.
    pub async fn document_count(&self) -> Result<u64> {
        let response = self
            .client
            .get(self.endpoint(&format!("/{}/_count", self.config.index)))
            .send()
            .await
            .map_err(|e| {
                RagEvalError::BackendUnavailable(format!(
                    "Elasticsearch at {}: {}",
                    self.config.url, e
                ))
            })?;

        if !response.status().is_success() {
            return Err(RagEvalError::BackendUnavailable(format!(
                "Index '{}' is not readable: {}",
                self.config.index,
                response.status()
            )));
        }

        let parsed: CountResponse = response
            .json()
            .await
            .map_err(|e| RagEvalError::Parse(e.to_string()))?;
        Ok(parsed.count)
    }

    /// Approximate nearest-neighbor search over the `embedding` field.
    ///
    /// Returns hits in the backend's own relevance order. An empty index
    /// yields an empty vector, not an error.
    pub async fn knn_search(
        &self,
        vector: &[f32],
        k: usize,
        num_candidates: usize,
    ) -> Result<Vec<SearchHit>> {
        let request = KnnSearchRequest {
            knn: KnnClause {
                field: "embedding",
                query_vector: vector,
                k,
                num_candidates,
            },
            _source: ["text", "source"],
            size: k,
        };

        let response = self
            .client
            .post(self.endpoint(&format!("/{}/_search", self.config.index)))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                RagEvalError::BackendUnavailable(format!(
                    "Elasticsearch at {}: {}",
                    self.config.url, e
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RagEvalError::BackendUnavailable(format!(
                "search against '{}' failed ({}): {}",
                self.config.index, status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| RagEvalError::Parse(e.to_string()))?;
        parse_hits(&body)
    }
}

/// Parse the search response body into hits.
fn parse_hits(body: &str) -> Result<Vec<SearchHit>> {
    let parsed: SearchResponse = serde_json::from_str(body)?;
    Ok(parsed
        .hits
        .hits
        .into_iter()
        .map(|hit| SearchHit {
            text: hit.source.text,
            source: hit.source.source,
            raw_score: hit.score,
        })
        .collect())
}
