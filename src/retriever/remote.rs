//! Delegated retrieval backend over an external Elasticsearch index.

use super::{RetrievalMatch, Retriever};
use crate::elastic::{ElasticClient, SearchHit};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagEvalError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Floor for the approximate-search candidate pool. Keeping the pool
/// well above `top_k` bounds the recall loss of approximate kNN.
const MIN_CANDIDATES: usize = 100;

/// Retrieval delegated to Elasticsearch kNN search.
///
/// Holds no chunk embeddings locally; each query is one embedding call
/// plus one search request against the index.
pub struct RemoteRetriever {
    index: ElasticClient,
    provider: Arc<dyn EmbeddingProvider>,
}

impl RemoteRetriever {
    /// Verify the index is reachable and non-degenerate, then construct.
    ///
    /// An unreachable cluster at construction time is a pre-run error;
    /// an empty index is allowed (queries then return no matches).
    pub async fn connect(index: ElasticClient, provider: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        index.ping().await?;
        let count = index.document_count().await?;
        if count == 0 {
            eprintln!(
                "warning: index '{}' is empty, every retrieval will return no matches",
                index.index()
            );
        }
        Ok(Self { index, provider })
    }

    /// Map the backend's raw score onto the Local backend's cosine scale.
    ///
    /// For cosine-metric kNN fields Elasticsearch reports
    /// `_score = (1 + cosine) / 2`; the exact inverse restores the raw
    /// cosine value, so both backends hand downstream consumers the same
    /// score semantics. Strictly monotonic in the backend's own ordering.
    fn normalize_score(raw: f32) -> f32 {
        2.0 * raw - 1.0
    }

    fn to_matches(hits: Vec<SearchHit>) -> Vec<RetrievalMatch> {
        hits.into_iter()
            .enumerate()
            .map(|(i, hit)| RetrievalMatch {
                chunk_text: hit.text,
                source_name: hit.source,
                score: Self::normalize_score(hit.raw_score),
                rank: i + 1,
            })
            .collect()
    }
}

#[async_trait]
impl Retriever for RemoteRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievalMatch>> {
        let query_embedding = self.provider.encode(query).await.map_err(|e| {
            RagEvalError::BackendUnavailable(format!("embedding the query failed: {}", e))
        })?;

        let num_candidates = MIN_CANDIDATES.max(top_k);
        let hits = self
            .index
            .knn_search(&query_embedding, top_k, num_candidates)
            .await?;

        Ok(Self::to_matches(hits))
    }
}
