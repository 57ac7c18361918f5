//! Brute-force in-memory retrieval backend.

use super::{RetrievalMatch, Retriever};
use crate::chunker;
use crate::document::Document;
use crate::embedding::{EmbeddingProvider, cosine_similarity};
use crate::error::{RagEvalError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Embedding batch size used when indexing the corpus.
const EMBED_BATCH_SIZE: usize = 32;

struct IndexEntry {
    text: String,
    source: String,
    embedding: Vec<f32>,
}

/// Retrieval over an in-memory set of chunk embeddings.
///
/// Chunks all documents and embeds every chunk once at construction;
/// each query is then a single embedding call plus an O(n) cosine scan.
pub struct LocalRetriever {
    entries: Vec<IndexEntry>,
    provider: Arc<dyn EmbeddingProvider>,
}

impl std::fmt::Debug for LocalRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalRetriever")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl LocalRetriever {
    /// Chunk and embed the corpus.
    ///
    /// Fails with `NotInitialized` if the corpus produces zero chunks,
    /// and with `Config` on invalid chunking parameters.
    pub async fn build(
        documents: &[Document],
        chunk_size: usize,
        chunk_overlap: usize,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let mut pending: Vec<(String, String)> = Vec::new();
        for doc in documents {
            for chunk in chunker::split(&doc.raw_text, doc.id, chunk_size, chunk_overlap)? {
                pending.push((chunk.text, doc.source_name.clone()));
            }
        }

        if pending.is_empty() {
            return Err(RagEvalError::NotInitialized(
                "local retriever constructed with zero chunks".to_string(),
            ));
        }

        let mut entries = Vec::with_capacity(pending.len());
        for batch in pending.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<&str> = batch.iter().map(|(text, _)| text.as_str()).collect();
            let embeddings = provider.encode_batch(&texts).await.map_err(|e| {
                RagEvalError::BackendUnavailable(format!("embedding the corpus failed: {}", e))
            })?;

            for ((text, source), embedding) in batch.iter().cloned().zip(embeddings) {
                entries.push(IndexEntry {
                    text,
                    source,
                    embedding,
                });
            }
        }

        Ok(Self { entries, provider })
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl Retriever for LocalRetriever {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievalMatch>> {
        let query_embedding = self.provider.encode(query).await.map_err(|e| {
            RagEvalError::BackendUnavailable(format!("embedding the query failed: {}", e))
        })?;

        let mut scored: Vec<(f32, &IndexEntry)> = self
            .entries
            .iter()
            .map(|entry| (cosine_similarity(&query_embedding, &entry.embedding), entry))
            .collect();

        // Stable sort: equal scores keep first-seen candidate order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .enumerate()
            .map(|(i, (score, entry))| RetrievalMatch {
                chunk_text: entry.text.clone(),
                source_name: entry.source.clone(),
                score,
                rank: i + 1,
            })
            .collect())
    }
}
