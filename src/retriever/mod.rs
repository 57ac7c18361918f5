//! Retrieval backends behind one interface.
//!
//! Both backends return the same result shape so the orchestrator stays
//! backend-agnostic: matches ordered by descending score, ties broken by
//! first-seen candidate order, 1-based ranks, at most `top_k` entries.

mod local;
mod remote;

pub use local::LocalRetriever;
pub use remote::RemoteRetriever;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One ranked retrieval result. Produced fresh per retrieval call and
/// recorded in at most one evaluation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalMatch {
    /// Text of the matched chunk.
    pub chunk_text: String,
    /// File the chunk came from.
    pub source_name: String,
    /// Raw similarity value used for ordering. Not clamped: ranking only
    /// needs relative order, and the unclamped value is kept for display.
    pub score: f32,
    /// 1-based rank, strictly increasing.
    pub rank: usize,
}

/// A retrieval backend: given a query, return the top-k ranked matches.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<RetrievalMatch>>;
}
