//! Semantic similarity scoring between texts.
//!
//! Used in two places with different contracts: ranking (raw cosine,
//! unclamped) and correctness classification (clamped to `[0, 1]`).
//! This is the only component allowed to absorb a collaborator failure
//! into a sentinel value, because it gates a pass/fail decision that
//! must always produce an answer.

use crate::embedding::{EmbeddingProvider, cosine_similarity};
use std::sync::Arc;

/// Fold a similarity value into `[0, 1]`. Negative cosine similarity
/// counts as 0 for classification purposes.
pub fn clamp_unit(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// Outcome of scoring two texts. `value` is the raw cosine similarity;
/// `error` carries the cause when a provider failure was absorbed into
/// the 0.0 sentinel.
#[derive(Debug)]
pub struct TextScore {
    pub value: f32,
    pub error: Option<String>,
}

impl TextScore {
    fn ok(value: f32) -> Self {
        Self { value, error: None }
    }

    fn degraded(cause: String) -> Self {
        Self {
            value: 0.0,
            error: Some(cause),
        }
    }
}

/// Scores semantic similarity between texts via an embedding provider.
pub struct SimilarityScorer {
    provider: Arc<dyn EmbeddingProvider>,
}

impl SimilarityScorer {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    /// Cosine similarity between two precomputed embeddings.
    pub fn score(a: &[f32], b: &[f32]) -> f32 {
        cosine_similarity(a, b)
    }

    /// Embed both texts and compute their cosine similarity.
    ///
    /// Either input being empty returns exactly 0.0 without invoking the
    /// provider. A provider failure returns 0.0 with the cause reported
    /// in [`TextScore::error`]; it never propagates past this boundary.
    pub async fn score_text(&self, text1: &str, text2: &str) -> TextScore {
        if text1.is_empty() || text2.is_empty() {
            return TextScore::ok(0.0);
        }

        let embedding1 = match self.provider.encode(text1).await {
            Ok(v) => v,
            Err(e) => return TextScore::degraded(e.to_string()),
        };
        let embedding2 = match self.provider.encode(text2).await {
            Ok(v) => v,
            Err(e) => return TextScore::degraded(e.to_string()),
        };

        TextScore::ok(cosine_similarity(&embedding1, &embedding2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockEmbedding;

    #[test]
    fn test_clamp_unit() {
        assert_eq!(clamp_unit(-0.3), 0.0);
        assert_eq!(clamp_unit(0.0), 0.0);
        assert_eq!(clamp_unit(0.42), 0.42);
        assert_eq!(clamp_unit(1.0), 1.0);
        assert_eq!(clamp_unit(1.7), 1.0);
    }

    #[tokio::test]
    async fn test_empty_input_short_circuits() {
        let provider = Arc::new(MockEmbedding::new());
        let scorer = SimilarityScorer::new(provider.clone());

        let score = scorer.score_text("", "anything").await;
        assert_eq!(score.value, 0.0);
        assert!(score.error.is_none());

        let score = scorer.score_text("anything", "").await;
        assert_eq!(score.value, 0.0);

        // No embedding calls were made for degenerate input.
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_identical_text_scores_one() {
        let scorer = SimilarityScorer::new(Arc::new(MockEmbedding::new()));
        let score = scorer.score_text("100 rubles per month", "100 rubles per month").await;
        assert!((score.value - 1.0).abs() < 1e-6);
        assert!(score.error.is_none());
    }

    #[tokio::test]
    async fn test_provider_failure_absorbed_to_zero() {
        let scorer = SimilarityScorer::new(Arc::new(MockEmbedding::failing()));
        let score = scorer.score_text("generated answer", "expected answer").await;
        assert_eq!(score.value, 0.0);
        assert!(score.error.is_some());
    }

    #[tokio::test]
    async fn test_partial_overlap_scores_between() {
        let scorer = SimilarityScorer::new(Arc::new(MockEmbedding::new()));
        // One shared token out of two on each side: cosine is exactly 0.5.
        let score = scorer.score_text("alpha beta", "alpha gamma").await;
        assert!((score.value - 0.5).abs() < 1e-6);
    }
}
