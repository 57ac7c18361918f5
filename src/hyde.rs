//! HyDE query rewriting.
//!
//! HyDE (Hypothetical Document Embeddings) replaces the question with a
//! short hypothetical answer before retrieval, which tends to embed
//! closer to the passages that actually contain the answer.

use crate::llm::{Generator, Prompts};
use std::sync::Arc;

/// Maximum length of a rewritten query, in characters.
pub const MAX_REWRITE_CHARS: usize = 500;

/// Rewrites questions into hypothetical answers before retrieval.
///
/// When disabled, `rewrite` is the identity function and makes no
/// generation call. When enabled, it makes exactly one generation call
/// per question and falls back to the original question on any failure,
/// so worst-case latency stays bounded at one call.
pub struct HydeRewriter {
    generator: Arc<dyn Generator>,
    enabled: bool,
}

impl HydeRewriter {
    pub fn new(generator: Arc<dyn Generator>, enabled: bool) -> Self {
        Self { generator, enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Rewrite a question for retrieval. Never fails and never retries.
    pub async fn rewrite(&self, question: &str) -> String {
        if !self.enabled {
            return question.to_string();
        }

        match self.generator.generate(&Prompts::hyde(question)).await {
            Ok(answer) => {
                let answer = answer.trim();
                if answer.is_empty() {
                    question.to_string()
                } else {
                    answer.chars().take(MAX_REWRITE_CHARS).collect()
                }
            }
            Err(_) => question.to_string(),
        }
    }
}
