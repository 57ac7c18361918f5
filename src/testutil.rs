//! Deterministic test doubles for the collaborator interfaces.

use crate::embedding::EmbeddingProvider;
use crate::error::{RagEvalError, Result};
use crate::llm::Generator;
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Embedding dimensionality of the mock provider. Matches the MiniLM
/// family the production models use.
pub const MOCK_DIMENSION: usize = 384;

/// Deterministic bag-of-words embedding: each lowercase alphanumeric
/// token is FNV-1a hashed into one of [`MOCK_DIMENSION`] buckets and
/// counted. Cosine similarity over these vectors behaves like token
/// overlap, which is enough to make ranking assertions meaningful.
pub struct MockEmbedding {
    calls: AtomicUsize,
    fail: bool,
}

impl MockEmbedding {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    /// A provider whose every call fails, for degraded-path tests.
    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    /// Number of `encode` calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn embed_sync(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; MOCK_DIMENSION];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let slot = fnv1a(&token.to_lowercase()) as usize % MOCK_DIMENSION;
            vector[slot] += 1.0;
        }
        vector
    }
}

impl Default for MockEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedding {
    async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RagEvalError::Embedding("mock embedding failure".to_string()));
        }
        Ok(Self::embed_sync(text))
    }

    fn dimension(&self) -> usize {
        MOCK_DIMENSION
    }
}

fn fnv1a(s: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in s.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Scripted generation collaborator: pops answers front-to-back, or
/// fails every call.
pub struct MockGenerator {
    responses: Mutex<Vec<String>>,
    fail: bool,
    calls: AtomicUsize,
}

impl MockGenerator {
    /// Always returns `answer`.
    pub fn fixed(answer: &str) -> Self {
        Self {
            responses: Mutex::new(vec![answer.to_string()]),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Returns the scripted answers in order, repeating the last one.
    pub fn scripted(answers: &[&str]) -> Self {
        Self {
            responses: Mutex::new(answers.iter().map(|s| s.to_string()).collect()),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// A generator whose every call fails, for fallback tests.
    pub fn failing() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `generate` calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RagEvalError::Generation("mock generation failure".to_string()));
        }
        let mut responses = self.responses.lock().expect("mock lock poisoned");
        if responses.len() > 1 {
            Ok(responses.remove(0))
        } else {
            responses
                .first()
                .cloned()
                .ok_or_else(|| RagEvalError::Generation("mock has no responses".to_string()))
        }
    }
}
