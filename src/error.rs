//! Error types for the RAG evaluator.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, RagEvalError>;

/// Errors that can occur while running an evaluation.
///
/// The orchestrator distinguishes two severities via [`RagEvalError::is_fatal`]:
/// fatal errors abort the whole batch (already-collected results are kept),
/// everything else is absorbed into a degraded per-question result.
#[derive(Error, Debug)]
pub enum RagEvalError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration (bad chunking parameters, missing settings, ...).
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The corpus directory contains no usable documents.
    #[error("No documents found in corpus at '{0}'")]
    EmptyCorpus(PathBuf),

    /// A component was constructed without the data it needs.
    #[error("Not initialized: {0}")]
    NotInitialized(String),

    /// The retrieval backend (or the embedding provider feeding it)
    /// cannot be reached. Aborts the batch.
    #[error("Retrieval backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The generation collaborator failed for a single call.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// The embedding provider failed for a single call.
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// HTTP transport error.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// A collaborator returned a response we could not parse.
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl RagEvalError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error must abort the whole batch.
    ///
    /// Configuration problems and an unreachable backend affect every
    /// remaining question; a single failed generation or embedding call
    /// only degrades the question it happened on.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Io { .. }
                | Self::Config(_)
                | Self::EmptyCorpus(_)
                | Self::NotInitialized(_)
                | Self::BackendUnavailable(_)
        )
    }
}

impl From<reqwest::Error> for RagEvalError {
    fn from(err: reqwest::Error) -> Self {
        RagEvalError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for RagEvalError {
    fn from(err: serde_json::Error) -> Self {
        RagEvalError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(RagEvalError::Config("bad overlap".into()).is_fatal());
        assert!(RagEvalError::BackendUnavailable("refused".into()).is_fatal());
        assert!(RagEvalError::NotInitialized("no chunks".into()).is_fatal());

        assert!(!RagEvalError::Generation("timeout".into()).is_fatal());
        assert!(!RagEvalError::Embedding("timeout".into()).is_fatal());
        assert!(!RagEvalError::Http("503".into()).is_fatal());
        assert!(!RagEvalError::Parse("bad json".into()).is_fatal());
    }
}
