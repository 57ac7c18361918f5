//! Configuration for the RAG evaluator.
//!
//! Supports both environment variables and a YAML config file.
//! Environment variables take precedence over config file values;
//! CLI flags (applied by the binary) take precedence over both.

use crate::error::{RagEvalError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which retrieval backend the pipeline uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrieverBackend {
    /// Brute-force cosine search over in-memory chunk embeddings.
    Local,
    /// Delegated nearest-neighbor search against an Elasticsearch index.
    Remote,
}

impl FromStr for RetrieverBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            other => Err(format!("unknown backend '{other}' (expected 'local' or 'remote')")),
        }
    }
}

/// Evaluation pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Chunk size in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between consecutive chunks, in characters.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Number of top retrieval results per question.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Similarity threshold for classifying an answer as correct (inclusive).
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f32,

    /// Whether to rewrite queries with HyDE before retrieval.
    #[serde(default)]
    pub hyde_enabled: bool,

    /// Timeout for a single generation call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub generation_timeout_secs: u64,

    /// Timeout for a single embedding or search request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Seed for question down-sampling. Same seed + same input set
    /// gives the same subset across runs.
    #[serde(default)]
    pub random_seed: Option<u64>,

    /// Maximum number of questions to evaluate per run.
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,

    /// Retrieval backend selection.
    #[serde(default = "default_backend")]
    pub backend: RetrieverBackend,
}

fn default_chunk_size() -> usize {
    500
}

fn default_chunk_overlap() -> usize {
    50
}

fn default_top_k() -> usize {
    5
}

fn default_threshold() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_questions() -> usize {
    10
}

fn default_backend() -> RetrieverBackend {
    RetrieverBackend::Local
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            similarity_threshold: default_threshold(),
            hyde_enabled: false,
            generation_timeout_secs: default_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            random_seed: None,
            max_questions: default_max_questions(),
            backend: default_backend(),
        }
    }
}

impl EvalConfig {
    /// Generation timeout as a [`Duration`].
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    /// Embedding/search request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Ollama collaborator settings (generation + embeddings).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server.
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Model used for answer generation and HyDE rewriting.
    #[serde(default = "default_ollama_model")]
    pub model: String,

    /// Model used for text embeddings.
    #[serde(default = "default_embed_model")]
    pub embedding_model: String,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3".to_string()
}

fn default_embed_model() -> String {
    "nomic-embed-text".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
            embedding_model: default_embed_model(),
        }
    }
}

/// Elasticsearch collaborator settings (remote backend only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticConfig {
    /// Base URL of the Elasticsearch server.
    #[serde(default = "default_elastic_url")]
    pub url: String,

    /// Index to search.
    #[serde(default = "default_elastic_index")]
    pub index: String,
}

fn default_elastic_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_elastic_index() -> String {
    "documents".to_string()
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            url: default_elastic_url(),
            index: default_elastic_index(),
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Evaluation pipeline settings.
    #[serde(default)]
    pub eval: EvalConfig,
    /// Ollama settings.
    #[serde(default)]
    pub ollama: OllamaConfig,
    /// Elasticsearch settings.
    #[serde(default)]
    pub elastic: ElasticConfig,
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (OLLAMA_HOST, OLLAMA_MODEL, OLLAMA_EMBED_MODEL,
    ///    ELASTIC_URL, ELASTIC_INDEX)
    /// 2. Config file (~/.config/rag-evaluator/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                config = Self::load_from_file(&config_path)?;
            }
        }

        if let Ok(host) = env::var("OLLAMA_HOST") {
            config.ollama.host = host;
        }
        if let Ok(model) = env::var("OLLAMA_MODEL") {
            config.ollama.model = model;
        }
        if let Ok(model) = env::var("OLLAMA_EMBED_MODEL") {
            config.ollama.embedding_model = model;
        }
        if let Ok(url) = env::var("ELASTIC_URL") {
            config.elastic.url = url;
        }
        if let Ok(index) = env::var("ELASTIC_INDEX") {
            config.elastic.index = index;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RagEvalError::io(path, e))?;

        serde_yaml::from_str(&content)
            .map_err(|e| RagEvalError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "rag-evaluator")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate settings before a run. Every violation here is a
    /// pre-run configuration error; nothing is silently corrected.
    pub fn validate(&self) -> Result<()> {
        let eval = &self.eval;

        if eval.chunk_size == 0 {
            return Err(RagEvalError::Config("chunk_size must be positive".to_string()));
        }
        if eval.chunk_overlap >= eval.chunk_size {
            return Err(RagEvalError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                eval.chunk_overlap, eval.chunk_size
            )));
        }
        if eval.top_k == 0 {
            return Err(RagEvalError::Config("top_k must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&eval.similarity_threshold) {
            return Err(RagEvalError::Config(format!(
                "similarity_threshold must be within [0, 1], got {}",
                eval.similarity_threshold
            )));
        }
        if eval.max_questions == 0 {
            return Err(RagEvalError::Config("max_questions must be at least 1".to_string()));
        }
        if eval.generation_timeout_secs == 0 || eval.request_timeout_secs == 0 {
            return Err(RagEvalError::Config("timeouts must be positive".to_string()));
        }
        if self.ollama.host.is_empty() {
            return Err(RagEvalError::Config("Ollama host is required".to_string()));
        }
        if eval.backend == RetrieverBackend::Remote && self.elastic.url.is_empty() {
            return Err(RagEvalError::Config(
                "Elasticsearch URL is required for the remote backend".to_string(),
            ));
        }

        Ok(())
    }
}
