//! RAG Evaluator - retrieval-augmented generation quality measurement.
//!
//! This library runs a question set through a full RAG pipeline
//! (chunking, embedding retrieval, optional HyDE query rewriting, answer
//! generation) and scores each generated answer against a reference
//! answer by embedding similarity.
//!
//! # Overview
//!
//! For every question the pipeline:
//! 1. Optionally rewrites the question into a hypothetical answer (HyDE)
//! 2. Retrieves the top-k most similar chunks from the corpus
//! 3. Generates an answer grounded in the retrieved chunks
//! 4. Scores the answer against the expected one and classifies it
//!    correct or incorrect against a configurable threshold
//!
//! Retrieval runs against either an in-memory brute-force index built
//! from the corpus, or an external Elasticsearch kNN index.
//!
//! # Quick Start
//!
//! ```no_run
//! use rag_evaluator::{
//!     config::Config,
//!     document::load_corpus,
//!     embedding::OllamaEmbeddings,
//!     evaluator::run_pipeline,
//!     llm::OllamaClient,
//!     questions::load_questions,
//! };
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     config.validate()?;
//!
//!     let documents = load_corpus(Path::new("corpus/"))?;
//!     let questions = load_questions(Path::new("questions.jsonl"))?;
//!
//!     let provider = Arc::new(
//!         OllamaEmbeddings::connect(
//!             &config.ollama.host,
//!             &config.ollama.embedding_model,
//!             config.eval.request_timeout(),
//!         )
//!         .await?,
//!     );
//!     let generator = Arc::new(OllamaClient::new(
//!         config.ollama.clone(),
//!         config.eval.generation_timeout(),
//!     )?);
//!
//!     let output = run_pipeline(
//!         &documents,
//!         &questions,
//!         &config,
//!         provider,
//!         generator,
//!         None,
//!         false,
//!     )
//!     .await?;
//!
//!     output.stats.print_summary();
//!     Ok(())
//! }
//! ```

pub mod chunker;
pub mod config;
pub mod document;
pub mod elastic;
pub mod embedding;
pub mod error;
pub mod evaluator;
pub mod hyde;
pub mod llm;
pub mod metrics;
pub mod questions;
pub mod report;
pub mod retriever;
pub mod scorer;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::{Config, EvalConfig, RetrieverBackend};
pub use document::Document;
pub use error::{RagEvalError, Result};
pub use evaluator::{EvaluationResult, PipelineOutput, RagEvaluator, run_pipeline};
pub use metrics::AggregateStats;
pub use questions::Question;
pub use retriever::{RetrievalMatch, Retriever};
