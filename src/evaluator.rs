//! Evaluation orchestrator.
//!
//! Drives the per-question pipeline (rewrite, retrieve, generate,
//! score), isolates per-item failures into degraded results, and
//! assembles the result set. Questions are processed strictly one at a
//! time in input order; the only shared state is the append-only result
//! list owned by the orchestrator itself.

use crate::config::{Config, EvalConfig, RetrieverBackend};
use crate::document::Document;
use crate::elastic::ElasticClient;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagEvalError, Result};
use crate::hyde::HydeRewriter;
use crate::llm::{Generator, Prompts};
use crate::metrics::{AggregateStats, aggregate};
use crate::questions::Question;
use crate::retriever::{LocalRetriever, RemoteRetriever, RetrievalMatch, Retriever};
use crate::scorer::{SimilarityScorer, clamp_unit};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

/// Outcome of evaluating one question. Append-only; never mutated after
/// creation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EvaluationResult {
    pub question: String,
    pub expected_answer: String,
    pub generated_answer: String,
    /// Clamped similarity between generated and expected answer.
    pub similarity: f32,
    /// Whether `similarity >= threshold` (inclusive).
    pub is_correct: bool,
    pub retrieved_matches: Vec<RetrievalMatch>,
    pub response_time_secs: f64,
}

/// Everything a run produces: itemized results, aggregate statistics,
/// and the fatal error when the batch was aborted mid-run. Results
/// collected before an abort are kept, never discarded.
#[derive(Debug)]
pub struct PipelineOutput {
    pub results: Vec<EvaluationResult>,
    pub stats: AggregateStats,
    pub aborted: Option<RagEvalError>,
}

/// The per-question pipeline driver.
pub struct RagEvaluator {
    retriever: Arc<dyn Retriever>,
    generator: Arc<dyn Generator>,
    scorer: SimilarityScorer,
    rewriter: HydeRewriter,
    config: EvalConfig,
    // Seeded exactly once at construction so down-sampling is
    // reproducible for a given seed and input set.
    rng: StdRng,
    verbose: bool,
}

impl RagEvaluator {
    pub fn new(
        config: EvalConfig,
        retriever: Arc<dyn Retriever>,
        generator: Arc<dyn Generator>,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let rewriter = HydeRewriter::new(generator.clone(), config.hyde_enabled);

        Self {
            retriever,
            generator,
            scorer: SimilarityScorer::new(provider),
            rewriter,
            config,
            rng,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Execute the batch: sample, then process each question in order.
    ///
    /// A fatal retrieval failure aborts the remainder of the batch;
    /// everything else degrades only the question it happened on.
    pub async fn run(&mut self, questions: &[Question]) -> PipelineOutput {
        let selected = self.sample(questions);
        let total = selected.len();

        let mut results = Vec::with_capacity(total);
        let mut aborted = None;

        for (i, question) in selected.iter().enumerate() {
            if self.verbose {
                println!("[{}/{}] {}", i + 1, total, truncate(&question.text, 80));
            } else {
                print!(".");
                std::io::stdout().flush().ok();
            }

            match self.evaluate_question(question).await {
                Ok(result) => {
                    if self.verbose {
                        let status = if result.is_correct { "OK" } else { "FAIL" };
                        println!(
                            "  [{}] similarity {:.1}% in {:.1}s",
                            status,
                            result.similarity * 100.0,
                            result.response_time_secs
                        );
                    }
                    results.push(result);
                }
                Err(e) => {
                    eprintln!("\nFatal error on question {}/{}: {}", i + 1, total, e);
                    aborted = Some(e);
                    break;
                }
            }
        }
        if !self.verbose {
            println!();
        }

        let stats = aggregate(&results);
        PipelineOutput {
            results,
            stats,
            aborted,
        }
    }

    /// Down-sample the question set to `max_questions`.
    ///
    /// Sampled indices are sorted so evaluation order stays input order.
    fn sample(&mut self, questions: &[Question]) -> Vec<Question> {
        if questions.len() <= self.config.max_questions {
            return questions.to_vec();
        }

        let mut indices = rand::seq::index::sample(
            &mut self.rng,
            questions.len(),
            self.config.max_questions,
        )
        .into_vec();
        indices.sort_unstable();

        indices.into_iter().map(|i| questions[i].clone()).collect()
    }

    /// Run one question through REWRITE -> RETRIEVE -> GENERATE -> SCORE.
    ///
    /// Returns `Err` only for fatal conditions; per-item failures come
    /// back as a degraded `Ok` result so the batch keeps going.
    async fn evaluate_question(&self, question: &Question) -> Result<EvaluationResult> {
        let start = Instant::now();

        // REWRITE: cannot fail; falls back to the question itself.
        let query = self.rewriter.rewrite(&question.text).await;
        if self.verbose && self.rewriter.is_enabled() && query != question.text {
            println!("  rewrote query: {}", truncate(&query, 80));
        }

        // RETRIEVE: a fatal error means the backend is gone for every
        // remaining question too, so it escalates past this item.
        let matches = match self.retriever.retrieve(&query, self.config.top_k).await {
            Ok(matches) => matches,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                return Ok(self.degraded(question, Vec::new(), &e.to_string(), start));
            }
        };

        // GENERATE: failures degrade this question but keep the matches
        // that were already obtained.
        let prompt = Prompts::rag_answer(&question.text, &matches);
        let answer = match self.generator.generate(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                return Ok(self.degraded(question, matches, &e.to_string(), start));
            }
        };

        // SCORE: the scorer absorbs its own failures into 0.0.
        let score = self.scorer.score_text(&answer, &question.expected_answer).await;
        if let Some(cause) = &score.error {
            eprintln!("warning: similarity scoring degraded: {}", cause);
        }
        let similarity = clamp_unit(score.value);
        // A failed scoring can never classify as correct, whatever the
        // threshold.
        let is_correct = score.error.is_none() && similarity >= self.config.similarity_threshold;

        Ok(EvaluationResult {
            question: question.text.clone(),
            expected_answer: question.expected_answer.clone(),
            generated_answer: answer,
            similarity,
            is_correct,
            retrieved_matches: matches,
            response_time_secs: start.elapsed().as_secs_f64(),
        })
    }

    fn degraded(
        &self,
        question: &Question,
        matches: Vec<RetrievalMatch>,
        cause: &str,
        start: Instant,
    ) -> EvaluationResult {
        EvaluationResult {
            question: question.text.clone(),
            expected_answer: question.expected_answer.clone(),
            generated_answer: format!("ERROR: {}", cause),
            similarity: 0.0,
            is_correct: false,
            retrieved_matches: matches,
            response_time_secs: start.elapsed().as_secs_f64(),
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

/// Pipeline entry point: build the configured backend and run the batch.
///
/// `Err` is returned only for pre-run failures (invalid configuration,
/// unreachable collaborator at construction time). A mid-run abort is
/// reported in [`PipelineOutput::aborted`] next to the partial results.
pub async fn run_pipeline(
    documents: &[Document],
    questions: &[Question],
    config: &Config,
    provider: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn Generator>,
    index: Option<ElasticClient>,
    verbose: bool,
) -> Result<PipelineOutput> {
    config.validate()?;

    let retriever: Arc<dyn Retriever> = match config.eval.backend {
        RetrieverBackend::Local => Arc::new(
            LocalRetriever::build(
                documents,
                config.eval.chunk_size,
                config.eval.chunk_overlap,
                provider.clone(),
            )
            .await?,
        ),
        RetrieverBackend::Remote => {
            let index = index.ok_or_else(|| {
                RagEvalError::Config("remote backend requires an Elasticsearch client".to_string())
            })?;
            Arc::new(RemoteRetriever::connect(index, provider.clone()).await?)
        }
    };

    let mut evaluator =
        RagEvaluator::new(config.eval.clone(), retriever, generator, provider).with_verbose(verbose);
    Ok(evaluator.run(questions).await)
}
