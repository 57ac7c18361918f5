//! RAG Evaluator CLI
//!
//! Measures answer quality of a retrieval-augmented generation pipeline
//! over a document corpus and a question set.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rag_evaluator::{
    config::{Config, RetrieverBackend},
    document::load_corpus,
    elastic::ElasticClient,
    embedding::{EmbeddingProvider, OllamaEmbeddings},
    evaluator::run_pipeline,
    llm::OllamaClient,
    questions::{extract_questions, load_questions, save_questions},
    report::write_html_report,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// RAG Evaluator - measure answer quality of a RAG pipeline
#[derive(Parser)]
#[command(name = "rag-eval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an evaluation over a corpus and a question set
    Evaluate {
        /// Directory with the document corpus (.txt / .md files)
        corpus: PathBuf,

        /// Question set in JSONL format; extracted from the corpus when omitted
        #[arg(short, long)]
        questions: Option<PathBuf>,

        /// Retrieval backend: local or remote
        #[arg(short, long)]
        backend: Option<RetrieverBackend>,

        /// Number of chunks to retrieve per question
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Similarity threshold for classifying an answer as correct
        #[arg(short = 't', long)]
        threshold: Option<f32>,

        /// Enable HyDE query rewriting
        #[arg(long)]
        hyde: bool,

        /// Maximum number of questions to evaluate (random sample)
        #[arg(short, long)]
        max_questions: Option<usize>,

        /// Seed for reproducible question sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Chunk size in characters
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Chunk overlap in characters
        #[arg(long)]
        chunk_overlap: Option<usize>,

        /// Write an HTML report to this path
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Write itemized results as JSON to this path
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Print per-question progress instead of dots
        #[arg(short, long)]
        verbose: bool,
    },

    /// Extract Q/A pairs from a corpus into a JSONL question set
    Extract {
        /// Directory with the document corpus
        corpus: PathBuf,

        /// Output path for the question set
        #[arg(short, long, default_value = "questions.jsonl")]
        output: PathBuf,
    },

    /// Test connectivity to Ollama (and Elasticsearch when configured)
    Test,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            corpus,
            questions,
            backend,
            top_k,
            threshold,
            hyde,
            max_questions,
            seed,
            chunk_size,
            chunk_overlap,
            report,
            output,
            verbose,
        } => {
            let opts = EvaluateOpts {
                corpus,
                questions,
                backend,
                top_k,
                threshold,
                hyde,
                max_questions,
                seed,
                chunk_size,
                chunk_overlap,
                report,
                output,
                verbose,
            };
            cmd_evaluate(opts).await
        }
        Commands::Extract { corpus, output } => cmd_extract(corpus, output),
        Commands::Test => cmd_test().await,
    }
}

struct EvaluateOpts {
    corpus: PathBuf,
    questions: Option<PathBuf>,
    backend: Option<RetrieverBackend>,
    top_k: Option<usize>,
    threshold: Option<f32>,
    hyde: bool,
    max_questions: Option<usize>,
    seed: Option<u64>,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    report: Option<PathBuf>,
    output: Option<PathBuf>,
    verbose: bool,
}

async fn cmd_evaluate(opts: EvaluateOpts) -> Result<()> {
    println!("Loading configuration...");
    let mut config = Config::load().context("Failed to load configuration")?;
    apply_overrides(&mut config, &opts);
    config.validate().context("Invalid configuration")?;

    println!("Loading corpus: {}", opts.corpus.display());
    let documents = load_corpus(&opts.corpus).context("Failed to load corpus")?;
    println!("  {} document(s)", documents.len());

    let questions = match &opts.questions {
        Some(path) => {
            let questions = load_questions(path).context("Failed to load question set")?;
            println!("Loaded {} question(s) from {}", questions.len(), path.display());
            questions
        }
        None => {
            let questions = extract_questions(&documents);
            println!("Extracted {} question(s) from the corpus", questions.len());
            questions
        }
    };
    if questions.is_empty() {
        anyhow::bail!("No questions to evaluate. Provide --questions or add Q:/A: pairs to the corpus.");
    }

    println!("Connecting to Ollama at {}...", config.ollama.host);
    let provider = Arc::new(
        OllamaEmbeddings::connect(
            &config.ollama.host,
            &config.ollama.embedding_model,
            config.eval.request_timeout(),
        )
        .await
        .context("Failed to connect to the embedding model")?,
    );
    let generator = Arc::new(
        OllamaClient::new(config.ollama.clone(), config.eval.generation_timeout())
            .context("Failed to create the generation client")?,
    );

    let index = match config.eval.backend {
        RetrieverBackend::Remote => {
            println!("Using remote backend: {} (index '{}')", config.elastic.url, config.elastic.index);
            Some(
                ElasticClient::new(config.elastic.clone(), config.eval.request_timeout())
                    .context("Failed to create the Elasticsearch client")?,
            )
        }
        RetrieverBackend::Local => {
            println!("Using local backend ({} char chunks, {} overlap)", config.eval.chunk_size, config.eval.chunk_overlap);
            None
        }
    };

    println!(
        "Evaluating with model '{}' (top-k {}, threshold {:.0}%{})",
        config.ollama.model,
        config.eval.top_k,
        config.eval.similarity_threshold * 100.0,
        if config.eval.hyde_enabled { ", HyDE on" } else { "" }
    );

    let start = Instant::now();
    let result = run_pipeline(
        &documents,
        &questions,
        &config,
        provider,
        generator,
        index,
        opts.verbose,
    )
    .await
    .context("Evaluation failed")?;

    result.stats.print_summary();
    println!("Total time: {:.1?}", start.elapsed());

    if let Some(path) = &opts.output {
        let json = serde_json::to_string_pretty(&result.results)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write results to '{}'", path.display()))?;
        println!("Results saved to: {}", path.display());
    }

    if let Some(path) = &opts.report {
        write_html_report(path, &result).context("Failed to write the HTML report")?;
        println!("Report saved to: {}", path.display());
    }

    if let Some(cause) = result.aborted {
        anyhow::bail!("Run aborted after {} question(s): {}", result.results.len(), cause);
    }
    Ok(())
}

fn apply_overrides(config: &mut Config, opts: &EvaluateOpts) {
    if let Some(backend) = opts.backend {
        config.eval.backend = backend;
    }
    if let Some(top_k) = opts.top_k {
        config.eval.top_k = top_k;
    }
    if let Some(threshold) = opts.threshold {
        config.eval.similarity_threshold = threshold;
    }
    if opts.hyde {
        config.eval.hyde_enabled = true;
    }
    if let Some(max) = opts.max_questions {
        config.eval.max_questions = max;
    }
    if opts.seed.is_some() {
        config.eval.random_seed = opts.seed;
    }
    if let Some(size) = opts.chunk_size {
        config.eval.chunk_size = size;
    }
    if let Some(overlap) = opts.chunk_overlap {
        config.eval.chunk_overlap = overlap;
    }
}

fn cmd_extract(corpus: PathBuf, output: PathBuf) -> Result<()> {
    let documents = load_corpus(&corpus).context("Failed to load corpus")?;
    let questions = extract_questions(&documents);

    if questions.is_empty() {
        anyhow::bail!("No Q:/A: pairs found in the corpus.");
    }

    save_questions(&questions, &output).context("Failed to save question set")?;
    println!("Extracted {} question(s) to: {}", questions.len(), output.display());
    Ok(())
}

async fn cmd_test() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    println!("Testing Ollama at {}...", config.ollama.host);
    let client = OllamaClient::new(config.ollama.clone(), config.eval.generation_timeout())?;
    client
        .check_connection()
        .await
        .context("Ollama connection test failed")?;
    println!("  Generation model '{}': OK", config.ollama.model);

    let embeddings = OllamaEmbeddings::connect(
        &config.ollama.host,
        &config.ollama.embedding_model,
        config.eval.request_timeout(),
    )
    .await
    .context("Embedding model test failed")?;
    println!(
        "  Embedding model '{}': OK ({} dimensions)",
        config.ollama.embedding_model,
        embeddings.dimension()
    );

    if config.eval.backend == RetrieverBackend::Remote {
        println!("Testing Elasticsearch at {}...", config.elastic.url);
        let elastic = ElasticClient::new(config.elastic.clone(), config.eval.request_timeout())?;
        elastic.ping().await.context("Elasticsearch ping failed")?;
        let count = elastic.document_count().await?;
        println!("  Index '{}': OK ({} documents)", config.elastic.index, count);
    }

    println!("\nAll connections OK.");
    Ok(())
}
