//! Generation collaborator integration.
//!
//! Provides the `Generator` trait, the Ollama-backed client, and the
//! prompt templates for answer generation and HyDE rewriting.

mod client;
mod prompts;

pub use client::{Generator, OllamaClient};
pub use prompts::Prompts;
