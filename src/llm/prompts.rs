//! Prompt templates for answer generation and HyDE rewriting.

use crate::retriever::RetrievalMatch;

/// Collection of prompts used by the pipeline.
pub struct Prompts;

impl Prompts {
    /// Build the RAG answering prompt: ordered context blocks (best match
    /// first, tagged with rank, relevance and source) followed by the
    /// question and grounding instructions.
    pub fn rag_answer(question: &str, matches: &[RetrievalMatch]) -> String {
        let context = if matches.is_empty() {
            "(no relevant passages found)".to_string()
        } else {
            matches
                .iter()
                .map(|m| {
                    format!(
                        "[Chunk {}, relevance: {:.0}%, source: {}]\n{}",
                        m.rank,
                        m.score.clamp(0.0, 1.0) * 100.0,
                        m.source_name,
                        m.chunk_text
                    )
                })
                .collect::<Vec<_>>()
                .join("\n\n")
        };

        format!(
            r#"You are an expert assistant. Answer the client's question using the documentation below.

RULES:
1. Use ONLY information from the context below
2. Answer briefly and precisely (1-3 sentences)
3. If the context contains exact numbers, percentages or formulas, copy them verbatim
4. If the answer requires a calculation, do it and give the concrete number
5. If the context does not contain the answer, say "The information was not found in the documents"
6. Do not use markdown formatting

CONTEXT:
{context}

QUESTION: {question}

ANSWER:"#
        )
    }

    /// Build the HyDE prompt asking for a short hypothetical answer.
    pub fn hyde(question: &str) -> String {
        format!(
            r#"Write a short hypothetical answer (2-3 sentences) to the following question, as if it came from product documentation. Do not say you are unsure; just write a plausible, concrete answer.

QUESTION: {question}

HYPOTHETICAL ANSWER:"#
        )
    }
}
