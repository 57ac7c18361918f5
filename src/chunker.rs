//! Sliding-window text chunking.
//!
//! Splits one document into overlapping fixed-size character spans. The
//! chunker is deterministic and never recovers from bad parameters: an
//! invalid `chunk_size`/`overlap` pair is a configuration error.

use crate::error::{RagEvalError, Result};
use serde::{Deserialize, Serialize};

/// A bounded contiguous span of a document's text.
///
/// Offsets are character indices (not bytes) into the trimmed document
/// text, so `char_start..char_end` always describes a valid span.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Id of the document this chunk came from.
    pub document_id: usize,
    /// 0-based position of the chunk within its document.
    pub sequence_index: usize,
    /// Chunk text content.
    pub text: String,
    /// Start character offset (inclusive).
    pub char_start: usize,
    /// End character offset (exclusive).
    pub char_end: usize,
}

/// Split text into overlapping chunks of `chunk_size` characters.
///
/// The window start advances by `chunk_size - overlap` each step, so
/// consecutive chunks share exactly `overlap` characters (the final
/// chunk may be shorter; it is the remainder). Input is trimmed first;
/// text shorter than `chunk_size` yields exactly one chunk equal to the
/// trimmed input, and whitespace-only text yields no chunks.
///
/// Requires `0 <= overlap < chunk_size`, else `RagEvalError::Config`.
pub fn split(text: &str, document_id: usize, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    if chunk_size == 0 {
        return Err(RagEvalError::Config("chunk_size must be positive".to_string()));
    }
    if overlap >= chunk_size {
        return Err(RagEvalError::Config(format!(
            "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
        )));
    }

    let chars: Vec<char> = text.trim().chars().collect();
    let text_len = chars.len();
    if text_len == 0 {
        return Ok(Vec::new());
    }

    let stride = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text_len {
        let end = (start + chunk_size).min(text_len);
        chunks.push(Chunk {
            document_id,
            sequence_index: chunks.len(),
            text: chars[start..end].iter().collect(),
            char_start: start,
            char_end: end,
        });

        if end == text_len {
            break;
        }
        start += stride;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameters() {
        assert!(split("text", 0, 0, 0).is_err());
        assert!(split("text", 0, 10, 10).is_err());
        assert!(split("text", 0, 10, 15).is_err());
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = split("  Tariff X costs 100 rubles per month.  ", 3, 500, 50).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Tariff X costs 100 rubles per month.");
        assert_eq!(chunks[0].document_id, 3);
        assert_eq!(chunks[0].char_start, 0);
        assert_eq!(chunks[0].char_end, chunks[0].text.chars().count());
    }

    #[test]
    fn test_empty_text_no_chunks() {
        assert!(split("", 0, 100, 10).unwrap().is_empty());
        assert!(split("   \n\t ", 0, 100, 10).unwrap().is_empty());
    }

    #[test]
    fn test_coverage_and_overlap() {
        let text: String = ('a'..='z').cycle().take(237).collect();
        let chunk_size = 50;
        let overlap = 10;
        let chunks = split(&text, 0, chunk_size, overlap).unwrap();

        // Spans cover [0, L) with no gaps.
        assert_eq!(chunks[0].char_start, 0);
        assert_eq!(chunks.last().unwrap().char_end, 237);
        for pair in chunks.windows(2) {
            assert!(pair[1].char_start < pair[0].char_end, "gap between chunks");
            // Consecutive chunks overlap by exactly `overlap`, except
            // possibly the final pair when the remainder is short.
            if pair[1].char_end - pair[1].char_start == chunk_size {
                assert_eq!(pair[0].char_end - pair[1].char_start, overlap);
            }
        }

        // All but the last chunk are full-size.
        for chunk in &chunks[..chunks.len() - 1] {
            assert_eq!(chunk.char_end - chunk.char_start, chunk_size);
            assert_eq!(chunk.text.chars().count(), chunk_size);
        }

        // Sequence indices are dense and 0-based.
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.sequence_index, i);
            assert!(!chunk.text.is_empty());
            assert!(chunk.char_end > chunk.char_start);
        }
    }

    #[test]
    fn test_exact_multiple_no_empty_tail() {
        // 100 chars, size 50, overlap 0: exactly two chunks.
        let text: String = "x".repeat(100);
        let chunks = split(&text, 0, 50, 0).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].char_start, 50);
        assert_eq!(chunks[1].char_end, 100);
    }

    #[test]
    fn test_zero_overlap_partitions() {
        let text: String = "ab".repeat(60); // 120 chars
        let chunks = split(&text, 0, 50, 0).unwrap();
        assert_eq!(chunks.len(), 3);
        let reassembled: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(reassembled, text);
    }
}
