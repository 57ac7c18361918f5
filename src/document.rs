//! Document representation and corpus loading.
//!
//! A document is one raw text file; the chunker turns it into retrieval
//! units. Documents are immutable once loaded.

use crate::error::{RagEvalError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use walkdir::WalkDir;

/// Extensions treated as corpus documents.
const CORPUS_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// A single corpus document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier within one run (0-based load order).
    pub id: usize,
    /// File name the document came from (used in retrieval matches).
    pub source_name: String,
    /// Raw text content.
    pub raw_text: String,
}

impl Document {
    /// Create a document from raw text.
    pub fn from_text(id: usize, source_name: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            id,
            source_name: source_name.into(),
            raw_text: raw_text.into(),
        }
    }

    /// Load a single text file.
    pub fn from_text_file(id: usize, path: &Path) -> Result<Self> {
        let raw_text = std::fs::read_to_string(path).map_err(|e| RagEvalError::io(path, e))?;

        let source_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled")
            .to_string();

        Ok(Self {
            id,
            source_name,
            raw_text,
        })
    }
}

/// Load all `.txt` and `.md` files under a directory (recursive).
///
/// Files are loaded in sorted path order so document ids are stable
/// across runs. An empty corpus is a fatal pre-run error.
pub fn load_corpus(dir: &Path) -> Result<Vec<Document>> {
    if !dir.is_dir() {
        return Err(RagEvalError::Config(format!(
            "Corpus path '{}' does not exist or is not a directory",
            dir.display()
        )));
    }

    let mut paths: Vec<_> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| CORPUS_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let doc = Document::from_text_file(documents.len(), &path)?;
        if !doc.raw_text.trim().is_empty() {
            documents.push(doc);
        }
    }

    if documents.is_empty() {
        return Err(RagEvalError::EmptyCorpus(dir.to_path_buf()));
    }

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_document_from_text() {
        let doc = Document::from_text(0, "tariffs.md", "Tariff X costs 100 rubles.");
        assert_eq!(doc.id, 0);
        assert_eq!(doc.source_name, "tariffs.md");
        assert!(!doc.raw_text.is_empty());
    }

    #[test]
    fn test_load_corpus() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "Document A content").unwrap();
        fs::write(dir.path().join("b.md"), "Document B content").unwrap();
        fs::write(dir.path().join("ignored.json"), "{}").unwrap();
        fs::write(dir.path().join("empty.txt"), "   \n").unwrap();

        let docs = load_corpus(dir.path()).unwrap();
        assert_eq!(docs.len(), 2);
        // Sorted path order, stable ids.
        assert_eq!(docs[0].source_name, "a.txt");
        assert_eq!(docs[0].id, 0);
        assert_eq!(docs[1].source_name, "b.md");
        assert_eq!(docs[1].id, 1);
    }

    #[test]
    fn test_load_corpus_empty_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_corpus(dir.path()).unwrap_err();
        assert!(matches!(err, RagEvalError::EmptyCorpus(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_load_corpus_missing_dir_fails() {
        let err = load_corpus(Path::new("/nonexistent/corpus/dir")).unwrap_err();
        assert!(matches!(err, RagEvalError::Config(_)));
    }
}
