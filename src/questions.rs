//! Question loading and Q&A extraction.
//!
//! Questions either come from a JSONL file (one `{"question", "answer"}`
//! object per line) or are auto-extracted from corpus documents that
//! contain `Q:`/`A:` style pairs.

use crate::document::Document;
use crate::error::{RagEvalError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single evaluation question with its reference answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// The question text.
    #[serde(rename = "question")]
    pub text: String,
    /// Reference answer the generated answer is scored against.
    #[serde(rename = "answer", default)]
    pub expected_answer: String,
}

/// Load questions from a JSONL file.
pub fn load_questions(path: &Path) -> Result<Vec<Question>> {
    let content = std::fs::read_to_string(path).map_err(|e| RagEvalError::io(path, e))?;

    let mut questions = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let question: Question = serde_json::from_str(line).map_err(|e| {
            RagEvalError::Parse(format!(
                "Invalid question at {}:{}: {}",
                path.display(),
                line_num + 1,
                e
            ))
        })?;

        if !question.text.is_empty() {
            questions.push(question);
        }
    }

    Ok(questions)
}

/// Save questions to a JSONL file.
pub fn save_questions(questions: &[Question], path: &Path) -> Result<()> {
    let mut out = String::new();
    for q in questions {
        out.push_str(&serde_json::to_string(q)?);
        out.push('\n');
    }
    std::fs::write(path, out).map_err(|e| RagEvalError::io(path, e))
}

/// Extract `Q:`/`A:` pairs from every document in the corpus.
///
/// Recognizes English (`Q:`/`A:`) and Russian (`В:`/`О:`) prefixes and
/// multi-line answers that run until the next question or a blank line.
pub fn extract_questions(documents: &[Document]) -> Vec<Question> {
    let mut questions = Vec::new();
    for doc in documents {
        extract_from_text(&doc.raw_text, &mut questions);
    }
    questions
}

fn extract_from_text(text: &str, out: &mut Vec<Question>) {
    let mut current_question: Option<String> = None;
    let mut answer_lines: Vec<String> = Vec::new();

    for line in text.lines() {
        let line = clean_markup(line);

        if let Some(q) = strip_prefix_any(&line, &["Q:", "В:"]) {
            flush_pair(&mut current_question, &mut answer_lines, out);
            current_question = Some(q.to_string());
        } else if let Some(a) = strip_prefix_any(&line, &["A:", "О:"]) {
            if current_question.is_some() {
                answer_lines.push(a.to_string());
            }
        } else if line.is_empty() {
            flush_pair(&mut current_question, &mut answer_lines, out);
        } else if !answer_lines.is_empty() {
            // Continuation of a multi-line answer.
            answer_lines.push(line);
        }
    }

    flush_pair(&mut current_question, &mut answer_lines, out);
}

fn flush_pair(question: &mut Option<String>, answer_lines: &mut Vec<String>, out: &mut Vec<Question>) {
    if let Some(q) = question.take() {
        let answer = answer_lines.join(" ").trim().to_string();
        // Very short answers are usually extraction noise.
        if !q.is_empty() && answer.len() > 10 {
            out.push(Question {
                text: q,
                expected_answer: answer,
            });
        }
    }
    answer_lines.clear();
}

fn strip_prefix_any<'a>(line: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    for prefix in prefixes {
        if let Some(rest) = line.strip_prefix(prefix) {
            return Some(rest.trim());
        }
    }
    None
}

/// Strip common markdown decoration from a line: heading markers,
/// bold/italic asterisks, and `[text](url)` links.
fn clean_markup(line: &str) -> String {
    let line = line.trim().trim_start_matches('#').trim_start();

    let mut cleaned = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {}
            '[' => {
                // Copy the link text, drop the URL part.
                for inner in chars.by_ref() {
                    if inner == ']' {
                        break;
                    }
                    cleaned.push(inner);
                }
                if chars.peek() == Some(&'(') {
                    for inner in chars.by_ref() {
                        if inner == ')' {
                            break;
                        }
                    }
                }
            }
            _ => cleaned.push(c),
        }
    }

    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use std::fs;

    #[test]
    fn test_load_questions_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.jsonl");
        fs::write(
            &path,
            r#"{"question": "How much does Tariff X cost?", "answer": "100 rubles per month."}

{"question": "What is Tariff Y?", "answer": "A yearly plan."}
"#,
        )
        .unwrap();

        let questions = load_questions(&path).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].text, "How much does Tariff X cost?");
        assert_eq!(questions[0].expected_answer, "100 rubles per month.");
    }

    #[test]
    fn test_load_questions_bad_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.jsonl");
        fs::write(&path, "not json\n").unwrap();
        assert!(load_questions(&path).is_err());
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        let questions = vec![Question {
            text: "What is X?".to_string(),
            expected_answer: "X is a tariff.".to_string(),
        }];
        save_questions(&questions, &path).unwrap();
        let reloaded = load_questions(&path).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].text, "What is X?");
    }

    #[test]
    fn test_extract_questions() {
        let doc = Document::from_text(
            0,
            "faq.md",
            "## FAQ\n\n**Q: How much does Tariff X cost?**\nA: Tariff X costs 100 rubles per month.\n\nQ: Short?\nA: No.\n\nВ: Что такое тариф?\nО: Тариф определяет ежемесячную стоимость обслуживания.\n",
        );

        let questions = extract_questions(&[doc]);
        assert_eq!(questions.len(), 2); // "Short?" dropped, answer too short
        assert_eq!(questions[0].text, "How much does Tariff X cost?");
        assert_eq!(questions[0].expected_answer, "Tariff X costs 100 rubles per month.");
        assert_eq!(questions[1].text, "Что такое тариф?");
    }

    #[test]
    fn test_extract_multiline_answer() {
        let doc = Document::from_text(
            0,
            "faq.md",
            "Q: What are the fees?\nA: The base fee is 100 rubles.\nWithdrawals add 0.8% above the limit.\n\n",
        );

        let questions = extract_questions(&[doc]);
        assert_eq!(questions.len(), 1);
        assert!(questions[0].expected_answer.contains("0.8%"));
    }

    #[test]
    fn test_clean_markup() {
        assert_eq!(clean_markup("## **Bold heading**"), "Bold heading");
        assert_eq!(clean_markup("see [the docs](http://x) now"), "see the docs now");
    }
}
