//! Self-contained HTML report for an evaluation run.

use crate::error::{RagEvalError, Result};
use crate::evaluator::{EvaluationResult, PipelineOutput};
use std::fmt::Write as _;
use std::path::Path;

/// Render the run into a single HTML file with no external assets.
pub fn write_html_report(path: &Path, output: &PipelineOutput) -> Result<()> {
    let html = render(output);
    std::fs::write(path, html).map_err(|e| RagEvalError::io(path, e))?;
    Ok(())
}

fn render(output: &PipelineOutput) -> String {
    let stats = &output.stats;
    let mut html = String::with_capacity(16 * 1024);

    html.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>RAG Evaluation Report</title>\n<style>\n\
         body { font-family: sans-serif; margin: 2em; color: #222; }\n\
         .cards { display: flex; gap: 1em; flex-wrap: wrap; }\n\
         .card { border: 1px solid #ccc; border-radius: 6px; padding: 1em 1.5em; }\n\
         .card .value { font-size: 1.8em; font-weight: bold; }\n\
         table { border-collapse: collapse; margin-top: 1.5em; width: 100%; }\n\
         th, td { border: 1px solid #ccc; padding: 0.4em 0.7em; text-align: left; \
         vertical-align: top; }\n\
         th { background: #f0f0f0; }\n\
         .correct { color: #1a7f37; font-weight: bold; }\n\
         .incorrect { color: #cf222e; font-weight: bold; }\n\
         .aborted { background: #fff1f0; border: 1px solid #cf222e; padding: 0.8em; \
         border-radius: 6px; margin-top: 1em; }\n\
         details { margin: 0.2em 0; }\n\
         </style>\n</head>\n<body>\n<h1>RAG Evaluation Report</h1>\n",
    );

    // Headline cards.
    html.push_str("<div class=\"cards\">\n");
    card(&mut html, "Questions", &stats.total_count.to_string());
    card(
        &mut html,
        "Accuracy",
        &format!("{:.1}% ({}/{})", stats.accuracy * 100.0, stats.correct_count, stats.total_count),
    );
    card(&mut html, "Avg similarity", &format!("{:.1}%", stats.avg_similarity * 100.0));
    card(&mut html, "Avg match score", &format!("{:.1}%", stats.avg_match_score * 100.0));
    html.push_str("</div>\n");

    if let Some(cause) = &output.aborted {
        let _ = write!(
            html,
            "<div class=\"aborted\">Run aborted after {} question(s): {}</div>\n",
            output.results.len(),
            escape(&cause.to_string())
        );
    }

    // Retrieval quality buckets.
    html.push_str("<h2>Retrieval quality</h2>\n<table>\n<tr><th>Bucket</th><th>Matches</th></tr>\n");
    let _ = write!(html, "<tr><td>High (&ge; 70%)</td><td>{}</td></tr>\n", stats.high_quality);
    let _ = write!(html, "<tr><td>Medium (50&ndash;70%)</td><td>{}</td></tr>\n", stats.medium_quality);
    let _ = write!(html, "<tr><td>Low (&lt; 50%)</td><td>{}</td></tr>\n", stats.low_quality);
    html.push_str("</table>\n");

    // Per-source match counts.
    if !stats.source_counts.is_empty() {
        html.push_str("<h2>Matches by source</h2>\n<table>\n<tr><th>Source</th><th>Matches</th></tr>\n");
        for (source, count) in &stats.source_counts {
            let _ = write!(html, "<tr><td>{}</td><td>{}</td></tr>\n", escape(source), count);
        }
        html.push_str("</table>\n");
    }

    // Per-question detail.
    html.push_str(
        "<h2>Questions</h2>\n<table>\n<tr><th>#</th><th>Question</th><th>Verdict</th>\
         <th>Similarity</th><th>Time</th><th>Answers</th><th>Matches</th></tr>\n",
    );
    for (i, result) in output.results.iter().enumerate() {
        question_row(&mut html, i + 1, result);
    }
    html.push_str("</table>\n</body>\n</html>\n");

    html
}

fn card(html: &mut String, label: &str, value: &str) {
    let _ = write!(
        html,
        "<div class=\"card\"><div>{}</div><div class=\"value\">{}</div></div>\n",
        escape(label),
        escape(value)
    );
}

fn question_row(html: &mut String, number: usize, result: &EvaluationResult) {
    let verdict = if result.is_correct {
        "<span class=\"correct\">correct</span>"
    } else {
        "<span class=\"incorrect\">incorrect</span>"
    };

    let mut answers = String::new();
    let _ = write!(
        answers,
        "<details><summary>generated</summary>{}</details>\
         <details><summary>expected</summary>{}</details>",
        escape(&result.generated_answer),
        escape(&result.expected_answer)
    );

    let mut matches = String::new();
    for m in &result.retrieved_matches {
        let _ = write!(
            matches,
            "<details><summary>#{} {} ({:.1}%)</summary>{}</details>",
            m.rank,
            escape(&m.source_name),
            m.score * 100.0,
            escape(&m.chunk_text)
        );
    }

    let _ = write!(
        html,
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.1}%</td><td>{:.1}s</td><td>{}</td><td>{}</td></tr>\n",
        number,
        escape(&result.question),
        verdict,
        result.similarity * 100.0,
        result.response_time_secs,
        answers,
        matches
    );
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::aggregate;
    use crate::retriever::RetrievalMatch;

    fn sample_output() -> PipelineOutput {
        let results = vec![EvaluationResult {
            question: "How much does Tariff X cost?".to_string(),
            expected_answer: "100 rubles per month".to_string(),
            generated_answer: "Tariff X costs <b>100</b> rubles.".to_string(),
            similarity: 0.85,
            is_correct: true,
            retrieved_matches: vec![RetrievalMatch {
                chunk_text: "Tariff X costs 100 rubles per month.".to_string(),
                source_name: "tariff_x.md".to_string(),
                score: 0.9,
                rank: 1,
            }],
            response_time_secs: 1.2,
        }];
        let stats = aggregate(&results);
        PipelineOutput {
            results,
            stats,
            aborted: None,
        }
    }

    #[test]
    fn test_render_contains_stats_and_rows() {
        let html = render(&sample_output());
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("100.0% (1/1)"));
        assert!(html.contains("How much does Tariff X cost?"));
        assert!(html.contains("tariff_x.md"));
        assert!(html.contains("class=\"correct\""));
    }

    #[test]
    fn test_render_escapes_model_output() {
        let html = render(&sample_output());
        assert!(html.contains("&lt;b&gt;100&lt;/b&gt;"));
        assert!(!html.contains("<b>100</b>"));
    }

    #[test]
    fn test_render_marks_aborted_runs() {
        let mut output = sample_output();
        output.aborted = Some(crate::error::RagEvalError::BackendUnavailable(
            "connection refused".to_string(),
        ));
        let html = render(&output);
        assert!(html.contains("Run aborted after 1 question(s)"));
        assert!(html.contains("connection refused"));
    }

    #[test]
    fn test_write_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.html");
        write_html_report(&path, &sample_output()).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("</html>"));
    }
}
