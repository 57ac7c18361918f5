//! Result aggregation.
//!
//! `aggregate` is a pure function over the result list and may be called
//! at any point with a partial list (e.g. for progress reporting); stats
//! are always recomputed from scratch, never maintained incrementally.

use crate::evaluator::EvaluationResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Quality-bucket threshold: scores at or above this are "high".
pub const HIGH_QUALITY_THRESHOLD: f32 = 0.7;
/// Quality-bucket threshold: scores at or above this (but below high) are "medium".
pub const MEDIUM_QUALITY_THRESHOLD: f32 = 0.5;

/// Summary statistics over a set of evaluation results.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AggregateStats {
    /// Number of evaluated questions.
    pub total_count: usize,
    /// Number of answers classified as correct.
    pub correct_count: usize,
    /// `correct / total` as a fraction in [0, 1]; 0 when empty.
    pub accuracy: f64,
    /// Mean answer similarity; 0 when empty.
    pub avg_similarity: f64,
    /// Mean retrieval score over the union of all matches; 0 when none.
    pub avg_match_score: f64,
    /// Number of retrieval matches per source file.
    pub source_counts: BTreeMap<String, usize>,
    /// Matches with score >= 0.7.
    pub high_quality: usize,
    /// Matches with score in [0.5, 0.7).
    pub medium_quality: usize,
    /// Matches with score < 0.5.
    pub low_quality: usize,
}

/// Reduce a result list into summary statistics.
pub fn aggregate(results: &[EvaluationResult]) -> AggregateStats {
    let mut stats = AggregateStats {
        total_count: results.len(),
        ..Default::default()
    };

    if results.is_empty() {
        return stats;
    }

    stats.correct_count = results.iter().filter(|r| r.is_correct).count();
    stats.accuracy = stats.correct_count as f64 / stats.total_count as f64;
    stats.avg_similarity =
        results.iter().map(|r| r.similarity as f64).sum::<f64>() / stats.total_count as f64;

    let mut match_count = 0usize;
    let mut score_sum = 0f64;
    for result in results {
        for m in &result.retrieved_matches {
            match_count += 1;
            score_sum += m.score as f64;
            *stats.source_counts.entry(m.source_name.clone()).or_default() += 1;

            if m.score >= HIGH_QUALITY_THRESHOLD {
                stats.high_quality += 1;
            } else if m.score >= MEDIUM_QUALITY_THRESHOLD {
                stats.medium_quality += 1;
            } else {
                stats.low_quality += 1;
            }
        }
    }
    if match_count > 0 {
        stats.avg_match_score = score_sum / match_count as f64;
    }

    stats
}

impl AggregateStats {
    /// Print a console summary.
    pub fn print_summary(&self) {
        println!("\n========== Evaluation Results ==========");
        println!(
            "Correct answers:    {}/{} ({:.1}%)",
            self.correct_count,
            self.total_count,
            self.accuracy * 100.0
        );
        println!("Avg similarity:     {:.1}%", self.avg_similarity * 100.0);
        println!("Avg match score:    {:.1}%", self.avg_match_score * 100.0);
        println!("----------------------------------------");
        println!(
            "Retrieval quality:  {} high / {} medium / {} low",
            self.high_quality, self.medium_quality, self.low_quality
        );
        if !self.source_counts.is_empty() {
            println!("Matches by source:");
            for (source, count) in &self.source_counts {
                println!("  {:<30} {}", source, count);
            }
        }
        println!("========================================\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retriever::RetrievalMatch;

    fn result(similarity: f32, is_correct: bool, scores: &[(f32, &str)]) -> EvaluationResult {
        EvaluationResult {
            question: "q".to_string(),
            expected_answer: "e".to_string(),
            generated_answer: "g".to_string(),
            similarity,
            is_correct,
            retrieved_matches: scores
                .iter()
                .enumerate()
                .map(|(i, (score, source))| RetrievalMatch {
                    chunk_text: "text".to_string(),
                    source_name: source.to_string(),
                    score: *score,
                    rank: i + 1,
                })
                .collect(),
            response_time_secs: 0.1,
        }
    }

    #[test]
    fn test_aggregate_empty() {
        let stats = aggregate(&[]);
        assert_eq!(stats.total_count, 0);
        assert_eq!(stats.accuracy, 0.0);
        assert_eq!(stats.avg_similarity, 0.0);
        assert_eq!(stats.avg_match_score, 0.0);
    }

    #[test]
    fn test_aggregate_counts_and_means() {
        let results = vec![
            result(0.9, true, &[(0.8, "a.md"), (0.6, "b.md")]),
            result(0.3, false, &[(0.4, "a.md")]),
        ];

        let stats = aggregate(&results);
        assert_eq!(stats.total_count, 2);
        assert_eq!(stats.correct_count, 1);
        assert!((stats.accuracy - 0.5).abs() < 1e-9);
        assert!((stats.avg_similarity - 0.6).abs() < 1e-6);
        assert!((stats.avg_match_score - 0.6).abs() < 1e-6);
        assert_eq!(stats.source_counts["a.md"], 2);
        assert_eq!(stats.source_counts["b.md"], 1);
    }

    #[test]
    fn test_quality_buckets() {
        let results = vec![result(
            0.5,
            false,
            &[(0.95, "a"), (0.7, "a"), (0.69, "a"), (0.5, "a"), (0.49, "a"), (0.1, "a")],
        )];

        let stats = aggregate(&results);
        // Boundaries: 0.7 is high, 0.5 is medium, below 0.5 is low.
        assert_eq!(stats.high_quality, 2);
        assert_eq!(stats.medium_quality, 2);
        assert_eq!(stats.low_quality, 2);
    }

    #[test]
    fn test_aggregate_is_pure() {
        let results = vec![result(0.8, true, &[(0.9, "a.md")])];
        let first = aggregate(&results);
        let second = aggregate(&results);
        assert_eq!(first.total_count, second.total_count);
        assert_eq!(first.correct_count, second.correct_count);
        assert_eq!(first.source_counts, second.source_counts);
    }
}
