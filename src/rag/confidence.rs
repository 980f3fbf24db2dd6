//! Answer confidence scoring
//!
//! Combines retrieval relevance and context coverage into a score in
//! `[0, 1]`. A rejected answer always scores zero.

/// Mean cosine similarity at or below this contributes nothing
const RETRIEVAL_FLOOR: f64 = 0.2;

/// Width of the useful similarity range; the ceiling is `0.2 + 0.7 = 0.9`
const RETRIEVAL_SPAN: f64 = 0.7;

/// Chunk count at which coverage saturates
const FULL_COVERAGE_CHUNKS: f64 = 5.0;

const RETRIEVAL_WEIGHT: f64 = 0.7;
const COVERAGE_WEIGHT: f64 = 0.3;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceScorer;

impl ConfidenceScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score an answer from its retrieval scores, chunk count and grounding verdict
    pub fn score(&self, retrieval_scores: &[f32], chunk_count: usize, is_valid: bool) -> f64 {
        if !is_valid {
            return 0.0;
        }

        let retrieval = Self::retrieval_confidence(retrieval_scores);
        let coverage = (chunk_count as f64 / FULL_COVERAGE_CHUNKS).clamp(0.0, 1.0);

        round2(RETRIEVAL_WEIGHT * retrieval + COVERAGE_WEIGHT * coverage)
    }

    fn retrieval_confidence(scores: &[f32]) -> f64 {
        if scores.is_empty() {
            return 0.0;
        }
        let mean = scores.iter().map(|&s| s as f64).sum::<f64>() / scores.len() as f64;
        let scaled = (mean - RETRIEVAL_FLOOR) / RETRIEVAL_SPAN;
        if scaled.is_nan() {
            return 0.0;
        }
        scaled.clamp(0.0, 1.0)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_scores_zero() {
        let scorer = ConfidenceScorer::new();
        assert_eq!(scorer.score(&[0.95; 5], 5, false), 0.0);
    }

    #[test]
    fn test_saturated_inputs_score_one() {
        let scorer = ConfidenceScorer::new();
        assert_eq!(scorer.score(&[0.9; 5], 5, true), 1.0);
    }

    #[test]
    fn test_floor_similarity_single_chunk() {
        let scorer = ConfidenceScorer::new();
        assert_eq!(scorer.score(&[0.2], 1, true), 0.06);
    }

    #[test]
    fn test_mid_range() {
        let scorer = ConfidenceScorer::new();
        // mean 0.55 -> 0.5 retrieval, 3 chunks -> 0.6 coverage
        assert_eq!(scorer.score(&[0.5, 0.6, 0.55], 3, true), 0.53);
    }

    #[test]
    fn test_coverage_caps_at_five_chunks() {
        let scorer = ConfidenceScorer::new();
        assert_eq!(
            scorer.score(&[0.6; 5], 5, true),
            scorer.score(&[0.6; 5], 12, true)
        );
    }

    #[test]
    fn test_below_floor_contributes_nothing() {
        let scorer = ConfidenceScorer::new();
        assert_eq!(scorer.score(&[0.05, 0.1], 2, true), 0.12);
    }

    #[test]
    fn test_empty_scores_are_total() {
        let scorer = ConfidenceScorer::new();
        assert_eq!(scorer.score(&[], 0, true), 0.0);
    }
}
