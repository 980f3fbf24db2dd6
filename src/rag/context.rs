// Context assembly from retrieved chunks
use std::collections::BTreeSet;

use crate::rag::types::RetrievedChunk;

/// Separator between chunk texts in the context blob
pub const CHUNK_SEPARATOR: &str = "\n\n";

/// Context handed to the generator and the judge, plus the scoring inputs
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledContext {
    /// Chunk texts joined in retrieval rank order
    pub text: String,
    /// Retrieval similarity per chunk, same order as `text`
    pub scores: Vec<f32>,
    /// Distinct `file#page-N` labels
    pub sources: BTreeSet<String>,
}

impl AssembledContext {
    pub fn from_chunks(chunks: &[RetrievedChunk]) -> Self {
        let text = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(CHUNK_SEPARATOR);

        Self {
            text,
            scores: chunks.iter().map(|c| c.relevance_score).collect(),
            sources: chunks.iter().map(RetrievedChunk::source_label).collect(),
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.scores.len()
    }

    pub fn average_score(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        self.scores.iter().map(|&s| s as f64).sum::<f64>() / self.scores.len() as f64
    }

    /// Sources as a sorted list for the response
    pub fn source_list(&self) -> Vec<String> {
        self.sources.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, file: &str, page: i64, score: f32) -> RetrievedChunk {
        RetrievedChunk {
            text: text.to_string(),
            source_file: file.to_string(),
            page,
            relevance_score: score,
        }
    }

    #[test]
    fn test_context_joins_in_rank_order() {
        let ctx = AssembledContext::from_chunks(&[
            chunk("alpha", "b.pdf", 2, 0.9),
            chunk("beta", "a.pdf", 1, 0.7),
        ]);
        assert_eq!(ctx.text, "alpha\n\nbeta");
        assert_eq!(ctx.scores, vec![0.9, 0.7]);
        assert_eq!(ctx.chunk_count(), 2);
    }

    #[test]
    fn test_sources_sorted_and_deduplicated() {
        let ctx = AssembledContext::from_chunks(&[
            chunk("one", "a.pdf", 3, 0.9),
            chunk("two", "a.pdf", 3, 0.8),
            chunk("three", "a.pdf", 10, 0.6),
            chunk("four", "Z.pdf", 1, 0.5),
        ]);
        // Lexicographic, so page-10 sorts before page-3
        assert_eq!(
            ctx.source_list(),
            vec!["Z.pdf#page-1", "a.pdf#page-10", "a.pdf#page-3"]
        );
        assert_eq!(ctx.chunk_count(), 4);
    }

    #[test]
    fn test_average_score() {
        let ctx = AssembledContext::from_chunks(&[
            chunk("one", "a.pdf", 1, 0.5),
            chunk("two", "a.pdf", 2, 0.7),
        ]);
        assert!((ctx.average_score() - 0.6).abs() < 1e-6);
        assert_eq!(AssembledContext::from_chunks(&[]).average_score(), 0.0);
    }
}
