// Retrieval stage: embed the question, search the index, validate payloads
use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::{DocuMindError, Result};
use crate::rag::services::{Embedder, VectorStore};
use crate::rag::types::{RetrievedChunk, ScoredPoint};

/// Outcome of the retrieval stage for one question
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval {
    /// The vector store returned nothing
    Empty,
    /// Hits came back but none survived payload validation
    AllMalformed { dropped: usize },
    /// Usable chunks, in retrieval rank order
    Chunks(Vec<RetrievedChunk>),
}

impl TryFrom<&ScoredPoint> for RetrievedChunk {
    type Error = &'static str;

    fn try_from(point: &ScoredPoint) -> std::result::Result<Self, Self::Error> {
        let text = point
            .payload
            .get("text")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or("missing text")?;
        let file = point
            .payload
            .get("file")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or("missing file")?;
        let page = point
            .payload
            .get("page")
            .and_then(page_number)
            .ok_or("missing page")?;

        Ok(Self {
            text: text.to_string(),
            source_file: file.to_string(),
            page,
            relevance_score: point.score,
        })
    }
}

// Indexers differ on whether pages are stored as ints, floats or strings
fn page_number(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Keep complete records, dropping malformed ones with a warning
pub fn filter_chunks(points: &[ScoredPoint]) -> Vec<RetrievedChunk> {
    points
        .iter()
        .filter_map(|point| match RetrievedChunk::try_from(point) {
            Ok(chunk) => Some(chunk),
            Err(problem) => {
                warn!(problem, payload = ?point.payload, "Skipping malformed chunk");
                None
            }
        })
        .collect()
}

/// Retrieval engine over an embedder and a vector store
pub struct RetrievalEngine {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
}

impl RetrievalEngine {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self { embedder, store }
    }

    /// Retrieve up to `top_k` validated chunks for a question
    pub async fn retrieve(&self, question: &str, top_k: usize) -> Result<Retrieval> {
        let mut vectors = self.embedder.embed(&[question.to_string()]).await?;
        let query_vector = vectors
            .pop()
            .ok_or_else(|| DocuMindError::Embedding("embedder returned no vector".to_string()))?;

        let points = self.store.query(&query_vector, top_k).await?;
        debug!(hits = points.len(), top_k, "Vector search returned");

        if points.is_empty() {
            return Ok(Retrieval::Empty);
        }

        let chunks = filter_chunks(&points);
        if chunks.is_empty() {
            return Ok(Retrieval::AllMalformed {
                dropped: points.len(),
            });
        }

        Ok(Retrieval::Chunks(chunks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn point(score: f32, payload: serde_json::Value) -> ScoredPoint {
        ScoredPoint {
            score,
            payload: payload.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_complete_payload_converts() {
        let p = point(0.82, json!({"text": "SCPs restrict accounts", "file": "org.pdf", "page": 7}));
        let chunk = RetrievedChunk::try_from(&p).unwrap();
        assert_eq!(chunk.source_file, "org.pdf");
        assert_eq!(chunk.page, 7);
        assert_eq!(chunk.relevance_score, 0.82);
    }

    #[test]
    fn test_page_zero_is_kept() {
        let p = point(0.5, json!({"text": "Cover", "file": "org.pdf", "page": 0}));
        assert_eq!(RetrievedChunk::try_from(&p).unwrap().page, 0);
    }

    #[test]
    fn test_page_as_string_or_float() {
        let p = point(0.5, json!({"text": "t", "file": "f.pdf", "page": "12"}));
        assert_eq!(RetrievedChunk::try_from(&p).unwrap().page, 12);

        let p = point(0.5, json!({"text": "t", "file": "f.pdf", "page": 4.0}));
        assert_eq!(RetrievedChunk::try_from(&p).unwrap().page, 4);
    }

    #[test]
    fn test_missing_or_empty_fields_rejected() {
        assert!(RetrievedChunk::try_from(&point(0.5, json!({"file": "f.pdf", "page": 1}))).is_err());
        assert!(RetrievedChunk::try_from(&point(0.5, json!({"text": "", "file": "f.pdf", "page": 1}))).is_err());
        assert!(RetrievedChunk::try_from(&point(0.5, json!({"text": "t", "page": 1}))).is_err());
        assert!(RetrievedChunk::try_from(&point(0.5, json!({"text": "t", "file": "f.pdf"}))).is_err());
        assert!(RetrievedChunk::try_from(&point(0.5, json!({"text": "t", "file": "f.pdf", "page": null}))).is_err());
    }

    #[test]
    fn test_filter_keeps_rank_order() {
        let points = vec![
            point(0.9, json!({"text": "first", "file": "a.pdf", "page": 1})),
            point(0.8, json!({"file": "broken.pdf"})),
            point(0.7, json!({"text": "third", "file": "b.pdf", "page": 2})),
        ];

        let chunks = filter_chunks(&points);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "first");
        assert_eq!(chunks[1].text, "third");
    }
}
