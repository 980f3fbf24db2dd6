//! External collaborators consumed by the query engine
//!
//! The engine only sees these traits. Production implementations live in
//! `index` (embeddings, qdrant) and `llm` (Ollama); tests plug in fakes.

use async_trait::async_trait;

use crate::errors::Result;
use crate::rag::types::ScoredPoint;

/// Turns texts into L2-normalized vectors of the index dimension
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Nearest-neighbour search over the indexed corpus, best match first
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredPoint>>;
}

/// Text completion service used to draft answers
#[async_trait]
pub trait Generator: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Grounding judge. Returns the literal `VALID` or a free-text rejection reason.
#[async_trait]
pub trait Judge: Send + Sync {
    async fn evaluate(&self, question: &str, answer: &str, context: &str) -> Result<String>;
}
