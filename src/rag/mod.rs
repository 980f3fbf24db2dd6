// Query-time answering pipeline
//
// Components:
// - Retrieval: embed the question, search the index, validate payloads
// - Context: join chunk texts, collect scores and source labels
// - Validator: grounding judge behind a timeout and a circuit breaker
// - Confidence: retrieval quality + coverage, zeroed on rejection
// - Pipeline: the QueryEngine tying the stages together

pub mod confidence;
pub mod context;
pub mod pipeline;
pub mod retrieval;
pub mod services;
pub mod types;
pub mod validator;

// Re-export key types
pub use confidence::ConfidenceScorer;
pub use context::AssembledContext;
pub use pipeline::QueryEngine;
pub use retrieval::RetrievalEngine;
pub use services::{Embedder, Generator, Judge, VectorStore};
pub use types::{QueryResult, RetrievedChunk, ScoredPoint, ValidationOutcome};
pub use validator::{CircuitBreaker, CircuitBreakerState, GroundingValidator};
