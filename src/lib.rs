//! DocuMind - grounded question answering
//!
//! Answers natural-language questions against an indexed document corpus:
//! retrieve relevant chunks, draft an answer with a local LLM, check that the
//! answer is grounded in the retrieved context, and attach a confidence score.
//!
//! # Architecture
//!
//! - **rag**: the query pipeline (retrieval, grounding validation with a
//!   circuit breaker, confidence scoring, orchestration)
//! - **index**: candle embeddings and the qdrant vector store
//! - **llm**: Ollama client used for generation and as the grounding judge
//! - **telemetry**: query metrics, latency logging, tracing setup

pub mod errors;
pub mod config;
pub mod rag;
pub mod index;
pub mod llm;
pub mod telemetry;
pub mod cli;

// Re-export commonly used types
pub use errors::{DocuMindError, Result};
pub use rag::{QueryEngine, QueryResult, ValidationOutcome};
