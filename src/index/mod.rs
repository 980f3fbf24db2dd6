//! Index access: the query-side embedding model and the vector store
//!
//! The corpus is indexed offline; this crate only reads it.

pub mod embedding;
pub mod vector_db;

pub use embedding::{CandleEmbedder, EmbeddingEngine};
pub use vector_db::VectorDBManager;
