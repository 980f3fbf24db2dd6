pub mod engine;

pub use engine::{filter_chunks, Retrieval, RetrievalEngine};
