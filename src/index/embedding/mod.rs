pub mod engine;

pub use engine::{l2_normalize, CandleEmbedder, EmbeddingEngine};
