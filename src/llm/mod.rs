//! Language model access (generation and grounding judge)

pub mod client;
pub mod prompts;

pub use client::{OllamaClient, OllamaJudge};
