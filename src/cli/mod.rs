//! CLI module for DocuMind
//!
//! Handles command-line argument parsing, the chat session and terminal
//! rendering of results.

pub mod args;
pub mod chat;
pub mod display;

pub use args::{Args, Commands, Verbosity};
pub use chat::{ChatCommand, ChatSession};
pub use display::ResultDisplay;
