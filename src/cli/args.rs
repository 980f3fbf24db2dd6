//! Command-line argument parsing for DocuMind
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DocuMind - grounded answers from your indexed documents
#[derive(Parser, Debug)]
#[command(name = "documind")]
#[command(version)]
#[command(about = "Answer questions from an indexed document corpus, with grounding checks", long_about = None)]
pub struct Args {
    /// Configuration file path (default: ~/.documind/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress all output except the answer)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Answer a single question
    Ask {
        /// The question to answer
        #[arg(value_name = "QUESTION")]
        question: String,

        /// Number of chunks to retrieve (default from config)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive question session
    Chat,

    /// Check Ollama and the vector store
    Doctor,

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Validate argument combinations clap cannot express
    pub fn validate(&self) -> Result<(), String> {
        if let Commands::Ask { question, top_k, .. } = &self.command {
            if question.trim().is_empty() {
                return Err("Question must not be empty.".to_string());
            }
            if *top_k == Some(0) {
                return Err("--top-k must be at least 1.".to_string());
            }
        }
        Ok(())
    }
}

impl Verbosity {
    /// Check if should show progress spinners
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should show sources and validation details
    pub fn show_details(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Default tracing filter for this level
    pub fn log_filter(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Normal => "warn",
            Verbosity::Verbose => "info",
            Verbosity::VeryVerbose => "debug",
        }
    }
}
