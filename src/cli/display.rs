//! Terminal rendering for query results and operator views

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::cli::Verbosity;
use crate::rag::types::{QueryResult, ValidationOutcome};
use crate::rag::validator::CircuitBreakerState;
use crate::telemetry::QueryStats;

/// Renders results according to the verbosity level
pub struct ResultDisplay {
    verbosity: Verbosity,
}

impl ResultDisplay {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    /// Show welcome banner for the chat session
    pub fn show_banner(&self, version: &str, model: &str, collection: &str) {
        if !self.verbosity.show_details() {
            return;
        }
        let width = 64;
        println!("\n{}", "=".repeat(width).cyan());
        println!("{}", format!("  DocuMind {} - Grounded Q&A", version).bold().cyan());
        println!("{}", format!("  Model: {} | Collection: {}", model, collection).dimmed());
        println!("{}\n", "=".repeat(width).cyan());
        println!(
            "Ask a question (or {} for commands, {} to quit)\n",
            "/help".green(),
            "/quit".green()
        );
    }

    /// Spinner shown while a query is in flight. Hidden in quiet mode.
    pub fn start_spinner(&self, question: &str) -> ProgressBar {
        if !self.verbosity.show_progress() {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Searching documents for: {}", truncate(question, 60)));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn show_result(&self, result: &QueryResult) {
        println!("\n{}", result.answer);

        if !self.verbosity.show_details() {
            return;
        }

        if !result.sources.is_empty() {
            println!("\n{}", "Sources:".bold());
            for source in &result.sources {
                println!("  - {}", source);
            }
        }

        println!("\n{} {}", "Validation:".bold(), format_validation(&result.validation));
        println!("{} {}\n", "Confidence:".bold(), format_confidence(result.confidence));
    }

    pub fn show_json(&self, result: &QueryResult) -> serde_json::Result<()> {
        println!("{}", serde_json::to_string_pretty(result)?);
        Ok(())
    }

    pub fn show_stats(&self, stats: &QueryStats) {
        println!("\n{}", "Query Metrics".bold());
        println!("─────────────────────────────────────");
        println!("Total queries:       {}", stats.total_queries);
        println!("Successful:          {}", stats.successful_queries);
        println!("Failed:              {}", stats.failed_queries);
        println!("Validation failures: {}", stats.validation_failures);
        println!("Avg latency:         {:.2} ms", stats.avg_latency_ms);
        if let Some(at) = stats.last_query_at {
            println!("Last query:          {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        println!();
    }

    pub fn show_circuit(&self, state: &CircuitBreakerState, threshold: u32) {
        let status = if state.is_open {
            "OPEN (validation skipped)".red().bold()
        } else {
            "closed".green()
        };
        println!(
            "Validation circuit: {} | consecutive failures: {}/{}",
            status, state.consecutive_failures, threshold
        );
    }

    pub fn show_info(&self, message: &str) {
        if self.verbosity.show_details() {
            println!("{} {}", "ℹ".blue(), message);
        }
    }

    pub fn show_success(&self, message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    pub fn show_error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message.red());
    }
}

fn format_validation(outcome: &ValidationOutcome) -> ColoredString {
    match outcome {
        ValidationOutcome::Valid => "grounded".green(),
        ValidationOutcome::Invalid { reason } => format!("rejected - {}", reason).red(),
        ValidationOutcome::Skipped { reason } => format!("skipped - {}", reason).yellow(),
        ValidationOutcome::Degraded { reason } => format!("unchecked - {}", reason).yellow(),
    }
}

fn format_confidence(confidence: f64) -> ColoredString {
    let text = format!("{:.2}", confidence);
    if confidence >= 0.7 {
        text.green()
    } else if confidence >= 0.4 {
        text.yellow()
    } else {
        text.red()
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééé", 3), "ééé…");
    }

    #[test]
    fn test_validation_labels() {
        assert!(format_validation(&ValidationOutcome::Valid).contains("grounded"));
        assert!(format_validation(&ValidationOutcome::invalid("nope")).contains("nope"));
    }
}
