//! Interactive question session using rustyline
//!
//! Plain lines are questions. Slash commands give the operator access to
//! metrics and the validation circuit.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

use crate::cli::ResultDisplay;
use crate::rag::QueryEngine;

/// One line of chat input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Ask(String),
    ResetCircuit,
    Circuit,
    Stats,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl ChatCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        if !trimmed.starts_with('/') {
            return Self::Ask(trimmed.to_string());
        }
        match trimmed.to_lowercase().as_str() {
            "/reset" => Self::ResetCircuit,
            "/circuit" => Self::Circuit,
            "/stats" => Self::Stats,
            "/help" | "/?" => Self::Help,
            "/quit" | "/exit" | "/q" => Self::Quit,
            _ => Self::Unknown(trimmed.to_string()),
        }
    }
}

/// Chat loop over a query engine
pub struct ChatSession<'a> {
    engine: &'a QueryEngine,
    display: ResultDisplay,
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
    circuit_threshold: u32,
}

impl<'a> ChatSession<'a> {
    pub fn new(engine: &'a QueryEngine, display: ResultDisplay, circuit_threshold: u32) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;
        let history_path = dirs::home_dir().map(|h| h.join(".documind").join("history"));
        if let Some(path) = &history_path {
            if path.exists() {
                let _ = editor.load_history(path);
            }
        }

        Ok(Self {
            engine,
            display,
            editor,
            history_path,
            circuit_threshold,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        loop {
            let line = match self.editor.readline("documind> ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            };

            let command = ChatCommand::parse(&line);
            if !matches!(command, ChatCommand::Empty) {
                let _ = self.editor.add_history_entry(line.trim());
            }

            match command {
                ChatCommand::Empty => continue,
                ChatCommand::Quit => break,
                ChatCommand::Help => self.show_help(),
                ChatCommand::Stats => self.display.show_stats(&self.engine.metrics().get_stats()),
                ChatCommand::Circuit => self
                    .display
                    .show_circuit(&self.engine.circuit_state(), self.circuit_threshold),
                ChatCommand::ResetCircuit => {
                    self.engine.reset_validation_circuit();
                    self.display.show_success("Validation circuit reset");
                }
                ChatCommand::Unknown(cmd) => {
                    self.display.show_error(&format!("Unknown command: {} (try /help)", cmd));
                }
                ChatCommand::Ask(question) => {
                    let spinner = self.display.start_spinner(&question);
                    let outcome = self.engine.ask(&question).await;
                    spinner.finish_and_clear();
                    match outcome {
                        Ok(result) => self.display.show_result(&result),
                        Err(e) => self.display.show_error(&format!("Query failed: {}", e)),
                    }
                }
            }
        }

        self.save_history();
        Ok(())
    }

    fn save_history(&mut self) {
        if let Some(path) = &self.history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = self.editor.save_history(path);
        }
    }

    fn show_help(&self) {
        println!("  /stats    query metrics");
        println!("  /circuit  validation circuit state");
        println!("  /reset    close the validation circuit");
        println!("  /quit     leave the session");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_question() {
        assert_eq!(
            ChatCommand::parse("  What is an OU?  "),
            ChatCommand::Ask("What is an OU?".to_string())
        );
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ChatCommand::parse("/reset"), ChatCommand::ResetCircuit);
        assert_eq!(ChatCommand::parse("/STATS"), ChatCommand::Stats);
        assert_eq!(ChatCommand::parse("/circuit"), ChatCommand::Circuit);
        assert_eq!(ChatCommand::parse("/exit"), ChatCommand::Quit);
        assert_eq!(ChatCommand::parse(""), ChatCommand::Empty);
        assert_eq!(
            ChatCommand::parse("/frobnicate"),
            ChatCommand::Unknown("/frobnicate".to_string())
        );
    }
}
