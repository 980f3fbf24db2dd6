// Value types flowing through the answering pipeline
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw hit returned by a vector store, before payload validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredPoint {
    pub score: f32,
    pub payload: serde_json::Map<String, serde_json::Value>,
}

/// A validated chunk of corpus text retrieved for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub source_file: String,
    pub page: i64,
    pub relevance_score: f32,
}

impl RetrievedChunk {
    /// Citation label, e.g. `guide.pdf#page-3`
    pub fn source_label(&self) -> String {
        format!("{}#page-{}", self.source_file, self.page)
    }
}

/// Result of the grounding check for one answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// Judge confirmed the answer is supported by the context
    Valid,
    /// Judge rejected the answer, or the pipeline could not produce one
    Invalid { reason: String },
    /// Circuit open, judge not contacted
    Skipped { reason: String },
    /// Judge timed out or errored; answer passed through
    Degraded { reason: String },
}

impl ValidationOutcome {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }

    /// Fail-open: only an explicit rejection counts as not valid
    pub fn is_valid(&self) -> bool {
        !matches!(self, Self::Invalid { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid { reason } | Self::Skipped { reason } | Self::Degraded { reason } => {
                Some(reason)
            }
        }
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => write!(f, "valid"),
            Self::Invalid { reason } => write!(f, "invalid ({})", reason),
            Self::Skipped { reason } => write!(f, "skipped ({})", reason),
            Self::Degraded { reason } => write!(f, "degraded ({})", reason),
        }
    }
}

/// Final answer returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub answer: String,
    /// Sorted, deduplicated `file#page-N` labels
    pub sources: Vec<String>,
    pub validation: ValidationOutcome,
    pub confidence: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_label() {
        let chunk = RetrievedChunk {
            text: "Service control policies".to_string(),
            source_file: "a.pdf".to_string(),
            page: 3,
            relevance_score: 0.8,
        };
        assert_eq!(chunk.source_label(), "a.pdf#page-3");
    }

    #[test]
    fn test_is_valid_is_fail_open() {
        assert!(ValidationOutcome::Valid.is_valid());
        assert!(ValidationOutcome::Skipped { reason: "open".into() }.is_valid());
        assert!(ValidationOutcome::Degraded { reason: "timeout".into() }.is_valid());
        assert!(!ValidationOutcome::invalid("unsupported").is_valid());
    }

    #[test]
    fn test_validation_outcome_json_shape() {
        let json = serde_json::to_value(ValidationOutcome::invalid("not in context")).unwrap();
        assert_eq!(json["status"], "invalid");
        assert_eq!(json["reason"], "not in context");

        let json = serde_json::to_value(ValidationOutcome::Valid).unwrap();
        assert_eq!(json["status"], "valid");
    }
}
