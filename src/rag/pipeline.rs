// Query engine: retrieve -> generate -> validate -> score
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::{DocuMindError, Result};
use crate::llm::prompts;
use crate::rag::confidence::ConfidenceScorer;
use crate::rag::context::AssembledContext;
use crate::rag::retrieval::{Retrieval, RetrievalEngine};
use crate::rag::services::{Embedder, Generator, Judge, VectorStore};
use crate::rag::types::{QueryResult, ValidationOutcome};
use crate::rag::validator::{CircuitBreakerState, GroundingValidator};
use crate::telemetry::{self, QueryMetrics};

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);

pub const NO_CONTEXT_REASON: &str = "No relevant context retrieved.";
pub const MALFORMED_CONTEXT_REASON: &str = "Retrieved chunks were empty or malformed.";

/// How far a query got, for metrics
struct Completed {
    result: QueryResult,
    reached_validation: bool,
}

impl Completed {
    fn early(result: QueryResult) -> Self {
        Self {
            result,
            reached_validation: false,
        }
    }
}

/// Orchestrates one question through the answering pipeline
pub struct QueryEngine {
    retrieval: RetrievalEngine,
    generator: Arc<dyn Generator>,
    validator: GroundingValidator,
    scorer: ConfidenceScorer,
    metrics: QueryMetrics,
    generation_timeout: Duration,
    default_top_k: usize,
}

impl QueryEngine {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        generator: Arc<dyn Generator>,
        validator: GroundingValidator,
    ) -> Self {
        Self {
            retrieval: RetrievalEngine::new(embedder, store),
            generator,
            validator,
            scorer: ConfidenceScorer::new(),
            metrics: QueryMetrics::new(),
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
            default_top_k: DEFAULT_TOP_K,
        }
    }

    /// Wire an engine from configuration
    pub fn from_config(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        generator: Arc<dyn Generator>,
        judge: Arc<dyn Judge>,
        config: &Config,
    ) -> Self {
        let validator = GroundingValidator::new(judge, &config.validation);
        let mut engine = Self::new(embedder, store, generator, validator)
            .with_generation_timeout(config.generation_timeout());
        engine.default_top_k = config.query.top_k.max(1);
        engine
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }

    /// Share a metrics collector with another observer
    pub fn with_metrics(mut self, metrics: QueryMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Answer with the configured default `top_k`
    pub async fn ask(&self, question: &str) -> Result<QueryResult> {
        self.answer(question, self.default_top_k).await
    }

    /// Answer a question from the indexed corpus.
    ///
    /// Empty retrieval, generation failure and judge rejection come back as
    /// degraded `QueryResult`s. Only embedding or vector-store failures are
    /// returned as errors.
    pub async fn answer(&self, question: &str, top_k: usize) -> Result<QueryResult> {
        let span = info_span!("query", query_id = %Uuid::new_v4());

        async move {
            let (outcome, latency_ms) =
                telemetry::timed("rag.answer", self.run(question, top_k.max(1))).await;

            match &outcome {
                Ok(done) => self.metrics.record_query(
                    done.reached_validation,
                    latency_ms,
                    done.result.validation.is_valid(),
                ),
                Err(_) => self.metrics.record_query(false, latency_ms, true),
            }

            outcome.map(|done| done.result)
        }
        .instrument(span)
        .await
    }

    async fn run(&self, question: &str, top_k: usize) -> Result<Completed> {
        info!(question_length = question.len(), top_k, "Query received");

        let chunks = match self.retrieval.retrieve(question, top_k).await? {
            Retrieval::Chunks(chunks) => chunks,
            Retrieval::Empty => {
                warn!("No results found for query");
                return Ok(Completed::early(rejected(NO_CONTEXT_REASON)));
            }
            Retrieval::AllMalformed { dropped } => {
                warn!(dropped, "All retrieved chunks were malformed");
                return Ok(Completed::early(rejected(MALFORMED_CONTEXT_REASON)));
            }
        };

        let context = AssembledContext::from_chunks(&chunks);
        info!(
            chunks = context.chunk_count(),
            avg_score = %format!("{:.3}", context.average_score()),
            "Retrieval complete"
        );

        let prompt = prompts::answer_prompt(&context.text, question);
        let answer = match self.generate(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                error!(error = %e, "LLM generation failed");
                return Ok(Completed::early(QueryResult {
                    answer: prompts::LLM_ERROR_ANSWER.to_string(),
                    sources: context.source_list(),
                    validation: ValidationOutcome::invalid(format!("LLM error: {}", e)),
                    confidence: 0.0,
                }));
            }
        };
        info!(answer_length = answer.len(), "LLM response received");

        let validation = self.validate(question, &answer, &context.text).await;

        let confidence = self.scorer.score(
            &context.scores,
            context.chunk_count(),
            validation.is_valid(),
        );
        info!(is_valid = validation.is_valid(), confidence, "Query complete");

        let answer = if validation.is_valid() {
            answer
        } else {
            prompts::VALIDATION_FAILED_ANSWER.to_string()
        };

        Ok(Completed {
            result: QueryResult {
                answer,
                sources: context.source_list(),
                validation,
                confidence,
            },
            reached_validation: true,
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        match tokio::time::timeout(self.generation_timeout, self.generator.complete(prompt)).await {
            Ok(Ok(text)) => Ok(text.trim().to_string()),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(DocuMindError::Timeout {
                duration_ms: self.generation_timeout.as_millis() as u64,
            }),
        }
    }

    // The validator handles its own failures; a panic inside it is a defect
    // and rejects the answer rather than passing it through.
    async fn validate(&self, question: &str, answer: &str, context: &str) -> ValidationOutcome {
        let call = self.validator.validate(question, answer, context);
        match AssertUnwindSafe(call).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                let detail = panic_message(panic.as_ref());
                error!(error = %detail, "Validation failed");
                ValidationOutcome::invalid(format!("Validation error: {}", detail))
            }
        }
    }

    /// Operator action: close the validation circuit
    pub fn reset_validation_circuit(&self) {
        self.validator.reset_circuit();
    }

    pub fn circuit_state(&self) -> CircuitBreakerState {
        self.validator.breaker().state()
    }

    pub fn metrics(&self) -> &QueryMetrics {
        &self.metrics
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }
}

fn rejected(reason: &str) -> QueryResult {
    QueryResult {
        answer: prompts::NO_ANSWER.to_string(),
        sources: Vec::new(),
        validation: ValidationOutcome::invalid(reason),
        confidence: 0.0,
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_result_shape() {
        let result = rejected(NO_CONTEXT_REASON);
        assert_eq!(result.answer, prompts::NO_ANSWER);
        assert!(result.sources.is_empty());
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.validation, ValidationOutcome::invalid(NO_CONTEXT_REASON));
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("judge exploded");
        assert_eq!(panic_message(boxed.as_ref()), "judge exploded");

        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");

        let boxed: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
