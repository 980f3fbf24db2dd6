//! Grounding validation with a circuit breaker
//!
//! The validator asks an external judge whether an answer is supported by
//! its context. Judge unavailability is fail-open: the answer goes through
//! as `Degraded`, and repeated failures trip the breaker so later queries
//! skip the judge entirely (`Skipped`). The breaker only closes again on an
//! explicit [`CircuitBreaker::reset`]; there is no half-open probe.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::ValidationConfig;
use crate::rag::services::Judge;
use crate::rag::types::ValidationOutcome;

/// Token the judge returns for a grounded answer
pub const VALID_VERDICT: &str = "VALID";

pub const CIRCUIT_OPEN_REASON: &str = "Validation skipped (circuit open)";
pub const TIMEOUT_REASON: &str = "Validation timeout, answer accepted";

/// Default judge call timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Consecutive failures that open the circuit
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Snapshot of the breaker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CircuitBreakerState {
    pub consecutive_failures: u32,
    pub is_open: bool,
}

/// Failure counter shared by every query in the process
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<CircuitBreakerState>,
    failure_threshold: u32,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32) -> Self {
        Self {
            state: Mutex::new(CircuitBreakerState::default()),
            failure_threshold: failure_threshold.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CircuitBreakerState> {
        // The state is two plain fields; a panic elsewhere cannot leave it torn
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> CircuitBreakerState {
        *self.lock()
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_open
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }

    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold
    }

    pub fn record_success(&self) {
        self.lock().consecutive_failures = 0;
    }

    /// Count a failure, opening the circuit at the threshold. Returns the new count.
    pub fn record_failure(&self) -> u32 {
        let mut state = self.lock();
        state.consecutive_failures += 1;
        if !state.is_open && state.consecutive_failures >= self.failure_threshold {
            state.is_open = true;
            error!(
                failures = state.consecutive_failures,
                threshold = self.failure_threshold,
                "Circuit breaker OPEN - validation disabled"
            );
        }
        state.consecutive_failures
    }

    /// Operator action: clear the counter and close the circuit
    pub fn reset(&self) {
        *self.lock() = CircuitBreakerState::default();
        info!("Validation circuit breaker reset");
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_THRESHOLD)
    }
}

/// Map a judge response to an outcome. `None` for an empty verdict.
pub fn parse_verdict(raw: &str) -> Option<ValidationOutcome> {
    let verdict = raw.trim();
    if verdict.is_empty() {
        None
    } else if verdict == VALID_VERDICT {
        Some(ValidationOutcome::Valid)
    } else {
        Some(ValidationOutcome::invalid(verdict))
    }
}

/// Grounding validator guarding an external judge
pub struct GroundingValidator {
    judge: Arc<dyn Judge>,
    breaker: Arc<CircuitBreaker>,
    timeout: Duration,
}

impl GroundingValidator {
    /// Create a validator with its own breaker
    pub fn new(judge: Arc<dyn Judge>, config: &ValidationConfig) -> Self {
        Self::with_breaker(
            judge,
            Arc::new(CircuitBreaker::new(config.failure_threshold)),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Create a validator around an externally owned breaker
    pub fn with_breaker(judge: Arc<dyn Judge>, breaker: Arc<CircuitBreaker>, timeout: Duration) -> Self {
        Self {
            judge,
            breaker,
            timeout,
        }
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn reset_circuit(&self) {
        self.breaker.reset();
    }

    /// Validate an answer against its context. Never fails.
    pub async fn validate(&self, question: &str, answer: &str, context: &str) -> ValidationOutcome {
        if self.breaker.is_open() {
            warn!("Validation circuit open, skipping validation");
            return ValidationOutcome::Skipped {
                reason: CIRCUIT_OPEN_REASON.to_string(),
            };
        }

        let call = self.judge.evaluate(question, answer, context);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(raw)) => match parse_verdict(&raw) {
                Some(outcome) => {
                    self.breaker.record_success();
                    info!(is_valid = outcome.is_valid(), "Validation complete");
                    outcome
                }
                None => {
                    let failures = self.breaker.record_failure();
                    error!(failures, "Validation error: judge returned an empty verdict");
                    ValidationOutcome::Degraded {
                        reason: "Validation error: judge returned an empty verdict".to_string(),
                    }
                }
            },
            Ok(Err(e)) => {
                let failures = self.breaker.record_failure();
                error!(failures, error = %e, "Validation error");
                ValidationOutcome::Degraded {
                    reason: format!("Validation error: {}", e),
                }
            }
            Err(_) => {
                let failures = self.breaker.record_failure();
                error!(
                    failures,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Validation timeout"
                );
                ValidationOutcome::Degraded {
                    reason: TIMEOUT_REASON.to_string(),
                }
            }
        }
    }
}
