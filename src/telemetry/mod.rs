//! Telemetry for DocuMind
//!
//! Query metrics for operators, latency logging around pipeline calls, and
//! the tracing subscriber setup used by the binary.

use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::cli::Verbosity;

/// Metrics snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryStats {
    pub total_queries: usize,
    pub successful_queries: usize,
    pub failed_queries: usize,
    pub validation_failures: usize,
    pub avg_latency_ms: f64,
    pub last_query_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
struct Counters {
    total_queries: usize,
    successful_queries: usize,
    failed_queries: usize,
    validation_failures: usize,
    total_latency_ms: f64,
    last_query_at: Option<DateTime<Utc>>,
}

/// Per-query success/latency collector. Cheap to clone; clones share counters.
#[derive(Clone, Default)]
pub struct QueryMetrics {
    counters: Arc<Mutex<Counters>>,
}

impl QueryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished query
    pub fn record_query(&self, success: bool, latency_ms: f64, validation_passed: bool) {
        let mut counters = self.counters.lock().unwrap_or_else(|p| p.into_inner());
        counters.total_queries += 1;
        counters.total_latency_ms += latency_ms;
        counters.last_query_at = Some(Utc::now());

        if success {
            counters.successful_queries += 1;
        } else {
            counters.failed_queries += 1;
        }

        if !validation_passed {
            counters.validation_failures += 1;
        }
    }

    /// Get current statistics
    pub fn get_stats(&self) -> QueryStats {
        let counters = self.counters.lock().unwrap_or_else(|p| p.into_inner());
        let avg_latency_ms = if counters.total_queries > 0 {
            counters.total_latency_ms / counters.total_queries as f64
        } else {
            0.0
        };

        QueryStats {
            total_queries: counters.total_queries,
            successful_queries: counters.successful_queries,
            failed_queries: counters.failed_queries,
            validation_failures: counters.validation_failures,
            avg_latency_ms: (avg_latency_ms * 100.0).round() / 100.0,
            last_query_at: counters.last_query_at,
        }
    }
}

/// Await a fallible operation, logging its latency and status
pub async fn timed<F, T, E>(operation: &str, fut: F) -> (Result<T, E>, f64)
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    let start = Instant::now();
    let result = fut.await;
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

    match &result {
        Ok(_) => info!(operation, latency_ms = %format!("{:.2}", latency_ms), status = "success"),
        Err(e) => error!(
            operation,
            latency_ms = %format!("{:.2}", latency_ms),
            status = "error",
            error = %e
        ),
    }

    (result, latency_ms)
}

/// Install the stderr subscriber. `RUST_LOG` wins over the verbosity flags.
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));

    // A second init (e.g. in tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
