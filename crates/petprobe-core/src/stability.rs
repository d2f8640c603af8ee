//! Track repeated operation outcomes and derive stability metrics.
//!
//! A tracker is append-only: every completed retry sequence is recorded as
//! one attempt, successful or not, and metrics are computed on demand from
//! the full record.

use std::time::{Duration, Instant};

use crate::retry::ErrorCategory;

/// One completed retry sequence.
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub success: bool,
    /// Retries the sequence needed beyond the first try.
    pub retry_count: u32,
    /// Terminal failure category, when the sequence failed.
    pub category: Option<ErrorCategory>,
    pub recorded_at: Instant,
}

/// Aggregated view over everything a tracker has seen.
#[derive(Debug, Clone)]
pub struct StabilityMetrics {
    pub operation: String,
    pub total: usize,
    pub successes: usize,
    pub failures: usize,
    /// Percentage of sequences that eventually succeeded, in [0, 100].
    pub success_rate: f64,
    /// Mean retries per sequence, successes and failures alike.
    pub average_retries: f64,
    /// Percentage of sequences that succeeded without any retry.
    pub first_try_success_rate: f64,
    /// Wall time from tracker creation to the metrics call.
    pub duration: Duration,
}

impl StabilityMetrics {
    /// Coarse label derived from how hard success was to come by.
    pub fn reliability_band(&self) -> &'static str {
        if self.average_retries < 1.0 {
            "stable"
        } else if self.average_retries < 2.0 {
            "unstable"
        } else {
            "highly unstable"
        }
    }

    pub fn summary_line(&self) -> String {
        format!(
            "{}: {:.1}% success ({}/{}), avg retries {:.2}, first-try {:.1}%, {}",
            self.operation,
            self.success_rate,
            self.successes,
            self.total,
            self.average_retries,
            self.first_try_success_rate,
            self.reliability_band()
        )
    }
}

/// Records outcomes for one named operation.
#[derive(Debug)]
pub struct StabilityTracker {
    operation: String,
    attempts: Vec<AttemptRecord>,
    started_at: Instant,
}

impl StabilityTracker {
    pub fn new(operation: impl Into<String>) -> Self {
        StabilityTracker {
            operation: operation.into(),
            attempts: Vec::new(),
            started_at: Instant::now(),
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn record_attempt(&mut self, success: bool, retry_count: u32) {
        self.record_attempt_with_category(success, retry_count, None);
    }

    pub fn record_attempt_with_category(
        &mut self,
        success: bool,
        retry_count: u32,
        category: Option<ErrorCategory>,
    ) {
        self.attempts.push(AttemptRecord {
            success,
            retry_count,
            category,
            recorded_at: Instant::now(),
        });
    }

    pub fn total(&self) -> usize {
        self.attempts.len()
    }

    /// Metrics over everything recorded so far, `None` until the first
    /// attempt lands.
    pub fn metrics(&self) -> Option<StabilityMetrics> {
        if self.attempts.is_empty() {
            return None;
        }
        let total = self.attempts.len();
        let successes = self.attempts.iter().filter(|a| a.success).count();
        let first_try = self
            .attempts
            .iter()
            .filter(|a| a.success && a.retry_count == 0)
            .count();
        let retries: u64 = self.attempts.iter().map(|a| u64::from(a.retry_count)).sum();
        Some(StabilityMetrics {
            operation: self.operation.clone(),
            total,
            successes,
            failures: total - successes,
            success_rate: successes as f64 / total as f64 * 100.0,
            average_retries: retries as f64 / total as f64,
            first_try_success_rate: first_try as f64 / total as f64 * 100.0,
            duration: self.started_at.elapsed(),
        })
    }

    /// Whether the recorded success rate clears `threshold` percent.
    /// An empty tracker is never stable.
    pub fn is_stable(&self, threshold: f64) -> bool {
        self.metrics()
            .map_or(false, |m| m.success_rate >= threshold)
    }

    /// Categories of the recorded failures, in order.
    pub fn failure_categories(&self) -> impl Iterator<Item = ErrorCategory> + '_ {
        self.attempts
            .iter()
            .filter(|a| !a.success)
            .filter_map(|a| a.category)
    }

    pub fn summary(&self) -> String {
        match self.metrics() {
            Some(m) => m.summary_line(),
            None => format!("{}: no attempts recorded", self.operation),
        }
    }
}
