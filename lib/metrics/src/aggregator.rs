//! Ticket counters and derived rates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct Counters {
    total: u64,
    escalated: u64,
    categories: BTreeMap<String, u64>,
    /// Seconds per run, in recording order.
    durations: Vec<f64>,
}

/// Point-in-time view of the aggregated metrics.
///
/// Rates are percentages and times are seconds, all rounded to two
/// decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_tickets: u64,
    pub escalated_tickets: u64,
    pub automated_tickets: u64,
    pub automation_rate: f64,
    pub escalation_rate: f64,
    pub average_response_time: f64,
    pub min_response_time: f64,
    pub max_response_time: f64,
    pub category_distribution: BTreeMap<String, u64>,
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tickets: {} | Automated: {:.2}% | Avg Time: {:.2}s",
            self.total_tickets, self.automation_rate, self.average_response_time
        )
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Thread-safe accumulator of per-run outcomes.
///
/// `record` and `reset` take the write lock, `snapshot` the read lock, so
/// readers never observe a half-applied update. A poisoned lock is
/// recovered, since every update leaves the counters consistent.
#[derive(Debug, Default)]
pub struct MetricsAggregator {
    inner: RwLock<Counters>,
}

impl MetricsAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Counters> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Counters> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records one completed run.
    ///
    /// `category` is not checked against the known categories; new labels
    /// get their own bucket.
    pub fn record(&self, category: &str, escalated: bool, duration: Duration) {
        let mut counters = self.write();
        counters.total += 1;
        if escalated {
            counters.escalated += 1;
        }
        *counters.categories.entry(category.to_string()).or_insert(0) += 1;
        counters.durations.push(duration.as_secs_f64());
        debug!(
            total = counters.total,
            escalated = counters.escalated,
            "recorded ticket metrics"
        );
    }

    /// Computes the current metrics without changing them.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let counters = self.read();

        let automated = counters.total - counters.escalated;
        let automation_rate = if counters.total == 0 {
            0.0
        } else {
            automated as f64 / counters.total as f64 * 100.0
        };

        let (average, min, max) = if counters.durations.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let sum: f64 = counters.durations.iter().sum();
            let min = counters
                .durations
                .iter()
                .copied()
                .fold(f64::INFINITY, f64::min);
            let max = counters
                .durations
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);
            (sum / counters.durations.len() as f64, min, max)
        };

        MetricsSnapshot {
            total_tickets: counters.total,
            escalated_tickets: counters.escalated,
            automated_tickets: automated,
            automation_rate: round2(automation_rate),
            escalation_rate: round2(100.0 - automation_rate),
            average_response_time: round2(average),
            min_response_time: round2(min),
            max_response_time: round2(max),
            category_distribution: counters.categories.clone(),
        }
    }

    /// Clears every counter.
    pub fn reset(&self) {
        *self.write() = Counters::default();
        info!("metrics reset");
    }
}
