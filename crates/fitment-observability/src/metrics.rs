//! Selector fetch metrics.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use fitment_core::selector::{SelectorObserver, SelectorTrace};
use fitment_core::SessionId;
use serde::{Deserialize, Serialize};

/// Fetch counters for one cascade level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelMetrics {
    pub issued: u64,
    pub applied: u64,
    pub failed: u64,
    /// Results dropped because a newer fetch superseded them.
    pub stale: u64,
    /// Summed provider time over every resolved fetch (microseconds).
    pub total_fetch_us: u64,
    /// Slowest resolved fetch (microseconds).
    pub max_fetch_us: u64,
}

impl LevelMetrics {
    fn record_resolved(&mut self, elapsed: Duration) {
        let us = elapsed.as_micros() as u64;
        self.total_fetch_us += us;
        self.max_fetch_us = self.max_fetch_us.max(us);
    }

    pub fn resolved(&self) -> u64 {
        self.applied + self.failed + self.stale
    }

    /// Mean provider time per resolved fetch (microseconds).
    pub fn avg_fetch_us(&self) -> Option<u64> {
        match self.resolved() {
            0 => None,
            n => Some(self.total_fetch_us / n),
        }
    }
}

/// Metrics for one selector session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorMetrics {
    pub session_id: String,
    pub selections: u64,
    pub clears: u64,
    /// Keyed by level name.
    pub levels: BTreeMap<String, LevelMetrics>,
}

impl SelectorMetrics {
    pub fn new(session_id: &SessionId) -> Self {
        Self {
            session_id: session_id.to_string(),
            ..Self::default()
        }
    }

    pub fn level(&self, name: &str) -> Option<&LevelMetrics> {
        self.levels.get(name)
    }

    pub fn record(&mut self, trace: &SelectorTrace) {
        match trace {
            SelectorTrace::Selected { .. } => self.selections += 1,
            SelectorTrace::Cleared => self.clears += 1,
            SelectorTrace::FetchIssued { level, .. } => {
                self.entry(level.as_str()).issued += 1;
            }
            SelectorTrace::FetchApplied { level, elapsed, .. } => {
                let m = self.entry(level.as_str());
                m.applied += 1;
                m.record_resolved(*elapsed);
            }
            SelectorTrace::FetchFailed { level, elapsed, .. } => {
                let m = self.entry(level.as_str());
                m.failed += 1;
                m.record_resolved(*elapsed);
            }
            SelectorTrace::StaleDiscarded { level, elapsed, .. } => {
                let m = self.entry(level.as_str());
                m.stale += 1;
                m.record_resolved(*elapsed);
            }
        }
    }

    fn entry(&mut self, level: &str) -> &mut LevelMetrics {
        self.levels.entry(level.to_string()).or_default()
    }

    /// Format as JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Collects [`SelectorMetrics`] from selector traces.
#[derive(Debug)]
pub struct MetricsObserver {
    metrics: Mutex<SelectorMetrics>,
}

impl MetricsObserver {
    pub fn new(session_id: &SessionId) -> Self {
        Self {
            metrics: Mutex::new(SelectorMetrics::new(session_id)),
        }
    }

    /// Copy of the metrics so far.
    pub fn snapshot(&self) -> SelectorMetrics {
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SelectorObserver for MetricsObserver {
    fn on_trace(&self, trace: &SelectorTrace) {
        self.metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .record(trace);
    }
}
