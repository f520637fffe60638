use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::sample::SampleKind;

/// Totals at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total: u64,
    /// Samples per second over the elapsed window.
    pub approx_rate: f64,
}

/// Running sample counter with a derived rate.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    total: AtomicU64,
    started: Mutex<Option<Instant>>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one sample. Kinds are not broken out yet.
    pub fn record(&self, _kind: SampleKind) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Restart the rate window at now. The total is kept.
    pub fn mark_start(&self) {
        *self.started.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    }

    /// Seconds since [`mark_start`](Self::mark_start), or 0 if never started.
    pub fn elapsed_secs(&self) -> f64 {
        self.started
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map_or(0.0, |start| start.elapsed().as_secs_f64())
    }

    /// Total and `total / elapsed_secs`; the rate is 0 unless elapsed is positive.
    pub fn snapshot(&self, elapsed_secs: f64) -> StatsSnapshot {
        let total = self.total();
        let approx_rate = if elapsed_secs > 0.0 && elapsed_secs.is_finite() {
            total as f64 / elapsed_secs
        } else {
            0.0
        };
        StatsSnapshot { total, approx_rate }
    }

    /// Snapshot over the window since the last start.
    pub fn snapshot_now(&self) -> StatsSnapshot {
        self.snapshot(self.elapsed_secs())
    }
}
