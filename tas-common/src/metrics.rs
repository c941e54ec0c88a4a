//! Process-wide metrics
//!
//! [`ServiceMetrics`] keeps monotonic counters and timing accumulators in
//! atomics so concurrent request workers never lose updates.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Destination for counters and timings
///
/// Implementations are fire-and-forget: recording never fails and never
/// blocks the request path on I/O.
pub trait MetricsSink: Send + Sync {
    /// Increment a monotonic counter by one
    fn increment(&self, name: &str);

    /// Record a duration in milliseconds
    fn timing(&self, name: &str, millis: f64);
}

#[derive(Debug, Default)]
struct TimingCell {
    samples: AtomicU64,
    total_micros: AtomicU64,
    max_micros: AtomicU64,
}

impl TimingCell {
    fn record(&self, micros: u64) {
        self.samples.fetch_add(1, Ordering::Relaxed);
        self.total_micros.fetch_add(micros, Ordering::Relaxed);
        self.max_micros.fetch_max(micros, Ordering::Relaxed);
    }
}

/// Snapshot of one timing metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingSnapshot {
    pub samples: u64,
    pub total_ms: f64,
    pub max_ms: f64,
}

/// Point-in-time copy of all metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub counters: BTreeMap<String, u64>,
    pub timings: BTreeMap<String, TimingSnapshot>,
}

/// In-process metrics registry
///
/// Cells are created on first use and never removed; after that, updates
/// only take a read lock and an atomic add.
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    counters: RwLock<HashMap<String, Arc<AtomicU64>>>,
    timings: RwLock<HashMap<String, Arc<TimingCell>>>,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-create counters so they report zero before the first request
    pub fn register_counters<'a>(&self, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            self.counter_cell(name);
        }
    }

    /// Current value of a counter (0 if never incremented)
    pub fn counter(&self, name: &str) -> u64 {
        let counters = self.counters.read().unwrap_or_else(|e| e.into_inner());
        counters
            .get(name)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Number of timing samples recorded under `name`
    pub fn timing_samples(&self, name: &str) -> u64 {
        let timings = self.timings.read().unwrap_or_else(|e| e.into_inner());
        timings
            .get(name)
            .map(|t| t.samples.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let counters = self
            .counters
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(name, value)| (name.clone(), value.load(Ordering::Relaxed)))
            .collect();

        let timings = self
            .timings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(name, cell)| {
                (
                    name.clone(),
                    TimingSnapshot {
                        samples: cell.samples.load(Ordering::Relaxed),
                        total_ms: cell.total_micros.load(Ordering::Relaxed) as f64 / 1000.0,
                        max_ms: cell.max_micros.load(Ordering::Relaxed) as f64 / 1000.0,
                    },
                )
            })
            .collect();

        MetricsSnapshot { counters, timings }
    }

    fn counter_cell(&self, name: &str) -> Arc<AtomicU64> {
        if let Some(cell) = self
            .counters
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
        {
            return Arc::clone(cell);
        }

        let mut counters = self.counters.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(counters.entry(name.to_string()).or_default())
    }

    fn timing_cell(&self, name: &str) -> Arc<TimingCell> {
        if let Some(cell) = self
            .timings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
        {
            return Arc::clone(cell);
        }

        let mut timings = self.timings.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(timings.entry(name.to_string()).or_default())
    }
}

impl MetricsSink for ServiceMetrics {
    fn increment(&self, name: &str) {
        self.counter_cell(name).fetch_add(1, Ordering::Relaxed);
    }

    fn timing(&self, name: &str, millis: f64) {
        let micros = if millis.is_finite() && millis > 0.0 {
            (millis * 1000.0).round() as u64
        } else {
            0
        };
        self.timing_cell(name).record(micros);
    }
}
