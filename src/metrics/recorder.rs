use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;
use tracing::warn;

use super::histogram::{HistogramSummary, SharedHistogram};
use crate::error::MetricsError;

/// Wire byte counters, updated by the client as requests go out and
/// responses come back.
#[derive(Debug, Default)]
pub struct ByteCounters {
    read: AtomicU64,
    written: AtomicU64,
}

impl ByteCounters {
    pub fn add_read(&self, bytes: u64) {
        self.read.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn add_written(&self, bytes: u64) {
        self.written.fetch_add(bytes, Ordering::Relaxed);
    }

    #[must_use]
    pub fn read(&self) -> u64 {
        self.read.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub req1xx: u64,
    pub req2xx: u64,
    pub req3xx: u64,
    pub req4xx: u64,
    pub req5xx: u64,
    pub others: u64,
}

impl StatusCounts {
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.req1xx
            .saturating_add(self.req2xx)
            .saturating_add(self.req3xx)
            .saturating_add(self.req4xx)
            .saturating_add(self.req5xx)
            .saturating_add(self.others)
    }
}

/// Per-run statistics: status classes, latencies, sampled request rates,
/// and byte counters.
#[derive(Debug)]
pub struct StatisticsRecorder {
    bytes: Arc<ByteCounters>,
    classes: [AtomicU64; 5],
    others: AtomicU64,
    latencies: SharedHistogram,
    rates: SharedHistogram,
    window_requests: AtomicU64,
    window_start: Mutex<Instant>,
}

impl StatisticsRecorder {
    /// # Errors
    ///
    /// Returns an error if a histogram cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        Ok(Self {
            bytes: Arc::new(ByteCounters::default()),
            classes: Default::default(),
            others: AtomicU64::new(0),
            latencies: SharedHistogram::new("latency")?,
            rates: SharedHistogram::new("requests per second")?,
            window_requests: AtomicU64::new(0),
            window_start: Mutex::new(Instant::now()),
        })
    }

    /// Records one finished request. `status` is `None` when the request
    /// failed before a status line arrived; it counts as "other", as does any
    /// code outside 100..=599.
    pub fn write_statistics(&self, status: Option<u16>, elapsed_micros: u64) {
        if let Err(err) = self.latencies.record(elapsed_micros) {
            warn!("Dropped latency sample: {}", err);
        }
        self.window_requests.fetch_add(1, Ordering::Relaxed);
        let counter = class_index(status)
            .and_then(|index| self.classes.get(index))
            .unwrap_or(&self.others);
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Restarts the rate window, discarding anything counted so far.
    pub fn start_window(&self) {
        *self.window_start.lock() = Instant::now();
        self.window_requests.store(0, Ordering::Relaxed);
    }

    /// Turns the requests completed since the previous sample into a
    /// requests-per-second value and records it. Returns `None` if no time
    /// has passed since the previous sample.
    #[must_use]
    pub fn record_rps(&self) -> Option<f64> {
        let now = Instant::now();
        let elapsed = {
            let mut start = self.window_start.lock();
            let elapsed = now.saturating_duration_since(*start);
            *start = now;
            elapsed
        };
        let requests = self.window_requests.swap(0, Ordering::AcqRel);
        if elapsed == Duration::ZERO {
            self.window_requests.fetch_add(requests, Ordering::AcqRel);
            return None;
        }
        let rps = requests as f64 / elapsed.as_secs_f64();
        if let Err(err) = self.rates.record(rps.round() as u64) {
            warn!("Dropped rate sample: {}", err);
        }
        Some(rps)
    }

    #[must_use]
    pub fn bytes(&self) -> Arc<ByteCounters> {
        Arc::clone(&self.bytes)
    }

    #[must_use]
    pub fn status_counts(&self) -> StatusCounts {
        let load = |index: usize| {
            self.classes
                .get(index)
                .map_or(0, |counter| counter.load(Ordering::Relaxed))
        };
        StatusCounts {
            req1xx: load(0),
            req2xx: load(1),
            req3xx: load(2),
            req4xx: load(3),
            req5xx: load(4),
            others: self.others.load(Ordering::Relaxed),
        }
    }

    #[must_use]
    pub fn latency_count(&self) -> u64 {
        self.latencies.count()
    }

    #[must_use]
    pub fn latency_summary(&self) -> HistogramSummary {
        self.latencies.summary()
    }

    #[must_use]
    pub fn rps_samples(&self) -> u64 {
        self.rates.count()
    }

    #[must_use]
    pub fn rps_summary(&self) -> HistogramSummary {
        self.rates.summary()
    }
}

fn class_index(status: Option<u16>) -> Option<usize> {
    let class = status?.checked_div(100)?;
    match class {
        1..=5 => usize::from(class).checked_sub(1),
        _ => None,
    }
}
