use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use hdrhistogram::Histogram;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::warn;

use crate::error::MetricsError;

/// Percentiles reported for every histogram.
pub const PERCENTILES: [u8; 5] = [50, 75, 90, 95, 99];

const SIGNIFICANT_DIGITS: u8 = 3;
const SHARDS: usize = 16;

static NEXT_SHARD: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    // Assigned on a thread's first sample.
    static SHARD: usize = NEXT_SHARD
        .fetch_add(1, Ordering::Relaxed)
        .checked_rem(SHARDS)
        .unwrap_or(0);
}

/// HDR histogram that can be fed from many tasks at once. Samples land in a
/// per-thread shard; shards are merged when a summary is taken.
#[derive(Debug)]
pub struct SharedHistogram {
    context: &'static str,
    shards: Vec<Mutex<Histogram<u64>>>,
}

impl SharedHistogram {
    /// Create an auto-resizing histogram.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new(context: &'static str) -> Result<Self, MetricsError> {
        let mut shards = Vec::with_capacity(SHARDS);
        for _ in 0..SHARDS {
            let hist = Histogram::<u64>::new(SIGNIFICANT_DIGITS)
                .map_err(|source| MetricsError::CreateHistogram { context, source })?;
            shards.push(Mutex::new(hist));
        }
        Ok(Self { context, shards })
    }

    /// Records one sample, growing the trackable range as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is beyond what the histogram can track.
    pub fn record(&self, value: u64) -> Result<(), MetricsError> {
        let index = SHARD.with(|shard| *shard);
        let Some(shard) = self.shards.get(index).or_else(|| self.shards.first()) else {
            return Ok(());
        };
        shard
            .lock()
            .record(value)
            .map_err(|source| MetricsError::Record {
                context: self.context,
                source,
            })
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.shards
            .iter()
            .fold(0_u64, |total, shard| total.saturating_add(shard.lock().len()))
    }

    fn merged(&self) -> Option<Histogram<u64>> {
        let mut merged: Option<Histogram<u64>> = None;
        for shard in &self.shards {
            let shard = shard.lock();
            if shard.is_empty() {
                continue;
            }
            match merged.as_mut() {
                Some(total) => {
                    if let Err(err) = total.add(&*shard) {
                        warn!("Failed to merge {} histogram shard: {}", self.context, err);
                    }
                }
                None => merged = Some(shard.clone()),
            }
        }
        merged
    }

    #[must_use]
    pub fn summary(&self) -> HistogramSummary {
        let Some(hist) = self.merged() else {
            return HistogramSummary::default();
        };
        let percentiles = PERCENTILES
            .iter()
            .map(|percentile| {
                let quantile = f64::from(*percentile) / 100.0;
                (
                    percentile.to_string(),
                    hist.value_at_quantile(quantile) as f64,
                )
            })
            .collect();
        HistogramSummary {
            mean: hist.mean(),
            stddev: hist.stdev(),
            max: hist.max() as f64,
            percentiles,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistogramSummary {
    pub mean: f64,
    pub stddev: f64,
    pub max: f64,
    pub percentiles: BTreeMap<String, f64>,
}

impl HistogramSummary {
    #[must_use]
    pub fn percentile(&self, percentile: u8) -> Option<f64> {
        self.percentiles.get(&percentile.to_string()).copied()
    }
}
