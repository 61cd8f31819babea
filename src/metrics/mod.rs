//! Statistics recorded while a run is in progress.
mod errors;
mod histogram;
mod recorder;


pub use errors::{ErrorCount, ErrorMap};
pub use histogram::{HistogramSummary, PERCENTILES, SharedHistogram};
pub use recorder::{ByteCounters, StatisticsRecorder, StatusCounts};
