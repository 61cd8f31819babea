use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Failed to create {context} histogram: {source}")]
    CreateHistogram {
        context: &'static str,
        #[source]
        source: hdrhistogram::CreationError,
    },
    #[error("Failed to record into {context} histogram: {source}")]
    Record {
        context: &'static str,
        #[source]
        source: hdrhistogram::RecordError,
    },
}
