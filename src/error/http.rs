use std::path::PathBuf;

use thiserror::Error;

/// Failures while building the client for a run. These surface before the
/// bombardment starts.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Failed to read cert '{path}': {source}")]
    ReadCert {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read key '{path}': {source}")]
    ReadKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid cert/key: {source}")]
    InvalidIdentity {
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to read body file '{path}': {source}")]
    ReadBodyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid header '{name}': {message}")]
    InvalidHeader { name: String, message: String },
    #[error("Failed to build HTTP client: {source}")]
    BuildClientFailed {
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to build request: {source}")]
    BuildRequestFailed {
        #[source]
        source: reqwest::Error,
    },
}

/// Failures of a single request. Only the display text is kept; it becomes
/// the key in the run's error table.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("timeout")]
    Timeout,
    #[error("connection failed: {source}")]
    Connect {
        #[source]
        source: reqwest::Error,
    },
    #[error("{source}")]
    Send {
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to read response body: {source}")]
    Body {
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to open body file '{path}': {source}")]
    OpenBodyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("request template could not be cloned")]
    CloneRequest,
}

impl RequestError {
    pub(crate) fn from_send(source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout
        } else if source.is_connect() {
            Self::Connect { source }
        } else {
            Self::Send { source }
        }
    }

    pub(crate) fn from_body(source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout
        } else {
            Self::Body { source }
        }
    }
}
