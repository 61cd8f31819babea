use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::args::HttpMethod;
use crate::config::{BodySource, RunConfig, RunMode};
use crate::http::ClientKind;
use crate::metrics::{ErrorCount, HistogramSummary, StatusCounts};

/// Final snapshot of a run, handed to the renderers.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub spec: RunSpec,
    pub result: RunResults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TestType {
    #[serde(rename = "number-of-requests")]
    Counted,
    #[serde(rename = "timed")]
    Timed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub key: String,
    pub value: String,
}

/// Echo of the configuration the run used.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSpec {
    pub number_of_connections: u64,
    pub test_type: TestType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_requests: Option<u64>,
    #[serde(
        rename = "testDurationSeconds",
        serialize_with = "serialize_opt_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub test_duration: Option<Duration>,
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<Header>,
    pub body: String,
    pub body_file_path: String,
    pub cert_path: String,
    pub key_path: String,
    pub stream: bool,
    #[serde(rename = "timeoutSeconds", serialize_with = "serialize_secs")]
    pub timeout: Duration,
    pub client: ClientKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<u64>,
}

impl RunSpec {
    #[must_use]
    pub fn from_config(config: &RunConfig) -> Self {
        let (test_type, number_of_requests, test_duration) = match config.mode {
            RunMode::Counted(requests) => (TestType::Counted, Some(requests.get()), None),
            RunMode::Timed(duration) => (TestType::Timed, None, Some(duration)),
        };
        let (body, body_file_path) = match &config.body {
            BodySource::Empty => (String::new(), String::new()),
            BodySource::Inline(body) => (body.clone(), String::new()),
            BodySource::File(path) => (String::new(), path.display().to_string()),
        };
        let (cert_path, key_path) = config.tls.identity.as_ref().map_or_else(
            || (String::new(), String::new()),
            |identity| {
                (
                    identity.cert.display().to_string(),
                    identity.key.display().to_string(),
                )
            },
        );
        Self {
            number_of_connections: config.connections.get(),
            test_type,
            number_of_requests,
            test_duration,
            method: config.method,
            url: config.url.to_string(),
            headers: config
                .headers
                .iter()
                .map(|(key, value)| Header {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect(),
            body,
            body_file_path,
            cert_path,
            key_path,
            stream: config.stream,
            timeout: config.timeout,
            client: config.client_kind,
            rate: config.rate.map(|rate| rate.get()),
        }
    }
}

/// Counters and summaries collected during the run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResults {
    pub bytes_read: u64,
    pub bytes_written: u64,
    #[serde(rename = "timeTakenSeconds", serialize_with = "serialize_secs")]
    pub time_taken: Duration,
    #[serde(flatten)]
    pub statuses: StatusCounts,
    pub errors: Vec<ErrorCount>,
    pub latency: HistogramSummary,
    pub rps: HistogramSummary,
}

impl RunResults {
    /// Bytes moved in both directions per second of wall time.
    #[must_use]
    pub fn throughput(&self) -> f64 {
        let secs = self.time_taken.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.bytes_read.saturating_add(self.bytes_written) as f64 / secs
    }

    #[must_use]
    pub const fn total_requests(&self) -> u64 {
        self.statuses.total()
    }
}

fn serialize_secs<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

fn serialize_opt_secs<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match duration {
        Some(duration) => serializer.serialize_some(&duration.as_secs_f64()),
        None => serializer.serialize_none(),
    }
}
