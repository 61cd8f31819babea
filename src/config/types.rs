use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::args::{HttpMethod, OutputFormat, parse_duration_arg};
use crate::error::ValidationError;

/// Contents of a `volley.toml` / `volley.json` file. Every field is optional
/// and only fills in values not given on the command line.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub connections: Option<u64>,
    pub requests: Option<u64>,
    pub duration: Option<DurationValue>,
    pub rate: Option<u64>,
    pub timeout: Option<DurationValue>,
    pub latencies: Option<bool>,
    pub method: Option<HttpMethod>,
    pub body: Option<String>,
    pub body_file: Option<PathBuf>,
    pub stream: Option<bool>,
    pub cert: Option<PathBuf>,
    pub key: Option<PathBuf>,
    pub insecure: Option<bool>,
    pub disable_keep_alives: Option<bool>,
    pub headers: Option<Vec<String>>,
    pub http1: Option<bool>,
    pub http2: Option<bool>,
    pub print: Option<String>,
    pub no_print: Option<bool>,
    pub format: Option<OutputFormat>,
}

/// A duration written either as whole seconds or as text like `"500ms"`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => parse_duration_arg(text),
        }
    }
}
