use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::args::{
    DEFAULT_CONNECTIONS, DEFAULT_TEST_DURATION, DEFAULT_TIMEOUT, HttpMethod, PositiveU64,
    VolleyArgs, parse_target_url,
};
use crate::error::ValidationError;
use crate::http::ClientKind;

const MIN_TEST_DURATION: Duration = Duration::from_secs(1);

/// How a run decides it is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Stop after this many requests have completed.
    Counted(PositiveU64),
    /// Stop admitting work once this much time has passed.
    Timed(Duration),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BodySource {
    #[default]
    Empty,
    Inline(String),
    File(PathBuf),
}

impl BodySource {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsSettings {
    pub identity: Option<ClientIdentity>,
    pub insecure: bool,
}

/// Everything a run needs, with defaults already filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub url: Url,
    pub mode: RunMode,
    pub connections: PositiveU64,
    pub rate: Option<PositiveU64>,
    /// Per-request timeout; zero disables it.
    pub timeout: Duration,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: BodySource,
    pub stream: bool,
    pub tls: TlsSettings,
    pub disable_keep_alives: bool,
    pub client_kind: ClientKind,
}

impl RunConfig {
    /// A GET run against `url` with default connections and timeout.
    #[must_use]
    pub fn new(url: Url, mode: RunMode) -> Self {
        Self {
            url,
            mode,
            connections: PositiveU64::from(DEFAULT_CONNECTIONS),
            rate: None,
            timeout: DEFAULT_TIMEOUT,
            method: HttpMethod::Get,
            headers: Vec::new(),
            body: BodySource::Empty,
            stream: false,
            tls: TlsSettings::default(),
            disable_keep_alives: false,
            client_kind: ClientKind::default(),
        }
    }

    /// Builds and validates a run configuration from parsed arguments.
    ///
    /// # Errors
    ///
    /// Returns an error when the arguments describe an invalid run.
    pub fn from_args(args: &VolleyArgs) -> Result<Self, ValidationError> {
        let raw_url = args.url.as_deref().ok_or(ValidationError::MissingUrl)?;
        let url = parse_target_url(raw_url)?;

        let mode = match (args.requests, args.duration) {
            (Some(requests), _) => RunMode::Counted(requests),
            (None, Some(duration)) => RunMode::Timed(duration),
            (None, None) => RunMode::Timed(DEFAULT_TEST_DURATION),
        };

        let inline = args.body.as_ref().filter(|body| !body.is_empty());
        let body = match (inline, args.body_file.as_ref()) {
            (Some(_), Some(_)) => return Err(ValidationError::BodyProvidedTwice),
            (Some(body), None) => BodySource::Inline(body.clone()),
            (None, Some(path)) => BodySource::File(path.clone()),
            (None, None) => BodySource::Empty,
        };

        let identity = match (args.cert.as_ref(), args.key.as_ref()) {
            (Some(cert), Some(key)) => Some(ClientIdentity {
                cert: cert.clone(),
                key: key.clone(),
            }),
            (Some(_), None) => return Err(ValidationError::CertRequiresKey),
            (None, Some(_)) => return Err(ValidationError::KeyRequiresCert),
            (None, None) => None,
        };

        let client_kind = match (args.http1, args.http2) {
            (true, true) => return Err(ValidationError::ClientKindConflict),
            (_, true) => ClientKind::Http2,
            (_, false) => ClientKind::Http1,
        };

        let config = Self {
            url,
            mode,
            connections: args.connections,
            rate: args.rate,
            timeout: args.timeout,
            method: args.method,
            headers: args.headers.clone(),
            body,
            stream: args.stream,
            tls: TlsSettings {
                identity,
                insecure: args.insecure,
            },
            disable_keep_alives: args.disable_keep_alives,
            client_kind,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants a run relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let scheme = self.url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(ValidationError::UnsupportedScheme {
                scheme: scheme.to_owned(),
                url: self.url.to_string(),
            });
        }
        if self.url.host_str().is_none_or(str::is_empty) {
            return Err(ValidationError::MissingHost {
                url: self.url.to_string(),
            });
        }
        if let RunMode::Timed(duration) = self.mode
            && duration < MIN_TEST_DURATION
        {
            return Err(ValidationError::TestDurationTooShort);
        }
        if !self.body.is_empty() && !self.method.can_have_body() {
            return Err(ValidationError::BodyNotAllowed {
                method: self.method.as_str(),
            });
        }
        Ok(())
    }

    /// The request timeout, or `None` when timeouts are disabled.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        (!self.timeout.is_zero()).then_some(self.timeout)
    }
}
