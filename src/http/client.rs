use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{
    CONNECTION, CONTENT_LENGTH, HOST, HeaderMap, HeaderName, HeaderValue, TRANSFER_ENCODING,
    USER_AGENT,
};
use reqwest::{Method, Request, Response, Version, redirect};
use tokio::time::Instant;
use tracing::debug;

use super::body::RequestBody;
use super::kind::ClientKind;
use super::len_u64;
use crate::args::{DEFAULT_USER_AGENT, HttpMethod};
use crate::config::{ClientIdentity, RunConfig};
use crate::error::{HttpError, RequestError};
use crate::metrics::ByteCounters;

const CRLF_LEN: usize = 2;
const HEADER_SEPARATOR_LEN: usize = 2;
const REQUEST_LINE_SUFFIX: &str = " HTTP/1.1\r\n";

/// What happened to one request. `status` is `None` whenever `error` is set.
#[derive(Debug)]
pub struct RequestOutcome {
    pub status: Option<u16>,
    pub elapsed: Duration,
    pub error: Option<RequestError>,
}

/// Issues the run's request over a shared connection pool and keeps the wire
/// byte counters up to date.
#[derive(Debug)]
pub struct Client {
    http: reqwest::Client,
    template: Request,
    body: RequestBody,
    head_len: u64,
    bytes: Arc<ByteCounters>,
}

impl Client {
    /// Builds the HTTP client and the request template for a run.
    ///
    /// # Errors
    ///
    /// Returns an error when the TLS identity or body file cannot be read,
    /// a header is invalid, or reqwest rejects the configuration.
    pub fn new(config: &RunConfig, bytes: Arc<ByteCounters>) -> Result<Self, HttpError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .redirect(redirect::Policy::none());

        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        builder = if config.disable_keep_alives {
            builder.pool_max_idle_per_host(0)
        } else {
            builder.pool_max_idle_per_host(
                usize::try_from(config.connections.get()).unwrap_or(usize::MAX),
            )
        };

        if config.client_kind == ClientKind::Http1 {
            builder = builder.http1_only();
        }

        if let Some(identity) = config.tls.identity.as_ref() {
            builder = builder.identity(load_identity(identity)?);
        }

        if config.tls.insecure {
            builder = builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }

        let http = builder
            .build()
            .map_err(|err| HttpError::BuildClientFailed { source: err })?;

        let close = config.disable_keep_alives && config.client_kind == ClientKind::Http1;
        let headers = build_headers(&config.headers, close)?;
        let (body, buffered) = RequestBody::prepare(&config.body, config.stream)?;

        let mut request = http
            .request(request_method(config.method), config.url.clone())
            .headers(headers);
        if let Some(data) = buffered {
            request = request.body(data);
        }
        let template = request
            .build()
            .map_err(|err| HttpError::BuildRequestFailed { source: err })?;
        let head_len = request_head_len(&template, &body);

        debug!(
            "HTTP client ready: {} {} ({}, keep-alive {}, streaming {})",
            config.method,
            config.url,
            config.client_kind,
            !config.disable_keep_alives,
            body.is_streaming()
        );

        Ok(Self {
            http,
            template,
            body,
            head_len,
            bytes,
        })
    }

    /// Performs one request and reads the whole response. Failures are
    /// returned in the outcome, never raised.
    pub async fn send(&self) -> RequestOutcome {
        let start = Instant::now();
        let result = self.exchange().await;
        let elapsed = start.elapsed();
        match result {
            Ok(status) => RequestOutcome {
                status: Some(status),
                elapsed,
                error: None,
            },
            Err(error) => RequestOutcome {
                status: None,
                elapsed,
                error: Some(error),
            },
        }
    }

    async fn exchange(&self) -> Result<u16, RequestError> {
        let mut request = self
            .template
            .try_clone()
            .ok_or(RequestError::CloneRequest)?;
        let body_len = match self.body.open_stream().await? {
            Some((body, len)) => {
                *request.body_mut() = Some(body);
                len
            }
            None => self.body.fixed_len(),
        };
        let mut response = self
            .http
            .execute(request)
            .await
            .map_err(RequestError::from_send)?;
        // Written bytes count only requests that got a response.
        self.bytes
            .add_written(self.head_len.saturating_add(body_len));
        self.bytes.add_read(response_head_len(&response));
        let status = response.status().as_u16();
        while let Some(chunk) = response.chunk().await.map_err(RequestError::from_body)? {
            self.bytes.add_read(len_u64(chunk.len()));
        }
        Ok(status)
    }
}

const fn request_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Connect => Method::CONNECT,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Get => Method::GET,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Options => Method::OPTIONS,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Trace => Method::TRACE,
    }
}

fn load_identity(identity: &ClientIdentity) -> Result<reqwest::Identity, HttpError> {
    let cert = std::fs::read(&identity.cert).map_err(|err| HttpError::ReadCert {
        path: identity.cert.clone(),
        source: err,
    })?;
    let key = std::fs::read(&identity.key).map_err(|err| HttpError::ReadKey {
        path: identity.key.clone(),
        source: err,
    })?;
    reqwest::Identity::from_pkcs8_pem(&cert, &key)
        .map_err(|err| HttpError::InvalidIdentity { source: err })
}

fn build_headers(headers: &[(String, String)], close: bool) -> Result<HeaderMap, HttpError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|err| HttpError::InvalidHeader {
                name: name.clone(),
                message: err.to_string(),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|err| HttpError::InvalidHeader {
            name: name.clone(),
            message: err.to_string(),
        })?;
        map.append(header_name, header_value);
    }
    if close && !map.contains_key(CONNECTION) {
        map.insert(CONNECTION, HeaderValue::from_static("close"));
    }
    Ok(map)
}

const fn header_line_len(name: usize, value: usize) -> usize {
    name.saturating_add(HEADER_SEPARATOR_LEN)
        .saturating_add(value)
        .saturating_add(CRLF_LEN)
}

/// Size of the request line and headers as they go over an HTTP/1.1 wire,
/// including the headers the client adds on its own.
fn request_head_len(request: &Request, body: &RequestBody) -> u64 {
    let url = request.url();
    let target = url
        .path()
        .len()
        .saturating_add(url.query().map_or(0, |query| query.len().saturating_add(1)));
    let mut len = request
        .method()
        .as_str()
        .len()
        .saturating_add(1)
        .saturating_add(target)
        .saturating_add(REQUEST_LINE_SUFFIX.len());

    let headers = request.headers();
    for (name, value) in headers {
        len = len.saturating_add(header_line_len(name.as_str().len(), value.len()));
    }
    if !headers.contains_key(HOST) {
        let host = url.host_str().map_or(0, str::len);
        let port = url
            .port()
            .map_or(0, |port| port.to_string().len().saturating_add(1));
        len = len.saturating_add(header_line_len(
            HOST.as_str().len(),
            host.saturating_add(port),
        ));
    }
    if !headers.contains_key(USER_AGENT) {
        len = len.saturating_add(header_line_len(
            USER_AGENT.as_str().len(),
            DEFAULT_USER_AGENT.len(),
        ));
    }
    let fixed = body.fixed_len();
    if body.is_streaming() {
        len = len.saturating_add(header_line_len(
            TRANSFER_ENCODING.as_str().len(),
            "chunked".len(),
        ));
    } else if fixed > 0 {
        len = len.saturating_add(header_line_len(
            CONTENT_LENGTH.as_str().len(),
            fixed.to_string().len(),
        ));
    }
    len_u64(len.saturating_add(CRLF_LEN))
}

fn response_head_len(response: &Response) -> u64 {
    let status = response.status();
    let version = response.version();
    let version_len = if version == Version::HTTP_2 || version == Version::HTTP_3 {
        "HTTP/2".len()
    } else {
        "HTTP/1.1".len()
    };
    let reason = status.canonical_reason().map_or(0, str::len);
    // "<version> <code> <reason>\r\n"
    let mut len = version_len
        .saturating_add(1)
        .saturating_add(3)
        .saturating_add(1)
        .saturating_add(reason)
        .saturating_add(CRLF_LEN);
    for (name, value) in response.headers() {
        len = len.saturating_add(header_line_len(name.as_str().len(), value.len()));
    }
    len_u64(len.saturating_add(CRLF_LEN))
}
