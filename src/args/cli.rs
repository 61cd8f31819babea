use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use super::parsers::{
    parse_duration_arg, parse_header, parse_output_format, parse_positive_u64, parse_print_spec,
};
use super::types::{HttpMethod, OutputFormat, PositiveU64, PrintSpec};

#[derive(Debug, Parser, Clone)]
#[clap(
    name = "volley",
    version,
    about = "Fast async HTTP benchmarking tool - fixed request counts or durations, optional rate limiting, latency and throughput statistics."
)]
pub struct VolleyArgs {
    /// Target URL (http:// is assumed when no scheme is given)
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Maximum number of concurrent connections
    #[arg(
        long = "connections",
        short = 'c',
        default_value = "125",
        value_parser = parse_positive_u64
    )]
    pub connections: PositiveU64,

    /// Number of requests to send
    #[arg(long = "requests", short = 'n', value_parser = parse_positive_u64)]
    pub requests: Option<PositiveU64>,

    /// Duration of the test (supports ms/s/m/h, default 10s when --requests is absent)
    #[arg(long = "duration", short = 'd', value_parser = parse_duration_arg)]
    pub duration: Option<Duration>,

    /// Rate limit in requests per second
    #[arg(long = "rate", short = 'r', value_parser = parse_positive_u64)]
    pub rate: Option<PositiveU64>,

    /// Socket/request timeout (0 disables it)
    #[arg(long = "timeout", short = 't', default_value = "2s", value_parser = parse_duration_arg)]
    pub timeout: Duration,

    /// Print latency statistics
    #[arg(long = "latencies", short = 'l')]
    pub latencies: bool,

    /// Request method
    #[arg(long = "method", short = 'm', default_value = "GET", ignore_case = true)]
    pub method: HttpMethod,

    /// Request body
    #[arg(long = "body", short = 'b')]
    pub body: Option<String>,

    /// File to use as request body
    #[arg(long = "body-file", short = 'f')]
    pub body_file: Option<PathBuf>,

    /// Stream the body instead of sending it buffered
    #[arg(long = "stream", short = 's')]
    pub stream: bool,

    /// Path to the client's TLS certificate (PEM)
    #[arg(long = "cert")]
    pub cert: Option<PathBuf>,

    /// Path to the client's TLS certificate private key (PEM)
    #[arg(long = "key")]
    pub key: Option<PathBuf>,

    /// Skip TLS certificate and hostname verification
    #[arg(long = "insecure", short = 'k')]
    pub insecure: bool,

    /// Disable HTTP keep-alive
    #[arg(long = "disable-keep-alives", short = 'a')]
    pub disable_keep_alives: bool,

    /// HTTP header, repeatable (e.g., -H "Key: Value")
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Use an HTTP/1.x-only client
    #[arg(long = "http1")]
    pub http1: bool,

    /// Allow HTTP/2 when the server negotiates it
    #[arg(long = "http2", conflicts_with = "http1")]
    pub http2: bool,

    /// What to print: any of i(ntro), p(rogress), r(esult), comma-separated
    #[arg(long = "print", short = 'p', value_parser = parse_print_spec)]
    pub print: Option<PrintSpec>,

    /// Don't print anything
    #[arg(long = "no-print", short = 'q')]
    pub no_print: bool,

    /// Result format: plain-text (pt) or json (j)
    #[arg(
        long = "format",
        short = 'o',
        default_value = "plain-text",
        value_parser = parse_output_format
    )]
    pub format: OutputFormat,

    /// Path to a config file (TOML or JSON); volley.toml or volley.json is used when present
    #[arg(long = "config")]
    pub config: Option<String>,

    /// Enable debug logging (overridden by VOLLEY_LOG / RUST_LOG)
    #[arg(long = "verbose", short = 'v')]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}

impl VolleyArgs {
    /// The print spec in effect once `--no-print` is taken into account.
    #[must_use]
    pub fn effective_print(&self) -> PrintSpec {
        if self.no_print {
            PrintSpec::NOTHING
        } else {
            self.print.unwrap_or_default()
        }
    }
}
