use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PositiveU64, PrintSpec, VolleyArgs, parse_header};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

use super::types::{ConfigFile, DurationValue};

/// Applies configuration values to CLI arguments. Values given on the
/// command line always win.
///
/// # Errors
///
/// Returns an error when config values are invalid or conflict with each other.
pub fn apply_config(
    args: &mut VolleyArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if !is_cli(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }

    if !is_cli(matches, "connections")
        && let Some(connections) = config.connections
    {
        args.connections = ensure_positive_u64(connections, "connections")?;
    }

    // Options that pick one of several alternatives are taken from the
    // file only when the command line picked none of them.
    let cli_test_mode = any_cli(matches, &["requests", "duration"]);
    if !cli_test_mode && let Some(requests) = config.requests {
        args.requests = Some(ensure_positive_u64(requests, "requests")?);
    }

    if !cli_test_mode && let Some(duration) = config.duration.as_ref() {
        args.duration = Some(to_duration(duration, "duration")?);
    }

    if !is_cli(matches, "rate")
        && let Some(rate) = config.rate
    {
        args.rate = Some(ensure_positive_u64(rate, "rate")?);
    }

    if !is_cli(matches, "timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.timeout = to_duration(timeout, "timeout")?;
    }

    if !is_cli(matches, "method")
        && let Some(method) = config.method
    {
        args.method = method;
    }

    let cli_body = any_cli(matches, &["body", "body_file"]);
    if !cli_body && let Some(body) = config.body.clone() {
        args.body = Some(body);
    }

    if !cli_body && let Some(body_file) = config.body_file.clone() {
        args.body_file = Some(body_file);
    }

    if !is_cli(matches, "cert")
        && let Some(cert) = config.cert.clone()
    {
        args.cert = Some(cert);
    }

    if !is_cli(matches, "key")
        && let Some(key) = config.key.clone()
    {
        args.key = Some(key);
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        args.headers = parse_headers(headers)?;
    }

    let cli_print = any_cli(matches, &["print", "no_print"]);
    if !cli_print && let Some(print) = config.print.as_deref() {
        let spec = print.parse::<PrintSpec>().map_err(|err| {
            AppError::config(ConfigError::InvalidField {
                field: "print",
                source: err,
            })
        })?;
        args.print = Some(spec);
    }

    if !is_cli(matches, "format")
        && let Some(format) = config.format
    {
        args.format = format;
    }

    apply_flag(matches, "latencies", config.latencies, &mut args.latencies);
    apply_flag(matches, "stream", config.stream, &mut args.stream);
    apply_flag(matches, "insecure", config.insecure, &mut args.insecure);
    apply_flag(
        matches,
        "disable_keep_alives",
        config.disable_keep_alives,
        &mut args.disable_keep_alives,
    );
    if !any_cli(matches, &["http1", "http2"]) {
        apply_flag(matches, "http1", config.http1, &mut args.http1);
        apply_flag(matches, "http2", config.http2, &mut args.http2);
    }
    if !cli_print {
        apply_flag(matches, "no_print", config.no_print, &mut args.no_print);
    }

    if args.http1 && args.http2 {
        return Err(AppError::validation(ValidationError::ClientKindConflict));
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn any_cli(matches: &ArgMatches, names: &[&str]) -> bool {
    names.iter().any(|name| is_cli(matches, name))
}

fn apply_flag(matches: &ArgMatches, name: &str, value: Option<bool>, target: &mut bool) {
    if !is_cli(matches, name)
        && let Some(value) = value
    {
        *target = value;
    }
}

fn ensure_positive_u64(value: u64, field: &str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}

fn to_duration(value: &DurationValue, field: &'static str) -> AppResult<std::time::Duration> {
    value
        .to_duration()
        .map_err(|err| AppError::config(ConfigError::InvalidDuration { field, source: err }))
}

fn parse_headers(headers: &[String]) -> AppResult<Vec<(String, String)>> {
    let mut parsed = Vec::with_capacity(headers.len());
    for header in headers {
        parsed.push(
            parse_header(header)
                .map_err(|err| AppError::config(ConfigError::InvalidHeader { source: err }))?,
        );
    }
    Ok(parsed)
}
