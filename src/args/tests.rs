use std::time::Duration;

use clap::Parser;

use super::*;
use crate::error::ValidationError;

fn parse(argv: &[&str]) -> Result<VolleyArgs, String> {
    VolleyArgs::try_parse_from(argv).map_err(|err| format!("parse failed: {}", err))
}

#[test]
fn defaults_match_documented_values() -> Result<(), String> {
    let args = parse(&["volley", "localhost:8080"])?;
    if args.connections.get() != DEFAULT_CONNECTIONS.get() {
        return Err(format!("Unexpected connections {}", args.connections));
    }
    if args.timeout != DEFAULT_TIMEOUT {
        return Err(format!("Unexpected timeout {:?}", args.timeout));
    }
    if args.method != HttpMethod::Get {
        return Err(format!("Unexpected method {}", args.method));
    }
    if args.format != OutputFormat::PlainText {
        return Err("Expected plain-text output".to_owned());
    }
    if args.effective_print() != PrintSpec::ALL {
        return Err("Expected everything to be printed".to_owned());
    }
    if args.requests.is_some() || args.duration.is_some() {
        return Err("No test bound should be set by default".to_owned());
    }
    Ok(())
}

#[test]
fn parses_full_flag_set() -> Result<(), String> {
    let args = parse(&[
        "volley",
        "-c",
        "10",
        "-n",
        "1000",
        "-r",
        "50",
        "-t",
        "0",
        "-m",
        "post",
        "-b",
        "hello",
        "-H",
        "X-Test: yes",
        "-H",
        "Host: example.com",
        "-p",
        "i,r",
        "-o",
        "j",
        "-l",
        "-a",
        "-k",
        "--http1",
        "https://example.com/path",
    ])?;

    if args.connections.get() != 10 || args.requests.map(PositiveU64::get) != Some(1_000) {
        return Err("Unexpected connection or request count".to_owned());
    }
    if args.rate.map(PositiveU64::get) != Some(50) {
        return Err("Unexpected rate".to_owned());
    }
    if args.timeout != Duration::ZERO {
        return Err(format!("Expected disabled timeout, got {:?}", args.timeout));
    }
    if args.method != HttpMethod::Post || args.body.as_deref() != Some("hello") {
        return Err("Unexpected method or body".to_owned());
    }
    let expected_headers = vec![
        ("X-Test".to_owned(), "yes".to_owned()),
        ("Host".to_owned(), "example.com".to_owned()),
    ];
    if args.headers != expected_headers {
        return Err(format!("Unexpected headers {:?}", args.headers));
    }
    let print = args.effective_print();
    if !print.intro || print.progress || !print.result {
        return Err(format!("Unexpected print spec {:?}", print));
    }
    if args.format != OutputFormat::Json {
        return Err("Expected json format".to_owned());
    }
    if !(args.latencies && args.disable_keep_alives && args.insecure && args.http1) {
        return Err("Expected boolean flags to be set".to_owned());
    }
    Ok(())
}

#[test]
fn no_print_overrides_print_spec() -> Result<(), String> {
    let args = parse(&["volley", "-q", "-p", "r", "localhost"])?;
    if args.effective_print() != PrintSpec::NOTHING {
        return Err("Expected nothing to be printed".to_owned());
    }
    Ok(())
}

#[test]
fn http1_and_http2_conflict() -> Result<(), String> {
    if parse(&["volley", "--http1", "--http2", "localhost"]).is_ok() {
        return Err("Expected conflicting client kinds to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn rejects_zero_connections_and_unknown_method() -> Result<(), String> {
    if parse(&["volley", "-c", "0", "localhost"]).is_ok() {
        return Err("Expected zero connections to be rejected".to_owned());
    }
    if parse(&["volley", "-m", "BREW", "localhost"]).is_ok() {
        return Err("Expected unknown method to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn duration_parser_accepts_units_and_compounds() -> Result<(), String> {
    let cases = [
        ("10", Duration::from_secs(10)),
        ("250ms", Duration::from_millis(250)),
        ("3s", Duration::from_secs(3)),
        ("2m", Duration::from_secs(120)),
        ("1h", Duration::from_secs(3_600)),
        ("1m30s", Duration::from_secs(90)),
        ("0", Duration::ZERO),
    ];
    for (input, expected) in cases {
        let parsed = parse_duration_arg(input).map_err(|err| err.to_string())?;
        if parsed != expected {
            return Err(format!("{} parsed as {:?}", input, parsed));
        }
    }
    Ok(())
}

#[test]
fn duration_parser_accepts_fractions() -> Result<(), String> {
    let cases = [
        ("1.5s", Duration::from_millis(1_500)),
        ("0.5m", Duration::from_secs(30)),
        ("1.5h30m", Duration::from_secs(7_200)),
        (".25s", Duration::from_millis(250)),
        ("2.", Duration::from_secs(2)),
        ("1.5", Duration::from_millis(1_500)),
        ("1.0000000009s", Duration::from_secs(1)),
        ("2.5ms", Duration::from_micros(2_500)),
    ];
    for (input, expected) in cases {
        let parsed = parse_duration_arg(input).map_err(|err| err.to_string())?;
        if parsed != expected {
            return Err(format!("{} parsed as {:?}", input, parsed));
        }
    }
    Ok(())
}

#[test]
fn duration_parser_rejects_garbage() -> Result<(), String> {
    for input in ["", "s", "10x", "ms10", "5m3", ".s", "1.2.3s", "."] {
        if parse_duration_arg(input).is_ok() {
            return Err(format!("Expected '{}' to be rejected", input));
        }
    }
    match parse_duration_arg("99999999999999999999h") {
        Err(ValidationError::InvalidDurationNumber { .. } | ValidationError::DurationOverflow) => {
            Ok(())
        }
        other => Err(format!("Expected overflow error, got {:?}", other)),
    }
}

#[test]
fn header_parser_requires_colon_and_name() -> Result<(), String> {
    let (name, value) = parse_header("Accept:  text/plain ").map_err(|err| err.to_string())?;
    if name != "Accept" || value != "text/plain" {
        return Err(format!("Unexpected header {}={}", name, value));
    }
    if parse_header("no-colon").is_ok() || parse_header(": value").is_ok() {
        return Err("Expected malformed headers to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn print_spec_accepts_short_and_long_parts() -> Result<(), String> {
    let spec: PrintSpec = "intro,p".parse().map_err(|err: ValidationError| err.to_string())?;
    if !spec.intro || !spec.progress || spec.result {
        return Err(format!("Unexpected spec {:?}", spec));
    }
    match "".parse::<PrintSpec>() {
        Err(ValidationError::EmptyPrintSpec) => {}
        other => return Err(format!("Expected empty spec error, got {:?}", other)),
    }
    match "i,x".parse::<PrintSpec>() {
        Err(ValidationError::InvalidPrintSpecPart { part }) if part == "x" => Ok(()),
        other => Err(format!("Expected invalid part error, got {:?}", other)),
    }
}

#[test]
fn output_format_accepts_shorthands() -> Result<(), String> {
    let cases = [
        ("plain-text", OutputFormat::PlainText),
        ("pt", OutputFormat::PlainText),
        ("json", OutputFormat::Json),
        ("j", OutputFormat::Json),
    ];
    for (input, expected) in cases {
        let parsed: OutputFormat = input.parse().map_err(|err: ValidationError| err.to_string())?;
        if parsed != expected {
            return Err(format!("{} parsed as {:?}", input, parsed));
        }
    }
    if "xml".parse::<OutputFormat>().is_ok() {
        return Err("Expected unknown format to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn target_url_defaults_to_http() -> Result<(), String> {
    let url = parse_target_url("localhost:8080/api").map_err(|err| err.to_string())?;
    if url.as_str() != "http://localhost:8080/api" {
        return Err(format!("Unexpected url {}", url));
    }
    let secure = parse_target_url("https://example.com").map_err(|err| err.to_string())?;
    if secure.scheme() != "https" {
        return Err("Expected https to be kept".to_owned());
    }
    Ok(())
}

#[test]
fn target_url_rejects_other_schemes() -> Result<(), String> {
    match parse_target_url("ftp://example.com") {
        Err(ValidationError::UnsupportedScheme { scheme, .. }) if scheme == "ftp" => Ok(()),
        other => Err(format!("Expected unsupported scheme, got {:?}", other)),
    }
}

#[test]
fn methods_without_body_are_flagged() -> Result<(), String> {
    let no_body = [
        HttpMethod::Connect,
        HttpMethod::Get,
        HttpMethod::Head,
        HttpMethod::Options,
        HttpMethod::Trace,
    ];
    let with_body = [
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Post,
        HttpMethod::Put,
    ];
    if no_body.iter().any(|method| method.can_have_body()) {
        return Err("Body-less method reported as body-capable".to_owned());
    }
    if !with_body.iter().all(|method| method.can_have_body()) {
        return Err("Body-capable method reported as body-less".to_owned());
    }
    Ok(())
}
