use std::ffi::OsString;
use std::io::Write;
use std::path::Path;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::{debug, error, warn};

use volley::args::{OutputFormat, VolleyArgs};
use volley::config::{RunConfig, apply_config, load_config};
use volley::error::AppResult;
use volley::http::ClientKind;
use volley::report::{Report, intro_line, write_json, write_plain_text};
use volley::run::Bombardier;

use crate::progress::setup_progress_indicator;
use crate::shutdown_handlers::setup_signal_handler;

/// Default config filenames checked when no CLI args are provided.
const DEFAULT_CONFIG_FILES: [&str; 2] = ["volley.toml", "volley.json"];

pub(crate) fn run() -> AppResult<()> {
    let (mut args, matches) = match parse_args()? {
        Some(parsed) => parsed,
        None => return Ok(()),
    };

    if let Some(config) = load_config(args.config.as_deref())? {
        apply_config(&mut args, &matches, &config)?;
    }

    crate::logger::init_logging(args.verbose, args.no_color);

    let config = RunConfig::from_args(&args)?;
    warn_ignored_options(&config);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(&args, config))
}

fn parse_args() -> AppResult<Option<(VolleyArgs, ArgMatches)>> {
    let mut cmd = VolleyArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = VolleyArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !has_default_config()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

fn warn_ignored_options(config: &RunConfig) {
    if config.stream && config.body.is_empty() {
        warn!("--stream has no effect without a request body.");
    }
    if config.client_kind == ClientKind::Http2 && config.url.scheme() == "http" {
        warn!("HTTP/2 is negotiated over TLS only; plain http targets use HTTP/1.1.");
    }
}

async fn run_async(args: &VolleyArgs, config: RunConfig) -> AppResult<()> {
    let print = args.effective_print();
    let bombardier = Bombardier::new(config).inspect_err(|err| {
        error!("Failed to set up the bombardment: {}", err);
    })?;

    if print.intro {
        println!("{}", intro_line(bombardier.config()));
    }

    let signals = setup_signal_handler(&bombardier.cancel_handle());
    let progress = print
        .progress
        .then(|| setup_progress_indicator(bombardier.progress(), args.no_color));

    let outcome = bombardier.bombard().await;
    signals.abort();
    if let Some(handle) = progress
        && let Err(err) = handle.await
    {
        debug!("Progress indicator stopped abnormally: {}", err);
    }
    outcome?;

    if print.result {
        let report = bombardier.report()?;
        print_report(&report, args)?;
    }
    Ok(())
}

fn print_report(report: &Report, args: &VolleyArgs) -> AppResult<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::PlainText => write_plain_text(report, args.latencies, &mut out)?,
        OutputFormat::Json => write_json(report, &mut out)?,
    }
    out.flush()?;
    Ok(())
}
