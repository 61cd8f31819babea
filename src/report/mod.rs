//! Result snapshot and its renderers.
mod json;
mod text;
mod types;
mod units;


pub use json::write_json;
pub use text::write_plain_text;
pub use types::{Header, Report, RunResults, RunSpec, TestType};
pub use units::{format_binary, format_duration, format_time_us};

use crate::config::{RunConfig, RunMode};

/// The line printed before a run starts.
#[must_use]
pub fn intro_line(config: &RunConfig) -> String {
    match config.mode {
        RunMode::Counted(requests) => format!(
            "Bombarding {} with {} request(s) using {} connection(s)",
            config.url, requests, config.connections
        ),
        RunMode::Timed(duration) => format!(
            "Bombarding {} for {} using {} connection(s)",
            config.url,
            format_duration(duration),
            config.connections
        ),
    }
}
