//! CLI argument types and parsing helpers.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
mod tests;

pub use cli::VolleyArgs;
pub use types::{HttpMethod, OutputFormat, PositiveU64, PrintSpec};

pub(crate) use defaults::{
    DEFAULT_CONNECTIONS, DEFAULT_TEST_DURATION, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
pub(crate) use parsers::{parse_duration_arg, parse_header, parse_target_url};
