//! Core library for the `volley` CLI.
//!
//! The crate is split the way a run flows: [`args`] and [`config`] turn the
//! command line and config files into a validated [`config::RunConfig`];
//! [`run::Bombardier`] drives workers against a [`barrier::CompletionBarrier`]
//! and a [`rate::RateLimiter`], recording into [`metrics`]; [`report`] renders
//! the finished run as plain text or JSON.
pub mod args;
pub mod barrier;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod rate;
pub mod report;
pub mod run;

#[cfg(test)]
mod test_support;
