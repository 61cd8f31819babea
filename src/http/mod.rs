//! HTTP client used by the workers of a run.
mod body;
mod client;
mod kind;


pub use client::{Client, RequestOutcome};
pub use kind::ClientKind;

fn len_u64(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}
