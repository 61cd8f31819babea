//! Request pacing.
//!
//! [`RateLimiter::pace`] is called once per request. The unlimited variant
//! never blocks; the bucket variant withdraws a token and, when none is on
//! hand, waits for either the token or the run's done signal.
mod bucket;
mod estimate;
mod timer_pool;

#[cfg(test)]
mod tests;

use std::num::NonZeroU64;

use tokio::time::Instant;

use crate::barrier::DoneSignal;

pub use bucket::TokenBucket;
pub use estimate::{RATE_LIMIT_INTERVAL, estimate};
use timer_pool::TimerPool;

/// Outcome of a pacing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    /// Issue the next request.
    Continue,
    /// The run is over; stop issuing requests.
    Break,
}

#[derive(Debug)]
pub enum RateLimiter {
    Unlimited,
    Bucket(BucketLimiter),
}

impl RateLimiter {
    #[must_use]
    pub fn new(rate: Option<NonZeroU64>) -> Self {
        rate.map_or(Self::Unlimited, |rate| Self::Bucket(BucketLimiter::new(rate)))
    }

    pub async fn pace(&self, done: &DoneSignal) -> Pace {
        match self {
            Self::Unlimited => Pace::Continue,
            Self::Bucket(limiter) => limiter.pace(done).await,
        }
    }
}

#[derive(Debug)]
pub struct BucketLimiter {
    bucket: TokenBucket,
    timers: TimerPool,
}

impl BucketLimiter {
    #[must_use]
    pub fn new(rate: NonZeroU64) -> Self {
        let (fill_interval, quantum) = estimate(rate, RATE_LIMIT_INTERVAL);
        tracing::debug!(
            "Token bucket: {} token(s) every {:?} (target {} req/s).",
            quantum,
            fill_interval,
            rate
        );
        Self {
            bucket: TokenBucket::new(fill_interval, quantum, quantum),
            timers: TimerPool::default(),
        }
    }

    pub async fn pace(&self, done: &DoneSignal) -> Pace {
        let wait = self.bucket.take(1);
        if wait.is_zero() {
            return Pace::Continue;
        }
        if done.is_closed() {
            return Pace::Break;
        }

        let deadline = Instant::now()
            .checked_add(wait)
            .unwrap_or_else(Instant::now);
        let mut timer = self.timers.acquire(deadline);
        let pace = tokio::select! {
            biased;
            () = done.closed() => Pace::Break,
            () = timer.as_mut() => Pace::Continue,
        };
        self.timers.release(timer);
        pace
    }

    #[cfg(test)]
    pub(crate) fn idle_timers(&self) -> usize {
        self.timers.idle_len()
    }
}
