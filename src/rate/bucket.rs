use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
struct BucketState {
    latest_tick: u64,
    available: i64,
}

/// Token bucket that refills `quantum` tokens every `fill_interval`, up to
/// `capacity`. It starts full.
///
/// Taking more tokens than are available reserves them anyway and reports
/// how long the caller must wait before they exist, so concurrent callers
/// queue up behind each other instead of racing for the next refill.
#[derive(Debug)]
pub struct TokenBucket {
    start: Instant,
    fill_interval: Duration,
    capacity: i64,
    quantum: u64,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    #[must_use]
    pub fn new(fill_interval: Duration, capacity: u64, quantum: u64) -> Self {
        Self::starting_at(Instant::now(), fill_interval, capacity, quantum)
    }

    pub(crate) fn starting_at(
        start: Instant,
        fill_interval: Duration,
        capacity: u64,
        quantum: u64,
    ) -> Self {
        let capacity = i64::try_from(capacity.max(1)).unwrap_or(i64::MAX);
        Self {
            start,
            fill_interval: fill_interval.max(Duration::from_nanos(1)),
            capacity,
            quantum: quantum.max(1),
            state: Mutex::new(BucketState {
                latest_tick: 0,
                available: capacity,
            }),
        }
    }

    /// Withdraws `count` tokens and returns how long to wait until they are
    /// actually available. A zero wait means the tokens were on hand.
    pub fn take(&self, count: u64) -> Duration {
        self.take_at(Instant::now(), count)
    }

    pub(crate) fn take_at(&self, now: Instant, count: u64) -> Duration {
        if count == 0 {
            return Duration::ZERO;
        }
        let tick = self.tick_at(now);
        let count = i64::try_from(count).unwrap_or(i64::MAX);

        let available = {
            let mut state = self.state.lock();
            self.refill(&mut state, tick);
            state.available = state.available.saturating_sub(count);
            state.available
        };
        if available >= 0 {
            return Duration::ZERO;
        }

        let ticks_needed = available.unsigned_abs().div_ceil(self.quantum);
        let end_tick = tick.saturating_add(ticks_needed);
        let offset = self
            .fill_interval
            .as_nanos()
            .saturating_mul(u128::from(end_tick));
        let offset = Duration::from_nanos(u64::try_from(offset).unwrap_or(u64::MAX));
        self.start.checked_add(offset).map_or(self.fill_interval, |end| {
            end.saturating_duration_since(now)
        })
    }

    fn tick_at(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.start).as_nanos();
        let tick = elapsed
            .checked_div(self.fill_interval.as_nanos())
            .unwrap_or(0);
        u64::try_from(tick).unwrap_or(u64::MAX)
    }

    fn refill(&self, state: &mut BucketState, tick: u64) {
        if tick <= state.latest_tick {
            return;
        }
        let added = tick
            .saturating_sub(state.latest_tick)
            .saturating_mul(self.quantum);
        let added = i64::try_from(added).unwrap_or(i64::MAX);
        state.available = state.available.saturating_add(added).min(self.capacity);
        state.latest_tick = tick;
    }
}
