use std::num::NonZeroU64;
use std::time::Duration;

/// Refill granularity the estimator aims for.
pub const RATE_LIMIT_INTERVAL: Duration = Duration::from_millis(10);

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Picks a refill interval and a per-interval quantum so that
/// `quantum / interval` approximates `rate` requests per second.
///
/// The quantum never drops below one token. Rates too low to yield a whole
/// token per `adjust_to` widen the interval instead; higher rates keep the
/// interval close to `adjust_to` and grow the quantum.
#[must_use]
pub fn estimate(rate: NonZeroU64, adjust_to: Duration) -> (Duration, u64) {
    let rate = u128::from(rate.get());
    let adjust_nanos = adjust_to.as_nanos().max(1);

    let quantum = rate
        .saturating_mul(adjust_nanos)
        .checked_div(NANOS_PER_SEC)
        .unwrap_or(0);
    if quantum == 0 {
        let interval = NANOS_PER_SEC.checked_div(rate).unwrap_or(NANOS_PER_SEC);
        return (duration_from_nanos(interval), 1);
    }

    let interval = quantum
        .saturating_mul(NANOS_PER_SEC)
        .checked_div(rate)
        .unwrap_or(adjust_nanos)
        .max(1);
    (
        duration_from_nanos(interval),
        u64::try_from(quantum).unwrap_or(u64::MAX),
    )
}

fn duration_from_nanos(nanos: u128) -> Duration {
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}
