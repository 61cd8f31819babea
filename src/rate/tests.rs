use std::num::NonZeroU64;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;

use super::*;
use crate::barrier::DoneSignal;
use crate::test_support::{run_async_test, run_multi_thread_test};

fn rate(value: u64) -> Result<NonZeroU64, String> {
    NonZeroU64::new(value).ok_or_else(|| "rate must be non-zero".to_owned())
}

fn effective_rate(interval: Duration, quantum: u64) -> f64 {
    quantum as f64 / interval.as_secs_f64()
}

#[test]
fn estimate_widens_interval_for_low_rates() -> Result<(), String> {
    let (interval, quantum) = estimate(rate(1)?, RATE_LIMIT_INTERVAL);
    if interval != Duration::from_secs(1) || quantum != 1 {
        return Err(format!("Unexpected estimate: {:?} / {}", interval, quantum));
    }

    let (interval, quantum) = estimate(rate(50)?, RATE_LIMIT_INTERVAL);
    if interval != Duration::from_millis(20) || quantum != 1 {
        return Err(format!("Unexpected estimate: {:?} / {}", interval, quantum));
    }
    Ok(())
}

#[test]
fn estimate_grows_quantum_for_high_rates() -> Result<(), String> {
    let (interval, quantum) = estimate(rate(5_000)?, RATE_LIMIT_INTERVAL);
    if interval != RATE_LIMIT_INTERVAL || quantum != 50 {
        return Err(format!("Unexpected estimate: {:?} / {}", interval, quantum));
    }

    let (interval, quantum) = estimate(rate(1_000_000)?, RATE_LIMIT_INTERVAL);
    if interval != RATE_LIMIT_INTERVAL || quantum != 10_000 {
        return Err(format!("Unexpected estimate: {:?} / {}", interval, quantum));
    }
    Ok(())
}

#[test]
fn estimate_tracks_target_rate() -> Result<(), String> {
    for target in [1_u64, 3, 7, 15, 99, 150, 333, 1_500, 12_345, 777_777, 10_000_000] {
        let (interval, quantum) = estimate(rate(target)?, RATE_LIMIT_INTERVAL);
        if quantum == 0 {
            return Err(format!("Quantum must be >= 1 for rate {}", target));
        }
        if interval < RATE_LIMIT_INTERVAL / 2 && quantum > 1 {
            return Err(format!("Interval too short for rate {}: {:?}", target, interval));
        }
        let actual = effective_rate(interval, quantum);
        let error = (actual - target as f64).abs() / target as f64;
        if error > 0.01 {
            return Err(format!("Rate {} estimated as {}", target, actual));
        }
    }
    Ok(())
}

#[test]
fn bucket_starts_full_and_reserves_ahead() -> Result<(), String> {
    run_async_test(async {
        let start = Instant::now();
        let interval = Duration::from_millis(10);
        let bucket = TokenBucket::starting_at(start, interval, 3, 3);

        for _ in 0..3 {
            let wait = bucket.take_at(start, 1);
            if !wait.is_zero() {
                return Err(format!("Expected a token on hand, waited {:?}", wait));
            }
        }

        let wait = bucket.take_at(start, 1);
        if wait != interval {
            return Err(format!("Expected to wait one interval, got {:?}", wait));
        }
        // Three more reservations fit into the same refill; the next does not.
        bucket.take_at(start, 1);
        bucket.take_at(start, 1);
        let wait = bucket.take_at(start, 1);
        if wait != interval * 2 {
            return Err(format!("Expected to wait two intervals, got {:?}", wait));
        }

        let later = start + interval * 5;
        let wait = bucket.take_at(later, 1);
        if !wait.is_zero() {
            return Err(format!("Bucket should have refilled, waited {:?}", wait));
        }
        Ok(())
    })
}

#[test]
fn bucket_refill_is_capped_at_capacity() -> Result<(), String> {
    run_async_test(async {
        let start = Instant::now();
        let interval = Duration::from_millis(1);
        let bucket = TokenBucket::starting_at(start, interval, 5, 5);
        let later = start + Duration::from_secs(1);

        for _ in 0..5 {
            if !bucket.take_at(later, 1).is_zero() {
                return Err("Expected a full bucket".to_owned());
            }
        }
        if bucket.take_at(later, 1).is_zero() {
            return Err("Bucket must not hold more than its capacity".to_owned());
        }
        Ok(())
    })
}

#[test]
fn unlimited_limiter_always_continues() -> Result<(), String> {
    run_multi_thread_test(async {
        let limiter = Arc::new(RateLimiter::new(None));
        let done = DoneSignal::new();
        let counter = Arc::new(AtomicU64::new(0));

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let limiter = Arc::clone(&limiter);
            let done = done.clone();
            let counter = Arc::clone(&counter);
            tasks.push(tokio::spawn(async move {
                while !done.is_closed() {
                    if limiter.pace(&done).await != Pace::Continue {
                        return Err("Unlimited limiter returned Break".to_owned());
                    }
                    counter.fetch_add(1, Ordering::Relaxed);
                    tokio::task::yield_now().await;
                }
                Ok(())
            }));
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
        done.close();
        for task in tasks {
            task.await
                .map_err(|err| format!("Pacing task failed: {}", err))??;
        }
        if counter.load(Ordering::Relaxed) == 0 {
            return Err("No events happened".to_owned());
        }
        Ok(())
    })
}

async fn count_granted(target: u64, duration: Duration) -> Result<u64, String> {
    let limiter = Arc::new(RateLimiter::new(Some(rate(target)?)));
    let done = DoneSignal::new();
    let pacer = {
        let limiter = Arc::clone(&limiter);
        let done = done.clone();
        tokio::spawn(async move {
            let mut granted = 0_u64;
            while limiter.pace(&done).await == Pace::Continue {
                granted = granted.saturating_add(1);
            }
            granted
        })
    };

    tokio::time::sleep(duration).await;
    done.close();
    tokio::time::timeout(Duration::from_millis(100), pacer)
        .await
        .map_err(|err| format!("Pacer for rate {} did not stop: {}", target, err))?
        .map_err(|err| format!("Pacer for rate {} failed: {}", target, err))
}

#[test]
fn bucket_limiter_holds_low_rates() -> Result<(), String> {
    run_multi_thread_test(async {
        let duration = Duration::from_secs(1);
        let mut runs = Vec::new();
        for target in [1_u64, 10, 15, 50, 100, 150, 500, 1_000, 1_500, 5_000] {
            runs.push((target, tokio::spawn(count_granted(target, duration))));
        }
        for (target, run) in runs {
            let granted = run
                .await
                .map_err(|err| format!("Rate run failed: {}", err))??;
            let expected = target as f64 * duration.as_secs_f64();
            let granted = granted as f64;
            if granted < expected * 0.9 || granted > expected * 1.1 + 5.0 {
                return Err(format!(
                    "Rate {}: expected about {}, granted {}",
                    target, expected, granted
                ));
            }
        }
        Ok(())
    })
}

#[test]
fn bucket_limiter_holds_high_rates() -> Result<(), String> {
    run_multi_thread_test(async {
        let duration = Duration::from_millis(100);
        for target in [100_000_u64, 200_000, 500_000] {
            let granted = count_granted(target, duration).await? as f64;
            let expected = target as f64 * duration.as_secs_f64();
            if granted < expected * 0.75 || granted > expected * 1.25 {
                return Err(format!(
                    "Rate {}: expected about {}, granted {}",
                    target, expected, granted
                ));
            }
        }
        Ok(())
    })
}

#[test]
fn closed_signal_breaks_without_waiting() -> Result<(), String> {
    run_async_test(async {
        let limiter = RateLimiter::new(Some(rate(1)?));
        let done = DoneSignal::new();
        if limiter.pace(&done).await != Pace::Continue {
            return Err("First token should be on hand".to_owned());
        }

        done.close();
        let started = Instant::now();
        let pace = limiter.pace(&done).await;
        if pace != Pace::Break {
            return Err("Expected Break on a closed signal".to_owned());
        }
        if started.elapsed() > Duration::from_millis(50) {
            return Err(format!("Break took {:?}", started.elapsed()));
        }
        Ok(())
    })
}

#[test]
fn close_interrupts_a_pending_wait() -> Result<(), String> {
    run_multi_thread_test(async {
        let limiter = Arc::new(RateLimiter::new(Some(rate(1)?)));
        let done = DoneSignal::new();
        limiter.pace(&done).await;

        let waiter = {
            let limiter = Arc::clone(&limiter);
            let done = done.clone();
            tokio::spawn(async move { limiter.pace(&done).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        done.close();

        let pace = tokio::time::timeout(Duration::from_millis(200), waiter)
            .await
            .map_err(|err| format!("Pending pace was not interrupted: {}", err))?
            .map_err(|err| format!("Pace task failed: {}", err))?;
        if pace != Pace::Break {
            return Err("Interrupted wait should return Break".to_owned());
        }
        Ok(())
    })
}

#[test]
fn wait_timers_are_reused() -> Result<(), String> {
    run_async_test(async {
        let limiter = BucketLimiter::new(rate(200)?);
        let done = DoneSignal::new();
        for _ in 0..10 {
            if limiter.pace(&done).await != Pace::Continue {
                return Err("Expected Continue".to_owned());
            }
        }
        let idle = limiter.idle_timers();
        if idle != 1 {
            return Err(format!("Expected one pooled timer, found {}", idle));
        }
        Ok(())
    })
}
