use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior, interval, interval_at};
use tracing::{debug, trace};

use super::Engine;
use crate::barrier::{CompletionBarrier, DoneSignal};
use crate::rate::Pace;

/// Which background task reported back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Finished {
    Progress,
    RateSampler,
}

pub(super) async fn worker(barrier: Arc<CompletionBarrier>, engine: Arc<Engine>) {
    let done = barrier.done();
    while barrier.try_grab_work() {
        if engine.limiter.pace(&done).await == Pace::Break {
            break;
        }
        let outcome = engine.client.send().await;
        if let Some(error) = outcome.error.as_ref() {
            engine.errors.add(error);
        }
        let micros = u64::try_from(outcome.elapsed.as_micros()).unwrap_or(u64::MAX);
        engine.stats.write_statistics(outcome.status, micros);
        barrier.job_done();
    }
}

/// Publishes the barrier's progress until it closes, then a final `1.0`.
pub(super) async fn report_progress(
    barrier: Arc<CompletionBarrier>,
    progress: watch::Sender<f64>,
    refresh: Duration,
    finished: mpsc::Sender<Finished>,
) {
    let done = barrier.done();
    let mut ticker = interval(refresh);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            biased;
            () = done.closed() => break,
            _ = ticker.tick() => {
                progress.send_replace(barrier.completed());
            }
        }
    }
    progress.send_replace(1.0);
    debug!("Progress reporter finished.");
    if finished.send(Finished::Progress).await.is_err() {
        debug!("Run stopped listening before the progress reporter finished.");
    }
}

/// Samples requests/sec every `period` until the run closes. The final
/// sample is taken only after every worker has joined.
pub(super) async fn sample_rates(
    engine: Arc<Engine>,
    done: DoneSignal,
    workers_joined: DoneSignal,
    period: Duration,
    finished: mpsc::Sender<Finished>,
) {
    let first = Instant::now()
        .checked_add(period)
        .unwrap_or_else(Instant::now);
    let mut ticker = interval_at(first, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            () = done.closed() => break,
            _ = ticker.tick() => {
                if let Some(rps) = engine.stats.record_rps() {
                    trace!("Rate sample: {:.2} req/s", rps);
                }
            }
        }
    }
    workers_joined.closed().await;
    if let Some(rps) = engine.stats.record_rps() {
        trace!("Final rate sample: {:.2} req/s", rps);
    }
    debug!(
        "Rate sampler finished after {} sample(s).",
        engine.stats.rps_samples()
    );
    if finished.send(Finished::RateSampler).await.is_err() {
        debug!("Run stopped listening before the rate sampler finished.");
    }
}
