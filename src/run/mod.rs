//! The bombardment orchestrator.
//!
//! A run launches one worker per connection plus two background tasks: a
//! progress reporter and a requests/sec sampler. Workers race for admission
//! on a shared completion barrier. Once they have all joined, the
//! orchestrator waits for both background tasks to check in, so nothing
//! touches the statistics after [`Bombardier::bombard`] returns.
mod phase;
mod tasks;


use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::args::PositiveU64;
use crate::barrier::{CompletionBarrier, CountingBarrier, DoneSignal, TimedBarrier};
use crate::config::{RunConfig, RunMode};
use crate::error::{AppError, AppResult, RunError};
use crate::http::Client;
use crate::metrics::{ErrorMap, StatisticsRecorder};
use crate::rate::{RATE_LIMIT_INTERVAL, RateLimiter, estimate};
use crate::report::{Report, RunResults, RunSpec};

pub use crate::barrier::CancelHandle;
pub use phase::RunPhase;
use tasks::{report_progress, sample_rates, worker};

/// How often the progress reporter polls the barrier.
pub const PROGRESS_REFRESH: Duration = Duration::from_millis(200);

const BASE_SAMPLE_INTERVAL: Duration = Duration::from_millis(10);
const SAMPLE_SLACK: Duration = Duration::from_millis(10);
const BACKGROUND_TASKS: usize = 2;

/// State shared by every task of a run.
#[derive(Debug)]
pub(crate) struct Engine {
    client: Client,
    limiter: RateLimiter,
    stats: StatisticsRecorder,
    errors: ErrorMap,
}

#[derive(Debug)]
pub struct Bombardier {
    config: RunConfig,
    engine: Arc<Engine>,
    done: DoneSignal,
    phase: watch::Sender<RunPhase>,
    progress: watch::Sender<f64>,
    time_taken: Mutex<Option<Duration>>,
}

impl Bombardier {
    /// Validates `config` and builds the client and statistics for a run.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: RunConfig) -> AppResult<Self> {
        config.validate()?;
        let stats = StatisticsRecorder::new()?;
        let client = Client::new(&config, stats.bytes())?;
        let limiter = RateLimiter::new(config.rate.map(PositiveU64::non_zero));
        let (phase, _) = watch::channel(RunPhase::Idle);
        let (progress, _) = watch::channel(0.0);
        Ok(Self {
            config,
            engine: Arc::new(Engine {
                client,
                limiter,
                stats,
                errors: ErrorMap::new(),
            }),
            done: DoneSignal::new(),
            phase,
            progress,
            time_taken: Mutex::new(None),
        })
    }

    #[must_use]
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> RunPhase {
        *self.phase.borrow()
    }

    #[must_use]
    pub fn phase_updates(&self) -> watch::Receiver<RunPhase> {
        self.phase.subscribe()
    }

    /// Completion fractions in `[0, 1]`, refreshed every [`PROGRESS_REFRESH`]
    /// while the run is active. The last value published is `1.0`.
    #[must_use]
    pub fn progress(&self) -> watch::Receiver<f64> {
        self.progress.subscribe()
    }

    /// A handle that stops the run early. It can be used before the run
    /// starts, in which case the run ends as soon as it begins.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle::new(self.done.clone())
    }

    #[must_use]
    pub fn statistics(&self) -> &StatisticsRecorder {
        &self.engine.stats
    }

    #[must_use]
    pub fn errors(&self) -> &ErrorMap {
        &self.engine.errors
    }

    #[must_use]
    pub fn time_taken(&self) -> Option<Duration> {
        *self.time_taken.lock()
    }

    /// Runs the bombardment to completion.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::AlreadyStarted`] when called more than once.
    pub async fn bombard(&self) -> AppResult<()> {
        let started = self.phase.send_if_modified(|phase| {
            if *phase == RunPhase::Idle {
                *phase = RunPhase::Running;
                true
            } else {
                false
            }
        });
        if !started {
            return Err(AppError::run(RunError::AlreadyStarted));
        }

        let barrier = Arc::new(self.build_barrier());
        let connections = self.config.connections.get();
        debug!(
            "Bombardment started: {} worker(s), phase {}.",
            connections,
            RunPhase::Running
        );

        let begin = Instant::now();
        self.engine.stats.start_window();

        let (finished_tx, mut finished_rx) = mpsc::channel(BACKGROUND_TASKS);
        let workers_joined = DoneSignal::new();
        tokio::spawn(sample_rates(
            Arc::clone(&self.engine),
            barrier.done(),
            workers_joined.clone(),
            sample_interval(&self.config),
            finished_tx.clone(),
        ));
        tokio::spawn(report_progress(
            Arc::clone(&barrier),
            self.progress.clone(),
            PROGRESS_REFRESH,
            finished_tx,
        ));

        let mut workers = Vec::with_capacity(usize::try_from(connections).unwrap_or(0));
        for _ in 0..connections {
            workers.push(tokio::spawn(worker(
                Arc::clone(&barrier),
                Arc::clone(&self.engine),
            )));
        }
        for handle in workers {
            if let Err(err) = handle.await {
                warn!("Worker task failed: {}", err);
            }
        }

        let elapsed = begin.elapsed();
        *self.time_taken.lock() = Some(elapsed);
        self.phase.send_replace(RunPhase::Draining);
        debug!("Workers joined after {:?}; draining.", elapsed);

        // A worker that panicked may have left the barrier open.
        barrier.cancel();
        workers_joined.close();

        for _ in 0..BACKGROUND_TASKS {
            match finished_rx.recv().await {
                Some(task) => debug!("Background task finished: {:?}.", task),
                None => {
                    warn!("A background task exited without reporting back.");
                    break;
                }
            }
        }

        self.phase.send_replace(RunPhase::Complete);
        debug!("Bombardment complete.");
        Ok(())
    }

    /// Snapshot of the finished run.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::NotFinished`] until [`Self::bombard`] has returned.
    pub fn report(&self) -> AppResult<Report> {
        let time_taken = match (self.phase(), self.time_taken()) {
            (RunPhase::Complete, Some(time_taken)) => time_taken,
            _ => return Err(AppError::run(RunError::NotFinished)),
        };
        let stats = &self.engine.stats;
        let bytes = stats.bytes();
        Ok(Report {
            spec: RunSpec::from_config(&self.config),
            result: RunResults {
                bytes_read: bytes.read(),
                bytes_written: bytes.written(),
                time_taken,
                statuses: stats.status_counts(),
                errors: self.engine.errors.by_frequency(),
                latency: stats.latency_summary(),
                rps: stats.rps_summary(),
            },
        })
    }

    fn build_barrier(&self) -> CompletionBarrier {
        let done = self.done.clone();
        match self.config.mode {
            RunMode::Counted(requests) => CompletionBarrier::Counting(
                CountingBarrier::with_signal(requests.non_zero(), done),
            ),
            RunMode::Timed(duration) => {
                CompletionBarrier::Timed(TimedBarrier::with_signal(duration, done))
            }
        }
    }
}

/// The sampler ticks at the limiter's refill interval when a rate is set,
/// otherwise every 10ms, plus 10ms of slack either way.
fn sample_interval(config: &RunConfig) -> Duration {
    let base = config.rate.map_or(BASE_SAMPLE_INTERVAL, |rate| {
        estimate(rate.non_zero(), RATE_LIMIT_INTERVAL).0
    });
    base.saturating_add(SAMPLE_SLACK)
}
