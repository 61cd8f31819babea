use std::time::Duration;

use tokio::time::{Instant, sleep};

use super::DoneSignal;

/// Stays open for a fixed wall-clock duration.
#[derive(Debug)]
pub struct TimedBarrier {
    start: Instant,
    duration: Duration,
    done: DoneSignal,
}

impl TimedBarrier {
    /// Starts the deadline immediately. A zero duration yields a barrier
    /// that is already closed.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime, because the deadline is
    /// driven by a spawned timer task.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self::with_signal(duration, DoneSignal::new())
    }

    /// Like [`Self::new`], closing `done` when the deadline passes. A signal
    /// that is already closed stays closed and the timer task exits at once.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    #[must_use]
    pub fn with_signal(duration: Duration, done: DoneSignal) -> Self {
        if duration.is_zero() {
            done.close();
        } else {
            let deadline = done.clone();
            tokio::spawn(async move {
                tokio::select! {
                    () = sleep(duration) => {
                        if deadline.close() {
                            tracing::debug!("Test duration elapsed.");
                        }
                    }
                    () = deadline.closed() => {}
                }
            });
        }
        Self {
            start: Instant::now(),
            duration,
            done,
        }
    }

    #[must_use]
    pub fn try_grab_work(&self) -> bool {
        !self.done.is_closed()
    }

    #[must_use]
    pub const fn done(&self) -> &DoneSignal {
        &self.done
    }

    #[must_use]
    pub fn completed(&self) -> f64 {
        if self.done.is_closed() || self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = self.start.elapsed().as_secs_f64();
        (elapsed / self.duration.as_secs_f64()).min(1.0)
    }
}
