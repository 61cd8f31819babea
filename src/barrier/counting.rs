use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use super::DoneSignal;

/// Admits exactly `num_reqs` units of work and closes after the same number
/// of completions.
#[derive(Debug)]
pub struct CountingBarrier {
    num_reqs: u64,
    grabbed: AtomicU64,
    finished: AtomicU64,
    done: DoneSignal,
}

impl CountingBarrier {
    #[must_use]
    pub fn new(num_reqs: NonZeroU64) -> Self {
        Self::with_signal(num_reqs, DoneSignal::new())
    }

    /// Uses `done` as the barrier's signal, so a handle created earlier can
    /// cancel the barrier.
    #[must_use]
    pub const fn with_signal(num_reqs: NonZeroU64, done: DoneSignal) -> Self {
        Self {
            num_reqs: num_reqs.get(),
            grabbed: AtomicU64::new(0),
            finished: AtomicU64::new(0),
            done,
        }
    }

    pub fn try_grab_work(&self) -> bool {
        if self.done.is_closed() {
            return false;
        }
        self.grabbed.fetch_add(1, Ordering::AcqRel) < self.num_reqs
    }

    pub fn job_done(&self) {
        let finished = self.finished.fetch_add(1, Ordering::AcqRel).saturating_add(1);
        // Closing on completions rather than grabs means the last in-flight
        // request is the one that ends the run.
        if finished == self.num_reqs {
            self.done.close();
        }
    }

    #[must_use]
    pub const fn done(&self) -> &DoneSignal {
        &self.done
    }

    #[must_use]
    pub fn completed(&self) -> f64 {
        if self.done.is_closed() {
            return 1.0;
        }
        let finished = self.finished.load(Ordering::Acquire) as f64;
        (finished / self.num_reqs as f64).min(1.0)
    }
}
