//! Completion barriers decide when a run stops admitting work.
//!
//! A count-bounded barrier admits a fixed number of requests and closes when
//! the last of them completes. A time-bounded barrier closes when its
//! duration elapses. Both close early on cancellation, and both close
//! exactly once.
mod counting;
mod signal;
mod timed;


use std::num::NonZeroU64;
use std::time::Duration;

pub use counting::CountingBarrier;
pub use signal::{CancelHandle, DoneSignal};
pub use timed::TimedBarrier;

#[derive(Debug)]
pub enum CompletionBarrier {
    Counting(CountingBarrier),
    Timed(TimedBarrier),
}

impl CompletionBarrier {
    #[must_use]
    pub fn counting(num_reqs: NonZeroU64) -> Self {
        Self::Counting(CountingBarrier::new(num_reqs))
    }

    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    #[must_use]
    pub fn timed(duration: Duration) -> Self {
        Self::Timed(TimedBarrier::new(duration))
    }

    /// Reserves one unit of work. Returns `false` once the barrier is closed
    /// or the request quota is exhausted.
    pub fn try_grab_work(&self) -> bool {
        match self {
            Self::Counting(barrier) => barrier.try_grab_work(),
            Self::Timed(barrier) => barrier.try_grab_work(),
        }
    }

    /// Records the completion of a unit obtained from [`Self::try_grab_work`].
    pub fn job_done(&self) {
        match self {
            Self::Counting(barrier) => barrier.job_done(),
            Self::Timed(_) => {}
        }
    }

    #[must_use]
    pub fn done(&self) -> DoneSignal {
        self.signal().clone()
    }

    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle::new(self.done())
    }

    pub fn cancel(&self) {
        self.signal().close();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.signal().is_closed()
    }

    /// Progress fraction in `[0, 1]`; `1.0` once closed.
    #[must_use]
    pub fn completed(&self) -> f64 {
        match self {
            Self::Counting(barrier) => barrier.completed(),
            Self::Timed(barrier) => barrier.completed(),
        }
    }

    const fn signal(&self) -> &DoneSignal {
        match self {
            Self::Counting(barrier) => barrier.done(),
            Self::Timed(barrier) => barrier.done(),
        }
    }
}
