use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct SignalState {
    closed: AtomicBool,
    notify: Notify,
}

/// One-shot signal with any number of waiters.
///
/// The signal starts open and closes at most once. Every clone observes the
/// same state, and a closed signal never reopens.
#[derive(Debug, Clone, Default)]
pub struct DoneSignal {
    state: Arc<SignalState>,
}

impl DoneSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Closes the signal and wakes every waiter.
    ///
    /// Returns `true` only for the caller that performed the transition.
    pub fn close(&self) -> bool {
        if self
            .state
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.state.notify.notify_waiters();
        true
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::Acquire)
    }

    /// Resolves once the signal is closed. Returns immediately if it already is.
    pub async fn closed(&self) {
        let mut notified = pin!(self.state.notify.notified());
        // Register before checking the flag so a close racing with this call
        // cannot be missed.
        notified.as_mut().enable();
        if self.is_closed() {
            return;
        }
        notified.await;
    }
}

/// Cloneable handle that ends a run early.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    signal: DoneSignal,
}

impl CancelHandle {
    pub(crate) const fn new(signal: DoneSignal) -> Self {
        Self { signal }
    }

    pub fn cancel(&self) {
        if self.signal.close() {
            tracing::debug!("Run cancelled.");
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.signal.is_closed()
    }
}
