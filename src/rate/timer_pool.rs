use std::pin::Pin;

use parking_lot::Mutex;
use tokio::time::{Instant, Sleep, sleep_until};

/// Upper bound on idle timers kept around between waits.
const MAX_IDLE_TIMERS: usize = 4096;

pub(crate) type PooledTimer = Pin<Box<Sleep>>;

/// Reusable wait timers for the pacing hot path.
#[derive(Debug, Default)]
pub(crate) struct TimerPool {
    idle: Mutex<Vec<PooledTimer>>,
}

impl TimerPool {
    /// Hands out a timer armed for `deadline`, reusing an idle one if any.
    pub(crate) fn acquire(&self, deadline: Instant) -> PooledTimer {
        let idle = self.idle.lock().pop();
        if let Some(mut timer) = idle {
            timer.as_mut().reset(deadline);
            return timer;
        }
        Box::pin(sleep_until(deadline))
    }

    pub(crate) fn release(&self, timer: PooledTimer) {
        let mut idle = self.idle.lock();
        if idle.len() < MAX_IDLE_TIMERS {
            idle.push(timer);
        }
    }

    #[cfg(test)]
    pub(crate) fn idle_len(&self) -> usize {
        self.idle.lock().len()
    }
}
