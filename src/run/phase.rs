use std::fmt;

/// Lifecycle of a run. Phases only move forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunPhase {
    #[default]
    Idle,
    /// Workers are issuing requests.
    Running,
    /// Workers have joined; background tasks are finishing.
    Draining,
    Complete,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Complete => "complete",
        };
        f.write_str(label)
    }
}
