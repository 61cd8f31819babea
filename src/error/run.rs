use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RunError {
    #[error("Bombardment was already started.")]
    AlreadyStarted,
    #[error("Bombardment has not finished yet.")]
    NotFinished,
}
