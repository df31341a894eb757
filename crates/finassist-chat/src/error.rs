use finassist_store::StoreError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    /// Referenced thread absent; surfaced to the caller, never retried here
    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    /// Underlying model/provider failure; the user message is already
    /// persisted, so the caller may retry the turn without resubmission
    #[error("Generation failed: {0}")]
    Generation(#[source] anyhow::Error),

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    /// Persistence failure; fatal for the current operation
    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ChatError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ThreadNotFound(id) => ChatError::ThreadNotFound(id),
            other => ChatError::Store(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
