use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Thread already exists: {0}")]
    ThreadExists(String),

    #[error("Corrupt checkpoint for thread {thread_id}: {reason}")]
    Corrupt { thread_id: String, reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
