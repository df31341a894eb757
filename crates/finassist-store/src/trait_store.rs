use async_trait::async_trait;
use crate::error::Result;
use crate::models::ChatMessage;

/// Trait for checkpoint-style message log persistence
///
/// A thread is an opaque string key owning an ordered, append-only message
/// log. Implementations must make every write durable before returning.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Create a new thread with an empty checkpoint so it is immediately
    /// listable.
    ///
    /// Generates a fresh identifier when none is supplied; rejects an
    /// identifier that already exists with [`StoreError::ThreadExists`].
    ///
    /// [`StoreError::ThreadExists`]: crate::error::StoreError::ThreadExists
    async fn create_thread(&self, thread_id: Option<String>) -> Result<String>;

    /// Append one message to the thread's ordered log
    ///
    /// Fails with `ThreadNotFound` if the thread was never created.
    async fn append(&self, thread_id: &str, message: ChatMessage) -> Result<()>;

    /// Load all messages for a thread in insertion order, oldest first
    ///
    /// Returns an empty vec for a freshly created thread; fails with
    /// `ThreadNotFound` for a never-created or deleted thread.
    async fn load(&self, thread_id: &str) -> Result<Vec<ChatMessage>>;

    /// Delete a thread and all its messages; idempotent
    async fn delete(&self, thread_id: &str) -> Result<()>;

    /// List all known thread identifiers, most-recently-active first
    ///
    /// Recency is the highest append sequence number observed for the
    /// thread, not wall-clock time, so the ordering is deterministic.
    async fn list_thread_ids(&self) -> Result<Vec<String>>;
}
