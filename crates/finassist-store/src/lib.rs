pub mod models;
pub mod error;
pub mod trait_store;
pub mod dbs;

pub use models::{ChatMessage, MessageRole};
pub use error::StoreError;
pub use trait_store::CheckpointStore;
pub use dbs::sqlite::SqliteCheckpointStore;
