//! Prelude module for convenient imports
//!
//! Import everything you need with:
//! ```rust
//! use finassist::prelude::*;
//! ```

pub use crate::{
    ChatClient, ChatConfig, ChatError, ChatMessage, ChatOptions, ChatRequest, ChatResponse,
    CheckpointStore, ClientFactory, Content, GeminiClient, GeminiConfig, Message, MessageRole,
    SqliteCheckpointStore, StoreError, ThreadDirectory, TurnConfig, TurnEvent, TurnProcessor,
};
