//! # FinAssist
//!
//! A single-turn conversational personal-finance assistant: chat sessions
//! backed by a hosted language model, with per-thread message history
//! persisted in SQLite.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use finassist::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(SqliteCheckpointStore::open("chat_memory.db")?);
//!     let client = Arc::new(GeminiClient::new(std::env::var("GEMINI_API_KEY")?)?);
//!
//!     let processor = TurnProcessor::new(store.clone(), client, TurnConfig::default());
//!
//!     let thread_id = store.create_thread(None).await?;
//!     let mut events = processor.spawn_run(&thread_id, "I earn 80k");
//!
//!     while let Some(event) = events.recv().await {
//!         match event {
//!             TurnEvent::Message { content } => print!("{}", content),
//!             TurnEvent::Completed { .. } => break,
//!             _ => {}
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! FinAssist is organized into focused crates:
//!
//! - **`finassist-store`**: SQLite checkpoint store for per-thread message logs
//! - **`finassist-chat`**: Conversation turn processor and thread directory
//! - **`finassist-llm`**: Provider-agnostic chat client (Gemini)
//!
//! ## License
//!
//! MIT

pub mod prelude;

pub use finassist_chat::{
    ChatConfig, ChatError, ContextSnapshot, ThreadDirectory, TurnConfig, TurnEvent,
    TurnProcessor, DEFAULT_THREAD_NAME, SYSTEM_INSTRUCTION,
};

pub use finassist_llm::{
    ChatClient, ChatOptions, ChatRequest, ChatResponse, ClientFactory, Content, GeminiClient,
    GeminiConfig, Message, StreamEvent, TokenUsage,
};

pub use finassist_store::{
    ChatMessage, CheckpointStore, MessageRole, SqliteCheckpointStore, StoreError,
};
