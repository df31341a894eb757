pub mod types;
pub mod traits;
pub mod streaming;
pub mod config;
pub mod gemini;

pub use traits::{
    ChatClient,
    ChatRequest, ChatResponse, ChatOptions,
    TokenUsage,
};

pub use streaming::StreamEvent;
pub use gemini::GeminiClient;
pub use config::{GeminiConfig, ClientFactory};
pub use types::{Message, Content};
