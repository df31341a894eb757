pub mod config;
pub mod context;
pub mod directory;
pub mod error;
pub mod events;
pub mod instruction;
pub mod turn;

pub use config::{ChatConfig, TurnConfig};
pub use context::ContextSnapshot;
pub use directory::{ThreadDirectory, DEFAULT_THREAD_NAME};
pub use error::ChatError;
pub use events::TurnEvent;
pub use instruction::SYSTEM_INSTRUCTION;
pub use turn::TurnProcessor;
