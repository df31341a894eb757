use finassist_llm::Message;
use finassist_store::CheckpointStore;

use crate::error::Result;
use crate::instruction::SYSTEM_INSTRUCTION;

/// A thread's history as loaded for one model invocation
///
/// The system-preamble presence is computed once here, at the store-loading
/// step, instead of being re-scanned by every consumer.
#[derive(Debug, Clone)]
pub struct ContextSnapshot {
    pub messages: Vec<Message>,
    pub has_system_preamble: bool,
}

impl ContextSnapshot {
    /// Load the full history of a thread
    ///
    /// Fails with `ChatError::ThreadNotFound` if the thread was never
    /// created or has been deleted.
    pub async fn load(store: &dyn CheckpointStore, thread_id: &str) -> Result<Self> {
        let history = store.load(thread_id).await?;

        let messages: Vec<Message> = history.into_iter().map(Into::into).collect();
        let has_system_preamble = messages.iter().any(Message::is_system);

        Ok(Self {
            messages,
            has_system_preamble,
        })
    }

    /// Build the message sequence for one generation call: the fixed system
    /// instruction (exactly once, first), the prior history, then the new
    /// user message.
    pub fn into_model_context(self, user_text: impl Into<String>) -> Vec<Message> {
        let mut context = Vec::with_capacity(self.messages.len() + 2);

        if !self.has_system_preamble {
            context.push(Message::system(SYSTEM_INSTRUCTION));
        }
        context.extend(self.messages);
        context.push(Message::human(user_text.into()));

        context
    }
}
