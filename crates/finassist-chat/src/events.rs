use serde::{Deserialize, Serialize};

/// Events emitted while a conversation turn executes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    /// Turn accepted; the user message is already persisted at this point
    Started {
        thread_id: String,
        turn_id: String,
        timestamp: i64,
    },

    /// Incremental fragment of the assistant reply
    Message {
        content: String,
    },

    /// Generation finished; the assistant reply is persisted
    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },

    /// Turn failed
    Error {
        message: String,
    },

    /// Turn fully complete
    Completed {
        total_duration_ms: u64,
    },
}
