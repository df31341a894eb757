use std::collections::HashMap;
use std::sync::Arc;

use finassist_store::{CheckpointStore, MessageRole};

use crate::error::Result;

/// Fallback label for threads with no derivable name. Used consistently for
/// fresh threads and for renames that trim down to nothing.
pub const DEFAULT_THREAD_NAME: &str = "New Chat";

/// Display names are truncated to this many code points
const NAME_MAX_CHARS: usize = 40;

/// Session-scoped view over the store's threads
///
/// Derives listings and display names from persisted data; rename overrides
/// live only for the lifetime of this value and are intentionally not
/// persisted. The store stays the single authority on which threads exist.
pub struct ThreadDirectory {
    store: Arc<dyn CheckpointStore>,
    overrides: HashMap<String, String>,
}

impl ThreadDirectory {
    pub fn new(store: Arc<dyn CheckpointStore>) -> Self {
        Self {
            store,
            overrides: HashMap::new(),
        }
    }

    /// Human-friendly name for a thread
    ///
    /// Precedence: session override, then a label derived from the first
    /// user message, then `DEFAULT_THREAD_NAME`.
    pub async fn display_name(&self, thread_id: &str) -> String {
        if let Some(name) = self.overrides.get(thread_id) {
            return name.clone();
        }

        match self.store.load(thread_id).await {
            Ok(messages) => messages
                .iter()
                .find(|m| m.role == MessageRole::User)
                .map(|m| derive_label(&m.content))
                .unwrap_or_else(|| DEFAULT_THREAD_NAME.to_string()),
            Err(e) => {
                tracing::warn!(thread_id = %thread_id, error = %e, "Could not derive thread name");
                DEFAULT_THREAD_NAME.to_string()
            }
        }
    }

    /// Set a session-lifetime display-name override
    ///
    /// Leading/trailing whitespace is trimmed; a name that trims to empty
    /// falls back to `DEFAULT_THREAD_NAME`.
    pub fn rename(&mut self, thread_id: &str, name: &str) {
        let trimmed = name.trim();
        let name = if trimmed.is_empty() {
            DEFAULT_THREAD_NAME.to_string()
        } else {
            trimmed.to_string()
        };
        self.overrides.insert(thread_id.to_string(), name);
    }

    /// Delete a thread's entire log and drop any override for it
    pub async fn delete(&mut self, thread_id: &str) -> Result<()> {
        self.store.delete(thread_id).await?;
        self.overrides.remove(thread_id);
        Ok(())
    }

    /// All known thread identifiers, most-recently-active first
    ///
    /// Degrades to an empty list when the store is unreadable: "no chats
    /// yet" is always a safe state for a listing. The failure is logged so
    /// outages stay visible.
    pub async fn threads(&self) -> Vec<String> {
        match self.store.list_thread_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(error = %e, "Thread listing unavailable, showing empty list");
                Vec::new()
            }
        }
    }
}

fn derive_label(text: &str) -> String {
    let mut label: String = text.chars().take(NAME_MAX_CHARS).collect();
    if text.chars().count() > NAME_MAX_CHARS {
        label.push_str("...");
    }
    label
}
