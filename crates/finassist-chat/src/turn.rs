use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::timeout;

use finassist_llm::{ChatClient, ChatOptions, ChatRequest, StreamEvent};
use finassist_store::{ChatMessage, CheckpointStore};

use crate::config::TurnConfig;
use crate::context::ContextSnapshot;
use crate::error::{ChatError, Result};
use crate::events::TurnEvent;

/// Outcome of consuming a generation stream
enum StreamOutcome {
    /// Full reply text plus the provider's finish reason
    Finished(String, Option<String>),
    /// The event receiver went away mid-stream
    Abandoned,
}

/// Processes one conversation turn: user message in, assistant message out.
///
/// Per turn: load history, ensure the system instruction is present exactly
/// once in the model context, persist the user message, generate, persist the
/// reply. The user message is persisted before generation so a failed turn
/// can be retried without resubmission. Blocking (`run`) and streaming
/// (`spawn_run`) produce the same persisted result.
pub struct TurnProcessor {
    store: Arc<dyn CheckpointStore>,
    client: Arc<dyn ChatClient>,
    config: TurnConfig,
}

impl TurnProcessor {
    pub fn new(
        store: Arc<dyn CheckpointStore>,
        client: Arc<dyn ChatClient>,
        config: TurnConfig,
    ) -> Self {
        Self {
            store,
            client,
            config,
        }
    }

    /// Run one turn to completion, returning the assistant reply text
    pub async fn run(&self, thread_id: &str, user_text: impl Into<String>) -> Result<String> {
        let user_text = user_text.into();

        let snapshot = ContextSnapshot::load(self.store.as_ref(), thread_id).await?;
        self.store
            .append(thread_id, ChatMessage::user(user_text.clone()))
            .await?;

        let request = self.build_request(snapshot, user_text);
        let response = timeout(self.config.generation_timeout, self.client.chat(request))
            .await
            .map_err(|_| ChatError::Timeout(self.config.generation_timeout))?
            .map_err(ChatError::Generation)?;

        let reply = response
            .content
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ChatError::Generation(anyhow!("model returned an empty reply")))?;

        self.store
            .append(thread_id, ChatMessage::assistant(reply.clone()))
            .await?;

        Ok(reply)
    }

    /// Spawn a streaming turn in the background, returning the event receiver
    ///
    /// Fragments arrive as [`TurnEvent::Message`]; the assistant reply is
    /// persisted only after the stream finishes cleanly. Dropping the
    /// receiver cancels the turn: no assistant message is persisted (the user
    /// message already is), never a silently truncated one.
    pub fn spawn_run(&self, thread_id: &str, user_text: impl Into<String>) -> mpsc::Receiver<TurnEvent> {
        let (tx, rx) = mpsc::channel(256);

        let store = Arc::clone(&self.store);
        let client = Arc::clone(&self.client);
        let config = self.config.clone();
        let thread_id = thread_id.to_string();
        let user_text = user_text.into();

        tokio::spawn(async move {
            if let Err(e) =
                Self::execute_streaming(store, client, config, &thread_id, user_text, tx.clone())
                    .await
            {
                tracing::error!(thread_id = %thread_id, error = %e, "Turn failed");
                let _ = tx
                    .send(TurnEvent::Error {
                        message: e.to_string(),
                    })
                    .await;
            }
        });

        rx
    }

    async fn execute_streaming(
        store: Arc<dyn CheckpointStore>,
        client: Arc<dyn ChatClient>,
        config: TurnConfig,
        thread_id: &str,
        user_text: String,
        tx: mpsc::Sender<TurnEvent>,
    ) -> Result<()> {
        let start = Instant::now();

        let snapshot = ContextSnapshot::load(store.as_ref(), thread_id).await?;
        store
            .append(thread_id, ChatMessage::user(user_text.clone()))
            .await?;

        let started = TurnEvent::Started {
            thread_id: thread_id.to_string(),
            turn_id: uuid::Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        if tx.send(started).await.is_err() {
            // Caller went away before generation began; the user message
            // still counts as sent.
            return Ok(());
        }

        let request = ChatRequest::new(
            config.llm.model.clone(),
            snapshot.into_model_context(user_text),
        )
        .with_options(Self::chat_options(&config));

        let outcome = timeout(
            config.generation_timeout,
            Self::consume_stream(client.as_ref(), request, &tx),
        )
        .await
        .map_err(|_| ChatError::Timeout(config.generation_timeout))??;

        let (reply, finish_reason) = match outcome {
            StreamOutcome::Finished(reply, finish_reason) => (reply, finish_reason),
            StreamOutcome::Abandoned => {
                tracing::info!(thread_id = %thread_id, "Turn abandoned mid-stream, reply discarded");
                return Ok(());
            }
        };

        if reply.is_empty() {
            return Err(ChatError::Generation(anyhow!("model returned an empty reply")));
        }

        store
            .append(thread_id, ChatMessage::assistant(reply))
            .await?;

        let _ = tx.send(TurnEvent::Done { finish_reason }).await;
        let _ = tx
            .send(TurnEvent::Completed {
                total_duration_ms: start.elapsed().as_millis() as u64,
            })
            .await;

        Ok(())
    }

    async fn consume_stream(
        client: &dyn ChatClient,
        request: ChatRequest,
        tx: &mpsc::Sender<TurnEvent>,
    ) -> Result<StreamOutcome> {
        let mut stream = client
            .chat_stream(request)
            .await
            .map_err(ChatError::Generation)?;

        let mut reply = String::new();
        let mut finish_reason = None;

        while let Some(event) = stream.next().await {
            match event.map_err(ChatError::Generation)? {
                StreamEvent::Message { content } => {
                    reply.push_str(&content);
                    let fragment = TurnEvent::Message { content };
                    if tx.send(fragment).await.is_err() {
                        return Ok(StreamOutcome::Abandoned);
                    }
                }
                StreamEvent::Done {
                    finish_reason: reason,
                } => {
                    finish_reason = reason;
                    break;
                }
            }
        }

        Ok(StreamOutcome::Finished(reply, finish_reason))
    }

    fn build_request(&self, snapshot: ContextSnapshot, user_text: String) -> ChatRequest {
        ChatRequest::new(
            self.config.llm.model.clone(),
            snapshot.into_model_context(user_text),
        )
        .with_options(Self::chat_options(&self.config))
    }

    fn chat_options(config: &TurnConfig) -> ChatOptions {
        let mut options = ChatOptions::new();
        if let Some(temp) = config.llm.temperature {
            options = options.temperature(temp);
        }
        if let Some(max_tokens) = config.llm.max_output_tokens {
            options = options.max_output_tokens(max_tokens);
        }
        options
    }
}
