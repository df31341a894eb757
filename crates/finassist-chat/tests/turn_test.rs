use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use futures::{Stream, StreamExt};

use finassist_chat::{ChatError, TurnConfig, TurnEvent, TurnProcessor};
use finassist_llm::{ChatClient, ChatRequest, ChatResponse, Message, StreamEvent};
use finassist_store::{CheckpointStore, MessageRole, SqliteCheckpointStore};

/// Chat client returning a fixed reply, capturing every request it sees
struct ScriptedClient {
    reply: String,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedClient {
    fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn last_request_messages(&self) -> Vec<Message> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .expect("no request captured")
            .messages
            .clone()
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().unwrap().push(request);
        Ok(ChatResponse {
            content: Some(self.reply.clone()),
            usage: None,
            finish_reason: Some("STOP".to_string()),
            raw: serde_json::Value::Null,
        })
    }

    async fn chat_stream(
        &self,
        request: ChatRequest,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>> {
        self.requests.lock().unwrap().push(request);

        // Stream the reply in small fragments, then a Done marker.
        let mut events: Vec<Result<StreamEvent>> = self
            .reply
            .as_bytes()
            .chunks(4)
            .map(|chunk| {
                Ok(StreamEvent::Message {
                    content: String::from_utf8(chunk.to_vec()).unwrap(),
                })
            })
            .collect();
        events.push(Ok(StreamEvent::Done {
            finish_reason: Some("STOP".to_string()),
        }));

        Ok(Box::pin(futures::stream::iter(events)))
    }
}

/// Chat client pacing its fragments so a consumer can walk away mid-stream
struct PacedClient {
    fragments: Vec<String>,
}

#[async_trait]
impl ChatClient for PacedClient {
    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
        anyhow::bail!("blocking path not used")
    }

    async fn chat_stream(
        &self,
        _request: ChatRequest,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>> {
        let mut events: Vec<Result<StreamEvent>> = self
            .fragments
            .iter()
            .map(|f| Ok(StreamEvent::Message { content: f.clone() }))
            .collect();
        events.push(Ok(StreamEvent::Done {
            finish_reason: Some("STOP".to_string()),
        }));

        let paced = futures::stream::iter(events).then(|event| async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            event
        });
        Ok(Box::pin(paced))
    }
}

/// Chat client that always fails
struct FailingClient;

#[async_trait]
impl ChatClient for FailingClient {
    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
        anyhow::bail!("quota exceeded")
    }

    async fn chat_stream(
        &self,
        _request: ChatRequest,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>> {
        anyhow::bail!("quota exceeded")
    }
}

/// Chat client that never answers within a reasonable time
struct StalledClient;

#[async_trait]
impl ChatClient for StalledClient {
    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        anyhow::bail!("unreachable")
    }

    async fn chat_stream(
        &self,
        _request: ChatRequest,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        anyhow::bail!("unreachable")
    }
}

fn processor_with(
    client: Arc<dyn ChatClient>,
) -> (TurnProcessor, Arc<SqliteCheckpointStore>) {
    let store = Arc::new(SqliteCheckpointStore::in_memory().unwrap());
    let processor = TurnProcessor::new(store.clone(), client, TurnConfig::default());
    (processor, store)
}

#[tokio::test]
async fn test_turn_persists_user_then_assistant() {
    let client = Arc::new(ScriptedClient::new("With 80k salary you can save 15-20k."));
    let (processor, store) = processor_with(client);

    let tid = store.create_thread(None).await.unwrap();
    let reply = processor.run(&tid, "I earn 80k").await.unwrap();

    assert_eq!(reply, "With 80k salary you can save 15-20k.");

    let messages = store.load(&tid).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[0].content, "I earn 80k");
    assert_eq!(messages[1].role, MessageRole::Assistant);
    assert_eq!(messages[1].content, "With 80k salary you can save 15-20k.");
}

#[tokio::test]
async fn test_system_instruction_injected_once_and_never_persisted() {
    let client = Arc::new(ScriptedClient::new("Got it!"));
    let (processor, store) = processor_with(client.clone());

    let tid = store.create_thread(None).await.unwrap();
    processor.run(&tid, "Hi, I'm Rahim").await.unwrap();
    processor.run(&tid, "I earn 80k").await.unwrap();

    // Persisted history never contains a system message, however many turns run.
    let messages = store.load(&tid).await.unwrap();
    assert_eq!(messages.len(), 4);
    assert!(messages.iter().all(|m| m.role != MessageRole::System));

    // Every model invocation still saw exactly one system message, first.
    let context = client.last_request_messages();
    assert_eq!(context.iter().filter(|m| m.is_system()).count(), 1);
    assert!(context[0].is_system());
    assert_eq!(context.len(), 4); // system + 2 prior + new user message
}

#[tokio::test]
async fn test_stored_system_message_is_not_duplicated() {
    let client = Arc::new(ScriptedClient::new("Sure."));
    let (processor, store) = processor_with(client.clone());

    let tid = store.create_thread(None).await.unwrap();
    store
        .append(&tid, finassist_store::ChatMessage::system("custom preamble"))
        .await
        .unwrap();

    processor.run(&tid, "Hello").await.unwrap();

    let context = client.last_request_messages();
    assert_eq!(context.iter().filter(|m| m.is_system()).count(), 1);
    assert!(context[0].is_system());
}

#[tokio::test]
async fn test_failed_generation_keeps_user_message() {
    let (processor, store) = processor_with(Arc::new(FailingClient));

    let tid = store.create_thread(None).await.unwrap();
    let err = processor.run(&tid, "I earn 80k").await.unwrap_err();

    assert!(matches!(err, ChatError::Generation(_)));

    // The user message survives, so the turn can be retried without
    // resubmission.
    let messages = store.load(&tid).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, MessageRole::User);
}

#[tokio::test]
async fn test_unknown_thread_is_not_found() {
    let client = Arc::new(ScriptedClient::new("hi"));
    let (processor, store) = processor_with(client);

    let err = processor.run("no-such-thread", "hello").await.unwrap_err();
    assert!(matches!(err, ChatError::ThreadNotFound(_)));

    // Nothing was created as a side effect.
    assert!(store.list_thread_ids().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_generation_timeout() {
    let store: Arc<SqliteCheckpointStore> = Arc::new(SqliteCheckpointStore::in_memory().unwrap());
    let config = TurnConfig::default().with_generation_timeout(Duration::from_millis(50));
    let processor = TurnProcessor::new(store.clone(), Arc::new(StalledClient), config);

    let tid = store.create_thread(None).await.unwrap();
    let err = processor.run(&tid, "hello").await.unwrap_err();

    assert!(matches!(err, ChatError::Timeout(_)));

    let messages = store.load(&tid).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, MessageRole::User);
}

#[tokio::test]
async fn test_streaming_turn_matches_blocking_result() {
    let reply = "Nice to meet you, Rahim! How can I help with your money today?";
    let client = Arc::new(ScriptedClient::new(reply));
    let (processor, store) = processor_with(client);

    let tid = store.create_thread(None).await.unwrap();
    let mut rx = processor.spawn_run(&tid, "Hi, I'm Rahim");

    let mut streamed = String::new();
    let mut saw_started = false;
    let mut saw_done = false;

    while let Some(event) = rx.recv().await {
        match event {
            TurnEvent::Started { thread_id, .. } => {
                assert_eq!(thread_id, tid);
                saw_started = true;
            }
            TurnEvent::Message { content } => streamed.push_str(&content),
            TurnEvent::Done { finish_reason } => {
                assert_eq!(finish_reason.as_deref(), Some("STOP"));
                saw_done = true;
            }
            TurnEvent::Completed { .. } => break,
            TurnEvent::Error { message } => panic!("unexpected error: {message}"),
        }
    }

    assert!(saw_started && saw_done);
    assert_eq!(streamed, reply);

    // Streaming persists the same final result as the blocking path.
    let messages = store.load(&tid).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content, reply);
}

#[tokio::test]
async fn test_streaming_error_is_surfaced_and_reply_not_persisted() {
    let (processor, store) = processor_with(Arc::new(FailingClient));

    let tid = store.create_thread(None).await.unwrap();
    let mut rx = processor.spawn_run(&tid, "hello");

    let mut saw_error = false;
    while let Some(event) = rx.recv().await {
        if let TurnEvent::Error { .. } = event {
            saw_error = true;
        }
    }
    assert!(saw_error);

    let messages = store.load(&tid).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, MessageRole::User);
}

#[tokio::test]
async fn test_dropped_receiver_discards_reply() {
    let client = Arc::new(PacedClient {
        fragments: vec![
            "With 80k ".to_string(),
            "salary you ".to_string(),
            "can save 15-20k.".to_string(),
        ],
    });
    let (processor, store) = processor_with(client);

    let tid = store.create_thread(None).await.unwrap();
    let mut rx = processor.spawn_run(&tid, "I earn 80k");

    // Walk away after the first fragment.
    loop {
        match rx.recv().await.expect("stream ended before first fragment") {
            TurnEvent::Message { .. } => break,
            TurnEvent::Error { message } => panic!("unexpected error: {message}"),
            _ => continue,
        }
    }
    drop(rx);

    // Let the background task notice the dropped receiver and settle.
    tokio::time::sleep(Duration::from_millis(200)).await;

    // The user message stays; no partial assistant reply is persisted.
    let messages = store.load(&tid).await.unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, MessageRole::User);
}

#[tokio::test]
async fn test_off_topic_input_is_recorded_verbatim() {
    let refusal = "Sorry! I only know about money and finance.";
    let client = Arc::new(ScriptedClient::new(refusal));
    let (processor, store) = processor_with(client);

    let tid = store.create_thread(None).await.unwrap();
    processor
        .run(&tid, "who wins the cricket world cup?")
        .await
        .unwrap();

    // Persistence never filters on content: the off-topic question is stored
    // exactly as submitted, alongside the refusal.
    let messages = store.load(&tid).await.unwrap();
    assert_eq!(messages[0].content, "who wins the cricket world cup?");
    assert_eq!(messages[1].content, refusal);
}

#[tokio::test]
async fn test_empty_reply_is_a_generation_error() {
    let client = Arc::new(ScriptedClient::new(""));
    let (processor, store) = processor_with(client);

    let tid = store.create_thread(None).await.unwrap();
    let err = processor.run(&tid, "hello").await.unwrap_err();

    assert!(matches!(err, ChatError::Generation(_)));
    assert_eq!(store.load(&tid).await.unwrap().len(), 1);
}
