mod config;

use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use finassist::prelude::*;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting FinAssist terminal session");

    let store: Arc<SqliteCheckpointStore> = Arc::new(SqliteCheckpointStore::open(&config.database.path)?);
    let client = ClientFactory::create_chat_client(GeminiConfig::new(config.gemini_api_key.clone()))?;

    let turn_config = TurnConfig::new()
        .with_llm(config.llm.clone().into())
        .with_generation_timeout(Duration::from_secs(config.llm.timeout_secs));

    let processor = TurnProcessor::new(store.clone(), client, turn_config);
    let mut directory = ThreadDirectory::new(store.clone());

    println!("FinAssist - Your Personal Finance AI for Bangladesh");
    println!("Commands: /new, /list, /open <id>, /rename <name>, /delete, /quit");
    println!();

    let mut current: Option<String> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match &current {
            Some(tid) => print!("[{}] > ", directory.display_name(tid).await),
            None => print!("> "),
        }
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(' ').map_or((line, ""), |(c, rest)| (c, rest.trim())) {
            ("/quit", _) => break,
            ("/new", _) => {
                let tid = store.create_thread(None).await?;
                println!("Started new chat {}", tid);
                current = Some(tid);
            }
            ("/list", _) => {
                let threads = directory.threads().await;
                if threads.is_empty() {
                    println!("No chats yet. Use /new to start one.");
                }
                for tid in threads {
                    println!("  {}  {}", tid, directory.display_name(&tid).await);
                }
            }
            ("/open", id) if !id.is_empty() => match store.load(id).await {
                Ok(_) => {
                    current = Some(id.to_string());
                    println!("Opened {}", id);
                }
                Err(e) => println!("Could not open chat: {}", e),
            },
            ("/rename", name) => match &current {
                Some(tid) => {
                    directory.rename(tid, name);
                    println!("Renamed to {}", directory.display_name(tid).await);
                }
                None => println!("No chat selected."),
            },
            ("/delete", _) => match current.take() {
                Some(tid) => {
                    directory.delete(&tid).await?;
                    println!("Chat deleted.");
                }
                None => println!("No chat selected."),
            },
            _ => match &current {
                Some(tid) => run_turn(&processor, tid, line).await,
                None => println!("No chat selected. Use /new to start one."),
            },
        }
    }

    Ok(())
}

async fn run_turn(processor: &TurnProcessor, thread_id: &str, user_text: &str) {
    let mut events = processor.spawn_run(thread_id, user_text);

    while let Some(event) = events.recv().await {
        match event {
            TurnEvent::Message { content } => {
                print!("{}", content);
                let _ = std::io::stdout().flush();
            }
            TurnEvent::Done { .. } => println!(),
            TurnEvent::Error { message } => {
                println!();
                println!("Generation failed: {}. Your message was saved, try again.", message);
            }
            TurnEvent::Started { .. } | TurnEvent::Completed { .. } => {}
        }
    }
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
