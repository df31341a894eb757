//! SQLite implementation of CheckpointStore
//!
//! One append-ordered `checkpoints` table holds everything: a `kind = 'init'`
//! row materializes thread creation, `kind = 'message'` rows carry the log.
//! The global autoincrement `seq` doubles as the recency order for listing.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::models::{ChatMessage, MessageRole};
use crate::trait_store::CheckpointStore;

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS checkpoints (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            thread_id TEXT NOT NULL,
            kind TEXT NOT NULL CHECK(kind IN ('init', 'message')),
            role TEXT CHECK(role IN ('system', 'user', 'assistant')),
            content TEXT,
            created_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_checkpoints_thread ON checkpoints(thread_id, seq);
        "#,
    )?;
    Ok(())
}

/// SQLite-backed checkpoint store
///
/// A single connection behind a mutex serializes all writes, which gives the
/// single-writer discipline the append order relies on. The same database
/// file can be opened from multiple short-lived stores.
pub struct SqliteCheckpointStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCheckpointStore {
    /// Open or create a SQLite database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(&path)?;
        Self::from_connection(conn)
    }

    /// Create an in-memory database (useful for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // A poisoned mutex means a panic mid-statement; propagating the
        // panic is the only sound option here.
        self.conn.lock().expect("checkpoint store mutex poisoned")
    }

    fn thread_exists(conn: &Connection, thread_id: &str) -> Result<bool> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM checkpoints WHERE thread_id = ?1 LIMIT 1",
                params![thread_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

#[async_trait]
impl CheckpointStore for SqliteCheckpointStore {
    async fn create_thread(&self, thread_id: Option<String>) -> Result<String> {
        let thread_id = thread_id.unwrap_or_else(|| Uuid::new_v4().to_string());

        let conn = self.lock();
        let tx = conn.unchecked_transaction()?;

        if Self::thread_exists(&tx, &thread_id)? {
            return Err(StoreError::ThreadExists(thread_id));
        }

        tx.execute(
            "INSERT INTO checkpoints (thread_id, kind, created_at) VALUES (?1, 'init', ?2)",
            params![thread_id, Utc::now().timestamp()],
        )?;
        tx.commit()?;

        tracing::debug!(thread_id = %thread_id, "Created thread");
        Ok(thread_id)
    }

    async fn append(&self, thread_id: &str, message: ChatMessage) -> Result<()> {
        let conn = self.lock();
        let tx = conn.unchecked_transaction()?;

        if !Self::thread_exists(&tx, thread_id)? {
            return Err(StoreError::ThreadNotFound(thread_id.to_string()));
        }

        tx.execute(
            "INSERT INTO checkpoints (thread_id, kind, role, content, created_at)
             VALUES (?1, 'message', ?2, ?3, ?4)",
            params![
                thread_id,
                message.role.as_str(),
                message.content,
                Utc::now().timestamp()
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    async fn load(&self, thread_id: &str) -> Result<Vec<ChatMessage>> {
        let conn = self.lock();

        if !Self::thread_exists(&conn, thread_id)? {
            return Err(StoreError::ThreadNotFound(thread_id.to_string()));
        }

        let mut stmt = conn.prepare(
            "SELECT role, content FROM checkpoints
             WHERE thread_id = ?1 AND kind = 'message'
             ORDER BY seq ASC",
        )?;

        let rows = stmt
            .query_map(params![thread_id], |row| {
                let role: String = row.get(0)?;
                let content: String = row.get(1)?;
                Ok((role, content))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(role, content)| {
                let role = MessageRole::from_str(&role).map_err(|reason| StoreError::Corrupt {
                    thread_id: thread_id.to_string(),
                    reason,
                })?;
                Ok(ChatMessage::new(role, content))
            })
            .collect()
    }

    async fn delete(&self, thread_id: &str) -> Result<()> {
        let conn = self.lock();
        let removed = conn.execute(
            "DELETE FROM checkpoints WHERE thread_id = ?1",
            params![thread_id],
        )?;

        if removed > 0 {
            tracing::debug!(thread_id = %thread_id, rows = removed, "Deleted thread");
        }
        Ok(())
    }

    async fn list_thread_ids(&self) -> Result<Vec<String>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT thread_id FROM checkpoints
             GROUP BY thread_id
             ORDER BY MAX(seq) DESC",
        )?;

        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }
}
