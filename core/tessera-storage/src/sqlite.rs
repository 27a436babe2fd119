//! SQLite-backed [`RecordStore`].
//!
//! Records are stored whole as JSON text, one row per content type and one
//! row per item. Blocking SQLite calls run on tokio's blocking pool.

use crate::{RecordStore, StorageError, StorageResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tessera_model::{ContentType, Item};
use tessera_types::{ContentTypeId, ItemId};
use tracing::debug;

/// Persistent record store backed by SQLite.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS content_types (
                id TEXT PRIMARY KEY,
                data TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS items (
                content_type TEXT NOT NULL,
                id TEXT NOT NULL,
                data TEXT NOT NULL,
                PRIMARY KEY (content_type, id)
            );
            ",
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs `f` against the connection on the blocking pool.
    async fn run<T, F>(&self, f: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StorageResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StorageError::Task("connection mutex poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn find_content_type(&self, id: &ContentTypeId) -> StorageResult<ContentType> {
        let key = id.to_string();
        self.run(move |conn| {
            let data: Option<String> = conn
                .query_row(
                    "SELECT data FROM content_types WHERE id = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            let data = data.ok_or_else(|| StorageError::NotFound(format!("content type {key}")))?;
            Ok(serde_json::from_str(&data)?)
        })
        .await
    }

    async fn save_content_type(&self, content_type: &ContentType) -> StorageResult<()> {
        let key = content_type.id.to_string();
        let data = serde_json::to_string(content_type)?;
        debug!("Saving content type {} ({} fields)", key, content_type.fields.len());
        self.run(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO content_types (id, data) VALUES (?1, ?2)",
                params![key, data],
            )?;
            Ok(())
        })
        .await
    }

    async fn find_item(&self, content_type: &ContentTypeId, id: &ItemId) -> StorageResult<Item> {
        let ct = content_type.to_string();
        let key = id.to_string();
        self.run(move |conn| {
            let data: Option<String> = conn
                .query_row(
                    "SELECT data FROM items WHERE content_type = ?1 AND id = ?2",
                    params![ct, key],
                    |row| row.get(0),
                )
                .optional()?;
            let data = data.ok_or_else(|| StorageError::NotFound(format!("item {ct} {key}")))?;
            let item: Item = serde_json::from_str(&data)?;
            if item.content_type.as_str() != ct || item.id.as_str() != key {
                return Err(StorageError::InvalidData(format!(
                    "row {ct} {key} holds item {}",
                    item.item_ref()
                )));
            }
            Ok(item)
        })
        .await
    }

    async fn save_item(&self, item: &Item) -> StorageResult<()> {
        let ct = item.content_type.to_string();
        let key = item.id.to_string();
        let data = serde_json::to_string(item)?;
        debug!("Saving item {} {}", ct, key);
        self.run(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO items (content_type, id, data) VALUES (?1, ?2, ?3)",
                params![ct, key, data],
            )?;
            Ok(())
        })
        .await
    }
}
