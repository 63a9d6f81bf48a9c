//! SQLite-backed document store
//!
//! One row per document, body stored as JSON text. Merges run inside a
//! transaction and listeners are notified after commit, while the connection
//! lock is still held.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::Mutex;

use super::error::{StoreError, StoreResult};
use super::listeners::{DocumentSubscription, ListenerRegistry};
use super::path::DocumentPath;
use super::{apply_merge, Document, DocumentSnapshot, DocumentStore, MergePatch};

/// File name of the database inside the data directory
const DB_FILE: &str = "documents.db";

struct SqliteInner {
    conn: Connection,
    listeners: ListenerRegistry,
}

/// Durable document store backed by a single SQLite file
pub struct SqliteDocumentStore {
    inner: Mutex<SqliteInner>,
}

impl SqliteDocumentStore {
    /// Create or open the store inside `data_dir`
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(DB_FILE);

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        tracing::info!(path = ?path, "Opened document store");
        Self::with_connection(conn)
    }

    /// Create a store that lives only in memory (tests)
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                path TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                update_time INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            inner: Mutex::new(SqliteInner {
                conn,
                listeners: ListenerRegistry::new(),
            }),
        })
    }

    /// Number of stored documents
    pub fn document_count(&self) -> StoreResult<usize> {
        let inner = self.inner.lock()?;
        let count: i64 = inner
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn read_document(conn: &Connection, path: &DocumentPath) -> StoreResult<Option<Document>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT data FROM documents WHERE path = ?",
            params![path.as_str()],
            |row| row.get(0),
        )
        .optional()?;

    match raw {
        None => Ok(None),
        Some(text) => match serde_json::from_str::<Value>(&text)? {
            Value::Object(map) => Ok(Some(map)),
            other => Err(StoreError::InvalidDocument {
                path: path.to_string(),
                reason: format!("expected an object, found {}", json_kind(&other)),
            }),
        },
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn get(&self, path: &DocumentPath) -> StoreResult<DocumentSnapshot> {
        let inner = self.inner.lock()?;
        Ok(DocumentSnapshot {
            path: path.clone(),
            data: read_document(&inner.conn, path)?,
        })
    }

    async fn set_merge(&self, path: &DocumentPath, patch: MergePatch) -> StoreResult<()> {
        let mut guard = self.inner.lock()?;
        let inner = &mut *guard;
        let now = Utc::now();

        let tx = inner.conn.transaction()?;
        let mut document = match read_document(&tx, path) {
            Ok(document) => document.unwrap_or_default(),
            Err(StoreError::InvalidDocument { path: at, reason }) => {
                inner.listeners.notify_error(path, || StoreError::InvalidDocument {
                    path: at.clone(),
                    reason: reason.clone(),
                });
                return Err(StoreError::InvalidDocument { path: at, reason });
            }
            Err(e) => return Err(e),
        };
        apply_merge(&mut document, &patch, now);

        let text = serde_json::to_string(&document)?;
        tx.execute(
            "INSERT INTO documents (path, data, update_time) VALUES (?1, ?2, ?3)
             ON CONFLICT(path) DO UPDATE SET data = excluded.data, update_time = excluded.update_time",
            params![path.as_str(), text, now.timestamp_millis()],
        )?;
        tx.commit()?;

        let snapshot = DocumentSnapshot {
            path: path.clone(),
            data: Some(document),
        };
        let delivered = inner.listeners.notify(&snapshot);

        tracing::debug!(path = %path, fields = patch.len(), listeners = delivered, "Document merged");
        Ok(())
    }

    async fn listen(&self, path: &DocumentPath) -> StoreResult<DocumentSubscription> {
        let mut guard = self.inner.lock()?;
        let inner = &mut *guard;
        let initial = DocumentSnapshot {
            path: path.clone(),
            data: read_document(&inner.conn, path)?,
        };
        Ok(inner.listeners.add(initial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FieldValue;
    use serde_json::json;
    use tempfile::tempdir;

    fn completed_patch(id: &str) -> MergePatch {
        let mut inner = MergePatch::new();
        inner.insert(id.to_string(), FieldValue::ServerTimestamp);
        let mut patch = MergePatch::new();
        patch.insert("completed".to_string(), FieldValue::Map(inner));
        patch
    }

    #[tokio::test]
    async fn test_documents_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = DocumentPath::user_progress("app", "u1").unwrap();

        {
            let store = SqliteDocumentStore::open(dir.path()).unwrap();
            store.set_merge(&path, completed_patch("goal_listen")).await.unwrap();
            assert_eq!(store.document_count().unwrap(), 1);
        }

        let store = SqliteDocumentStore::open(dir.path()).unwrap();
        let data = store.get(&path).await.unwrap().data.unwrap();
        assert!(data["completed"]["goal_listen"].is_string());
    }

    #[tokio::test]
    async fn test_merge_keeps_existing_fields() {
        let store = SqliteDocumentStore::open_in_memory().unwrap();
        let path = DocumentPath::parse("users/u1").unwrap();

        store.set_merge(&path, completed_patch("a")).await.unwrap();
        let first = store.get(&path).await.unwrap().data.unwrap();
        store.set_merge(&path, completed_patch("b")).await.unwrap();
        let second = store.get(&path).await.unwrap().data.unwrap();

        assert_eq!(first["completed"]["a"], second["completed"]["a"]);
        assert!(second["completed"]["b"].is_string());
    }

    #[tokio::test]
    async fn test_listener_receives_commits() {
        let store = SqliteDocumentStore::open_in_memory().unwrap();
        let path = DocumentPath::parse("users/u1").unwrap();

        let mut sub = store.listen(&path).await.unwrap();
        assert!(!sub.next().await.unwrap().unwrap().exists());

        store.set_merge(&path, completed_patch("a")).await.unwrap();
        let snapshot = sub.next().await.unwrap().unwrap();
        assert!(snapshot.data.unwrap()["completed"]["a"].is_string());
    }

    #[tokio::test]
    async fn test_non_object_document_is_rejected() {
        let store = SqliteDocumentStore::open_in_memory().unwrap();
        let path = DocumentPath::parse("users/u1").unwrap();

        {
            let inner = store.inner.lock().unwrap();
            inner
                .conn
                .execute(
                    "INSERT INTO documents (path, data, update_time) VALUES (?1, ?2, 0)",
                    params![path.as_str(), json!([1, 2]).to_string()],
                )
                .unwrap();
        }

        let err = store.get(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidDocument { .. }));
    }

    #[tokio::test]
    async fn test_corrupt_document_ends_listeners() {
        let store = SqliteDocumentStore::open_in_memory().unwrap();
        let path = DocumentPath::parse("users/u1").unwrap();
        let mut sub = store.listen(&path).await.unwrap();
        sub.next().await.unwrap().unwrap();

        {
            let inner = store.inner.lock().unwrap();
            inner
                .conn
                .execute(
                    "INSERT INTO documents (path, data, update_time) VALUES (?1, ?2, 0)",
                    params![path.as_str(), "\"text\""],
                )
                .unwrap();
        }

        let err = store.set_merge(&path, completed_patch("a")).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidDocument { .. }));
        assert!(matches!(
            sub.next().await,
            Some(Err(StoreError::InvalidDocument { .. }))
        ));
        assert!(sub.next().await.is_none());
    }
}
