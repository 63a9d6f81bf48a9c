//! # Document Store
//!
//! A small document database: JSON object documents addressed by
//! [`DocumentPath`], written with merge semantics and observed through live
//! listeners.
//!
//! ## Semantics
//!
//! - `set_merge` creates the document if it does not exist and merges the
//!   patch into it field by field. Nested maps merge recursively, leaf values
//!   overwrite. [`FieldValue::ServerTimestamp`] is resolved by the store at
//!   commit time.
//! - `listen` delivers the current snapshot immediately and again after every
//!   committed write to that path, in commit order.
//!
//! Two backends are provided: [`MemoryDocumentStore`] and
//! [`SqliteDocumentStore`]. [`Database`] selects one at runtime.

mod backend;
mod error;
mod listeners;
mod memory;
mod path;
mod sqlite;

pub use backend::{Database, StorageBackend};
pub use error::{StoreError, StoreResult};
pub use listeners::{DocumentSubscription, ListenerRegistry};
pub use memory::MemoryDocumentStore;
pub use path::DocumentPath;
pub use sqlite::SqliteDocumentStore;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A JSON object document body
pub type Document = Map<String, Value>;

/// A value in a merge-write
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Replaced by the commit time of the write
    ServerTimestamp,
    /// Nested map, merged recursively into the existing value
    Map(MergePatch),
    /// Plain JSON value, overwrites the existing value
    Value(Value),
}

/// Field-level patch applied by `set_merge`
pub type MergePatch = BTreeMap<String, FieldValue>;

/// One delivered state of a document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub path: DocumentPath,
    /// `None` if the document does not exist
    pub data: Option<Document>,
}

impl DocumentSnapshot {
    pub fn exists(&self) -> bool {
        self.data.is_some()
    }
}

/// The document database contract shared by all backends
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the current state of a document
    async fn get(&self, path: &DocumentPath) -> StoreResult<DocumentSnapshot>;

    /// Merge a patch into a document, creating it if needed
    async fn set_merge(&self, path: &DocumentPath, patch: MergePatch) -> StoreResult<()>;

    /// Register a live listener on one document
    async fn listen(&self, path: &DocumentPath) -> StoreResult<DocumentSubscription>;
}

/// Format a server timestamp the way it is stored in documents
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Apply a merge patch to a document, resolving server timestamps to `now`
pub fn apply_merge(target: &mut Document, patch: &MergePatch, now: DateTime<Utc>) {
    for (key, field) in patch {
        match field {
            FieldValue::ServerTimestamp => {
                target.insert(key.clone(), Value::String(format_timestamp(now)));
            }
            FieldValue::Value(value) => {
                target.insert(key.clone(), value.clone());
            }
            FieldValue::Map(nested) => {
                let entry = target
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !entry.is_object() {
                    *entry = Value::Object(Map::new());
                }
                if let Value::Object(map) = entry {
                    apply_merge(map, nested, now);
                }
            }
        }
    }
}
