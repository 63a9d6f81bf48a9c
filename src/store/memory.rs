//! In-memory document store
//!
//! Documents live only for the lifetime of the process. Used for tests and for
//! `storage.backend = "memory"`.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

use super::error::StoreResult;
use super::listeners::{DocumentSubscription, ListenerRegistry};
use super::path::DocumentPath;
use super::{apply_merge, Document, DocumentSnapshot, DocumentStore, MergePatch};

#[derive(Default)]
struct MemoryInner {
    documents: HashMap<DocumentPath, Document>,
    listeners: ListenerRegistry,
}

impl MemoryInner {
    fn snapshot(&self, path: &DocumentPath) -> DocumentSnapshot {
        DocumentSnapshot {
            path: path.clone(),
            data: self.documents.get(path).cloned(),
        }
    }
}

/// Process-local document store
#[derive(Default)]
pub struct MemoryDocumentStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    pub fn document_count(&self) -> StoreResult<usize> {
        Ok(self.inner.lock()?.documents.len())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, path: &DocumentPath) -> StoreResult<DocumentSnapshot> {
        Ok(self.inner.lock()?.snapshot(path))
    }

    async fn set_merge(&self, path: &DocumentPath, patch: MergePatch) -> StoreResult<()> {
        let mut inner = self.inner.lock()?;

        let document = inner.documents.entry(path.clone()).or_default();
        apply_merge(document, &patch, Utc::now());

        let snapshot = inner.snapshot(path);
        let delivered = inner.listeners.notify(&snapshot);

        tracing::debug!(path = %path, fields = patch.len(), listeners = delivered, "Document merged");
        Ok(())
    }

    async fn listen(&self, path: &DocumentPath) -> StoreResult<DocumentSubscription> {
        let mut inner = self.inner.lock()?;
        let initial = inner.snapshot(path);
        Ok(inner.listeners.add(initial))
    }
}
