//! Progress store adapter
//!
//! Maps a user id onto their progress document and exposes the two
//! operations the tracker needs: a live subscription and a one-field write.

use async_trait::async_trait;
use std::sync::Arc;

use super::types::{UserProgress, COMPLETED_FIELD};
use crate::store::{
    DocumentPath, DocumentStore, DocumentSubscription, FieldValue, MergePatch, StoreResult,
};

/// Subscribe/write access to per-user progress documents
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Register a live listener on the user's progress document
    ///
    /// The first item is the current state (empty if the document does not
    /// exist), followed by one item per committed write.
    async fn subscribe(&self, user_id: &str) -> StoreResult<ProgressSubscription>;

    /// Merge `{completed: {objective_id: <server timestamp>}}` into the
    /// user's document without reading it first
    async fn write(&self, user_id: &str, objective_id: &str) -> StoreResult<()>;
}

/// Live stream of decoded progress snapshots
pub struct ProgressSubscription {
    inner: DocumentSubscription,
}

impl ProgressSubscription {
    pub fn new(inner: DocumentSubscription) -> Self {
        Self { inner }
    }

    /// Wait for the next snapshot
    ///
    /// Errors come from the store itself; any document shape decodes.
    pub async fn next(&mut self) -> Option<StoreResult<UserProgress>> {
        let next = self.inner.next().await?;
        Some(next.map(|snapshot| {
            snapshot
                .data
                .as_ref()
                .map(UserProgress::from_document)
                .unwrap_or_default()
        }))
    }

    pub fn path(&self) -> &DocumentPath {
        self.inner.path()
    }
}

/// [`ProgressStore`] over any [`DocumentStore`], namespaced by app id
pub struct DocumentProgressStore<D> {
    db: Arc<D>,
    app_id: String,
}

impl<D: DocumentStore> DocumentProgressStore<D> {
    pub fn new(db: Arc<D>, app_id: impl Into<String>) -> Self {
        Self {
            db,
            app_id: app_id.into(),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn database(&self) -> &Arc<D> {
        &self.db
    }

    /// Path of the user's progress document
    pub fn path_for(&self, user_id: &str) -> StoreResult<DocumentPath> {
        DocumentPath::user_progress(&self.app_id, user_id)
    }

    /// One-shot read of the user's progress
    pub async fn read(&self, user_id: &str) -> StoreResult<UserProgress> {
        let path = self.path_for(user_id)?;
        let snapshot = self.db.get(&path).await?;
        Ok(snapshot
            .data
            .as_ref()
            .map(UserProgress::from_document)
            .unwrap_or_default())
    }
}

/// Patch marking one objective complete at server time
pub fn completion_patch(objective_id: &str) -> MergePatch {
    let mut completed = MergePatch::new();
    completed.insert(objective_id.to_string(), FieldValue::ServerTimestamp);

    let mut patch = MergePatch::new();
    patch.insert(COMPLETED_FIELD.to_string(), FieldValue::Map(completed));
    patch
}

#[async_trait]
impl<D: DocumentStore> ProgressStore for DocumentProgressStore<D> {
    async fn subscribe(&self, user_id: &str) -> StoreResult<ProgressSubscription> {
        let path = self.path_for(user_id)?;
        let inner = self.db.listen(&path).await?;
        tracing::debug!(user_id = %user_id, path = %path, "Subscribed to progress");
        Ok(ProgressSubscription::new(inner))
    }

    async fn write(&self, user_id: &str, objective_id: &str) -> StoreResult<()> {
        let path = self.path_for(user_id)?;
        self.db.set_merge(&path, completion_patch(objective_id)).await?;
        tracing::info!(user_id = %user_id, objective_id = %objective_id, "Objective marked complete");
        Ok(())
    }
}
