//! Live document listeners
//!
//! Each listener owns an unbounded channel. Stores call [`ListenerRegistry::notify`]
//! while holding their write lock, so listeners observe commits in order.

use std::collections::HashMap;
use tokio::sync::mpsc;

use super::error::{StoreError, StoreResult};
use super::path::DocumentPath;
use super::DocumentSnapshot;

type SnapshotSender = mpsc::UnboundedSender<StoreResult<DocumentSnapshot>>;

/// Listeners grouped by the document they watch
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: HashMap<DocumentPath, Vec<SnapshotSender>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener and deliver `initial` to it immediately
    pub fn add(&mut self, initial: DocumentSnapshot) -> DocumentSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let path = initial.path.clone();

        // The receiver is alive, this cannot fail
        let _ = tx.send(Ok(initial));

        self.listeners.entry(path.clone()).or_default().push(tx);
        tracing::debug!(path = %path, "Listener registered");

        DocumentSubscription { path, rx }
    }

    /// Deliver a snapshot to every live listener of its path
    ///
    /// Listeners whose subscription was dropped are removed.
    pub fn notify(&mut self, snapshot: &DocumentSnapshot) -> usize {
        let Some(senders) = self.listeners.get_mut(&snapshot.path) else {
            return 0;
        };

        senders.retain(|tx| tx.send(Ok(snapshot.clone())).is_ok());
        let delivered = senders.len();

        if senders.is_empty() {
            self.listeners.remove(&snapshot.path);
        }

        tracing::trace!(path = %snapshot.path, listeners = delivered, "Snapshot delivered");
        delivered
    }

    /// Deliver a store failure to every listener of `path` and drop them
    ///
    /// An error ends a subscription; its receiver yields `None` afterwards.
    pub fn notify_error<F>(&mut self, path: &DocumentPath, error: F) -> usize
    where
        F: Fn() -> StoreError,
    {
        let Some(senders) = self.listeners.remove(path) else {
            return 0;
        };

        let delivered = senders.iter().filter(|tx| tx.send(Err(error())).is_ok()).count();
        tracing::warn!(path = %path, listeners = delivered, "Listeners closed by store error");
        delivered
    }
}

/// Receiving end of a live listener
///
/// The listener stays registered until this value is dropped.
pub struct DocumentSubscription {
    path: DocumentPath,
    rx: mpsc::UnboundedReceiver<StoreResult<DocumentSnapshot>>,
}

impl DocumentSubscription {
    /// Wait for the next snapshot
    ///
    /// Returns `None` once the store has gone away.
    pub async fn next(&mut self) -> Option<StoreResult<DocumentSnapshot>> {
        self.rx.recv().await
    }

    pub fn path(&self) -> &DocumentPath {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_snapshot(path: &DocumentPath) -> DocumentSnapshot {
        DocumentSnapshot {
            path: path.clone(),
            data: None,
        }
    }

    #[tokio::test]
    async fn test_initial_snapshot_is_delivered() {
        let path = DocumentPath::parse("users/u1").unwrap();
        let mut registry = ListenerRegistry::new();

        let mut sub = registry.add(empty_snapshot(&path));
        let first = sub.next().await.unwrap().unwrap();

        assert!(!first.exists());
        assert_eq!(sub.path(), &path);
    }

    #[tokio::test]
    async fn test_dropped_listeners_are_pruned() {
        let path = DocumentPath::parse("users/u1").unwrap();
        let mut registry = ListenerRegistry::new();

        let sub1 = registry.add(empty_snapshot(&path));
        let mut sub2 = registry.add(empty_snapshot(&path));
        assert_eq!(registry.notify(&empty_snapshot(&path)), 2);

        drop(sub1);
        assert_eq!(registry.notify(&empty_snapshot(&path)), 1);

        // initial + two notifications
        for _ in 0..3 {
            assert!(sub2.next().await.is_some());
        }
    }

    #[tokio::test]
    async fn test_error_ends_subscription() {
        let path = DocumentPath::parse("users/u1").unwrap();
        let mut registry = ListenerRegistry::new();

        let mut sub = registry.add(empty_snapshot(&path));
        sub.next().await.unwrap().unwrap();

        let delivered = registry.notify_error(&path, || StoreError::Lock("gone".to_string()));
        assert_eq!(delivered, 1);

        assert!(matches!(sub.next().await, Some(Err(StoreError::Lock(_)))));
        assert!(sub.next().await.is_none());
        assert_eq!(registry.notify(&empty_snapshot(&path)), 0);
    }

    #[test]
    fn test_notify_without_listeners() {
        let path = DocumentPath::parse("users/u1").unwrap();
        let mut registry = ListenerRegistry::new();
        assert_eq!(registry.notify(&empty_snapshot(&path)), 0);
    }
}
