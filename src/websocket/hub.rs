//! Page Hub
//!
//! Tracks every open goal page and the user it belongs to. Snapshots do not
//! flow through the hub; each page has its own store subscription, the hub
//! only owns the outgoing channel and enforces the page limit.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::messages::ServerMessage;

/// Identifier handed to the client in the `connected` message
pub type PageId = String;

#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Open pages allowed across all users
    pub max_pages: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self { max_pages: 1000 }
    }
}

struct PageEntry {
    user_id: String,
    opened_at: DateTime<Utc>,
    outbox: mpsc::UnboundedSender<ServerMessage>,
}

/// Registry of open goal pages
pub struct PageHub {
    pages: RwLock<HashMap<PageId, PageEntry>>,
    config: HubConfig,
}

impl PageHub {
    pub fn new(config: HubConfig) -> Self {
        Self {
            pages: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Open a page for `user_id`, or refuse when the hub is full
    pub async fn open(
        &self,
        user_id: &str,
        outbox: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<PageId, HubError> {
        let mut pages = self.pages.write().await;
        if pages.len() >= self.config.max_pages {
            return Err(HubError::PageLimitReached(self.config.max_pages));
        }

        let page_id = Uuid::new_v4().to_string();
        pages.insert(
            page_id.clone(),
            PageEntry {
                user_id: user_id.to_string(),
                opened_at: Utc::now(),
                outbox,
            },
        );

        tracing::info!(page_id = %page_id, user_id = %user_id, open_pages = pages.len(), "Goal page opened");
        Ok(page_id)
    }

    /// Close a page; dropping its outbox ends the writer task
    pub async fn close(&self, page_id: &str) {
        let removed = self.pages.write().await.remove(page_id);
        if let Some(entry) = removed {
            let open_for = Utc::now() - entry.opened_at;
            tracing::info!(
                page_id = %page_id,
                user_id = %entry.user_id,
                open_secs = open_for.num_seconds(),
                "Goal page closed"
            );
        }
    }

    /// Queue a message for one page
    pub async fn send(&self, page_id: &str, message: ServerMessage) -> Result<(), HubError> {
        let pages = self.pages.read().await;
        let entry = pages.get(page_id).ok_or(HubError::PageClosed)?;
        entry.outbox.send(message).map_err(|_| HubError::PageClosed)
    }

    pub async fn page_count(&self) -> usize {
        self.pages.read().await.len()
    }
}

#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many open goal pages (limit: {0})")]
    PageLimitReached(usize),

    #[error("Goal page is closed")]
    PageClosed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_and_close() {
        let hub = PageHub::new(HubConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();

        let page = hub.open("alice", tx).await.unwrap();
        assert_eq!(hub.page_count().await, 1);

        hub.close(&page).await;
        assert_eq!(hub.page_count().await, 0);
    }

    #[tokio::test]
    async fn test_page_limit() {
        let hub = PageHub::new(HubConfig { max_pages: 1 });
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        hub.open("alice", tx1).await.unwrap();
        let refused = hub.open("alice", tx2).await;
        assert!(matches!(refused, Err(HubError::PageLimitReached(1))));
    }

    #[tokio::test]
    async fn test_send_reaches_only_that_page() {
        let hub = PageHub::new(HubConfig::default());
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let a = hub.open("alice", tx_a).await.unwrap();
        hub.open("alice", tx_b).await.unwrap();

        hub.send(&a, ServerMessage::Pong).await.unwrap();
        assert!(matches!(rx_a.recv().await, Some(ServerMessage::Pong)));
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_send_after_close() {
        let hub = PageHub::new(HubConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();
        let page = hub.open("alice", tx).await.unwrap();
        hub.close(&page).await;

        assert!(matches!(
            hub.send(&page, ServerMessage::Pong).await,
            Err(HubError::PageClosed)
        ));
    }
}
