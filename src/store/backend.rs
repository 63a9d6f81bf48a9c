//! Runtime backend selection

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::error::{StoreError, StoreResult};
use super::listeners::DocumentSubscription;
use super::memory::MemoryDocumentStore;
use super::path::DocumentPath;
use super::sqlite::SqliteDocumentStore;
use super::{DocumentSnapshot, DocumentStore, MergePatch};

/// Which document store to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    Sqlite,
}

impl FromStr for StorageBackend {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "sqlite" => Ok(StorageBackend::Sqlite),
            other => Err(StoreError::Serialization(format!(
                "unknown storage backend: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// The configured document store
pub enum Database {
    Memory(MemoryDocumentStore),
    Sqlite(SqliteDocumentStore),
}

impl Database {
    /// Open the backend named by `backend`; `data_dir` is used by SQLite only
    pub fn open(backend: StorageBackend, data_dir: &Path) -> StoreResult<Self> {
        match backend {
            StorageBackend::Memory => Ok(Database::Memory(MemoryDocumentStore::new())),
            StorageBackend::Sqlite => Ok(Database::Sqlite(SqliteDocumentStore::open(data_dir)?)),
        }
    }

    pub fn backend(&self) -> StorageBackend {
        match self {
            Database::Memory(_) => StorageBackend::Memory,
            Database::Sqlite(_) => StorageBackend::Sqlite,
        }
    }

    /// Cheap liveness check used by the readiness route
    pub fn is_healthy(&self) -> bool {
        match self {
            Database::Memory(store) => store.document_count().is_ok(),
            Database::Sqlite(store) => store.document_count().is_ok(),
        }
    }
}

#[async_trait]
impl DocumentStore for Database {
    async fn get(&self, path: &DocumentPath) -> StoreResult<DocumentSnapshot> {
        match self {
            Database::Memory(store) => store.get(path).await,
            Database::Sqlite(store) => store.get(path).await,
        }
    }

    async fn set_merge(&self, path: &DocumentPath, patch: MergePatch) -> StoreResult<()> {
        match self {
            Database::Memory(store) => store.set_merge(path, patch).await,
            Database::Sqlite(store) => store.set_merge(path, patch).await,
        }
    }

    async fn listen(&self, path: &DocumentPath) -> StoreResult<DocumentSubscription> {
        match self {
            Database::Memory(store) => store.listen(path).await,
            Database::Sqlite(store) => store.listen(path).await,
        }
    }
}
