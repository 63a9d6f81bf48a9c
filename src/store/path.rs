//! Document Paths
//!
//! A document lives at a slash-separated path of alternating collection and
//! document segments, e.g. `artifacts/my-app/users/u1/progress/userProgress`.

use serde::Serialize;
use std::fmt;

use super::error::{StoreError, StoreResult};

/// Collection holding the per-user progress document
const PROGRESS_COLLECTION: &str = "progress";

/// Document id of the per-user progress document
const PROGRESS_DOCUMENT: &str = "userProgress";

/// Validated path to a single document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DocumentPath(String);

impl DocumentPath {
    /// Build a path from its segments
    ///
    /// Segments must be non-empty, must not contain `/`, and there must be an
    /// even number of them (a document, not a collection).
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> StoreResult<Self> {
        if segments.is_empty() || segments.len() % 2 != 0 {
            let joined: Vec<&str> = segments.iter().map(|s| s.as_ref()).collect();
            return Err(StoreError::InvalidPath(joined.join("/")));
        }

        for segment in segments {
            let segment = segment.as_ref();
            if segment.is_empty() || segment.contains('/') {
                let joined: Vec<&str> = segments.iter().map(|s| s.as_ref()).collect();
                return Err(StoreError::InvalidPath(joined.join("/")));
            }
        }

        let joined: Vec<&str> = segments.iter().map(|s| s.as_ref()).collect();
        Ok(Self(joined.join("/")))
    }

    /// Parse a path string such as `a/b/c/d`
    pub fn parse(path: &str) -> StoreResult<Self> {
        let segments: Vec<&str> = path.split('/').collect();
        Self::from_segments(&segments)
    }

    /// `artifacts/{app_id}/users/{user_id}/progress/userProgress`
    pub fn user_progress(app_id: &str, user_id: &str) -> StoreResult<Self> {
        Self::from_segments(&[
            "artifacts",
            app_id,
            "users",
            user_id,
            PROGRESS_COLLECTION,
            PROGRESS_DOCUMENT,
        ])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
