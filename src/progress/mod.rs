//! # Progress
//!
//! The per-user progress document and the store adapter that reads, writes
//! and watches it.

mod store;
mod types;

pub use store::{completion_patch, DocumentProgressStore, ProgressStore, ProgressSubscription};
pub use types::{UserProgress, COMPLETED_FIELD};
