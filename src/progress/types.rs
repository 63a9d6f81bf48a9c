//! Progress document types

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::objectives::OBJECTIVES;
use crate::store::Document;

/// Field of the progress document holding the completion map
pub const COMPLETED_FIELD: &str = "completed";

/// Per-user record of which objectives are completed and when
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserProgress {
    /// Objective id → completion time, when the stored value is a timestamp
    pub completed: BTreeMap<String, Option<DateTime<Utc>>>,
}

impl UserProgress {
    /// The state used when the document does not exist yet
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read a stored document without validating its shape
    ///
    /// A missing, null or non-map `completed` field reads as nothing
    /// completed. Every entry other than `null` or `false` counts as
    /// completed; its time is kept when it parses as one.
    pub fn from_document(document: &Document) -> Self {
        let Some(Value::Object(entries)) = document.get(COMPLETED_FIELD) else {
            return Self::empty();
        };

        let completed = entries
            .iter()
            .filter(|(_, value)| !matches!(value, Value::Null | Value::Bool(false)))
            .map(|(id, value)| (id.clone(), parse_timestamp(value)))
            .collect();

        Self { completed }
    }

    /// Builder used when constructing known states
    pub fn with_completed(mut self, objective_id: &str, at: DateTime<Utc>) -> Self {
        self.completed.insert(objective_id.to_string(), Some(at));
        self
    }

    pub fn is_completed(&self, objective_id: &str) -> bool {
        self.completed.contains_key(objective_id)
    }

    pub fn completed_at(&self, objective_id: &str) -> Option<DateTime<Utc>> {
        self.completed.get(objective_id).copied().flatten()
    }

    /// Number of catalog objectives marked complete
    ///
    /// Keys that are not in the catalog are not counted.
    pub fn completed_count(&self) -> usize {
        OBJECTIVES
            .iter()
            .filter(|o| self.is_completed(o.id))
            .count()
    }
}

/// RFC 3339 strings and `{seconds, nanoseconds}` maps
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|ts| ts.with_timezone(&Utc)),
        Value::Object(map) => {
            let seconds = map.get("seconds")?.as_i64()?;
            let nanos = map.get("nanoseconds").and_then(Value::as_u64).unwrap_or(0);
            DateTime::from_timestamp(seconds, u32::try_from(nanos).ok()?)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn decode(value: Value) -> UserProgress {
        UserProgress::from_document(value.as_object().unwrap())
    }

    #[test]
    fn test_decode_stored_document() {
        let progress = decode(json!({
            "completed": {"goal_listen": "2024-05-01T12:00:00.000Z"},
            "other": 1
        }));

        assert!(progress.is_completed("goal_listen"));
        assert_eq!(
            progress.completed_at("goal_listen"),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
        );
        assert!(!progress.is_completed("goal_new"));
    }

    #[test]
    fn test_missing_or_null_completed_is_empty() {
        assert_eq!(decode(json!({})), UserProgress::empty());
        assert_eq!(decode(json!({"completed": null})), UserProgress::empty());
        assert_eq!(decode(json!({"completed": [1, 2]})), UserProgress::empty());
    }

    #[test]
    fn test_truthy_entries_are_completed() {
        let progress = decode(json!({
            "completed": {
                "goal_listen": true,
                "goal_repeat": 42,
                "goal_new": "yesterday"
            }
        }));

        assert_eq!(progress.completed_count(), 3);
        assert_eq!(progress.completed_at("goal_listen"), None);
        assert_eq!(progress.completed_at("goal_new"), None);
    }

    #[test]
    fn test_null_and_false_entries_are_not_completed() {
        let progress = decode(json!({
            "completed": {"goal_listen": null, "goal_repeat": false}
        }));
        assert_eq!(progress.completed_count(), 0);
    }

    #[test]
    fn test_seconds_map_timestamp() {
        let progress = decode(json!({
            "completed": {"goal_listen": {"seconds": 1, "nanoseconds": 0}}
        }));

        assert!(progress.is_completed("goal_listen"));
        assert_eq!(
            progress.completed_at("goal_listen"),
            Some(Utc.timestamp_opt(1, 0).unwrap())
        );
    }

    #[test]
    fn test_completed_count_ignores_unknown_ids() {
        let now = Utc::now();
        let progress = UserProgress::empty()
            .with_completed("goal_listen", now)
            .with_completed("goal_removed", now);
        assert_eq!(progress.completed_count(), 1);
    }
}
