//! Objective list projection

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::objectives::OBJECTIVES;
use crate::progress::UserProgress;

pub const LABEL_COMPLETED: &str = "Completed!";
pub const LABEL_INCOMPLETE: &str = "Mark as complete";

/// One rendered row of the objective list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalItem {
    pub id: &'static str,
    pub text: &'static str,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub button_label: &'static str,
    pub button_class: &'static str,
    /// Completed objectives cannot be clicked again
    pub disabled: bool,
}

/// Rebuild the list from the catalog and the current completion map
pub fn render_goals(progress: &UserProgress) -> Vec<GoalItem> {
    OBJECTIVES
        .iter()
        .map(|objective| {
            let completed = progress.is_completed(objective.id);
            let completed_at = progress.completed_at(objective.id);

            GoalItem {
                id: objective.id,
                text: objective.text,
                completed,
                completed_at,
                button_label: if completed { LABEL_COMPLETED } else { LABEL_INCOMPLETE },
                button_class: if completed {
                    "btn-success"
                } else {
                    "btn-outline-secondary"
                },
                disabled: completed,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_progress_renders_all_incomplete() {
        let items = render_goals(&UserProgress::empty());

        assert_eq!(items.len(), 3);
        for item in &items {
            assert_eq!(item.button_label, "Mark as complete");
            assert_eq!(item.button_class, "btn-outline-secondary");
            assert!(!item.disabled);
            assert!(item.completed_at.is_none());
        }
    }

    #[test]
    fn test_completed_goal_is_disabled() {
        let now = Utc::now();
        let progress = UserProgress::empty().with_completed("goal_listen", now);
        let items = render_goals(&progress);

        assert_eq!(items[0].id, "goal_listen");
        assert!(items[0].completed);
        assert!(items[0].disabled);
        assert_eq!(items[0].button_label, "Completed!");
        assert_eq!(items[0].button_class, "btn-success");
        assert_eq!(items[0].completed_at, Some(now));

        assert!(!items[1].disabled);
        assert!(!items[2].disabled);
    }

    #[test]
    fn test_completed_without_time_is_disabled() {
        let mut progress = UserProgress::empty();
        progress.completed.insert("goal_repeat".to_string(), None);
        let items = render_goals(&progress);

        assert!(items[1].disabled);
        assert_eq!(items[1].button_label, "Completed!");
        assert!(items[1].completed_at.is_none());
    }

    #[test]
    fn test_order_follows_catalog() {
        let ids: Vec<_> = render_goals(&UserProgress::empty())
            .iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, vec!["goal_listen", "goal_repeat", "goal_new"]);
    }
}
