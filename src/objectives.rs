//! Objective Catalog
//!
//! The fixed set of objectives a user can complete. The catalog is known at
//! compile time and never changes at runtime.

use serde::Serialize;

/// A predefined user goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Objective {
    /// Stable identifier, used as the key in the progress document
    pub id: &'static str,
    /// Human-readable description
    pub text: &'static str,
}

impl Objective {
    /// Short label used on the chart axis (first word of the text)
    pub fn label(&self) -> &'static str {
        self.text.split_whitespace().next().unwrap_or(self.text)
    }
}

/// All objectives, in display order
pub const OBJECTIVES: [Objective; 3] = [
    Objective {
        id: "goal_listen",
        text: "Try to start listening to native speakers",
    },
    Objective {
        id: "goal_repeat",
        text: "Try to repeat after them",
    },
    Objective {
        id: "goal_new",
        text: "More items to determine",
    },
];

/// Look up an objective by id
pub fn find(id: &str) -> Option<&'static Objective> {
    OBJECTIVES.iter().find(|o| o.id == id)
}

/// Number of objectives in the catalog
pub fn total() -> usize {
    OBJECTIVES.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_are_unique() {
        let mut ids: Vec<_> = OBJECTIVES.iter().map(|o| o.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total());
    }

    #[test]
    fn test_labels_are_first_word() {
        let labels: Vec<_> = OBJECTIVES.iter().map(|o| o.label()).collect();
        assert_eq!(labels, vec!["Try", "Try", "More"]);
    }

    #[test]
    fn test_find() {
        assert_eq!(find("goal_repeat").map(|o| o.text), Some("Try to repeat after them"));
        assert!(find("goal_unknown").is_none());
    }
}
