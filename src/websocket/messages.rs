//! WebSocket Message Types
//!
//! Defines all message types exchanged between a goal page and the server.

use serde::{Deserialize, Serialize};

use crate::tracker::Completion;
use crate::view::{BarChart, GoalItem, RenderedView};

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// The user clicked "Mark as complete"
    Complete {
        /// Objective to mark complete
        goal_id: String,
    },
    /// Ping for keepalive
    Ping,
}

/// Outcome reported back for a completion request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    Written,
    AlreadyCompleted,
}

impl From<Completion> for CompletionStatus {
    fn from(completion: Completion) -> Self {
        match completion {
            Completion::Written => CompletionStatus::Written,
            Completion::AlreadyCompleted => CompletionStatus::AlreadyCompleted,
        }
    }
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established
    Connected {
        /// Unique connection identifier
        connection_id: String,
        /// User the connection is bound to
        user_id: String,
    },
    /// A snapshot arrived and was rendered
    View {
        goals: Vec<GoalItem>,
        chart: BarChart,
        /// Ready to hand to Chart.js
        chart_config: serde_json::Value,
    },
    /// Result of a `complete` request
    Completed {
        goal_id: String,
        status: CompletionStatus,
    },
    /// Pong response to ping
    Pong,
    /// Error message
    Error {
        /// Error description
        message: String,
    },
}

impl ServerMessage {
    pub fn view(rendered: RenderedView) -> Self {
        let chart_config = rendered.chart.to_chartjs_config();
        ServerMessage::View {
            goals: rendered.goals,
            chart: rendered.chart,
            chart_config,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::UserProgress;
    use crate::view::GoalView;

    #[test]
    fn test_client_message_deserialize_complete() {
        let json = r#"{"type": "complete", "goal_id": "goal_listen"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        match msg {
            ClientMessage::Complete { goal_id } => assert_eq!(goal_id, "goal_listen"),
            _ => panic!("Expected Complete"),
        }
    }

    #[test]
    fn test_client_message_deserialize_ping() {
        let json = r#"{"type": "ping"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn test_unknown_client_message_rejected() {
        let json = r#"{"type": "delete", "goal_id": "goal_listen"}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn test_server_message_serialize_view() {
        let rendered = GoalView::new().render(&UserProgress::empty());
        let json = serde_json::to_value(ServerMessage::view(rendered)).unwrap();

        assert_eq!(json["type"], "view");
        assert_eq!(json["goals"].as_array().unwrap().len(), 3);
        assert_eq!(json["chart"]["title"], "Total goals completed: 0 / 3");
        assert_eq!(json["chart_config"]["type"], "bar");
    }

    #[test]
    fn test_server_message_serialize_completed() {
        let msg = ServerMessage::Completed {
            goal_id: "goal_new".to_string(),
            status: Completion::AlreadyCompleted.into(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"completed\""));
        assert!(json.contains("\"status\":\"already_completed\""));
    }

    #[test]
    fn test_server_message_serialize_connected() {
        let msg = ServerMessage::Connected {
            connection_id: "abc-123".to_string(),
            user_id: "alice".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"connected\""));
        assert!(json.contains("\"connection_id\":\"abc-123\""));
    }
}
