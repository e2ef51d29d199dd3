//! Conversation history types.
//!
//! A conversation is an append-only list of [`Turn`]s. Providers read the
//! whole history to build wire requests; the loop only ever pushes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::action::{ActionRequest, ActionResult};

/// Role of a single turn in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// System instructions seeded at session start
    System,
    /// User message
    User,
    /// Assistant (model) response
    Assistant,
    /// Result of a dispatched action, fed back to the model
    ToolResult,
}

impl Role {
    /// Convert to string representation for wire protocols and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::ToolResult => "tool_result",
        }
    }

    /// Parse from string representation.
    pub fn parse(s: &str) -> Self {
        match s {
            "system" => Self::System,
            "assistant" => Self::Assistant,
            "tool_result" => Self::ToolResult,
            _ => Self::User, // Default fallback
        }
    }
}

/// A single entry in the conversation history.
///
/// Plain text turns carry only `content`. Turns recording a model request
/// for actions carry `requests`; turns recording a dispatched outcome carry
/// `content` plus the correlation id in `answers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Who produced this turn.
    pub role: Role,
    /// Display or wire text, absent on pure action-request turns.
    pub content: Option<String>,
    /// Actions the model asked for in this turn.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requests: Vec<ActionRequest>,
    /// Correlation id linking a tool-result turn to its request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<String>,
    /// When the turn was appended.
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Create a system turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    /// Create an assistant turn recording the actions the model asked for.
    pub fn action_request(requests: Vec<ActionRequest>) -> Self {
        Self {
            role: Role::Assistant,
            content: None,
            requests,
            answers: None,
            created_at: Utc::now(),
        }
    }

    /// Create a turn recording one dispatched action outcome.
    pub fn tool_result(result: &ActionResult) -> Self {
        Self {
            role: Role::ToolResult,
            content: Some(result.text.clone()),
            requests: Vec::new(),
            answers: result.correlation_id.clone(),
            created_at: Utc::now(),
        }
    }

    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            requests: Vec::new(),
            answers: None,
            created_at: Utc::now(),
        }
    }

    /// Whether this turn carries action requests.
    pub fn has_requests(&self) -> bool {
        !self.requests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_roundtrip() {
        assert_eq!(Role::parse(Role::System.as_str()), Role::System);
        assert_eq!(Role::parse(Role::User.as_str()), Role::User);
        assert_eq!(Role::parse(Role::Assistant.as_str()), Role::Assistant);
        assert_eq!(Role::parse(Role::ToolResult.as_str()), Role::ToolResult);
    }

    #[test]
    fn test_role_unknown_defaults_to_user() {
        assert_eq!(Role::parse("unknown"), Role::User);
    }

    #[test]
    fn test_text_turns_have_no_requests() {
        let turn = Turn::user("hello");
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.content.as_deref(), Some("hello"));
        assert!(!turn.has_requests());
    }

    #[test]
    fn test_action_request_turn() {
        let turn = Turn::action_request(vec![ActionRequest::new(
            "insert_note",
            json!({"text": "note body"}),
        )]);

        assert_eq!(turn.role, Role::Assistant);
        assert!(turn.content.is_none());
        assert!(turn.has_requests());
        assert_eq!(turn.requests[0].name, "insert_note");
    }

    #[test]
    fn test_tool_result_turn_carries_correlation_id() {
        let request = ActionRequest::with_correlation_id("get_weather", json!({}), "call_3");
        let result = ActionResult::success(&request, "sunny");
        let turn = Turn::tool_result(&result);

        assert_eq!(turn.role, Role::ToolResult);
        assert_eq!(turn.content.as_deref(), Some("sunny"));
        assert_eq!(turn.answers.as_deref(), Some("call_3"));
    }

    #[test]
    fn test_turn_serializes_without_empty_requests() {
        let json = serde_json::to_string(&Turn::user("hi")).unwrap();
        assert!(!json.contains("requests"));
        assert!(!json.contains("answers"));
    }
}
