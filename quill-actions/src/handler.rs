//! Action handler trait and its failure type.
//!
//! Handlers own all side effects. They receive the argument object the
//! provider produced (schema-checked under the validated policy, raw under
//! the untyped one) and reduce the outcome to a display string. Transport
//! and remote failures must come back as [`ActionError`], never as a raw
//! client error.

use async_trait::async_trait;
use thiserror::Error;

/// Typed failure of one handler invocation.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The argument object did not match the shape the handler expects.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The outbound request could not be sent or its response not read.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The remote service answered with a non-success status.
    #[error("Remote service error (status {status}): {body}")]
    Remote { status: u16, body: String },
}

/// Trait for action handlers.
///
/// Each handler provides:
/// - `name()`: the action identifier it serves
/// - `execute()`: async function performing the side effect
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Action name this handler serves. Must match a handler table key.
    fn name(&self) -> &str;

    /// Execute the action. Exactly one invocation per request; the caller
    /// never retries.
    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ActionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_arguments_display() {
        let err = ActionError::InvalidArguments("missing field `text`".to_string());
        assert_eq!(err.to_string(), "Invalid arguments: missing field `text`");
    }

    #[test]
    fn remote_display_includes_status_and_body() {
        let err = ActionError::Remote {
            status: 403,
            body: "insufficient permissions".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("403"));
        assert!(text.contains("insufficient permissions"));
    }
}
