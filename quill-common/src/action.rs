//! Action request and result types.
//!
//! An [`ActionRequest`] is what a completion provider extracts from a model
//! response; an [`ActionResult`] is what the dispatch engine produces after
//! invoking (or failing to invoke) a handler. Both cross crate boundaries,
//! so they live here rather than next to the handlers.

use serde::{Deserialize, Serialize};

/// A single action the model asked the assistant to perform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Action name as emitted by the model (may be unknown to the runtime).
    pub name: String,
    /// Structured arguments for the handler.
    pub arguments: serde_json::Value,
    /// Provider-assigned identifier linking this request to its result,
    /// when the wire protocol carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl ActionRequest {
    /// Create a request without a correlation identifier.
    pub fn new(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            arguments,
            correlation_id: None,
        }
    }

    /// Create a request carrying the provider's correlation identifier.
    pub fn with_correlation_id(
        name: impl Into<String>,
        arguments: serde_json::Value,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            arguments,
            correlation_id: Some(correlation_id.into()),
        }
    }
}

/// Outcome of dispatching one [`ActionRequest`].
///
/// Always carries display text: handler output on success, a diagnostic
/// sentence on failure. The engine never drops a request silently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    /// Name of the action that was dispatched.
    pub action: String,
    /// Correlation identifier copied from the originating request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    /// Whether the handler completed successfully.
    pub success: bool,
    /// Text describing the outcome, shown to the user or fed back to the model.
    pub text: String,
}

impl ActionResult {
    /// Create a successful result.
    pub fn success(request: &ActionRequest, text: impl Into<String>) -> Self {
        Self {
            action: request.name.clone(),
            correlation_id: request.correlation_id.clone(),
            success: true,
            text: text.into(),
        }
    }

    /// Create a failed result.
    pub fn failure(request: &ActionRequest, text: impl Into<String>) -> Self {
        Self {
            action: request.name.clone(),
            correlation_id: request.correlation_id.clone(),
            success: false,
            text: text.into(),
        }
    }
}
