//! Completion provider abstraction.
//!
//! A provider runs one model call over the conversation history and reduces
//! the response to a [`CompletionOutcome`]: either a direct textual reply or
//! the list of actions the model asked for. The dispatch engine consumes the
//! outcome; it never sees wire formats or transport errors.

mod openai;

pub use openai::{OpenAiFunctionProvider, OpenAiStructuredProvider};

use async_trait::async_trait;
use thiserror::Error;

use quill_actions::ActionRegistry;
use quill_common::action::ActionRequest;
use quill_common::conversation::Turn;

// ============================================================================
// Completion Provider Trait
// ============================================================================

/// Unified interface over the remote model call.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run one completion over the history with the registry's actions
    /// offered to the model.
    async fn complete(
        &self,
        history: &[Turn],
        registry: &ActionRegistry,
    ) -> Result<CompletionOutcome, CompletionError>;

    /// Run a plain completion over the history with no actions offered.
    /// Used for the second phrasing pass of the untyped policy.
    async fn phrase(&self, history: &[Turn]) -> Result<String, CompletionError>;
}

/// What the model decided for one turn.
#[derive(Debug, Clone)]
pub enum CompletionOutcome {
    /// The model answered in text and asked for no action.
    DirectReply(String),
    /// The model asked for one or more actions, in the order it listed them.
    ActionRequested(Vec<ActionRequest>),
}

// ============================================================================
// Error Types
// ============================================================================

/// Turn-level failure of a completion policy.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The raw argument payload of a function call could not be parsed
    /// (untyped policy). Fatal to the turn.
    #[error("Malformed action payload for '{action}': {source}")]
    MalformedActionPayload {
        action: String,
        #[source]
        source: serde_json::Error,
    },

    /// The structured response never conformed to the action schema within
    /// the retry budget (validated policy). Fatal to the turn.
    #[error("Structured output failed validation after {attempts} attempts: {reason}")]
    StructuredOutputValidation { attempts: usize, reason: String },

    /// Transport or API failure below the policy layer.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Error from the underlying model API.
#[derive(Debug, Clone)]
pub struct ProviderError {
    pub provider: String,
    pub model: String,
    pub message: String,
    pub status_code: Option<u16>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}:{}] {}", self.provider, self.model, self.message)
    }
}

impl std::error::Error for ProviderError {}
