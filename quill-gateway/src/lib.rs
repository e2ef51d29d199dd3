//! Quill Gateway - completion provider layer for the Quill assistant.
//!
//! Turns conversation history plus the action schema registry into either a
//! direct textual reply or a list of requested actions, over an
//! OpenAI-compatible chat API. Two policies are provided:
//! - `OpenAiFunctionProvider`: untyped function calling, at most one action
//!   per turn, arguments deserialized but not schema-checked.
//! - `OpenAiStructuredProvider`: schema-validated structured output that can
//!   carry several heterogeneous actions per turn, with bounded re-asks when
//!   the model's response fails validation.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod provider;

pub use provider::{
    CompletionError, CompletionOutcome, CompletionProvider, OpenAiFunctionProvider,
    OpenAiStructuredProvider, ProviderError,
};
