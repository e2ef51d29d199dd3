//! Quill Agent - dispatch engine and conversation session driver.
//!
//! The engine resolves requested actions against the handler table and
//! executes them exactly once each, in request order. The conversation
//! driver owns the append-only history, seeds the system prompt, and folds
//! turn outputs back into the session.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod conversation;
pub mod engine;

pub use conversation::{Conversation, DispatchPolicy};
pub use engine::{DispatchEngine, TurnOutput};
