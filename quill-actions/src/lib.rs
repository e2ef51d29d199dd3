//! Quill Actions - the action domain of the Quill assistant.
//!
//! Provides the pieces the completion layer and the dispatch engine build on:
//! - Action descriptors and the schema registry (pure data)
//! - The `ActionHandler` trait and its typed failure
//! - The `ActionPayload` tagged union used by the validated policy
//! - The handler table mapping action names to implementations
//! - Built-in handlers: note insertion (Notion API), weather report

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod descriptor;
pub mod handler;
pub mod note;
pub mod payload;
pub mod registry;
pub mod table;
pub mod weather;

pub use descriptor::{ActionDescriptor, ParameterSpec};
pub use handler::{ActionError, ActionHandler};
pub use payload::ActionPayload;
pub use registry::ActionRegistry;
pub use table::HandlerTable;

// Re-export handler implementations
pub use note::NoteHandler;
pub use weather::WeatherHandler;

// Re-export the request/result types shared with the history model
pub use quill_common::action::{ActionRequest, ActionResult};
