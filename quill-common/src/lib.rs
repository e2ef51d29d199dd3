//! Quill Common - shared types, configuration, and logging for the Quill assistant.
//!
//! This crate provides:
//! - Runtime configuration read from the environment once at startup
//! - Error types and handling utilities
//! - Logging setup with noise filtering
//! - The conversation history data model shared by the provider and engine layers

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod action;
pub mod config;
pub mod conversation;
pub mod error;
pub mod logging;

pub use action::{ActionRequest, ActionResult};
pub use config::AgentConfig;
pub use conversation::{Role, Turn};
pub use error::{Error, Result};
