//! Configuration loaded from environment variables.
//!
//! All settings are read once at startup. Required variables that are
//! missing or empty produce a [`Error::Config`](crate::error::Error::Config)
//! naming the variable, so operators can fix the environment without
//! reading source code.

use crate::error::{Error, Result};

/// Default chat model when `OPENAI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default OpenAI API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Default Notion API base URL.
pub const DEFAULT_NOTION_BASE_URL: &str = "https://api.notion.com";

/// Runtime configuration for the assistant.
///
/// Holds credentials and endpoints for the completion provider and the
/// note-taking backend. Cloning is cheap enough for handing copies to
/// handlers at startup.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// API key for the OpenAI-compatible completion endpoint.
    pub openai_api_key: String,
    /// Chat model identifier sent with every completion request.
    pub openai_model: String,
    /// Base URL of the completion endpoint (no trailing slash).
    pub openai_base_url: String,
    /// Integration token for the Notion API.
    pub notion_api_key: String,
    /// Page under which new notes are created.
    pub notion_page_id: String,
    /// Base URL of the Notion API (no trailing slash).
    pub notion_base_url: String,
}

impl AgentConfig {
    /// Load configuration from process environment variables.
    ///
    /// Required: `OPENAI_API_KEY`, `NOTION_API_KEY`, `NOTION_PAGE_ID`.
    /// Optional: `OPENAI_MODEL` (default `gpt-3.5-turbo`),
    /// `OPENAI_BASE_URL`, `NOTION_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a lookup function.
    ///
    /// Keeps tests free of process-global environment mutation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let openai_api_key = required(&lookup, "OPENAI_API_KEY")?;
        let notion_api_key = required(&lookup, "NOTION_API_KEY")?;
        let notion_page_id = required(&lookup, "NOTION_PAGE_ID")?;

        let openai_model = optional(&lookup, "OPENAI_MODEL", DEFAULT_MODEL);
        let openai_base_url = optional(&lookup, "OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL);
        let notion_base_url = optional(&lookup, "NOTION_BASE_URL", DEFAULT_NOTION_BASE_URL);

        Ok(Self {
            openai_api_key,
            openai_model,
            openai_base_url,
            notion_api_key,
            notion_page_id,
            notion_base_url,
        })
    }
}

/// Fetch a required variable. Empty or whitespace-only values count as missing.
fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!(
            "missing required environment variable: {}",
            key
        ))),
    }
}

/// Fetch an optional variable, falling back to a default when unset or empty.
fn optional<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}
