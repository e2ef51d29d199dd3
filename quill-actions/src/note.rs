//! Note insertion handler backed by the Notion API.
//!
//! Creates a page under the configured parent page. The note text becomes
//! the page title, matching how the note store renders short entries.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;

use quill_common::AgentConfig;

use crate::handler::{ActionError, ActionHandler};

/// Notion API version sent with every request.
const NOTION_VERSION: &str = "2022-06-28";
/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Handler for the `insert_note` action.
pub struct NoteHandler {
    client: reqwest::Client,
    base_url: String,
    page_id: String,
}

/// Arguments accepted by `insert_note`.
#[derive(Debug, Deserialize)]
struct NoteArgs {
    text: String,
    #[serde(default)]
    #[allow(dead_code)] // Accepted per the schema; the page title carries the text
    title: Option<String>,
}

impl NoteHandler {
    /// Create a handler from configuration.
    pub fn new(config: &AgentConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.notion_api_key))
                .unwrap_or_else(|_| HeaderValue::from_static("")),
        );
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.notion_base_url.clone(),
            page_id: config.notion_page_id.clone(),
        }
    }
}

#[async_trait]
impl ActionHandler for NoteHandler {
    fn name(&self) -> &str {
        "insert_note"
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ActionError> {
        let args: NoteArgs = serde_json::from_value(arguments)
            .map_err(|e| ActionError::InvalidArguments(e.to_string()))?;

        let url = format!("{}/v1/pages", self.base_url);
        let body = json!({
            "parent": { "page_id": self.page_id },
            "properties": {
                "title": {
                    "title": [
                        {
                            "type": "text",
                            "text": { "content": args.text }
                        }
                    ]
                }
            }
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let status = response.status();

        if status.is_success() {
            tracing::info!(page_id = %self.page_id, "Note inserted");
            Ok("Note successfully inserted in Notion!".to_string())
        } else {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Note insertion rejected");
            Err(ActionError::Remote {
                status: status.as_u16(),
                body,
            })
        }
    }
}
