//! OpenAI-backed completion providers.
//!
//! Two policies over the same chat API:
//! - [`OpenAiFunctionProvider`]: native function calling. At most one action
//!   per turn; the raw argument string is deserialized but not checked
//!   against the descriptor schema.
//! - [`OpenAiStructuredProvider`]: the model is instructed to answer with a
//!   single JSON envelope `{"reply": ..., "actions": [...]}`. Every action
//!   tagged with a registered name is coerced through the typed payload
//!   union; unknown tags pass through untyped for the dispatch engine to
//!   classify. Responses that fail validation are re-asked with the failure
//!   attached, up to a bounded attempt count.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::json;

use quill_actions::{ActionPayload, ActionRegistry};
use quill_common::action::ActionRequest;
use quill_common::conversation::{Role, Turn};
use quill_common::AgentConfig;

use super::{CompletionError, CompletionOutcome, CompletionProvider, ProviderError};

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 300;
/// Completion attempts before a structured turn fails validation.
const MAX_VALIDATION_ATTEMPTS: usize = 3;

// ============================================================================
// Untyped policy: native function calling
// ============================================================================

/// Provider using OpenAI function calling, unchecked arguments.
pub struct OpenAiFunctionProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: Option<f64>,
}

impl OpenAiFunctionProvider {
    /// Create a provider from configuration.
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            client: build_client(&config.openai_api_key),
            base_url: config.openai_base_url.clone(),
            model: config.openai_model.clone(),
            temperature: None,
        }
    }

    /// Set the sampling temperature sent with every request.
    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl CompletionProvider for OpenAiFunctionProvider {
    async fn complete(
        &self,
        history: &[Turn],
        registry: &ActionRegistry,
    ) -> Result<CompletionOutcome, CompletionError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: function_history(history),
            temperature: self.temperature,
            tools: Some(wire_tools(registry)),
            response_format: None,
        };

        let response = send_chat(&self.client, &self.base_url, &self.model, &request).await?;
        let message = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .unwrap_or_default();

        let tool_calls = message.tool_calls.unwrap_or_default();
        let dropped = tool_calls.len().saturating_sub(1);
        let mut calls = tool_calls.into_iter();

        match calls.next() {
            Some(call) => {
                if dropped > 0 {
                    tracing::warn!(
                        dropped,
                        "Model returned multiple function calls; taking the first"
                    );
                }
                let arguments: serde_json::Value = serde_json::from_str(&call.function.arguments)
                    .map_err(|source| CompletionError::MalformedActionPayload {
                        action: call.function.name.clone(),
                        source,
                    })?;

                tracing::info!(action = %call.function.name, "Model requested an action");
                Ok(CompletionOutcome::ActionRequested(vec![
                    ActionRequest::with_correlation_id(call.function.name, arguments, call.id),
                ]))
            }
            None => Ok(CompletionOutcome::DirectReply(
                message.content.unwrap_or_default(),
            )),
        }
    }

    async fn phrase(&self, history: &[Turn]) -> Result<String, CompletionError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: function_history(history),
            temperature: self.temperature,
            tools: None,
            response_format: None,
        };

        let response = send_chat(&self.client, &self.base_url, &self.model, &request).await?;
        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

// ============================================================================
// Validated policy: structured envelope with re-asks
// ============================================================================

/// Provider coercing structured model output into typed action payloads.
pub struct OpenAiStructuredProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    temperature: Option<f64>,
}

impl OpenAiStructuredProvider {
    /// Create a provider from configuration.
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            client: build_client(&config.openai_api_key),
            base_url: config.openai_base_url.clone(),
            model: config.openai_model.clone(),
            temperature: None,
        }
    }

    /// Set the sampling temperature sent with every request.
    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }
}

#[async_trait]
impl CompletionProvider for OpenAiStructuredProvider {
    async fn complete(
        &self,
        history: &[Turn],
        registry: &ActionRegistry,
    ) -> Result<CompletionOutcome, CompletionError> {
        let mut messages = vec![WireMessage::text("system", schema_instruction(registry))];
        messages.extend(structured_history(history));

        let mut last_reason = String::new();

        for attempt in 1..=MAX_VALIDATION_ATTEMPTS {
            let request = ChatCompletionRequest {
                model: self.model.clone(),
                messages: messages.clone(),
                temperature: self.temperature,
                tools: None,
                response_format: Some(json!({ "type": "json_object" })),
            };

            let response = send_chat(&self.client, &self.base_url, &self.model, &request).await?;
            let raw = response
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .unwrap_or_default();

            match parse_envelope(&raw) {
                Ok(outcome) => {
                    if attempt > 1 {
                        tracing::debug!(attempt, "Structured response validated after re-ask");
                    }
                    return Ok(outcome);
                }
                Err(reason) => {
                    tracing::warn!(attempt, reason = %reason, "Structured response failed validation");
                    messages.push(WireMessage::text("assistant", raw));
                    messages.push(WireMessage::text(
                        "user",
                        format!(
                            "Your previous response was not valid: {}. \
                             Respond again with a single JSON object matching the required schema.",
                            reason
                        ),
                    ));
                    last_reason = reason;
                }
            }
        }

        Err(CompletionError::StructuredOutputValidation {
            attempts: MAX_VALIDATION_ATTEMPTS,
            reason: last_reason,
        })
    }

    async fn phrase(&self, history: &[Turn]) -> Result<String, CompletionError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: structured_history(history),
            temperature: self.temperature,
            tools: None,
            response_format: None,
        };

        let response = send_chat(&self.client, &self.base_url, &self.model, &request).await?;
        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

// ============================================================================
// Shared client plumbing
// ============================================================================

fn build_client(api_key: &str) -> reqwest::Client {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", api_key))
            .unwrap_or_else(|_| HeaderValue::from_static("")),
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

async fn send_chat(
    client: &reqwest::Client,
    base_url: &str,
    model: &str,
    request: &ChatCompletionRequest,
) -> Result<ChatCompletionResponse, ProviderError> {
    let url = format!("{}/v1/chat/completions", base_url);

    let response = client
        .post(&url)
        .json(request)
        .send()
        .await
        .map_err(|e| ProviderError {
            provider: "openai".into(),
            model: model.to_string(),
            message: format!("Request failed: {}", e),
            status_code: None,
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError {
            provider: "openai".into(),
            model: model.to_string(),
            message: format!("API error: {}", body),
            status_code: Some(status.as_u16()),
        });
    }

    response.json().await.map_err(|e| ProviderError {
        provider: "openai".into(),
        model: model.to_string(),
        message: format!("Failed to parse response: {}", e),
        status_code: None,
    })
}

fn wire_tools(registry: &ActionRegistry) -> Vec<WireTool> {
    registry
        .describe_actions()
        .iter()
        .map(|descriptor| WireTool {
            kind: "function".to_string(),
            function: WireFunction {
                name: descriptor.name.clone(),
                description: descriptor.description.clone(),
                parameters: descriptor.parameters_schema(),
            },
        })
        .collect()
}

// ============================================================================
// History conversion
// ============================================================================

/// Convert history into wire messages for the function-calling protocol.
///
/// Action-request turns become assistant messages carrying `tool_calls`;
/// tool-result turns become `tool` messages linked by `tool_call_id`.
fn function_history(history: &[Turn]) -> Vec<WireMessage> {
    history
        .iter()
        .map(|turn| match turn.role {
            Role::Assistant if turn.has_requests() => WireMessage {
                role: "assistant".to_string(),
                content: None,
                tool_calls: Some(
                    turn.requests
                        .iter()
                        .enumerate()
                        .map(|(index, request)| WireToolCall {
                            id: request
                                .correlation_id
                                .clone()
                                .unwrap_or_else(|| format!("call_{}", index)),
                            kind: "function".to_string(),
                            function: FunctionCall {
                                name: request.name.clone(),
                                arguments: request.arguments.to_string(),
                            },
                        })
                        .collect(),
                ),
                tool_call_id: None,
            },
            Role::ToolResult => WireMessage {
                role: "tool".to_string(),
                content: turn.content.clone().or_else(|| Some(String::new())),
                tool_calls: None,
                tool_call_id: turn.answers.clone(),
            },
            role => WireMessage::text(role.as_str(), turn.content.clone().unwrap_or_default()),
        })
        .collect()
}

/// Convert history into wire messages for the structured-envelope protocol.
///
/// Action-request turns are replayed as the envelope the model produced;
/// tool-result turns become plain assistant messages, matching how results
/// are folded back into the visible conversation.
fn structured_history(history: &[Turn]) -> Vec<WireMessage> {
    history
        .iter()
        .map(|turn| match turn.role {
            Role::Assistant if turn.has_requests() => {
                let envelope = json!({
                    "reply": null,
                    "actions": turn.requests.iter().map(tagged_action).collect::<Vec<_>>(),
                });
                WireMessage::text("assistant", envelope.to_string())
            }
            Role::ToolResult => {
                WireMessage::text("assistant", turn.content.clone().unwrap_or_default())
            }
            role => WireMessage::text(role.as_str(), turn.content.clone().unwrap_or_default()),
        })
        .collect()
}

/// Rebuild the tagged wire object for one action request.
fn tagged_action(request: &ActionRequest) -> serde_json::Value {
    let mut object = serde_json::Map::new();
    object.insert(
        "action".to_string(),
        serde_json::Value::String(request.name.clone()),
    );
    if let Some(arguments) = request.arguments.as_object() {
        for (key, value) in arguments {
            object.insert(key.clone(), value.clone());
        }
    }
    serde_json::Value::Object(object)
}

// ============================================================================
// Validated envelope
// ============================================================================

/// The structured shape the model is asked to produce.
#[derive(Debug, Deserialize)]
struct ActionEnvelope {
    #[serde(default)]
    reply: Option<String>,
    #[serde(default)]
    actions: Vec<serde_json::Value>,
}

/// Instruction describing the envelope and the available actions.
fn schema_instruction(registry: &ActionRegistry) -> String {
    let mut lines = Vec::new();
    for descriptor in registry.describe_actions() {
        let parameters = if descriptor.parameters.is_empty() {
            "none".to_string()
        } else {
            descriptor
                .parameters
                .iter()
                .map(|p| {
                    format!(
                        "{} ({}, {}): {}",
                        p.name,
                        p.kind,
                        if p.required { "required" } else { "optional" },
                        p.description
                    )
                })
                .collect::<Vec<_>>()
                .join("; ")
        };
        lines.push(format!(
            "- {}: {}. Parameters: {}",
            descriptor.name, descriptor.description, parameters
        ));
    }

    format!(
        "Respond with a single JSON object of the shape \
         {{\"reply\": <string or null>, \"actions\": [...]}}. \
         Each entry in \"actions\" must be an object with an \"action\" field \
         naming one of the available actions plus that action's argument fields. \
         Available actions:\n{}\n\
         When no action is needed, return an empty \"actions\" array and put \
         your answer in \"reply\".",
        lines.join("\n")
    )
}

/// Validate one raw structured response.
///
/// Known action tags are coerced strictly through [`ActionPayload`]; a tag
/// outside the closed set is not a validation failure here, it passes
/// through untyped for the dispatch engine to classify.
fn parse_envelope(raw: &str) -> Result<CompletionOutcome, String> {
    let envelope: ActionEnvelope = serde_json::from_str(raw).map_err(|e| e.to_string())?;

    let mut requests = Vec::with_capacity(envelope.actions.len());
    for (index, item) in envelope.actions.iter().enumerate() {
        let object = item
            .as_object()
            .ok_or_else(|| format!("action #{} is not an object", index))?;
        let tag = object
            .get("action")
            .and_then(|v| v.as_str())
            .ok_or_else(|| format!("action #{} is missing the \"action\" field", index))?;

        if ActionPayload::is_known(tag) {
            let payload: ActionPayload = serde_json::from_value(item.clone())
                .map_err(|e| format!("action #{} ({}): {}", index, tag, e))?;
            requests.push(payload.into_request());
        } else {
            let mut arguments = object.clone();
            arguments.remove("action");
            requests.push(ActionRequest::new(
                tag,
                serde_json::Value::Object(arguments),
            ));
        }
    }

    if requests.is_empty() {
        match envelope.reply {
            Some(reply) if !reply.trim().is_empty() => Ok(CompletionOutcome::DirectReply(reply)),
            _ => Err("the response carried no actions and no reply".to_string()),
        }
    } else {
        Ok(CompletionOutcome::ActionRequested(requests))
    }
}

// ============================================================================
// OpenAI API Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
struct WireMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl WireMessage {
    fn text(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: String,
    function: WireFunction,
}

#[derive(Debug, Clone, Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    /// Raw JSON string, as the protocol transmits arguments.
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ResponseToolCall {
    id: String,
    function: FunctionCall,
}
