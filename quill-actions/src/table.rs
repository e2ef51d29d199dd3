//! Handler table.
//!
//! Maps action names to executable handlers. Built once at startup from
//! static bindings; resolution is an exact name match. Unknown names stay
//! unresolved so the dispatch engine can classify them.

use std::sync::Arc;

use quill_common::AgentConfig;

use crate::handler::ActionHandler;
use crate::note::NoteHandler;
use crate::weather::WeatherHandler;

/// Name-to-handler mapping for dispatch.
#[derive(Default)]
pub struct HandlerTable {
    handlers: Vec<Arc<dyn ActionHandler>>,
}

impl HandlerTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Table with the built-in handlers.
    pub fn builtin(config: &AgentConfig) -> Self {
        let mut table = Self::new();
        table.register(Arc::new(NoteHandler::new(config)));
        table.register(Arc::new(WeatherHandler::new()));
        table
    }

    /// Register a handler under its own name.
    pub fn register(&mut self, handler: Arc<dyn ActionHandler>) {
        self.handlers.push(handler);
    }

    /// Resolve a handler by exact action name.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn ActionHandler>> {
        self.handlers
            .iter()
            .find(|h| h.name() == name)
            .map(Arc::clone)
    }

    /// Names of all registered handlers, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::ActionError;
    use async_trait::async_trait;

    struct EchoHandler;

    #[async_trait]
    impl ActionHandler for EchoHandler {
        fn name(&self) -> &str {
            "echo"
        }

        async fn execute(&self, arguments: serde_json::Value) -> Result<String, ActionError> {
            Ok(arguments.to_string())
        }
    }

    fn test_config() -> AgentConfig {
        AgentConfig::from_lookup(|key| match key {
            "OPENAI_API_KEY" => Some("sk-test".to_string()),
            "NOTION_API_KEY" => Some("secret_test".to_string()),
            "NOTION_PAGE_ID" => Some("page-123".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn builtin_table_serves_registered_actions() {
        let table = HandlerTable::builtin(&test_config());
        assert_eq!(table.names(), vec!["insert_note", "get_weather"]);
        assert!(table.resolve("insert_note").is_some());
        assert!(table.resolve("get_weather").is_some());
    }

    #[test]
    fn resolve_unknown_returns_none() {
        let table = HandlerTable::builtin(&test_config());
        assert!(table.resolve("launch_rocket").is_none());
    }

    #[tokio::test]
    async fn registered_handler_is_resolvable_and_callable() {
        let mut table = HandlerTable::new();
        table.register(Arc::new(EchoHandler));

        let handler = table.resolve("echo").unwrap();
        let result = handler.execute(serde_json::json!({"k": "v"})).await.unwrap();
        assert!(result.contains("\"k\""));
    }
}
