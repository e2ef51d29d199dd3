//! Dispatch engine.
//!
//! Consumes the completion provider's outcome for one turn and turns action
//! requests into ordered action results. Invariants enforced here: one
//! handler invocation per request, never retried; results in request order,
//! one per request; an unknown or failing action becomes result text and
//! never aborts its siblings.

use std::sync::Arc;

use quill_actions::{ActionRegistry, HandlerTable};
use quill_common::action::{ActionRequest, ActionResult};
use quill_common::conversation::Turn;
use quill_gateway::{CompletionError, CompletionOutcome, CompletionProvider};

/// Definitive output of one completed turn.
#[derive(Debug, Clone)]
pub enum TurnOutput {
    /// The model replied in text; no handler ran.
    Reply(String),
    /// Actions were dispatched; one result per request, order matching.
    Dispatched {
        requests: Vec<ActionRequest>,
        results: Vec<ActionResult>,
    },
}

/// Resolves requested actions against the handler table and executes them.
pub struct DispatchEngine {
    provider: Arc<dyn CompletionProvider>,
    registry: ActionRegistry,
    table: HandlerTable,
}

impl DispatchEngine {
    /// Create an engine over a provider, registry, and handler table.
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        registry: ActionRegistry,
        table: HandlerTable,
    ) -> Self {
        Self {
            provider,
            registry,
            table,
        }
    }

    /// Run one turn over the history: ask the provider, then dispatch
    /// whatever it requested.
    pub async fn execute_turn(&self, history: &[Turn]) -> Result<TurnOutput, CompletionError> {
        let outcome = self.provider.complete(history, &self.registry).await?;

        match outcome {
            CompletionOutcome::DirectReply(text) => Ok(TurnOutput::Reply(text)),
            CompletionOutcome::ActionRequested(requests) => {
                let results = self.dispatch(&requests).await;
                Ok(TurnOutput::Dispatched { requests, results })
            }
        }
    }

    /// Execute every request sequentially, in the order received.
    pub async fn dispatch(&self, requests: &[ActionRequest]) -> Vec<ActionResult> {
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            results.push(self.dispatch_one(request).await);
        }
        results
    }

    async fn dispatch_one(&self, request: &ActionRequest) -> ActionResult {
        let Some(handler) = self.table.resolve(&request.name) else {
            tracing::warn!(action = %request.name, "No handler registered for requested action");
            return ActionResult::failure(
                request,
                format!("No handler found for action type: {}", request.name),
            );
        };

        tracing::info!(action = %request.name, "Executing action");
        match handler.execute(request.arguments.clone()).await {
            Ok(text) => ActionResult::success(request, text),
            Err(e) => {
                tracing::warn!(action = %request.name, error = %e, "Action failed");
                ActionResult::failure(
                    request,
                    format!("Action '{}' failed: {}", request.name, e),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quill_actions::{ActionError, ActionHandler};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FixedProvider {
        outcome: CompletionOutcome,
    }

    #[async_trait]
    impl CompletionProvider for FixedProvider {
        async fn complete(
            &self,
            _history: &[Turn],
            _registry: &ActionRegistry,
        ) -> Result<CompletionOutcome, CompletionError> {
            Ok(self.outcome.clone())
        }

        async fn phrase(&self, _history: &[Turn]) -> Result<String, CompletionError> {
            Ok("phrased".to_string())
        }
    }

    struct CountingHandler {
        name: &'static str,
        calls: Arc<AtomicUsize>,
        order: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    #[async_trait]
    impl ActionHandler for CountingHandler {
        fn name(&self) -> &str {
            self.name
        }

        async fn execute(&self, _arguments: serde_json::Value) -> Result<String, ActionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.order.lock().unwrap().push(self.name.to_string());
            if self.fail {
                Err(ActionError::Remote {
                    status: 502,
                    body: "bad gateway".to_string(),
                })
            } else {
                Ok(format!("{} completed", self.name))
            }
        }
    }

    struct Fixture {
        calls: Arc<AtomicUsize>,
        order: Arc<Mutex<Vec<String>>>,
        table: HandlerTable,
    }

    fn fixture(handlers: &[(&'static str, bool)]) -> Fixture {
        let calls = Arc::new(AtomicUsize::new(0));
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut table = HandlerTable::new();
        for (name, fail) in handlers {
            table.register(Arc::new(CountingHandler {
                name,
                calls: Arc::clone(&calls),
                order: Arc::clone(&order),
                fail: *fail,
            }));
        }
        Fixture {
            calls,
            order,
            table,
        }
    }

    fn engine_with(outcome: CompletionOutcome, table: HandlerTable) -> DispatchEngine {
        DispatchEngine::new(
            Arc::new(FixedProvider { outcome }),
            ActionRegistry::builtin(),
            table,
        )
    }

    fn seed_history() -> Vec<Turn> {
        vec![Turn::system("assist"), Turn::user("go")]
    }

    #[tokio::test]
    async fn direct_reply_runs_no_handlers() {
        let fx = fixture(&[("create_task", false)]);
        let engine = engine_with(
            CompletionOutcome::DirectReply("just chatting".to_string()),
            fx.table,
        );

        let output = engine.execute_turn(&seed_history()).await.unwrap();

        match output {
            TurnOutput::Reply(text) => assert_eq!(text, "just chatting"),
            other => panic!("unexpected output: {:?}", other),
        }
        assert_eq!(fx.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn one_result_per_request_in_order() {
        let fx = fixture(&[("create_task", false), ("list_tasks", false)]);
        let requests = vec![
            ActionRequest::new("create_task", json!({"due": "tomorrow"})),
            ActionRequest::new("list_tasks", json!({})),
        ];
        let engine = engine_with(CompletionOutcome::ActionRequested(requests), fx.table);

        let output = engine.execute_turn(&seed_history()).await.unwrap();

        match output {
            TurnOutput::Dispatched { requests, results } => {
                assert_eq!(results.len(), requests.len());
                assert_eq!(results[0].action, "create_task");
                assert_eq!(results[0].text, "create_task completed");
                assert_eq!(results[1].action, "list_tasks");
                assert_eq!(results[1].text, "list_tasks completed");
            }
            other => panic!("unexpected output: {:?}", other),
        }
        assert_eq!(
            *fx.order.lock().unwrap(),
            vec!["create_task".to_string(), "list_tasks".to_string()]
        );
    }

    #[tokio::test]
    async fn each_handler_invoked_exactly_once() {
        let fx = fixture(&[("create_task", false)]);
        let requests = vec![ActionRequest::new("create_task", json!({}))];
        let engine = engine_with(CompletionOutcome::ActionRequested(requests), fx.table);

        engine.execute_turn(&seed_history()).await.unwrap();

        assert_eq!(fx.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_action_yields_advisory_text_without_blocking_siblings() {
        let fx = fixture(&[("list_tasks", false)]);
        let requests = vec![
            ActionRequest::new("launch_rocket", json!({"target": "moon"})),
            ActionRequest::new("list_tasks", json!({})),
        ];
        let engine = engine_with(CompletionOutcome::ActionRequested(requests), fx.table);

        let output = engine.execute_turn(&seed_history()).await.unwrap();

        match output {
            TurnOutput::Dispatched { results, .. } => {
                assert_eq!(results.len(), 2);
                assert!(!results[0].success);
                assert_eq!(
                    results[0].text,
                    "No handler found for action type: launch_rocket"
                );
                assert!(results[1].success);
            }
            other => panic!("unexpected output: {:?}", other),
        }
        assert_eq!(fx.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_handler_becomes_result_text_and_siblings_still_run() {
        let fx = fixture(&[("create_task", true), ("list_tasks", false)]);
        let requests = vec![
            ActionRequest::new("create_task", json!({})),
            ActionRequest::new("list_tasks", json!({})),
        ];
        let engine = engine_with(CompletionOutcome::ActionRequested(requests), fx.table);

        let output = engine.execute_turn(&seed_history()).await.unwrap();

        match output {
            TurnOutput::Dispatched { results, .. } => {
                assert!(!results[0].success);
                assert!(results[0].text.contains("create_task"));
                assert!(results[0].text.contains("failed"));
                assert!(results[1].success);
            }
            other => panic!("unexpected output: {:?}", other),
        }
        assert_eq!(fx.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn dispatch_preserves_correlation_ids() {
        let fx = fixture(&[("create_task", false)]);
        let requests = vec![ActionRequest::with_correlation_id(
            "create_task",
            json!({}),
            "call_9",
        )];
        let engine = engine_with(CompletionOutcome::ActionRequested(requests), fx.table);

        match engine.execute_turn(&seed_history()).await.unwrap() {
            TurnOutput::Dispatched { results, .. } => {
                assert_eq!(results[0].correlation_id.as_deref(), Some("call_9"));
            }
            other => panic!("unexpected output: {:?}", other),
        }
    }
}
