//! Conversation session driver.
//!
//! Owns the append-only history, runs one turn per user input through the
//! dispatch engine, and folds every exchanged message back in: the user
//! turn, the model's reply or action-request marker, and one tool-result
//! turn per dispatched action. Under the untyped policy a second model pass
//! phrases the raw results for display.

use std::sync::Arc;

use uuid::Uuid;

use quill_actions::{ActionRegistry, HandlerTable};
use quill_common::conversation::Turn;
use quill_gateway::{CompletionError, CompletionProvider};

use crate::engine::{DispatchEngine, TurnOutput};

/// Which provider policy the session runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// Untyped function calling; raw results are phrased by a second pass.
    Untyped,
    /// Schema-validated structured output; results are displayed directly.
    Validated,
}

/// One linear conversation session.
pub struct Conversation {
    engine: DispatchEngine,
    provider: Arc<dyn CompletionProvider>,
    policy: DispatchPolicy,
    history: Vec<Turn>,
    session_id: Uuid,
}

impl Conversation {
    /// Start a session seeded with the system prompt.
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        registry: ActionRegistry,
        table: HandlerTable,
        policy: DispatchPolicy,
    ) -> Self {
        let session_id = Uuid::new_v4();
        tracing::info!(session_id = %session_id, policy = ?policy, "Session started");

        Self {
            engine: DispatchEngine::new(Arc::clone(&provider), registry, table),
            provider,
            policy,
            history: vec![Turn::system(system_prompt())],
            session_id,
        }
    }

    /// Run one turn for the given user input.
    ///
    /// Returns the display strings the turn produced, in order: one for a
    /// direct reply, one per action result under the validated policy, one
    /// phrased summary under the untyped policy. The history is extended
    /// with every exchanged message before this returns.
    pub async fn submit(&mut self, user_input: &str) -> Result<Vec<String>, CompletionError> {
        self.history.push(Turn::user(user_input));

        let output = self.engine.execute_turn(&self.history).await?;

        match output {
            TurnOutput::Reply(text) => {
                self.history.push(Turn::assistant(text.clone()));
                Ok(vec![text])
            }
            TurnOutput::Dispatched { requests, results } => {
                self.history.push(Turn::action_request(requests));
                for result in &results {
                    self.history.push(Turn::tool_result(result));
                }

                match self.policy {
                    DispatchPolicy::Validated => {
                        Ok(results.into_iter().map(|r| r.text).collect())
                    }
                    DispatchPolicy::Untyped => {
                        match self.provider.phrase(&self.history).await {
                            Ok(text) => {
                                self.history.push(Turn::assistant(text.clone()));
                                Ok(vec![text])
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "Phrasing pass failed; showing raw results");
                                Ok(results.into_iter().map(|r| r.text).collect())
                            }
                        }
                    }
                }
            }
        }
    }

    /// Read-only view of the history.
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Identifier of this session, for log correlation.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }
}

/// System prompt seeded as the first history turn.
fn system_prompt() -> String {
    format!(
        "You are an assistant that can create notes and retrieve weather data. \
         The current date is: {}",
        chrono::Local::now().date_naive()
    )
}
