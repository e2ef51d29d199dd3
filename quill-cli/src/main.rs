#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use quill_actions::{ActionRegistry, HandlerTable};
use quill_agent::{Conversation, DispatchPolicy};
use quill_common::{logging, AgentConfig};
use quill_gateway::{CompletionProvider, OpenAiFunctionProvider, OpenAiStructuredProvider};

mod chat;

/// Quill - an assistant that creates notes and retrieves weather data.
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(version = "0.1.0")]
#[command(about = "Chat with an assistant that can take notes and look up weather.", long_about = None)]
struct Cli {
    /// How model output is turned into action requests
    #[arg(long, value_enum, default_value_t = Policy::Validated)]
    policy: Policy,

    /// Override the completion model configured in the environment
    #[arg(long)]
    model: Option<String>,

    /// Sampling temperature forwarded to the completion API
    #[arg(long)]
    temperature: Option<f64>,

    /// Send a single message and exit instead of starting the chat loop
    #[arg(long)]
    message: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log format (pretty, json)
    #[arg(long, default_value = "pretty")]
    log_format: String,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Policy {
    /// Provider-native function calling, at most one action per turn
    Untyped,
    /// Schema-validated output, any number of actions per turn
    Validated,
}

impl From<Policy> for DispatchPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Untyped => DispatchPolicy::Untyped,
            Policy::Validated => DispatchPolicy::Validated,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(&cli.log_level, &cli.log_format);

    let mut config = AgentConfig::from_env()?;
    if let Some(model) = cli.model {
        config.openai_model = model;
    }
    tracing::debug!(model = %config.openai_model, policy = ?cli.policy, "Configuration loaded");

    let provider: Arc<dyn CompletionProvider> = match cli.policy {
        Policy::Untyped => {
            Arc::new(OpenAiFunctionProvider::new(&config).with_temperature(cli.temperature))
        }
        Policy::Validated => {
            Arc::new(OpenAiStructuredProvider::new(&config).with_temperature(cli.temperature))
        }
    };

    let registry = ActionRegistry::builtin();
    let table = HandlerTable::builtin(&config);
    let mut conversation = Conversation::new(provider, registry, table, cli.policy.into());

    if let Some(message) = cli.message {
        for line in conversation.submit(&message).await? {
            println!("{line}");
        }
        return Ok(());
    }

    chat::run(&mut conversation).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_has_no_flag_conflicts() {
        Cli::command().debug_assert();
    }

    #[test]
    fn policy_defaults_to_validated() {
        let cli = Cli::parse_from(["quill"]);
        assert_eq!(cli.policy, Policy::Validated);
    }

    #[test]
    fn policy_flag_accepts_both_modes() {
        let cli = Cli::parse_from(["quill", "--policy", "untyped"]);
        assert_eq!(cli.policy, Policy::Untyped);

        let cli = Cli::parse_from(["quill", "--policy", "validated"]);
        assert_eq!(cli.policy, Policy::Validated);
    }

    #[test]
    fn policy_converts_to_dispatch_policy() {
        assert_eq!(
            DispatchPolicy::from(Policy::Untyped),
            DispatchPolicy::Untyped
        );
        assert_eq!(
            DispatchPolicy::from(Policy::Validated),
            DispatchPolicy::Validated
        );
    }
}
