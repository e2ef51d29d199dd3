//! Weather report handler.
//!
//! Produces the report locally with no outbound call. Kept behind the same
//! trait as the network-backed handlers so the dispatch path is uniform.

use async_trait::async_trait;
use serde::Deserialize;

use crate::handler::{ActionError, ActionHandler};

/// Handler for the `get_weather` action.
#[derive(Debug, Default)]
pub struct WeatherHandler;

/// Arguments accepted by `get_weather`.
#[derive(Debug, Deserialize)]
struct WeatherArgs {
    location: String,
}

impl WeatherHandler {
    /// Create the handler.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ActionHandler for WeatherHandler {
    fn name(&self) -> &str {
        "get_weather"
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ActionError> {
        let args: WeatherArgs = serde_json::from_value(arguments)
            .map_err(|e| ActionError::InvalidArguments(e.to_string()))?;

        tracing::debug!(location = %args.location, "Weather report requested");
        Ok(format!("Retrieved weather data for {}.", args.location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn weather_report_names_the_location() {
        let handler = WeatherHandler::new();
        let result = handler
            .execute(json!({"location": "Bergen"}))
            .await
            .unwrap();

        assert_eq!(result, "Retrieved weather data for Bergen.");
    }

    #[tokio::test]
    async fn weather_rejects_missing_location() {
        let handler = WeatherHandler::new();
        let err = handler.execute(json!({})).await.unwrap_err();

        match err {
            ActionError::InvalidArguments(msg) => assert!(msg.contains("location")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
