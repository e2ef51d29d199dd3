//! Typed action payloads for the validated policy.
//!
//! One variant per registered action descriptor, tagged with the action
//! name. Coercing a raw model object into [`ActionPayload`] is the schema
//! check: required fields must be present with the right types, optional
//! fields fall back to their declared defaults. Names outside the closed
//! set fail to coerce here and are instead passed through untyped for the
//! dispatch engine to classify.

use quill_common::action::ActionRequest;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Default title for inserted notes.
fn default_note_title() -> String {
    "Note".to_string()
}

/// Schema-checked action request, one variant per descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionPayload {
    /// Insert a note into the note store.
    InsertNote {
        /// The note text to insert.
        text: String,
        /// Title for the note.
        #[serde(default = "default_note_title")]
        title: String,
    },
    /// Retrieve weather data for a location.
    GetWeather {
        /// The location to retrieve the weather for.
        location: String,
    },
}

impl ActionPayload {
    /// Whether a tag names one of the typed variants.
    pub fn is_known(tag: &str) -> bool {
        matches!(tag, "insert_note" | "get_weather")
    }

    /// The action name this payload is tagged with.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InsertNote { .. } => "insert_note",
            Self::GetWeather { .. } => "get_weather",
        }
    }

    /// Canonical argument object, with defaults materialized.
    pub fn arguments(&self) -> serde_json::Value {
        match self {
            Self::InsertNote { text, title } => json!({ "text": text, "title": title }),
            Self::GetWeather { location } => json!({ "location": location }),
        }
    }

    /// Convert into the untyped request shape the dispatch engine consumes.
    pub fn into_request(self) -> ActionRequest {
        ActionRequest::new(self.name(), self.arguments())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_insert_note_with_default_title() {
        let payload: ActionPayload =
            serde_json::from_value(json!({"action": "insert_note", "text": "old pond"})).unwrap();

        match &payload {
            ActionPayload::InsertNote { text, title } => {
                assert_eq!(text, "old pond");
                assert_eq!(title, "Note");
            }
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[test]
    fn coerces_get_weather() {
        let payload: ActionPayload =
            serde_json::from_value(json!({"action": "get_weather", "location": "Bergen"}))
                .unwrap();

        assert_eq!(payload.name(), "get_weather");
        assert_eq!(payload.arguments()["location"], "Bergen");
    }

    #[test]
    fn missing_required_field_fails_coercion() {
        let result: Result<ActionPayload, _> =
            serde_json::from_value(json!({"action": "insert_note", "title": "just a title"}));

        let err = result.unwrap_err().to_string();
        assert!(err.contains("text"), "error should name the field: {}", err);
    }

    #[test]
    fn wrong_type_fails_coercion() {
        let result: Result<ActionPayload, _> =
            serde_json::from_value(json!({"action": "get_weather", "location": 42}));

        assert!(result.is_err());
    }

    #[test]
    fn unknown_tag_fails_coercion() {
        let result: Result<ActionPayload, _> =
            serde_json::from_value(json!({"action": "launch_rocket", "target": "moon"}));

        assert!(result.is_err());
        assert!(!ActionPayload::is_known("launch_rocket"));
    }

    #[test]
    fn known_tags_cover_the_builtin_registry() {
        let registry = crate::registry::ActionRegistry::builtin();
        for descriptor in registry.describe_actions() {
            assert!(
                ActionPayload::is_known(&descriptor.name),
                "no typed variant for {}",
                descriptor.name
            );
        }
    }

    #[test]
    fn into_request_materializes_defaults() {
        let payload: ActionPayload =
            serde_json::from_value(json!({"action": "insert_note", "text": "sea foam"})).unwrap();
        let request = payload.into_request();

        assert_eq!(request.name, "insert_note");
        assert_eq!(request.arguments["title"], "Note");
        assert!(request.correlation_id.is_none());
    }
}
