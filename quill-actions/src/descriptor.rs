//! Action descriptors.
//!
//! A descriptor declares an invocable capability: its name, a description
//! shown to the model, and a typed parameter schema. Descriptors are pure
//! data; execution lives behind the handler table.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// One parameter of an action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter name as it appears in the argument object.
    pub name: String,
    /// JSON type ("string", "number", "boolean", ...).
    pub kind: String,
    /// Description shown to the model.
    pub description: String,
    /// Whether the model must supply this parameter.
    pub required: bool,
}

impl ParameterSpec {
    /// Declare a required parameter.
    pub fn required(name: &str, kind: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            description: description.to_string(),
            required: true,
        }
    }

    /// Declare an optional parameter.
    pub fn optional(name: &str, kind: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            description: description.to_string(),
            required: false,
        }
    }
}

/// Static declaration of one invocable action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDescriptor {
    /// Unique action name.
    pub name: String,
    /// Description shown to the model.
    pub description: String,
    /// Ordered parameter declarations.
    pub parameters: Vec<ParameterSpec>,
}

impl ActionDescriptor {
    /// Create a descriptor.
    pub fn new(name: &str, description: &str, parameters: Vec<ParameterSpec>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        }
    }

    /// Render the parameter declarations as a JSON Schema object.
    ///
    /// This is the shape OpenAI-style function calling expects under
    /// `function.parameters`.
    pub fn parameters_schema(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &self.parameters {
            properties.insert(
                param.name.clone(),
                json!({
                    "type": param.kind,
                    "description": param.description,
                }),
            );
            if param.required {
                required.push(serde_json::Value::String(param.name.clone()));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}
