//! Action schema registry.
//!
//! A fixed, ordered list of [`ActionDescriptor`]s declared at startup.
//! Providers read it to tell the model what it may ask for; the dispatch
//! engine reads it for identifiers only. Enumeration order is stable for
//! the lifetime of the registry.

use crate::descriptor::{ActionDescriptor, ParameterSpec};

/// Read-only collection of action descriptors.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    descriptors: Vec<ActionDescriptor>,
}

impl ActionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    /// Registry with the built-in actions.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(ActionDescriptor::new(
            "insert_note",
            "Insert a note into the note store",
            vec![
                ParameterSpec::required("text", "string", "The note text to insert"),
                ParameterSpec::optional("title", "string", "Title for the note"),
            ],
        ));
        registry.register(ActionDescriptor::new(
            "get_weather",
            "Retrieve weather data for a location",
            vec![ParameterSpec::required(
                "location",
                "string",
                "The location to retrieve the weather for",
            )],
        ));
        registry
    }

    /// Add a descriptor. Registration order is enumeration order.
    pub fn register(&mut self, descriptor: ActionDescriptor) {
        self.descriptors.push(descriptor);
    }

    /// Enumerate all descriptors in registration order.
    pub fn describe_actions(&self) -> &[ActionDescriptor] {
        &self.descriptors
    }

    /// Look up a descriptor by name.
    pub fn get(&self, name: &str) -> Option<&ActionDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    /// Whether a descriptor with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names of all registered actions, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.name.as_str()).collect()
    }
}
