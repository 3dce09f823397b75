//! Operator metadata and input form descriptions.

use serde::{Deserialize, Serialize};

/// Static description of an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorConfig {
    pub name: String,
    pub label: String,
    pub description: String,
    /// Input form depends on current parameters and is re-resolved on change
    #[serde(default)]
    pub dynamic: bool,
    /// Hidden from operator browsers; invoked programmatically
    #[serde(default)]
    pub unlisted: bool,
}

/// Element type of a list input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    String,
}

/// One entry of an input form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Property {
    /// Choice from a fixed list
    Enum {
        name: String,
        label: String,
        description: String,
        choices: Vec<String>,
        default: Option<String>,
        required: bool,
    },
    /// List of primitive values
    List {
        name: String,
        label: String,
        description: String,
        element: ElementType,
    },
    /// Warning banner
    Warning {
        name: String,
        label: String,
        description: String,
    },
    /// Informational banner
    Notice { name: String, label: String },
}

impl Property {
    pub fn name(&self) -> &str {
        match self {
            Property::Enum { name, .. }
            | Property::List { name, .. }
            | Property::Warning { name, .. }
            | Property::Notice { name, .. } => name,
        }
    }
}

/// Ordered set of inputs shown before execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputForm {
    pub properties: Vec<Property>,
}

impl InputForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, property: Property) {
        self.properties.push(property);
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
