//! Operators exposed to the host runtime.
//!
//! - `load_visualization_results` - discover brain results and build plot data
//! - `apply_selection_from_plot` - push plot selections back to the host

mod load;
mod selection;
mod types;

pub use load::LoadVisualizationResults;
pub use selection::ApplySelectionFromPlot;
pub use types::{ElementType, InputForm, OperatorConfig, Property};

use crate::error::{Error, Result};
use crate::host::ExecutionContext;
use serde_json::Value;

/// A host-invocable operator.
pub trait Operator: Send + Sync {
    fn config(&self) -> OperatorConfig;

    /// Describe the inputs for the current parameters.
    fn resolve_input(&self, ctx: &ExecutionContext<'_>) -> InputForm;

    /// Run the operator. Failures are reported inside the returned value.
    fn execute(&self, ctx: &ExecutionContext<'_>) -> Value;
}

/// Operators registered by this plugin, in registration order.
#[derive(Default)]
pub struct PluginRegistry {
    operators: Vec<Box<dyn Operator>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every operator this plugin provides.
    pub fn register_all() -> Self {
        let mut registry = Self::new();
        registry.register(LoadVisualizationResults);
        registry.register(ApplySelectionFromPlot);
        registry
    }

    pub fn register<O: Operator + 'static>(&mut self, operator: O) {
        self.operators.push(Box::new(operator));
    }

    pub fn get(&self, name: &str) -> Result<&dyn Operator> {
        self.operators
            .iter()
            .find(|op| op.config().name == name)
            .map(|op| op.as_ref())
            .ok_or_else(|| Error::UnknownOperator(name.to_string()))
    }

    pub fn configs(&self) -> Vec<OperatorConfig> {
        self.operators.iter().map(|op| op.config()).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.operators.iter().map(|op| op.config().name).collect()
    }
}
