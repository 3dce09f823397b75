use super::{ElementType, InputForm, Operator, OperatorConfig, Property};
use crate::host::ExecutionContext;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Forwards sample ids selected in the plot to the host's selection state.
pub struct ApplySelectionFromPlot;

#[derive(Debug, Default, Deserialize)]
struct SelectionParams {
    #[serde(default)]
    sample_ids: Option<Vec<String>>,
}

impl Operator for ApplySelectionFromPlot {
    fn config(&self) -> OperatorConfig {
        OperatorConfig {
            name: "apply_selection_from_plot".to_string(),
            label: "Apply Selection From Plot".to_string(),
            description: "Update the host sample selection from the 3D plot selection".to_string(),
            dynamic: false,
            unlisted: true,
        }
    }

    fn resolve_input(&self, _ctx: &ExecutionContext<'_>) -> InputForm {
        let mut form = InputForm::new();
        form.push(Property::List {
            name: "sample_ids".to_string(),
            label: "Sample IDs".to_string(),
            description: "List of selected sample IDs".to_string(),
            element: ElementType::String,
        });
        form
    }

    fn execute(&self, ctx: &ExecutionContext<'_>) -> Value {
        let params: SelectionParams = ctx.parse_params().unwrap_or_else(|e| {
            warn!("Unreadable selection parameters, clearing selection: {}", e);
            SelectionParams::default()
        });
        let sample_ids = params.sample_ids.unwrap_or_default();

        debug!(count = sample_ids.len(), "applying plot selection");
        ctx.ops.set_selected_samples(&sample_ids);

        json!({})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PluginConfig;
    use crate::memory::{MemoryLog, RecordingOps};
    use serde_json::Map;

    fn execute(params: Value) -> Vec<Vec<String>> {
        let ops = RecordingOps::new();
        let log = MemoryLog::new();
        let config = PluginConfig::default();
        let ctx = ExecutionContext {
            dataset: None,
            params: match params {
                Value::Object(map) => map,
                _ => Map::new(),
            },
            ops: &ops,
            log: &log,
            config: &config,
        };
        assert_eq!(ApplySelectionFromPlot.execute(&ctx), json!({}));
        ops.calls()
    }

    #[test]
    fn forwards_ids_exactly_once() {
        let calls = execute(json!({"sample_ids": ["a", "b"]}));
        assert_eq!(calls, vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn forwards_empty_selection() {
        assert_eq!(execute(json!({"sample_ids": []})), vec![Vec::<String>::new()]);
    }

    #[test]
    fn missing_ids_clear_selection() {
        assert_eq!(execute(json!({})), vec![Vec::<String>::new()]);
        assert_eq!(execute(json!({"sample_ids": null})), vec![Vec::<String>::new()]);
    }

    #[test]
    fn form_declares_string_list() {
        let ops = RecordingOps::new();
        let config = PluginConfig::default();
        let ctx = ExecutionContext {
            dataset: None,
            params: Map::new(),
            ops: &ops,
            log: &crate::host::NullLog,
            config: &config,
        };
        let form = ApplySelectionFromPlot.resolve_input(&ctx);
        assert!(matches!(
            form.get("sample_ids"),
            Some(Property::List {
                element: ElementType::String,
                ..
            })
        ));
    }
}
