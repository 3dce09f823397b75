use super::{InputForm, Operator, OperatorConfig, Property};
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::fields::{color_fields, selected_color_field, NO_COLOR_FIELD};
use crate::host::ExecutionContext;
use crate::plot::{prepare_plot_data, PlotData, PLOT_DIMS};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Loads a 3D visualization brain result and returns plot data for the panel.
pub struct LoadVisualizationResults;

#[derive(Debug, Default, Deserialize)]
struct LoadParams {
    #[serde(default)]
    brain_key: Option<String>,
    #[serde(default)]
    color_by: Option<String>,
}

impl LoadParams {
    fn brain_key(&self) -> Option<&str> {
        self.brain_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

impl Operator for LoadVisualizationResults {
    fn config(&self) -> OperatorConfig {
        OperatorConfig {
            name: "load_visualization_results".to_string(),
            label: "Load 3D Visualization Results".to_string(),
            description: "Load 3D embeddings visualization from brain results".to_string(),
            dynamic: true,
            unlisted: false,
        }
    }

    fn resolve_input(&self, ctx: &ExecutionContext<'_>) -> InputForm {
        let mut form = InputForm::new();

        let Some(dataset) = ctx.dataset else {
            return form;
        };

        let brain_keys = dataset.list_brain_runs(&ctx.config.visualization_run_type);
        if brain_keys.is_empty() {
            form.push(Property::Warning {
                name: "warning".to_string(),
                label: "No 3D visualizations found".to_string(),
                description: "Compute a 3D visualization brain run on this dataset first"
                    .to_string(),
            });
            return form;
        }

        let default_key = if brain_keys.len() == 1 {
            Some(brain_keys[0].clone())
        } else {
            None
        };

        form.push(Property::Enum {
            name: "brain_key".to_string(),
            label: "Brain Key".to_string(),
            description: "Select the visualization to load".to_string(),
            choices: brain_keys,
            default: default_key.clone(),
            required: false,
        });

        form.push(Property::Enum {
            name: "color_by".to_string(),
            label: "Color By".to_string(),
            description: "Field to use for point colors".to_string(),
            choices: color_fields(dataset),
            default: Some(NO_COLOR_FIELD.to_string()),
            required: false,
        });

        let params: LoadParams = ctx.parse_params().unwrap_or_else(|e| {
            warn!("Ignoring unreadable parameters while resolving inputs: {}", e);
            LoadParams::default()
        });

        let Some(brain_key) = params.brain_key().or(default_key.as_deref()) else {
            return form;
        };

        match dataset.load_brain_results(brain_key) {
            Ok(results) => {
                let (n_samples, dims) = results.shape();
                form.push(Property::Notice {
                    name: "info".to_string(),
                    label: format!(
                        "Visualization: {} samples, {} method, {}D",
                        n_samples, results.config.method, dims
                    ),
                });
            }
            Err(e) => {
                warn!("Failed to load brain key '{}' for summary: {}", brain_key, e);
                form.push(Property::Warning {
                    name: "warning".to_string(),
                    label: format!("Could not load visualization '{}'", brain_key),
                    description: e.to_string(),
                });
            }
        }

        form
    }

    fn execute(&self, ctx: &ExecutionContext<'_>) -> Value {
        let outcome = load_plot_data(ctx).and_then(|data| {
            let plot_data = serde_json::to_value(&data)?;
            Ok(json!({ "plot_data": plot_data }))
        });

        match outcome {
            Ok(result) => {
                ctx.log("Returning result with keys: [\"plot_data\"]");
                result
            }
            Err(e) => {
                ctx.log_error(&log_message(&e));
                json!({ "error": e.to_string() })
            }
        }
    }
}

fn load_plot_data(ctx: &ExecutionContext<'_>) -> Result<PlotData> {
    let dataset = ctx.dataset()?;
    let params: LoadParams = ctx.parse_params()?;
    let color_by = selected_color_field(params.color_by.as_deref());

    let brain_key = match params.brain_key() {
        Some(key) => key.to_string(),
        None => {
            let key = first_visualization(dataset, &ctx.config.visualization_run_type)?;
            ctx.log(&format!("Auto-selected brain key: {}", key));
            key
        }
    };

    ctx.log(&format!("Loading brain results for key: {}", brain_key));
    let results = dataset.load_brain_results(&brain_key)?;
    let (rows, dims) = results.shape();
    ctx.log(&format!(
        "Brain results loaded. Points shape: ({}, {})",
        rows, dims
    ));

    if dims != PLOT_DIMS {
        return Err(Error::Dimensionality {
            key: brain_key,
            dims,
            expected: PLOT_DIMS,
        });
    }
    results.validate()?;

    ctx.log(&format!(
        "Preparing plot data with color_by: {}",
        color_by.unwrap_or(NO_COLOR_FIELD)
    ));
    let data = prepare_plot_data(dataset, &results, color_by, ctx.config)?;
    data.validate()?;
    debug!(scheme = ?data.color_scheme, "plot data prepared");
    ctx.log(&format!("Plot data prepared. Points: {}", data.len()));

    Ok(data)
}

fn first_visualization(dataset: &dyn Dataset, run_type: &str) -> Result<String> {
    dataset
        .list_brain_runs(run_type)
        .into_iter()
        .next()
        .ok_or(Error::NoVisualizations)
}

/// Host log line for a failed load; names the key where the payload does not.
fn log_message(err: &Error) -> String {
    match err {
        Error::Dimensionality {
            key,
            dims,
            expected,
        } => format!(
            "Brain key '{}' has {}D embeddings, not {}D",
            key, dims, expected
        ),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PluginConfig;
    use crate::dataset::{BrainResults, BrainRunConfig, FieldKind, Sample};
    use crate::memory::{MemoryDataset, MemoryLog, RecordingOps};
    use serde_json::Map;

    fn results(key: &str, points: Vec<Vec<f64>>) -> BrainResults {
        BrainResults {
            key: key.to_string(),
            sample_ids: (0..points.len()).map(|i| format!("sample{:04}", i)).collect(),
            points,
            num_dims: None,
            config: BrainRunConfig {
                method: "umap".to_string(),
                run_type: "visualization".to_string(),
            },
        }
    }

    fn params(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn run(dataset: &MemoryDataset, p: Value) -> (InputForm, Value, Vec<String>) {
        let ops = RecordingOps::new();
        let log = MemoryLog::new();
        let config = PluginConfig::default();
        let ctx = ExecutionContext {
            dataset: Some(dataset),
            params: params(p),
            ops: &ops,
            log: &log,
            config: &config,
        };
        let form = LoadVisualizationResults.resolve_input(&ctx);
        let result = LoadVisualizationResults.execute(&ctx);
        (form, result, log.lines())
    }

    #[test]
    fn no_results_warns_and_errors() {
        let dataset = MemoryDataset::new("empty");
        let (form, result, lines) = run(&dataset, json!({}));

        assert_eq!(form.properties.len(), 1);
        assert!(matches!(&form.properties[0], Property::Warning { label, .. } if label == "No 3D visualizations found"));
        assert_eq!(result, json!({"error": "No 3D visualizations found"}));
        assert_eq!(lines, vec!["ERROR: No 3D visualizations found"]);
    }

    #[test]
    fn single_result_is_preselected_and_summarized() {
        let dataset = MemoryDataset::new("d")
            .with_field("ground_truth", FieldKind::Classification)
            .with_results(results("umap3d", vec![vec![0.0, 0.0, 0.0]; 4]));
        let (form, _, _) = run(&dataset, json!({}));

        match form.get("brain_key") {
            Some(Property::Enum { choices, default, .. }) => {
                assert_eq!(choices, &vec!["umap3d".to_string()]);
                assert_eq!(default.as_deref(), Some("umap3d"));
            }
            other => panic!("unexpected brain_key property: {:?}", other),
        }
        match form.get("color_by") {
            Some(Property::Enum { choices, default, .. }) => {
                assert_eq!(choices, &vec!["None".to_string(), "ground_truth.label".to_string()]);
                assert_eq!(default.as_deref(), Some("None"));
            }
            other => panic!("unexpected color_by property: {:?}", other),
        }
        assert!(matches!(
            form.get("info"),
            Some(Property::Notice { label, .. }) if label == "Visualization: 4 samples, umap method, 3D"
        ));
    }

    #[test]
    fn several_results_require_a_choice() {
        let dataset = MemoryDataset::new("d")
            .with_results(results("a", vec![vec![0.0, 0.0, 0.0]]))
            .with_results(results("b", vec![vec![0.0, 0.0]]));
        let (form, _, _) = run(&dataset, json!({}));

        assert!(matches!(form.get("brain_key"), Some(Property::Enum { default: None, .. })));
        assert!(form.get("info").is_none());

        let (form, _, _) = run(&dataset, json!({"brain_key": "b"}));
        assert!(matches!(
            form.get("info"),
            Some(Property::Notice { label, .. }) if label.ends_with("2D")
        ));
    }

    #[test]
    fn two_dimensional_results_are_rejected() {
        let dataset =
            MemoryDataset::new("d").with_results(results("flat", vec![vec![1.0, 2.0]; 3]));
        let (_, result, lines) = run(&dataset, json!({"brain_key": "flat"}));

        assert_eq!(result, json!({"error": "Brain key has 2D embeddings, not 3D"}));
        assert!(lines.contains(&"ERROR: Brain key 'flat' has 2D embeddings, not 3D".to_string()));
    }

    #[test]
    fn four_dimensional_results_are_rejected() {
        let dataset =
            MemoryDataset::new("d").with_results(results("deep", vec![vec![1.0, 2.0, 3.0, 4.0]; 2]));
        let (_, result, lines) = run(&dataset, json!({}));

        assert_eq!(result, json!({"error": "Brain key has 4D embeddings, not 3D"}));
        assert!(result.get("plot_data").is_none());
        assert!(lines.contains(&"ERROR: Brain key 'deep' has 4D embeddings, not 3D".to_string()));
    }

    #[test]
    fn ragged_rows_are_reported_not_plotted() {
        let mut r = results("ragged", vec![vec![1.0, 2.0, 3.0]; 2]);
        r.points[1] = vec![1.0, 2.0];
        r.num_dims = Some(3);
        let dataset = MemoryDataset::new("d").with_results(r);
        let (_, result, _) = run(&dataset, json!({"brain_key": "ragged"}));

        let message = result["error"].as_str().unwrap();
        assert!(message.starts_with("malformed brain results for 'ragged'"), "{}", message);
    }

    #[test]
    fn omitted_key_uses_first_result() {
        let dataset = MemoryDataset::new("d")
            .with_results(results("first", vec![vec![1.0, 2.0, 3.0]]))
            .with_results(results("second", vec![vec![4.0, 5.0, 6.0]; 2]));
        let (_, result, lines) = run(&dataset, json!({"color_by": "None"}));

        assert_eq!(result["plot_data"]["x"], json!([1.0]));
        assert_eq!(result["plot_data"]["color_scheme"], "uniform");
        assert_eq!(lines[0], "Auto-selected brain key: first");
    }

    #[test]
    fn unknown_key_reports_error() {
        let dataset =
            MemoryDataset::new("d").with_results(results("a", vec![vec![0.0, 0.0, 0.0]]));
        let (form, result, _) = run(&dataset, json!({"brain_key": "missing"}));

        assert_eq!(result, json!({"error": "unknown brain key: missing"}));
        assert!(matches!(form.get("warning"), Some(Property::Warning { .. })));
    }

    #[test]
    fn colors_by_requested_field() {
        let mut r = results("viz", vec![vec![0.0, 1.0, 2.0]; 2]);
        r.sample_ids = vec!["s1".to_string(), "s2".to_string()];
        let dataset = MemoryDataset::new("d")
            .with_field("confidence", FieldKind::Float)
            .with_results(r)
            .with_sample(Sample {
                id: "s1".to_string(),
                fields: serde_json::from_value(json!({"confidence": 0.5})).unwrap(),
            });
        let (_, result, lines) = run(&dataset, json!({"color_by": "confidence"}));

        let data = &result["plot_data"];
        assert_eq!(data["color_scheme"], "continuous");
        assert_eq!(data["colors"], json!([0.5, 0.0]));
        assert_eq!(data["labels"], json!(["0.5", "None"]));
        assert!(lines.contains(&"Preparing plot data with color_by: confidence".to_string()));
    }

    #[test]
    fn missing_dataset_is_reported() {
        let ops = RecordingOps::new();
        let log = MemoryLog::new();
        let config = PluginConfig::default();
        let ctx = ExecutionContext {
            dataset: None,
            params: Map::new(),
            ops: &ops,
            log: &log,
            config: &config,
        };
        assert!(LoadVisualizationResults.resolve_input(&ctx).is_empty());
        assert_eq!(
            LoadVisualizationResults.execute(&ctx),
            json!({"error": "no dataset loaded"})
        );
    }
}
