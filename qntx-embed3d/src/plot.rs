//! Plot payload construction.
//!
//! Turns a 3D brain result into parallel coordinate, label, and color arrays
//! for the scatter panel. Coloring is uniform when no field is chosen,
//! continuous when every present value is numeric, and categorical otherwise.

use crate::config::PluginConfig;
use crate::dataset::{BrainResults, Dataset};
use crate::error::{Error, Result};
use crate::palette::generate_palette;
use crate::value::{resolve_path, FieldValue};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Number of coordinate columns a result must have to be plotted.
pub const PLOT_DIMS: usize = 3;

/// How `colors` should be interpreted by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Uniform,
    Continuous,
    Categorical,
}

/// Per-point colors: hex strings, or raw numbers for the front end's gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Colors {
    Hex(Vec<String>),
    Values(Vec<f64>),
}

impl Colors {
    pub fn len(&self) -> usize {
        match self {
            Colors::Hex(c) => c.len(),
            Colors::Values(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Plot-ready payload for the 3D scatter panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotData {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub sample_ids: Vec<String>,
    pub labels: Vec<String>,
    pub colors: Colors,
    pub color_scheme: ColorScheme,
}

impl PlotData {
    /// Number of points.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Check that every per-point array has the same length.
    pub fn validate(&self) -> Result<()> {
        let n = self.x.len();
        let lengths = [
            ("y", self.y.len()),
            ("z", self.z.len()),
            ("sample_ids", self.sample_ids.len()),
            ("labels", self.labels.len()),
            ("colors", self.colors.len()),
        ];
        for (name, len) in lengths {
            if len != n {
                return Err(Error::InvalidPlotData(format!(
                    "{} has {} entries, x has {}",
                    name, len, n
                )));
            }
        }
        Ok(())
    }
}

/// Labels, colors, and scheme computed for one coloring choice.
#[derive(Debug, Clone, PartialEq)]
pub struct Coloring {
    pub labels: Vec<String>,
    pub colors: Colors,
    pub scheme: ColorScheme,
}

/// Build the plot payload for `results`, optionally colored by `color_by`.
///
/// Every row must have exactly [`PLOT_DIMS`] columns.
pub fn prepare_plot_data(
    dataset: &dyn Dataset,
    results: &BrainResults,
    color_by: Option<&str>,
    config: &PluginConfig,
) -> Result<PlotData> {
    let n = results.points.len();
    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    let mut z = Vec::with_capacity(n);
    for (row, point) in results.points.iter().enumerate() {
        let &[px, py, pz] = point.as_slice() else {
            return Err(Error::MalformedResults {
                key: results.key.clone(),
                reason: format!(
                    "row {} has {} columns, expected {}",
                    row,
                    point.len(),
                    PLOT_DIMS
                ),
            });
        };
        x.push(px);
        y.push(py);
        z.push(pz);
    }

    let coloring = match color_by {
        Some(field) => compute_colors(dataset, &results.sample_ids, field),
        None => uniform_colors(&results.sample_ids, config),
    };

    Ok(PlotData {
        x,
        y,
        z,
        sample_ids: results.sample_ids.clone(),
        labels: coloring.labels,
        colors: coloring.colors,
        color_scheme: coloring.scheme,
    })
}

/// Single default color; labels are short id prefixes.
pub fn uniform_colors(sample_ids: &[String], config: &PluginConfig) -> Coloring {
    Coloring {
        labels: sample_ids
            .iter()
            .map(|id| id.chars().take(config.label_length).collect())
            .collect(),
        colors: Colors::Hex(vec![config.default_color.clone(); sample_ids.len()]),
        scheme: ColorScheme::Uniform,
    }
}

/// Color each sample by the value found at the dotted `field` path.
pub fn compute_colors(dataset: &dyn Dataset, sample_ids: &[String], field: &str) -> Coloring {
    let values: Vec<Option<&FieldValue>> = sample_ids
        .iter()
        .map(|id| {
            dataset
                .sample(id)
                .and_then(|sample| resolve_path(sample, field))
        })
        .collect();

    let labels: Vec<String> = values
        .iter()
        .map(|v| match v {
            Some(value) => value.to_string(),
            None => "None".to_string(),
        })
        .collect();

    let is_numeric = values.iter().flatten().all(|v| v.as_number().is_some());

    if is_numeric {
        let numbers = values
            .iter()
            .map(|v| v.and_then(FieldValue::as_number).unwrap_or(0.0))
            .collect();
        return Coloring {
            labels,
            colors: Colors::Values(numbers),
            scheme: ColorScheme::Continuous,
        };
    }

    let unique: BTreeSet<&str> = labels.iter().map(String::as_str).collect();
    let palette = generate_palette(unique.len());
    let color_map: HashMap<&str, &String> = unique.into_iter().zip(palette.iter()).collect();
    let colors = labels
        .iter()
        .map(|label| color_map[label.as_str()].clone())
        .collect();

    Coloring {
        labels,
        colors: Colors::Hex(colors),
        scheme: ColorScheme::Categorical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{BrainRunConfig, FieldKind, Sample};
    use crate::memory::MemoryDataset;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample(id: &str, fields: serde_json::Value) -> Sample {
        Sample {
            id: id.to_string(),
            fields: serde_json::from_value(fields).unwrap(),
        }
    }

    fn results(ids: &[&str]) -> BrainResults {
        BrainResults {
            key: "viz".to_string(),
            sample_ids: ids.iter().map(|s| s.to_string()).collect(),
            points: ids
                .iter()
                .enumerate()
                .map(|(i, _)| vec![i as f64, i as f64 + 0.5, -(i as f64)])
                .collect(),
            num_dims: None,
            config: BrainRunConfig {
                method: "umap".to_string(),
                run_type: "visualization".to_string(),
            },
        }
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn uniform_payload_has_parallel_arrays() {
        let dataset = MemoryDataset::new("d");
        let r = results(&["0123456789abcdef", "short", "fedcba9876543210"]);
        let data = prepare_plot_data(&dataset, &r, None, &PluginConfig::default()).unwrap();

        assert_eq!(data.x, vec![0.0, 1.0, 2.0]);
        assert_eq!(data.y, vec![0.5, 1.5, 2.5]);
        assert_eq!(data.z, vec![0.0, -1.0, -2.0]);
        assert_eq!(data.sample_ids, r.sample_ids);
        assert_eq!(data.labels, vec!["01234567", "short", "fedcba98"]);
        assert_eq!(data.colors, Colors::Hex(vec!["#1f77b4".to_string(); 3]));
        assert_eq!(data.color_scheme, ColorScheme::Uniform);
        assert!(data.validate().is_ok());
    }

    #[test]
    fn numeric_field_is_continuous_with_zero_for_missing() {
        let dataset = MemoryDataset::new("d")
            .with_field("score", FieldKind::Float)
            .with_sample(sample("a", json!({"score": 0.25})))
            .with_sample(sample("b", json!({})))
            .with_sample(sample("c", json!({"score": 7})));

        let coloring = compute_colors(&dataset, &ids(&["a", "b", "c"]), "score");
        assert_eq!(coloring.scheme, ColorScheme::Continuous);
        assert_eq!(coloring.colors, Colors::Values(vec![0.25, 0.0, 7.0]));
        assert_eq!(coloring.labels, vec!["0.25", "None", "7"]);
    }

    #[test]
    fn all_missing_is_continuous() {
        let dataset = MemoryDataset::new("d").with_sample(sample("a", json!({})));
        let coloring = compute_colors(&dataset, &ids(&["a", "missing"]), "score");
        assert_eq!(coloring.scheme, ColorScheme::Continuous);
        assert_eq!(coloring.colors, Colors::Values(vec![0.0, 0.0]));
        assert_eq!(coloring.labels, vec!["None", "None"]);
    }

    #[test]
    fn categorical_colors_follow_sorted_labels() {
        let dataset = MemoryDataset::new("d")
            .with_sample(sample("a", json!({"gt": {"label": "dog"}})))
            .with_sample(sample("b", json!({"gt": {"label": "cat"}})))
            .with_sample(sample("c", json!({"gt": {"label": "dog"}})))
            .with_sample(sample("d", json!({"gt": null})));

        let coloring = compute_colors(&dataset, &ids(&["a", "b", "c", "d"]), "gt.label");
        assert_eq!(coloring.scheme, ColorScheme::Categorical);
        assert_eq!(coloring.labels, vec!["dog", "cat", "dog", "None"]);
        // sorted: None, cat, dog
        assert_eq!(
            coloring.colors,
            Colors::Hex(ids(&["#2ca02c", "#ff7f0e", "#2ca02c", "#1f77b4"]))
        );
    }

    #[test]
    fn mixed_values_fall_back_to_categorical() {
        let dataset = MemoryDataset::new("d")
            .with_sample(sample("a", json!({"v": 1})))
            .with_sample(sample("b", json!({"v": "one"})));

        let coloring = compute_colors(&dataset, &ids(&["a", "b"]), "v");
        assert_eq!(coloring.scheme, ColorScheme::Categorical);
        assert_eq!(coloring.colors, Colors::Hex(ids(&["#1f77b4", "#ff7f0e"])));
    }

    #[test]
    fn many_categories_get_generated_palette() {
        let mut dataset = MemoryDataset::new("d");
        let names: Vec<String> = (0..14).map(|i| format!("s{:02}", i)).collect();
        for name in &names {
            dataset = dataset.with_sample(sample(name, json!({"gt": {"label": name}})));
        }

        let coloring = compute_colors(&dataset, &names, "gt.label");
        let palette = generate_palette(14);
        assert_eq!(coloring.colors, Colors::Hex(palette));
    }

    #[test]
    fn rows_without_three_columns_are_rejected() {
        let dataset = MemoryDataset::new("d");
        let config = PluginConfig::default();
        for row in [vec![1.0, 2.0], vec![1.0, 2.0, 3.0, 4.0]] {
            let mut r = results(&["a", "b"]);
            r.points[1] = row.clone();
            let err = prepare_plot_data(&dataset, &r, None, &config).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!(
                    "malformed brain results for 'viz': row 1 has {} columns, expected 3",
                    row.len()
                )
            );
        }
    }

    #[test]
    fn validate_rejects_ragged_payload() {
        let data = PlotData {
            x: vec![0.0, 1.0],
            y: vec![0.0, 1.0],
            z: vec![0.0],
            sample_ids: ids(&["a", "b"]),
            labels: ids(&["a", "b"]),
            colors: Colors::Values(vec![0.0, 1.0]),
            color_scheme: ColorScheme::Continuous,
        };
        let err = data.validate().unwrap_err();
        assert!(err.to_string().contains("z has 1 entries"));
    }

    #[test]
    fn payload_serializes_with_lowercase_scheme() {
        let dataset = MemoryDataset::new("d");
        let data =
            prepare_plot_data(&dataset, &results(&["a"]), None, &PluginConfig::default()).unwrap();
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["color_scheme"], "uniform");
        assert_eq!(value["colors"], json!(["#1f77b4"]));
    }
}
