//! Host dataset capability.
//!
//! The plugin never owns dataset storage. Everything it reads goes through
//! [`Dataset`], so a host adapter, the in-memory snapshot used by the CLI, and
//! test fixtures are interchangeable.

use crate::error::{Error, Result};
use crate::value::{FieldAccess, FieldValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of a top-level field in the dataset schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Single-label classification document with a `label` attribute
    Classification,
    /// Detections document holding a `detections` list
    Detections,
    Int,
    Float,
    String,
    Boolean,
    /// Anything the plugin cannot color by
    Other,
}

/// Run configuration recorded with a brain result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrainRunConfig {
    /// Reduction method that produced the points (umap, tsne, pca, ...)
    pub method: String,
    #[serde(default = "default_run_type")]
    pub run_type: String,
}

fn default_run_type() -> String {
    crate::config::DEFAULT_RUN_TYPE.to_string()
}

/// Precomputed embedding coordinates for a set of samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrainResults {
    pub key: String,
    pub sample_ids: Vec<String>,
    /// Row-major N x D coordinates
    pub points: Vec<Vec<f64>>,
    /// Declared column count; needed when there are no rows to infer it from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_dims: Option<usize>,
    pub config: BrainRunConfig,
}

impl BrainResults {
    /// Column count of the points array.
    pub fn dims(&self) -> usize {
        self.num_dims
            .or_else(|| self.points.first().map(Vec::len))
            .unwrap_or(0)
    }

    /// `(rows, columns)` of the points array.
    pub fn shape(&self) -> (usize, usize) {
        (self.points.len(), self.dims())
    }

    /// Check that ids and rows pair up and that every row has `dims()` columns.
    pub fn validate(&self) -> Result<()> {
        if self.sample_ids.len() != self.points.len() {
            return Err(Error::MalformedResults {
                key: self.key.clone(),
                reason: format!(
                    "{} sample ids but {} points",
                    self.sample_ids.len(),
                    self.points.len()
                ),
            });
        }

        let dims = self.dims();
        if let Some(row) = self.points.iter().position(|p| p.len() != dims) {
            return Err(Error::MalformedResults {
                key: self.key.clone(),
                reason: format!(
                    "point {} has {} components, expected {}",
                    row,
                    self.points[row].len(),
                    dims
                ),
            });
        }

        Ok(())
    }
}

/// A dataset sample and its top-level fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl FieldAccess for Sample {
    fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

/// Read-only view of a host dataset.
pub trait Dataset {
    /// Keys of brain runs of the given type, in the order the host records them.
    fn list_brain_runs(&self, run_type: &str) -> Vec<String>;

    /// Load the result stored under `key`.
    ///
    /// Returns `Error::UnknownBrainKey` when nothing is recorded under it.
    fn load_brain_results(&self, key: &str) -> Result<BrainResults>;

    /// Top-level fields in schema order.
    fn field_schema(&self) -> Vec<(String, FieldKind)>;

    /// Fetch a sample by id.
    fn sample(&self, id: &str) -> Option<&Sample>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(ids: &[&str], points: Vec<Vec<f64>>) -> BrainResults {
        BrainResults {
            key: "viz".to_string(),
            sample_ids: ids.iter().map(|s| s.to_string()).collect(),
            points,
            num_dims: None,
            config: BrainRunConfig {
                method: "umap".to_string(),
                run_type: "visualization".to_string(),
            },
        }
    }

    #[test]
    fn dims_inferred_from_first_row() {
        let r = results(&["a", "b"], vec![vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0]]);
        assert_eq!(r.shape(), (2, 3));
        assert!(r.validate().is_ok());
    }

    #[test]
    fn declared_dims_win_for_empty_results() {
        let mut r = results(&[], vec![]);
        assert_eq!(r.dims(), 0);
        r.num_dims = Some(3);
        assert_eq!(r.shape(), (0, 3));
        assert!(r.validate().is_ok());
    }

    #[test]
    fn length_mismatch_is_malformed() {
        let r = results(&["a"], vec![vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0]]);
        assert!(matches!(r.validate(), Err(Error::MalformedResults { .. })));
    }

    #[test]
    fn ragged_rows_are_malformed() {
        let r = results(&["a", "b"], vec![vec![0.0, 1.0, 2.0], vec![3.0, 4.0]]);
        let err = r.validate().unwrap_err();
        assert!(err.to_string().contains("point 1 has 2 components"));
    }

    #[test]
    fn field_kind_uses_snake_case() {
        let kind: FieldKind = serde_json::from_str("\"classification\"").unwrap();
        assert_eq!(kind, FieldKind::Classification);
    }
}
