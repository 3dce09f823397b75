//! In-memory host implementations
//!
//! A plain snapshot of a dataset, its brain results, and its samples. Used by
//! the CLI (loaded from a JSON file) and by tests. Selection and log sinks
//! record what they receive so callers can inspect it afterwards.

use crate::dataset::{BrainResults, Dataset, FieldKind, Sample};
use crate::error::{Error, Result};
use crate::host::{ExecutionLog, HostOps};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Dataset snapshot held entirely in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryDataset {
    #[serde(default)]
    pub name: String,
    /// Schema in declaration order
    #[serde(default)]
    pub schema: Vec<SchemaField>,
    #[serde(default)]
    pub brain_results: Vec<BrainResults>,
    #[serde(default)]
    pub samples: Vec<Sample>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

/// One schema entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub kind: FieldKind,
}

impl MemoryDataset {
    /// Create an empty dataset.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Load a snapshot from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a snapshot from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut dataset: MemoryDataset = serde_json::from_str(json)?;
        dataset.reindex();
        Ok(dataset)
    }

    pub fn with_field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.schema.push(SchemaField {
            name: name.into(),
            kind,
        });
        self
    }

    pub fn with_results(mut self, results: BrainResults) -> Self {
        self.brain_results.push(results);
        self
    }

    pub fn with_sample(mut self, sample: Sample) -> Self {
        self.index.insert(sample.id.clone(), self.samples.len());
        self.samples.push(sample);
        self
    }

    fn reindex(&mut self) {
        self.index = self
            .samples
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();
    }
}

impl Dataset for MemoryDataset {
    fn list_brain_runs(&self, run_type: &str) -> Vec<String> {
        self.brain_results
            .iter()
            .filter(|r| r.config.run_type == run_type)
            .map(|r| r.key.clone())
            .collect()
    }

    fn load_brain_results(&self, key: &str) -> Result<BrainResults> {
        self.brain_results
            .iter()
            .find(|r| r.key == key)
            .cloned()
            .ok_or_else(|| Error::UnknownBrainKey(key.to_string()))
    }

    fn field_schema(&self) -> Vec<(String, FieldKind)> {
        self.schema
            .iter()
            .map(|f| (f.name.clone(), f.kind))
            .collect()
    }

    fn sample(&self, id: &str) -> Option<&Sample> {
        self.index.get(id).and_then(|&i| self.samples.get(i))
    }
}

/// Selection sink that records every call.
#[derive(Debug, Default)]
pub struct RecordingOps {
    calls: Mutex<Vec<Vec<String>>>,
}

impl RecordingOps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every selection received, oldest first.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().clone()
    }

    /// The most recent selection, if any.
    pub fn selected(&self) -> Option<Vec<String>> {
        self.calls.lock().last().cloned()
    }
}

impl HostOps for RecordingOps {
    fn set_selected_samples(&self, sample_ids: &[String]) {
        self.calls.lock().push(sample_ids.to_vec());
    }
}

/// Diagnostic log that keeps every line.
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl ExecutionLog for MemoryLog {
    fn log(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
