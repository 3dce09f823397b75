//! Plugin configuration types

use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;

/// Color given to every point when no coloring field is chosen.
pub const DEFAULT_COLOR: &str = "#1f77b4";

/// Number of leading id characters used as a point label in uniform mode.
pub const DEFAULT_LABEL_LENGTH: usize = 8;

/// Brain run type that holds visualization results.
pub const DEFAULT_RUN_TYPE: &str = "visualization";

/// Plugin configuration received during initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    /// Hex color for uniformly colored plots
    pub default_color: String,
    /// Id prefix length used for uniform labels
    pub label_length: usize,
    /// Brain run type listed during discovery
    pub visualization_run_type: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            default_color: DEFAULT_COLOR.to_string(),
            label_length: DEFAULT_LABEL_LENGTH,
            visualization_run_type: DEFAULT_RUN_TYPE.to_string(),
        }
    }
}

impl PluginConfig {
    /// Parse the host-provided key/value map, falling back to defaults for absent keys.
    ///
    /// Unknown keys are ignored so newer hosts can pass settings this plugin
    /// does not know about.
    pub fn from_map(values: &HashMap<String, String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(color) = values.get("default_color") {
            if !is_hex_color(color) {
                return Err(Error::Config(format!(
                    "default_color must be a #rrggbb hex color, got '{}'",
                    color
                )));
            }
            config.default_color = color.to_lowercase();
        }

        if let Some(raw) = values.get("label_length") {
            config.label_length = parse_positive("label_length", raw)?;
        }

        if let Some(run_type) = values.get("visualization_run_type") {
            if run_type.trim().is_empty() {
                return Err(Error::Config(
                    "visualization_run_type must not be empty".to_string(),
                ));
            }
            config.visualization_run_type = run_type.trim().to_string();
        }

        Ok(config)
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(Error::Config(format!("{} must be greater than zero", key))),
        Ok(n) => Ok(n),
        Err(e) => Err(Error::Config(format!(
            "{} must be a positive integer, got '{}': {}",
            key, raw, e
        ))),
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Description of a single configurable field.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConfigFieldSchema {
    #[serde(rename = "type")]
    pub r#type: String,
    pub description: String,
    pub default_value: String,
    pub required: bool,
}

/// Build the configuration schema for the 3D embeddings plugin.
pub fn build_schema() -> HashMap<String, ConfigFieldSchema> {
    let mut fields = HashMap::new();

    fields.insert(
        "default_color".to_string(),
        ConfigFieldSchema {
            r#type: "string".to_string(),
            description: "Hex color for points when no Color By field is selected.".to_string(),
            default_value: DEFAULT_COLOR.to_string(),
            required: false,
        },
    );

    fields.insert(
        "label_length".to_string(),
        ConfigFieldSchema {
            r#type: "integer".to_string(),
            description: "Number of sample id characters shown as the point label.".to_string(),
            default_value: DEFAULT_LABEL_LENGTH.to_string(),
            required: false,
        },
    );

    fields.insert(
        "visualization_run_type".to_string(),
        ConfigFieldSchema {
            r#type: "string".to_string(),
            description: "Brain run type searched for visualization results.".to_string(),
            default_value: DEFAULT_RUN_TYPE.to_string(),
            required: false,
        },
    );

    fields
}
