//! Error types for the 3D embeddings plugin.

use thiserror::Error;

/// Errors raised while discovering, loading, or preparing visualization results.
#[derive(Error, Debug)]
pub enum Error {
    /// The dataset has no visualization results recorded against it
    #[error("No 3D visualizations found")]
    NoVisualizations,

    /// The selected result does not have the plotted dimensionality
    #[error("Brain key has {dims}D embeddings, not {expected}D")]
    Dimensionality {
        key: String,
        dims: usize,
        expected: usize,
    },

    /// No result is recorded under the requested key
    #[error("unknown brain key: {0}")]
    UnknownBrainKey(String),

    /// The result's ids and points cannot be paired up
    #[error("malformed brain results for '{key}': {reason}")]
    MalformedResults { key: String, reason: String },

    /// No dataset is attached to the execution context
    #[error("no dataset loaded")]
    NoDataset,

    /// Operator parameters failed to parse
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// No operator is registered under this name
    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    /// No route matches the request
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// Plot payload failed validation
    #[error("invalid plot data: {0}")]
    InvalidPlotData(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the plugin [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
