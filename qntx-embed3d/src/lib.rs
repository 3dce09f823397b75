//! QNTX 3D Embeddings Plugin
//!
//! Loads precomputed 3D embedding coordinates recorded against a dataset,
//! prepares them for the 3D scatter panel, and pushes plot selections back
//! into the host's sample selection.
//!
//! ## Module Structure
//!
//! - `dataset` - Host dataset capability and brain result types
//! - `value` - Sample field values and dotted-path lookup
//! - `fields` - Discovery of fields usable for coloring
//! - `palette` - Categorical color palettes
//! - `plot` - Plot payload construction
//! - `operators` - Host-invocable operators and their registry
//! - `host` - Injected host capabilities and execution context
//! - `memory` - In-memory host implementations
//! - `config` - Plugin configuration types
//! - `handlers` - HTTP endpoint handlers
//! - `service` - Plugin service implementation
//! - `http` - Request/response envelopes

pub mod config;
pub mod dataset;
pub mod error;
pub mod fields;
mod handlers;
pub mod host;
pub mod http;
pub mod memory;
pub mod operators;
pub mod palette;
pub mod plot;
pub mod service;
pub mod value;

pub use error::{Error, Result};
pub use service::EmbeddingsPluginService;
