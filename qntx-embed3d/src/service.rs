use crate::config::{build_schema, ConfigFieldSchema, PluginConfig};
use crate::error::{Error, Result};
use crate::handlers::{json_response, HandlerContext, PluginState};
use crate::host::Host;
use crate::http::{HttpHeader, HttpRequest, HttpResponse};
use crate::operators::PluginRegistry;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Plugin identity reported to the host.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MetadataResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub license: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InitializeResponse {
    pub handler_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub healthy: bool,
    pub message: String,
    pub details: HashMap<String, String>,
}

/// 3D embeddings plugin service.
pub struct EmbeddingsPluginService {
    handlers: HandlerContext,
}

impl EmbeddingsPluginService {
    pub fn new() -> Self {
        let state = Arc::new(RwLock::new(PluginState {
            config: PluginConfig::default(),
            initialized: false,
            executions: 0,
        }));

        Self {
            handlers: HandlerContext::new(state, PluginRegistry::register_all()),
        }
    }

    pub fn metadata(&self) -> MetadataResponse {
        debug!("Metadata request received");
        MetadataResponse {
            name: "threed-embeddings".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: "Interactive 3D embeddings viewer for precomputed visualization results"
                .to_string(),
            author: "QNTX Contributors".to_string(),
            license: "MIT".to_string(),
        }
    }

    /// Apply host configuration and report the operators this plugin serves.
    pub fn initialize(&self, config: &HashMap<String, String>) -> Result<InitializeResponse> {
        info!("Initializing 3D embeddings plugin");

        let parsed = PluginConfig::from_map(config)?;
        debug!("Plugin config: {:?}", parsed);
        {
            let mut state = self.handlers.state.write();
            state.config = parsed;
            state.initialized = true;
        }

        Ok(InitializeResponse {
            handler_names: self.handlers.registry.names(),
        })
    }

    pub fn shutdown(&self) {
        info!("Shutting down 3D embeddings plugin");
        let mut state = self.handlers.state.write();
        state.initialized = false;
    }

    /// Route a host request. Failures become JSON error responses.
    pub fn handle_http(&self, host: &Host<'_>, req: HttpRequest) -> HttpResponse {
        debug!("HTTP request: {} {}", req.method, req.path);

        match self.route(host, &req) {
            Ok(response) => response,
            Err(err) => {
                warn!("{} {} failed: {}", req.method, req.path, err);
                error_response(&err)
            }
        }
    }

    fn route(&self, host: &Host<'_>, req: &HttpRequest) -> Result<HttpResponse> {
        let body: serde_json::Value = if req.body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&req.body)
                .map_err(|e| Error::InvalidParams(format!("Invalid JSON body: {}", e)))?
        };

        let segments: Vec<&str> = req
            .path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        match (req.method.as_str(), segments.as_slice()) {
            ("GET", ["operators"]) => self.handlers.handle_operators(),
            ("POST", [operator, "resolve_input"]) => {
                self.handlers.handle_resolve_input(host, operator, body)
            }
            ("POST", [operator, "execute"]) => self.handlers.handle_execute(host, operator, body),
            _ => Err(Error::UnknownEndpoint(format!(
                "{} {}",
                req.method, req.path
            ))),
        }
    }

    pub fn health(&self) -> HealthResponse {
        let state = self.handlers.state.read();

        let mut details = HashMap::new();
        details.insert("initialized".to_string(), state.initialized.to_string());
        details.insert("executions".to_string(), state.executions.to_string());
        details.insert(
            "operators".to_string(),
            self.handlers.registry.names().join(","),
        );

        HealthResponse {
            healthy: true,
            message: "OK".to_string(),
            details,
        }
    }

    pub fn config_schema(&self) -> HashMap<String, ConfigFieldSchema> {
        build_schema()
    }
}

impl Default for EmbeddingsPluginService {
    fn default() -> Self {
        Self::new()
    }
}

fn status_code(err: &Error) -> i32 {
    match err {
        Error::UnknownOperator(_) | Error::UnknownEndpoint(_) | Error::UnknownBrainKey(_) => 404,
        Error::InvalidParams(_) | Error::Serialization(_) | Error::Config(_) => 400,
        Error::NoDataset | Error::NoVisualizations => 412,
        _ => 500,
    }
}

fn error_response(err: &Error) -> HttpResponse {
    let error_body = serde_json::json!({
        "error": err.to_string()
    });
    json_response(status_code(err), &error_body).unwrap_or_else(|_| HttpResponse {
        status_code: 500,
        headers: vec![HttpHeader {
            name: "Content-Type".to_string(),
            values: vec!["text/plain".to_string()],
        }],
        body: err.to_string().into_bytes(),
    })
}
