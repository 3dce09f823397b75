//! HTTP endpoint handlers for the 3D embeddings plugin.
//!
//! Endpoints:
//! - GET  /operators                 — Registered operator configs
//! - POST /{operator}/resolve_input  — Input form for the given parameters
//! - POST /{operator}/execute        — Run the operator with the given parameters

use crate::config::PluginConfig;
use crate::error::{Error, Result};
use crate::host::Host;
use crate::http::{HttpHeader, HttpResponse};
use crate::operators::PluginRegistry;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Internal plugin state shared with the service module.
pub(crate) struct PluginState {
    pub config: PluginConfig,
    pub initialized: bool,
    pub executions: u64,
}

/// Handler context providing access to plugin state and operators.
pub struct HandlerContext {
    pub(crate) state: Arc<RwLock<PluginState>>,
    pub(crate) registry: PluginRegistry,
}

impl HandlerContext {
    pub(crate) fn new(state: Arc<RwLock<PluginState>>, registry: PluginRegistry) -> Self {
        Self { state, registry }
    }

    /// GET /operators — Registered operator configs.
    pub fn handle_operators(&self) -> Result<HttpResponse> {
        json_response(200, &self.registry.configs())
    }

    /// POST /{operator}/resolve_input — Input form for the current parameters.
    pub fn handle_resolve_input(
        &self,
        host: &Host<'_>,
        operator: &str,
        body: Value,
    ) -> Result<HttpResponse> {
        let operator = self.registry.get(operator)?;
        let params = params_from_body(body)?;
        let config = self.state.read().config.clone();

        let ctx = host.context(params, &config);
        let form = operator.resolve_input(&ctx);
        debug!(
            "{} resolved {} input properties",
            operator.config().name,
            form.properties.len()
        );

        json_response(200, &form)
    }

    /// POST /{operator}/execute — Run the operator.
    pub fn handle_execute(
        &self,
        host: &Host<'_>,
        operator: &str,
        body: Value,
    ) -> Result<HttpResponse> {
        let operator = self.registry.get(operator)?;
        let params = params_from_body(body)?;
        let config = self.state.read().config.clone();

        let ctx = host.context(params, &config);
        let result = operator.execute(&ctx);

        let executions = {
            let mut state = self.state.write();
            state.executions += 1;
            state.executions
        };
        info!(
            "{} executed (execution #{})",
            operator.config().name,
            executions
        );

        json_response(200, &result)
    }
}

/// Operator parameters are the request body object; an empty body means none.
fn params_from_body(body: Value) -> Result<Map<String, Value>> {
    match body {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidParams(format!(
            "expected a JSON object, got {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Create a JSON HTTP response.
pub(crate) fn json_response<T: Serialize>(status_code: i32, data: &T) -> Result<HttpResponse> {
    let body = serde_json::to_vec(data)?;

    Ok(HttpResponse {
        status_code,
        headers: vec![HttpHeader {
            name: "Content-Type".to_string(),
            values: vec!["application/json".to_string()],
        }],
        body,
    })
}
