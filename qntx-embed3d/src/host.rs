//! Host capabilities injected into every operator call.

use crate::config::PluginConfig;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{error, info};

/// Host-side mutations an operator may trigger.
pub trait HostOps {
    /// Replace the host's selected samples with `sample_ids`.
    fn set_selected_samples(&self, sample_ids: &[String]);
}

/// Host-side diagnostic log for operator progress lines.
pub trait ExecutionLog {
    fn log(&self, line: &str);
}

/// Log sink for hosts without a diagnostic log. Lines still reach `tracing`
/// through [`ExecutionContext::log`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLog;

impl ExecutionLog for NullLog {
    fn log(&self, _line: &str) {}
}

/// Everything an operator sees during one resolve or execute call.
pub struct ExecutionContext<'a> {
    pub dataset: Option<&'a dyn Dataset>,
    pub params: Map<String, Value>,
    pub ops: &'a dyn HostOps,
    pub log: &'a dyn ExecutionLog,
    pub config: &'a PluginConfig,
}

impl<'a> ExecutionContext<'a> {
    /// Dataset attached to this call, or `Error::NoDataset`.
    pub fn dataset(&self) -> Result<&'a dyn Dataset> {
        self.dataset.ok_or(Error::NoDataset)
    }

    /// Deserialize the call parameters into an operator's typed parameter struct.
    pub fn parse_params<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.params.clone()))
            .map_err(|e| Error::InvalidParams(e.to_string()))
    }

    /// Write a progress line to the host log.
    pub fn log(&self, line: &str) {
        info!("{}", line);
        self.log.log(line);
    }

    /// Write an error line to the host log.
    pub fn log_error(&self, message: &str) {
        error!("{}", message);
        self.log.log(&format!("ERROR: {}", message));
    }
}

/// Host capabilities for a single request, before parameters are attached.
#[derive(Clone, Copy)]
pub struct Host<'a> {
    pub dataset: Option<&'a dyn Dataset>,
    pub ops: &'a dyn HostOps,
    pub log: &'a dyn ExecutionLog,
}

impl<'a> Host<'a> {
    /// Build the execution context for one operator call.
    pub fn context<'c>(
        &self,
        params: Map<String, Value>,
        config: &'c PluginConfig,
    ) -> ExecutionContext<'c>
    where
        'a: 'c,
    {
        ExecutionContext {
            dataset: self.dataset,
            params,
            ops: self.ops,
            log: self.log,
            config,
        }
    }
}
