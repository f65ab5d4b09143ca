//! Application configuration snapshot and re-application.

use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

use super::{CloneError, RuntimeIdentity};
use crate::cf::retry::{execute_with_retry, RetryPolicy};
use crate::cf::OperationsHandle;

/// Snapshot of the settings a clone must reproduce: sizing plus the
/// user-provided environment variables.
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    /// Memory per instance, MB
    pub memory_mb: u32,
    /// Disk per instance, MB
    pub disk_mb: u32,
    /// Desired instance count
    pub instances: u32,
    /// User-provided environment variables, values normalized to strings.
    /// Ordered so sequential re-application is deterministic.
    pub environment_variables: BTreeMap<String, String>,
}

/// Captures and re-applies application configuration through an operations
/// handle, retrying transient platform failures.
pub struct AppConfigService {
    ops: OperationsHandle,
    retry: RetryPolicy,
}

impl AppConfigService {
    pub fn new(ops: OperationsHandle, retry: RetryPolicy) -> Self {
        Self { ops, retry }
    }

    /// Capture sizing and environment variables of `app`.
    ///
    /// Sizing retrieval failures are fatal. Environment retrieval failures
    /// degrade to an empty variable set so a clone of an app whose env
    /// endpoint is unavailable still proceeds.
    pub async fn capture_config(&self, app: &str) -> Result<AppConfig, CloneError> {
        let detail = execute_with_retry("get application", self.retry, || {
            self.ops.get_application(app)
        })
        .await
        .map_err(|source| CloneError::Snapshot {
            app: app.to_string(),
            source,
        })?;

        let environment_variables = match execute_with_retry("get environment", self.retry, || {
            self.ops.get_environment(app)
        })
        .await
        {
            Ok(vars) => vars,
            Err(e) => {
                warn!(
                    "could not read environment variables for '{}', continuing with none: {}",
                    app, e
                );
                BTreeMap::new()
            }
        };

        info!(
            "captured config for '{}': memory={}MB, disk={}MB, instances={}, env vars={}",
            app,
            detail.memory_mb,
            detail.disk_mb,
            detail.instances,
            environment_variables.len()
        );

        Ok(AppConfig {
            memory_mb: detail.memory_mb,
            disk_mb: detail.disk_mb,
            instances: detail.instances,
            environment_variables,
        })
    }

    /// Capture the runtime identity of `app` from its assigned buildpacks.
    /// Multiple buildpacks collapse into one comma-joined label; none at all
    /// reads as "unknown", which downstream falls back to static content.
    pub async fn capture_runtime_identity(&self, app: &str) -> Result<RuntimeIdentity, CloneError> {
        let detail = execute_with_retry("get application", self.retry, || {
            self.ops.get_application(app)
        })
        .await
        .map_err(|source| CloneError::Snapshot {
            app: app.to_string(),
            source,
        })?;

        let label = if detail.buildpacks.is_empty() {
            "unknown".to_string()
        } else {
            detail.buildpacks.join(", ")
        };
        Ok(RuntimeIdentity::from_label(label))
    }

    /// Apply `vars` to `app`, one remote call per variable, in key order.
    /// A failure partway leaves exactly the preceding keys applied. An empty
    /// set performs no remote call.
    pub async fn apply_environment_variables(
        &self,
        app: &str,
        vars: &BTreeMap<String, String>,
    ) -> Result<(), CloneError> {
        if vars.is_empty() {
            return Ok(());
        }
        for (key, value) in vars {
            execute_with_retry("set environment variable", self.retry, || {
                self.ops.set_environment_variable(app, key, value)
            })
            .await
            .map_err(|source| CloneError::Environment {
                app: app.to_string(),
                variable: key.clone(),
                source,
            })?;
            debug!("set environment variable on '{}': {}={}", app, key, value);
        }
        Ok(())
    }
}
