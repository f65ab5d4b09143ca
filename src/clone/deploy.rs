//! Deployment steps of the clone pipeline.
//!
//! Each step is one remote operation wrapped in transient-failure retry;
//! step ordering and failure reporting belong to the orchestrator.

use log::info;
use std::path::Path;
use std::time::Duration;

use super::{AppConfig, CloneError, RuntimeIdentity};
use crate::cf::api::types::{CopySourceRequest, PushRequest, ScaleRequest, StartRequest};
use crate::cf::retry::{execute_with_retry, RetryPolicy};
use crate::cf::OperationsHandle;

/// Staging budget for the placeholder push. Placeholders are tiny but some
/// buildpacks still resolve dependencies during staging.
const PLACEHOLDER_STAGING_TIMEOUT: Duration = Duration::from_secs(3 * 60);
/// Staging budget once the real source is in place
const SOURCE_STAGING_TIMEOUT: Duration = Duration::from_secs(8 * 60);
/// Startup budget for the cloned application
const STARTUP_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Drives the platform-side deployment steps of a clone.
pub struct DeploymentService {
    ops: OperationsHandle,
    retry: RetryPolicy,
}

impl DeploymentService {
    pub fn new(ops: OperationsHandle, retry: RetryPolicy) -> Self {
        Self { ops, retry }
    }

    /// Push the placeholder tree under the target name: stopped, pinned to
    /// the captured runtime so staging never auto-detects, and sized exactly
    /// like the source.
    pub async fn deploy_placeholder(
        &self,
        target_app: &str,
        placeholder_path: &Path,
        identity: &RuntimeIdentity,
        config: &AppConfig,
    ) -> Result<(), CloneError> {
        let request = PushRequest {
            name: target_app.to_string(),
            source_path: placeholder_path.to_path_buf(),
            no_start: true,
            memory_mb: config.memory_mb,
            disk_mb: config.disk_mb,
            instances: config.instances,
            buildpack: Some(identity.label().to_string()),
            staging_timeout: PLACEHOLDER_STAGING_TIMEOUT,
        };
        execute_with_retry("push placeholder", self.retry, || self.ops.push(&request))
            .await
            .map_err(|source| CloneError::Deploy {
                app: target_app.to_string(),
                source,
            })?;
        info!(
            "placeholder deployed as '{}' with buildpack '{}'",
            target_app,
            identity.label()
        );
        Ok(())
    }

    /// Copy the source app's bits over the placeholder without restarting,
    /// keeping the pinned runtime identity in place.
    pub async fn copy_source(&self, source_app: &str, target_app: &str) -> Result<(), CloneError> {
        let request = CopySourceRequest {
            source_name: source_app.to_string(),
            target_name: target_app.to_string(),
            restart: false,
            staging_timeout: SOURCE_STAGING_TIMEOUT,
            startup_timeout: STARTUP_TIMEOUT,
        };
        execute_with_retry("copy source", self.retry, || self.ops.copy_source(&request))
            .await
            .map_err(|source| CloneError::CopySource {
                source_app: source_app.to_string(),
                target_app: target_app.to_string(),
                source,
            })?;
        info!("copied source from '{}' to '{}'", source_app, target_app);
        Ok(())
    }

    /// Re-apply the captured sizing. The copy step should not have moved it,
    /// but the clone reports the source's sizing as fact, so it is asserted.
    pub async fn rescale(&self, target_app: &str, config: &AppConfig) -> Result<(), CloneError> {
        let request = ScaleRequest {
            name: target_app.to_string(),
            memory_mb: Some(config.memory_mb),
            disk_mb: Some(config.disk_mb),
            instances: Some(config.instances),
        };
        execute_with_retry("scale application", self.retry, || self.ops.scale(&request))
            .await
            .map_err(|source| CloneError::Rescale {
                app: target_app.to_string(),
                source,
            })?;
        info!(
            "scaled '{}' to memory={}MB, disk={}MB, instances={}",
            target_app, config.memory_mb, config.disk_mb, config.instances
        );
        Ok(())
    }

    /// Start the cloned application.
    pub async fn start(&self, target_app: &str) -> Result<(), CloneError> {
        let request = StartRequest {
            name: target_app.to_string(),
            staging_timeout: SOURCE_STAGING_TIMEOUT,
            startup_timeout: STARTUP_TIMEOUT,
        };
        execute_with_retry("start application", self.retry, || self.ops.start(&request))
            .await
            .map_err(|source| CloneError::Start {
                app: target_app.to_string(),
                source,
            })?;
        info!("started '{}'", target_app);
        Ok(())
    }
}
