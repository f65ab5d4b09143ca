//! The clone orchestrator.
//!
//! Sequencing: snapshot (config and runtime identity, concurrently) →
//! generate placeholder → deploy it pinned and sized → apply env vars →
//! copy source over it → rescale → start → verify identity. The placeholder
//! directory is removed after every outcome, including the end-to-end
//! timeout firing mid-step.
//!
//! Remote effects are not rolled back: a failure after the placeholder push
//! leaves the target app on the platform in a partially-cloned state, and
//! the returned error says which step stopped.

use log::{error, info};
use serde::Serialize;
use std::time::Duration;

use super::config::AppConfigService;
use super::deploy::DeploymentService;
use super::placeholder::{self, PlaceholderArtifact, RuntimeIdentity};
use super::CloneError;
use crate::cf::retry::RetryPolicy;
use crate::cf::OperationsHandle;

/// Bound on the whole pipeline, staging and startup waits included
const OVERALL_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// What a successful clone produced.
#[derive(Debug, Clone, Serialize)]
pub struct CloneReport {
    /// Application that was cloned
    pub source_app: String,
    /// Application that now exists and runs
    pub target_app: String,
    /// Runtime identity carried over and verified
    pub runtime: String,
    /// Memory per instance, MB
    pub memory_mb: u32,
    /// Disk per instance, MB
    pub disk_mb: u32,
    /// Instance count
    pub instances: u32,
    /// Number of environment variables applied
    pub environment_variables: usize,
}

/// Clones one application to a new name within a single operations context.
pub struct ApplicationCloner {
    config: AppConfigService,
    deploy: DeploymentService,
}

impl ApplicationCloner {
    pub fn new(ops: OperationsHandle, retry: RetryPolicy) -> Self {
        Self {
            config: AppConfigService::new(ops.clone(), retry),
            deploy: DeploymentService::new(ops, retry),
        }
    }

    /// Run the full clone pipeline.
    ///
    /// The placeholder directory is created inside the bounded section but
    /// owned by the slot outside it, so cleanup runs exactly once whether
    /// the pipeline finishes, fails or is cut off by the timeout.
    pub async fn clone_application(
        &self,
        source_app: &str,
        target_app: &str,
    ) -> Result<CloneReport, CloneError> {
        info!("starting clone operation: {} -> {}", source_app, target_app);

        let mut artifact: Option<PlaceholderArtifact> = None;
        let outcome = tokio::time::timeout(
            OVERALL_TIMEOUT,
            self.run_pipeline(source_app, target_app, &mut artifact),
        )
        .await;

        if let Some(artifact) = artifact.take() {
            info!("cleaning up temporary files");
            artifact.cleanup();
        }

        let result = match outcome {
            Ok(result) => result,
            Err(_) => Err(CloneError::Timeout {
                source_app: source_app.to_string(),
                target_app: target_app.to_string(),
                seconds: OVERALL_TIMEOUT.as_secs(),
            }),
        };

        match &result {
            Ok(_) => info!(
                "clone operation completed successfully: {} -> {}",
                source_app, target_app
            ),
            Err(e) => error!("clone operation failed: {}", e),
        }
        result
    }

    async fn run_pipeline(
        &self,
        source_app: &str,
        target_app: &str,
        artifact: &mut Option<PlaceholderArtifact>,
    ) -> Result<CloneReport, CloneError> {
        // Both snapshot reads are independent queries against the source app.
        let (config, identity) = tokio::try_join!(
            self.config.capture_config(source_app),
            self.config.capture_runtime_identity(source_app),
        )?;
        info!(
            "source snapshot: memory={}MB, disk={}MB, instances={}, runtime='{}', env vars={}",
            config.memory_mb,
            config.disk_mb,
            config.instances,
            identity,
            config.environment_variables.len()
        );

        let generated = placeholder::generate(target_app, &identity)?;
        let placeholder_path = generated.path().to_path_buf();
        *artifact = Some(generated);

        self.deploy
            .deploy_placeholder(target_app, &placeholder_path, &identity, &config)
            .await?;
        self.config
            .apply_environment_variables(target_app, &config.environment_variables)
            .await?;

        self.deploy.copy_source(source_app, target_app).await?;
        self.deploy.rescale(target_app, &config).await?;
        self.deploy.start(target_app).await?;

        self.verify_runtime(target_app, &identity).await?;

        Ok(CloneReport {
            source_app: source_app.to_string(),
            target_app: target_app.to_string(),
            runtime: identity.label().to_string(),
            memory_mb: config.memory_mb,
            disk_mb: config.disk_mb,
            instances: config.instances,
            environment_variables: config.environment_variables.len(),
        })
    }

    /// Re-read the target's runtime identity and require label equality with
    /// the captured one. The placeholder exists to make this hold; a
    /// mismatch means the platform re-detected the buildpack during copy.
    async fn verify_runtime(
        &self,
        target_app: &str,
        expected: &RuntimeIdentity,
    ) -> Result<(), CloneError> {
        let actual = self.config.capture_runtime_identity(target_app).await?;
        if actual == *expected {
            info!(
                "runtime preserved during source copy: '{}'",
                actual.label()
            );
            Ok(())
        } else {
            Err(CloneError::RuntimeMismatch {
                app: target_app.to_string(),
                expected: expected.label().to_string(),
                actual: actual.label().to_string(),
            })
        }
    }
}
