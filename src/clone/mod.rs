//! Application cloning.
//!
//! The pipeline snapshots a source application, deploys a buildpack-matched
//! placeholder under the target name, copies the real source bits over it,
//! then rescales, starts and verifies the runtime identity survived the copy.
//! Local temporary files are removed on every exit path.

pub mod cloner;
pub mod config;
pub mod deploy;
pub mod placeholder;

pub use cloner::{ApplicationCloner, CloneReport};
pub use config::{AppConfig, AppConfigService};
pub use deploy::DeploymentService;
pub use placeholder::{PlaceholderArtifact, RuntimeFamily, RuntimeIdentity};

use thiserror::Error;

use crate::cf::CfApiError;

/// Failure of one clone pipeline step. The step that failed is part of the
/// variant so the single reported error names where the pipeline stopped.
#[derive(Debug, Error)]
pub enum CloneError {
    #[error("failed to snapshot application '{app}': {source}")]
    Snapshot {
        app: String,
        #[source]
        source: CfApiError,
    },

    #[error("failed to create {buildpack} placeholder for app '{app}': {source}")]
    PlaceholderGeneration {
        app: String,
        buildpack: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to deploy placeholder application '{app}': {source}")]
    Deploy {
        app: String,
        #[source]
        source: CfApiError,
    },

    #[error("failed to apply environment variable '{variable}' to '{app}': {source}")]
    Environment {
        app: String,
        variable: String,
        #[source]
        source: CfApiError,
    },

    #[error("failed to copy source from '{source_app}' to '{target_app}': {source}")]
    CopySource {
        source_app: String,
        target_app: String,
        #[source]
        source: CfApiError,
    },

    #[error("failed to rescale application '{app}': {source}")]
    Rescale {
        app: String,
        #[source]
        source: CfApiError,
    },

    #[error("failed to start application '{app}': {source}")]
    Start {
        app: String,
        #[source]
        source: CfApiError,
    },

    #[error(
        "runtime changed during copy for '{app}': expected '{expected}', actual '{actual}'"
    )]
    RuntimeMismatch {
        app: String,
        expected: String,
        actual: String,
    },

    #[error("clone {source_app} -> {target_app} timed out after {seconds}s")]
    Timeout {
        source_app: String,
        target_app: String,
        seconds: u64,
    },
}
