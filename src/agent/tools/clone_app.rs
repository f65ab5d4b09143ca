//! Application clone tool for the agent
//!
//! Exposes the buildpack-matched clone pipeline as a single tool call.

use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::agent::tools::error::format_clone_error;
use crate::agent::tools::resolve_handle;
use crate::cf::retry::RetryPolicy;
use crate::cf::OperationsCache;
use crate::clone::ApplicationCloner;

/// Arguments for the clone application tool
#[derive(Debug, Deserialize)]
pub struct CloneApplicationArgs {
    /// Source application name
    pub source_app: String,
    /// Target application name
    pub target_app: String,
    /// Organization name (optional, defaults to current target)
    #[serde(default)]
    pub organization: Option<String>,
    /// Space name (optional, defaults to current target)
    #[serde(default)]
    pub space: Option<String>,
}

/// Error type for clone application operations
#[derive(Debug, thiserror::Error)]
#[error("Clone application error: {0}")]
pub struct CloneApplicationError(String);

/// Tool to clone an existing application to a new name
///
/// Snapshots the source app's sizing, environment and buildpack, deploys a
/// buildpack-matched placeholder under the target name, copies the source
/// bits over it and starts the result, verifying the buildpack survived.
pub struct CloneApplicationTool {
    cache: Arc<OperationsCache>,
}

impl CloneApplicationTool {
    pub fn new(cache: Arc<OperationsCache>) -> Self {
        Self { cache }
    }
}

impl Tool for CloneApplicationTool {
    const NAME: &'static str = "clone_application";

    type Error = CloneApplicationError;
    type Args = CloneApplicationArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: r#"Clone an existing application to create a copy with a new name.

Captures the source application's memory, disk, instance count, environment
variables and buildpack, then deploys the copy pinned to the same buildpack
so staging never re-detects the runtime. The cloned app is started and its
buildpack verified before the tool reports success.

**Behavior:**
- The whole operation is bounded by a 10 minute timeout
- On failure after the placeholder was pushed, the target app is left on the
  platform in a partially-cloned state (no rollback)
- Local temporary files are always removed

**Use Cases:**
- Creating a canary copy of a production app
- Duplicating an app into the same space under a new name"#
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "source_app": {
                        "type": "string",
                        "description": "Name of the application to clone"
                    },
                    "target_app": {
                        "type": "string",
                        "description": "Name for the new application"
                    },
                    "organization": {
                        "type": "string",
                        "description": "Organization name (optional, defaults to current target)"
                    },
                    "space": {
                        "type": "string",
                        "description": "Space name (optional, defaults to current target)"
                    }
                },
                "required": ["source_app", "target_app"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let ops = match resolve_handle(
            Self::NAME,
            &self.cache,
            args.organization.as_deref(),
            args.space.as_deref(),
        ) {
            Ok(ops) => ops,
            Err(error_json) => return Ok(error_json),
        };

        let cloner = ApplicationCloner::new(ops, RetryPolicy::default());
        match cloner
            .clone_application(&args.source_app, &args.target_app)
            .await
        {
            Ok(report) => {
                let result = json!({
                    "success": true,
                    "source_app": report.source_app,
                    "target_app": report.target_app,
                    "runtime": report.runtime,
                    "memory_mb": report.memory_mb,
                    "disk_mb": report.disk_mb,
                    "instances": report.instances,
                    "environment_variables": report.environment_variables,
                });
                serde_json::to_string_pretty(&result)
                    .map_err(|e| CloneApplicationError(format!("Failed to serialize: {}", e)))
            }
            Err(e) => Ok(format_clone_error(Self::NAME, &e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_name() {
        assert_eq!(CloneApplicationTool::NAME, "clone_application");
    }
}
