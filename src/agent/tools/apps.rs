//! Application lifecycle tools for the agent
//!
//! List, inspect, start, stop, restart, scale and delete applications in
//! the targeted org/space.

use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use crate::agent::tools::error::format_api_error;
use crate::agent::tools::resolve_handle;
use crate::cf::api::types::{ScaleRequest, StartRequest};
use crate::cf::OperationsCache;

/// Staging budget for lifecycle starts and restarts
const STAGING_TIMEOUT: Duration = Duration::from_secs(8 * 60);
/// Startup budget for lifecycle starts and restarts
const STARTUP_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Arguments shared by tools that act on one named application
#[derive(Debug, Deserialize)]
pub struct AppActionArgs {
    /// Application name
    pub app_name: String,
    /// Organization name (optional, defaults to current target)
    #[serde(default)]
    pub organization: Option<String>,
    /// Space name (optional, defaults to current target)
    #[serde(default)]
    pub space: Option<String>,
}

/// Arguments for listing applications
#[derive(Debug, Deserialize)]
pub struct ListApplicationsArgs {
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub space: Option<String>,
}

/// Arguments for scaling an application
#[derive(Debug, Deserialize)]
pub struct ScaleApplicationArgs {
    /// Application name
    pub app_name: String,
    /// New memory per instance, MB (optional)
    #[serde(default)]
    pub memory_mb: Option<u32>,
    /// New disk per instance, MB (optional)
    #[serde(default)]
    pub disk_mb: Option<u32>,
    /// New instance count (optional)
    #[serde(default)]
    pub instances: Option<u32>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub space: Option<String>,
}

/// Error type for application lifecycle operations
#[derive(Debug, thiserror::Error)]
#[error("Application tool error: {0}")]
pub struct AppToolError(String);

fn context_params() -> serde_json::Value {
    json!({
        "organization": {
            "type": "string",
            "description": "Organization name (optional, defaults to current target)"
        },
        "space": {
            "type": "string",
            "description": "Space name (optional, defaults to current target)"
        }
    })
}

fn app_action_params() -> serde_json::Value {
    let mut props = json!({
        "app_name": {
            "type": "string",
            "description": "Application name"
        }
    });
    if let (Some(props_obj), Some(ctx)) = (props.as_object_mut(), context_params().as_object()) {
        for (k, v) in ctx {
            props_obj.insert(k.clone(), v.clone());
        }
    }
    json!({
        "type": "object",
        "properties": props,
        "required": ["app_name"]
    })
}

fn ack(action: &str, app: &str) -> Result<String, AppToolError> {
    serde_json::to_string_pretty(&json!({
        "success": true,
        "action": action,
        "app_name": app,
    }))
    .map_err(|e| AppToolError(format!("Failed to serialize: {}", e)))
}

/// Tool to list applications in the targeted space
pub struct ListApplicationsTool {
    cache: Arc<OperationsCache>,
}

impl ListApplicationsTool {
    pub fn new(cache: Arc<OperationsCache>) -> Self {
        Self { cache }
    }
}

impl Tool for ListApplicationsTool {
    const NAME: &'static str = "list_applications";

    type Error = AppToolError;
    type Args = ListApplicationsArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "List all applications in the targeted space with their state, \
                          instance count and memory."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": context_params(),
                "required": []
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

        match ops.list_applications().await {
            Ok(apps) => {
                let count = apps.len();
                serde_json::to_string_pretty(&json!({
                    "success": true,
                    "applications": apps,
                    "count": count,
                }))
                .map_err(|e| AppToolError(format!("Failed to serialize: {}", e)))
            }
            Err(e) => Ok(format_api_error(Self::NAME, &e)),
        }
    }
}

/// Tool to get details of one application
pub struct ApplicationDetailsTool {
    cache: Arc<OperationsCache>,
}

impl ApplicationDetailsTool {
    pub fn new(cache: Arc<OperationsCache>) -> Self {
        Self { cache }
    }
}

impl Tool for ApplicationDetailsTool {
    const NAME: &'static str = "application_details";

    type Error = AppToolError;
    type Args = AppActionArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Get details of one application: state, sizing (memory, disk, \
                          instances), assigned buildpacks and stack."
                .to_string(),
            parameters: app_action_params(),
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

        match ops.get_application(&args.app_name).await {
            Ok(detail) => serde_json::to_string_pretty(&json!({
                "success": true,
                "application": detail,
            }))
            .map_err(|e| AppToolError(format!("Failed to serialize: {}", e))),
            Err(e) => Ok(format_api_error(Self::NAME, &e)),
        }
    }
}

/// Tool to start an application
pub struct StartApplicationTool {
    cache: Arc<OperationsCache>,
}

impl StartApplicationTool {
    pub fn new(cache: Arc<OperationsCache>) -> Self {
        Self { cache }
    }
}

impl Tool for StartApplicationTool {
    const NAME: &'static str = "start_application";

    type Error = AppToolError;
    type Args = AppActionArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Start a stopped application and wait until it is running."
                .to_string(),
            parameters: app_action_params(),
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

        let request = StartRequest {
            name: args.app_name.clone(),
            staging_timeout: STAGING_TIMEOUT,
            startup_timeout: STARTUP_TIMEOUT,
        };
        match ops.start(&request).await {
            Ok(()) => ack("started", &args.app_name),
            Err(e) => Ok(format_api_error(Self::NAME, &e)),
        }
    }
}

/// Tool to stop an application
pub struct StopApplicationTool {
    cache: Arc<OperationsCache>,
}

impl StopApplicationTool {
    pub fn new(cache: Arc<OperationsCache>) -> Self {
        Self { cache }
    }
}

impl Tool for StopApplicationTool {
    const NAME: &'static str = "stop_application";

    type Error = AppToolError;
    type Args = AppActionArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Stop a running application.".to_string(),
            parameters: app_action_params(),
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

        match ops.stop(&args.app_name).await {
            Ok(()) => ack("stopped", &args.app_name),
            Err(e) => Ok(format_api_error(Self::NAME, &e)),
        }
    }
}

/// Tool to restart an application
pub struct RestartApplicationTool {
    cache: Arc<OperationsCache>,
}

impl RestartApplicationTool {
    pub fn new(cache: Arc<OperationsCache>) -> Self {
        Self { cache }
    }
}

impl Tool for RestartApplicationTool {
    const NAME: &'static str = "restart_application";

    type Error = AppToolError;
    type Args = AppActionArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Restart an application (stop, then start and wait until running)."
                .to_string(),
            parameters: app_action_params(),
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

        let request = StartRequest {
            name: args.app_name.clone(),
            staging_timeout: STAGING_TIMEOUT,
            startup_timeout: STARTUP_TIMEOUT,
        };
        match ops.restart(&request).await {
            Ok(()) => ack("restarted", &args.app_name),
            Err(e) => Ok(format_api_error(Self::NAME, &e)),
        }
    }
}

/// Tool to scale an application's web process
pub struct ScaleApplicationTool {
    cache: Arc<OperationsCache>,
}

impl ScaleApplicationTool {
    pub fn new(cache: Arc<OperationsCache>) -> Self {
        Self { cache }
    }
}

impl Tool for ScaleApplicationTool {
    const NAME: &'static str = "scale_application";

    type Error = AppToolError;
    type Args = ScaleApplicationArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Scale an application's memory, disk or instance count. Only the \
                          provided values change."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "app_name": {
                        "type": "string",
                        "description": "Application name"
                    },
                    "memory_mb": {
                        "type": "integer",
                        "description": "New memory per instance in MB (optional)"
                    },
                    "disk_mb": {
                        "type": "integer",
                        "description": "New disk per instance in MB (optional)"
                    },
                    "instances": {
                        "type": "integer",
                        "description": "New instance count (optional)"
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
                "required": ["app_name"]
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

        let request = ScaleRequest {
            name: args.app_name.clone(),
            memory_mb: args.memory_mb,
            disk_mb: args.disk_mb,
            instances: args.instances,
        };
        match ops.scale(&request).await {
            Ok(()) => ack("scaled", &args.app_name),
            Err(e) => Ok(format_api_error(Self::NAME, &e)),
        }
    }
}

/// Tool to delete an application
pub struct DeleteApplicationTool {
    cache: Arc<OperationsCache>,
}

impl DeleteApplicationTool {
    pub fn new(cache: Arc<OperationsCache>) -> Self {
        Self { cache }
    }
}

impl Tool for DeleteApplicationTool {
    const NAME: &'static str = "delete_application";

    type Error = AppToolError;
    type Args = AppActionArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Delete an application from the targeted space. This cannot be undone."
                .to_string(),
            parameters: app_action_params(),
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

        match ops.delete_application(&args.app_name).await {
            Ok(()) => ack("deleted", &args.app_name),
            Err(e) => Ok(format_api_error(Self::NAME, &e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names() {
        assert_eq!(ListApplicationsTool::NAME, "list_applications");
        assert_eq!(ApplicationDetailsTool::NAME, "application_details");
        assert_eq!(StartApplicationTool::NAME, "start_application");
        assert_eq!(StopApplicationTool::NAME, "stop_application");
        assert_eq!(RestartApplicationTool::NAME, "restart_application");
        assert_eq!(ScaleApplicationTool::NAME, "scale_application");
        assert_eq!(DeleteApplicationTool::NAME, "delete_application");
    }

    #[test]
    fn test_app_action_params_require_app_name() {
        let params = app_action_params();
        assert_eq!(params["required"][0], "app_name");
        assert!(params["properties"]["organization"].is_object());
    }
}
