//! Service instance tools for the agent

use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::agent::tools::error::format_api_error;
use crate::agent::tools::resolve_handle;
use crate::cf::OperationsCache;

/// Arguments for listing service instances
#[derive(Debug, Deserialize)]
pub struct ListServiceInstancesArgs {
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub space: Option<String>,
}

/// Arguments for binding or unbinding a service instance
#[derive(Debug, Deserialize)]
pub struct ServiceBindingArgs {
    /// Application name
    pub app_name: String,
    /// Service instance name
    pub service_instance: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub space: Option<String>,
}

/// Error type for service instance operations
#[derive(Debug, thiserror::Error)]
#[error("Service tool error: {0}")]
pub struct ServiceToolError(String);

fn binding_params() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "app_name": {
                "type": "string",
                "description": "Application name"
            },
            "service_instance": {
                "type": "string",
                "description": "Service instance name"
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
        "required": ["app_name", "service_instance"]
    })
}

/// Tool to list service instances in the targeted space
pub struct ListServiceInstancesTool {
    cache: Arc<OperationsCache>,
}

impl ListServiceInstancesTool {
    pub fn new(cache: Arc<OperationsCache>) -> Self {
        Self { cache }
    }
}

impl Tool for ListServiceInstancesTool {
    const NAME: &'static str = "list_service_instances";

    type Error = ServiceToolError;
    type Args = ListServiceInstancesArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "List the service instances in the targeted space.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "organization": {
                        "type": "string",
                        "description": "Organization name (optional, defaults to current target)"
                    },
                    "space": {
                        "type": "string",
                        "description": "Space name (optional, defaults to current target)"
                    }
                },
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

        match ops.list_service_instances().await {
            Ok(services) => {
                let count = services.len();
                serde_json::to_string_pretty(&json!({
                    "success": true,
                    "service_instances": services,
                    "count": count,
                }))
                .map_err(|e| ServiceToolError(format!("Failed to serialize: {}", e)))
            }
            Err(e) => Ok(format_api_error(Self::NAME, &e)),
        }
    }
}

/// Tool to bind a service instance to an application
pub struct BindServiceTool {
    cache: Arc<OperationsCache>,
}

impl BindServiceTool {
    pub fn new(cache: Arc<OperationsCache>) -> Self {
        Self { cache }
    }
}

impl Tool for BindServiceTool {
    const NAME: &'static str = "bind_service";

    type Error = ServiceToolError;
    type Args = ServiceBindingArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Bind a service instance to an application. The application must \
                          be restarted for the binding to take effect."
                .to_string(),
            parameters: binding_params(),
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

        match ops
            .bind_service(&args.app_name, &args.service_instance)
            .await
        {
            Ok(()) => serde_json::to_string_pretty(&json!({
                "success": true,
                "action": "bound",
                "app_name": args.app_name,
                "service_instance": args.service_instance,
            }))
            .map_err(|e| ServiceToolError(format!("Failed to serialize: {}", e))),
            Err(e) => Ok(format_api_error(Self::NAME, &e)),
        }
    }
}

/// Tool to unbind a service instance from an application
pub struct UnbindServiceTool {
    cache: Arc<OperationsCache>,
}

impl UnbindServiceTool {
    pub fn new(cache: Arc<OperationsCache>) -> Self {
        Self { cache }
    }
}

impl Tool for UnbindServiceTool {
    const NAME: &'static str = "unbind_service";

    type Error = ServiceToolError;
    type Args = ServiceBindingArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Unbind a service instance from an application.".to_string(),
            parameters: binding_params(),
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

        match ops
            .unbind_service(&args.app_name, &args.service_instance)
            .await
        {
            Ok(()) => serde_json::to_string_pretty(&json!({
                "success": true,
                "action": "unbound",
                "app_name": args.app_name,
                "service_instance": args.service_instance,
            }))
            .map_err(|e| ServiceToolError(format!("Failed to serialize: {}", e))),
            Err(e) => Ok(format_api_error(Self::NAME, &e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names() {
        assert_eq!(ListServiceInstancesTool::NAME, "list_service_instances");
        assert_eq!(BindServiceTool::NAME, "bind_service");
        assert_eq!(UnbindServiceTool::NAME, "unbind_service");
    }
}
