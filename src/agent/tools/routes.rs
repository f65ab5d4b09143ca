//! Route tools for the agent

use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::agent::tools::error::format_api_error;
use crate::agent::tools::resolve_handle;
use crate::cf::OperationsCache;

/// Arguments for listing routes
#[derive(Debug, Deserialize)]
pub struct ListRoutesArgs {
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub space: Option<String>,
}

/// Arguments for mapping or unmapping a route
#[derive(Debug, Deserialize)]
pub struct RouteActionArgs {
    /// Application name
    pub app_name: String,
    /// Host part of the route (host.default-domain)
    pub host: String,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub space: Option<String>,
}

/// Error type for route operations
#[derive(Debug, thiserror::Error)]
#[error("Route tool error: {0}")]
pub struct RouteToolError(String);

fn route_action_params() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "app_name": {
                "type": "string",
                "description": "Application name"
            },
            "host": {
                "type": "string",
                "description": "Host part of the route under the default domain"
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
        "required": ["app_name", "host"]
    })
}

/// Tool to list the routes in the targeted space
pub struct ListRoutesTool {
    cache: Arc<OperationsCache>,
}

impl ListRoutesTool {
    pub fn new(cache: Arc<OperationsCache>) -> Self {
        Self { cache }
    }
}

impl Tool for ListRoutesTool {
    const NAME: &'static str = "list_routes";

    type Error = RouteToolError;
    type Args = ListRoutesArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "List the HTTP routes in the targeted space.".to_string(),
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

        match ops.list_routes().await {
            Ok(routes) => {
                let count = routes.len();
                serde_json::to_string_pretty(&json!({
                    "success": true,
                    "routes": routes,
                    "count": count,
                }))
                .map_err(|e| RouteToolError(format!("Failed to serialize: {}", e)))
            }
            Err(e) => Ok(format_api_error(Self::NAME, &e)),
        }
    }
}

/// Tool to map a route onto an application
pub struct MapRouteTool {
    cache: Arc<OperationsCache>,
}

impl MapRouteTool {
    pub fn new(cache: Arc<OperationsCache>) -> Self {
        Self { cache }
    }
}

impl Tool for MapRouteTool {
    const NAME: &'static str = "map_route";

    type Error = RouteToolError;
    type Args = RouteActionArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Map a route (host under the default domain) onto an application. \
                          The route is created if it does not exist yet."
                .to_string(),
            parameters: route_action_params(),
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

        match ops.map_route(&args.app_name, &args.host).await {
            Ok(()) => serde_json::to_string_pretty(&json!({
                "success": true,
                "action": "mapped",
                "app_name": args.app_name,
                "host": args.host,
            }))
            .map_err(|e| RouteToolError(format!("Failed to serialize: {}", e))),
            Err(e) => Ok(format_api_error(Self::NAME, &e)),
        }
    }
}

/// Tool to unmap a route from an application
pub struct UnmapRouteTool {
    cache: Arc<OperationsCache>,
}

impl UnmapRouteTool {
    pub fn new(cache: Arc<OperationsCache>) -> Self {
        Self { cache }
    }
}

impl Tool for UnmapRouteTool {
    const NAME: &'static str = "unmap_route";

    type Error = RouteToolError;
    type Args = RouteActionArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Unmap a route (host under the default domain) from an application."
                .to_string(),
            parameters: route_action_params(),
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

        match ops.unmap_route(&args.app_name, &args.host).await {
            Ok(()) => serde_json::to_string_pretty(&json!({
                "success": true,
                "action": "unmapped",
                "app_name": args.app_name,
                "host": args.host,
            }))
            .map_err(|e| RouteToolError(format!("Failed to serialize: {}", e))),
            Err(e) => Ok(format_api_error(Self::NAME, &e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names() {
        assert_eq!(ListRoutesTool::NAME, "list_routes");
        assert_eq!(MapRouteTool::NAME, "map_route");
        assert_eq!(UnmapRouteTool::NAME, "unmap_route");
    }
}
