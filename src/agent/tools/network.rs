//! Container-to-container network policy tools for the agent

use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::agent::tools::error::format_api_error;
use crate::agent::tools::resolve_handle;
use crate::cf::OperationsCache;

/// Arguments for listing network policies
#[derive(Debug, Deserialize)]
pub struct ListNetworkPoliciesArgs {
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub space: Option<String>,
}

/// Arguments for adding or removing a network policy
#[derive(Debug, Deserialize)]
pub struct NetworkPolicyArgs {
    /// Application traffic originates from
    pub source_app: String,
    /// Application traffic is allowed to reach
    pub destination_app: String,
    /// Protocol, "tcp" or "udp" (defaults to tcp)
    #[serde(default = "default_protocol")]
    pub protocol: String,
    /// First port of the allowed range
    pub start_port: u16,
    /// Last port of the allowed range (defaults to start_port)
    #[serde(default)]
    pub end_port: Option<u16>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub space: Option<String>,
}

fn default_protocol() -> String {
    "tcp".to_string()
}

/// Error type for network policy operations
#[derive(Debug, thiserror::Error)]
#[error("Network policy tool error: {0}")]
pub struct NetworkToolError(String);

fn policy_params() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "source_app": {
                "type": "string",
                "description": "Application the traffic originates from"
            },
            "destination_app": {
                "type": "string",
                "description": "Application the traffic is allowed to reach"
            },
            "protocol": {
                "type": "string",
                "description": "Protocol: tcp or udp (default tcp)"
            },
            "start_port": {
                "type": "integer",
                "description": "First port of the allowed range"
            },
            "end_port": {
                "type": "integer",
                "description": "Last port of the allowed range (defaults to start_port)"
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
        "required": ["source_app", "destination_app", "start_port"]
    })
}

/// Tool to list network policies involving apps in the targeted space
pub struct ListNetworkPoliciesTool {
    cache: Arc<OperationsCache>,
}

impl ListNetworkPoliciesTool {
    pub fn new(cache: Arc<OperationsCache>) -> Self {
        Self { cache }
    }
}

impl Tool for ListNetworkPoliciesTool {
    const NAME: &'static str = "list_network_policies";

    type Error = NetworkToolError;
    type Args = ListNetworkPoliciesArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "List container-to-container network policies for applications in \
                          the targeted space."
                .to_string(),
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

        match ops.list_network_policies().await {
            Ok(policies) => {
                let count = policies.len();
                serde_json::to_string_pretty(&json!({
                    "success": true,
                    "policies": policies,
                    "count": count,
                }))
                .map_err(|e| NetworkToolError(format!("Failed to serialize: {}", e)))
            }
            Err(e) => Ok(format_api_error(Self::NAME, &e)),
        }
    }
}

/// Tool to allow direct traffic between two applications
pub struct AddNetworkPolicyTool {
    cache: Arc<OperationsCache>,
}

impl AddNetworkPolicyTool {
    pub fn new(cache: Arc<OperationsCache>) -> Self {
        Self { cache }
    }
}

impl Tool for AddNetworkPolicyTool {
    const NAME: &'static str = "add_network_policy";

    type Error = NetworkToolError;
    type Args = NetworkPolicyArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Allow direct container-to-container traffic from one application \
                          to another on a port range."
                .to_string(),
            parameters: policy_params(),
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

        let end_port = args.end_port.unwrap_or(args.start_port);
        match ops
            .add_network_policy(
                &args.source_app,
                &args.destination_app,
                &args.protocol,
                args.start_port,
                end_port,
            )
            .await
        {
            Ok(()) => serde_json::to_string_pretty(&json!({
                "success": true,
                "action": "added",
                "source_app": args.source_app,
                "destination_app": args.destination_app,
                "protocol": args.protocol,
                "start_port": args.start_port,
                "end_port": end_port,
            }))
            .map_err(|e| NetworkToolError(format!("Failed to serialize: {}", e))),
            Err(e) => Ok(format_api_error(Self::NAME, &e)),
        }
    }
}

/// Tool to remove a previously added network policy
pub struct RemoveNetworkPolicyTool {
    cache: Arc<OperationsCache>,
}

impl RemoveNetworkPolicyTool {
    pub fn new(cache: Arc<OperationsCache>) -> Self {
        Self { cache }
    }
}

impl Tool for RemoveNetworkPolicyTool {
    const NAME: &'static str = "remove_network_policy";

    type Error = NetworkToolError;
    type Args = NetworkPolicyArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Remove a container-to-container network policy. The policy fields \
                          must match the one that was added."
                .to_string(),
            parameters: policy_params(),
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

        let end_port = args.end_port.unwrap_or(args.start_port);
        match ops
            .remove_network_policy(
                &args.source_app,
                &args.destination_app,
                &args.protocol,
                args.start_port,
                end_port,
            )
            .await
        {
            Ok(()) => serde_json::to_string_pretty(&json!({
                "success": true,
                "action": "removed",
                "source_app": args.source_app,
                "destination_app": args.destination_app,
                "protocol": args.protocol,
                "start_port": args.start_port,
                "end_port": end_port,
            }))
            .map_err(|e| NetworkToolError(format!("Failed to serialize: {}", e))),
            Err(e) => Ok(format_api_error(Self::NAME, &e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names() {
        assert_eq!(ListNetworkPoliciesTool::NAME, "list_network_policies");
        assert_eq!(AddNetworkPolicyTool::NAME, "add_network_policy");
        assert_eq!(RemoveNetworkPolicyTool::NAME, "remove_network_policy");
    }

    #[test]
    fn test_policy_params_required_fields() {
        let params = policy_params();
        let required: Vec<&str> = params["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, vec!["source_app", "destination_app", "start_port"]);
    }
}
