//! Tenancy discovery tools for the agent

use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::agent::tools::error::format_api_error;
use crate::agent::tools::resolve_handle;
use crate::cf::OperationsCache;

/// Arguments for the tenancy listing tools
#[derive(Debug, Deserialize)]
pub struct TenancyArgs {
    /// Organization name (optional, defaults to current target)
    #[serde(default)]
    pub organization: Option<String>,
    /// Space name (optional, defaults to current target)
    #[serde(default)]
    pub space: Option<String>,
}

/// Error type for tenancy operations
#[derive(Debug, thiserror::Error)]
#[error("Tenancy tool error: {0}")]
pub struct TenancyToolError(String);

fn tenancy_params() -> serde_json::Value {
    json!({
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
    })
}

/// Tool to list all organizations visible to the configured account
pub struct ListOrganizationsTool {
    cache: Arc<OperationsCache>,
}

impl ListOrganizationsTool {
    pub fn new(cache: Arc<OperationsCache>) -> Self {
        Self { cache }
    }
}

impl Tool for ListOrganizationsTool {
    const NAME: &'static str = "list_organizations";

    type Error = TenancyToolError;
    type Args = TenancyArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "List all organizations the configured account can see. Use this \
                          to discover valid targets before set_target."
                .to_string(),
            parameters: tenancy_params(),
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

        match ops.list_organizations().await {
            Ok(orgs) => {
                let count = orgs.len();
                serde_json::to_string_pretty(&json!({
                    "success": true,
                    "organizations": orgs,
                    "count": count,
                }))
                .map_err(|e| TenancyToolError(format!("Failed to serialize: {}", e)))
            }
            Err(e) => Ok(format_api_error(Self::NAME, &e)),
        }
    }
}

/// Tool to list the spaces in the targeted organization
pub struct ListSpacesTool {
    cache: Arc<OperationsCache>,
}

impl ListSpacesTool {
    pub fn new(cache: Arc<OperationsCache>) -> Self {
        Self { cache }
    }
}

impl Tool for ListSpacesTool {
    const NAME: &'static str = "list_spaces";

    type Error = TenancyToolError;
    type Args = TenancyArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "List the spaces in the targeted organization.".to_string(),
            parameters: tenancy_params(),
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

        match ops.list_spaces().await {
            Ok(spaces) => {
                let count = spaces.len();
                serde_json::to_string_pretty(&json!({
                    "success": true,
                    "spaces": spaces,
                    "count": count,
                }))
                .map_err(|e| TenancyToolError(format!("Failed to serialize: {}", e)))
            }
            Err(e) => Ok(format_api_error(Self::NAME, &e)),
        }
    }
}
