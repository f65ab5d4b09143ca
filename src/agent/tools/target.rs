//! Targeting tools for the agent
//!
//! Set, query and clear the default org/space that context-free tool calls
//! operate against. Setting a target validates it against the platform
//! before committing, so a typo never silently re-points the default.

use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::agent::tools::error::{format_api_error, format_error_for_llm, ErrorCategory};
use crate::cf::{OperationsCache, TargetContext};

/// Arguments for the set target tool
#[derive(Debug, Deserialize)]
pub struct SetTargetArgs {
    /// Organization name
    pub organization: String,
    /// Space name
    pub space: String,
}

/// Arguments for tools that take no input
#[derive(Debug, Deserialize)]
pub struct NoArgs {}

/// Error type for targeting operations
#[derive(Debug, thiserror::Error)]
#[error("Target tool error: {0}")]
pub struct TargetToolError(String);

/// Tool to set the default org/space target
pub struct SetTargetTool {
    cache: Arc<OperationsCache>,
}

impl SetTargetTool {
    pub fn new(cache: Arc<OperationsCache>) -> Self {
        Self { cache }
    }
}

impl Tool for SetTargetTool {
    const NAME: &'static str = "set_target";

    type Error = TargetToolError;
    type Args = SetTargetArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: r#"Set the default organization and space for subsequent operations.

The org/space pair is validated against the platform (the space must exist
and be accessible) before the default target changes. Tools called without
an explicit organization/space use this target."#
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "organization": {
                        "type": "string",
                        "description": "Organization name"
                    },
                    "space": {
                        "type": "string",
                        "description": "Space name"
                    }
                },
                "required": ["organization", "space"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let context = TargetContext::new(args.organization.clone(), args.space.clone());
        let ops = match self.cache.resolve(Some(&context)) {
            Ok(ops) => ops,
            Err(e) => return Ok(format_api_error(Self::NAME, &e)),
        };

        // Listing spaces both proves the org resolves and lets us confirm
        // the named space is actually in it.
        let spaces = match ops.list_spaces().await {
            Ok(spaces) => spaces,
            Err(e) => return Ok(format_api_error(Self::NAME, &e)),
        };
        if !spaces.iter().any(|s| s == &args.space) {
            return Ok(format_error_for_llm(
                Self::NAME,
                ErrorCategory::NotFound,
                &format!(
                    "Space '{}' not found in organization '{}'",
                    args.space, args.organization
                ),
                Some(vec!["Use list_spaces to see the spaces in this organization"]),
            ));
        }

        self.cache
            .set_default_target(args.organization.clone(), args.space.clone());

        serde_json::to_string_pretty(&json!({
            "success": true,
            "target": {
                "organization": args.organization,
                "space": args.space,
            }
        }))
        .map_err(|e| TargetToolError(format!("Failed to serialize: {}", e)))
    }
}

/// Tool to report the current default target
pub struct CurrentTargetTool {
    cache: Arc<OperationsCache>,
}

impl CurrentTargetTool {
    pub fn new(cache: Arc<OperationsCache>) -> Self {
        Self { cache }
    }
}

impl Tool for CurrentTargetTool {
    const NAME: &'static str = "current_target";

    type Error = TargetToolError;
    type Args = NoArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Get the organization and space that context-free operations \
                          currently target."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        }
    }

    async fn call(&self, _args: Self::Args) -> Result<Self::Output, Self::Error> {
        let target = self.cache.current_default();
        serde_json::to_string_pretty(&json!({
            "success": true,
            "target": {
                "organization": target.organization,
                "space": target.space,
            }
        }))
        .map_err(|e| TargetToolError(format!("Failed to serialize: {}", e)))
    }
}

/// Tool to revert the default target to the configured one
pub struct ClearTargetTool {
    cache: Arc<OperationsCache>,
}

impl ClearTargetTool {
    pub fn new(cache: Arc<OperationsCache>) -> Self {
        Self { cache }
    }
}

impl Tool for ClearTargetTool {
    const NAME: &'static str = "clear_target";

    type Error = TargetToolError;
    type Args = NoArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Clear any runtime target override and revert to the configured \
                          default organization and space."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        }
    }

    async fn call(&self, _args: Self::Args) -> Result<Self::Output, Self::Error> {
        self.cache.clear_default_target();
        let target = self.cache.current_default();
        serde_json::to_string_pretty(&json!({
            "success": true,
            "target": {
                "organization": target.organization,
                "space": target.space,
            }
        }))
        .map_err(|e| TargetToolError(format!("Failed to serialize: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::NullOperations;

    fn cache() -> Arc<OperationsCache> {
        Arc::new(OperationsCache::new(
            TargetContext::new("acme", "dev"),
            |_| Ok(Arc::new(NullOperations)),
        ))
    }

    #[test]
    fn test_tool_names() {
        assert_eq!(SetTargetTool::NAME, "set_target");
        assert_eq!(CurrentTargetTool::NAME, "current_target");
        assert_eq!(ClearTargetTool::NAME, "clear_target");
    }

    #[tokio::test]
    async fn test_set_target_rejects_unknown_space() {
        // NullOperations lists no spaces, so validation must refuse.
        let cache = cache();
        let tool = SetTargetTool::new(Arc::clone(&cache));
        let out = tool
            .call(SetTargetArgs {
                organization: "acme".to_string(),
                space: "qa".to_string(),
            })
            .await
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["code"], "NOT_FOUND");
        assert_eq!(cache.current_default(), TargetContext::new("acme", "dev"));
    }

    #[tokio::test]
    async fn test_current_and_clear_target() {
        let cache = cache();
        cache.set_default_target("globex", "qa");

        let current = CurrentTargetTool::new(Arc::clone(&cache));
        let out = current.call(NoArgs {}).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["target"]["organization"], "globex");

        let clear = ClearTargetTool::new(Arc::clone(&cache));
        let out = clear.call(NoArgs {}).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["target"]["organization"], "acme");
        assert_eq!(parsed["target"]["space"], "dev");
    }
}
