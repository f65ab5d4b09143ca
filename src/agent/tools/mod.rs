//! Agent tools using Rig's Tool trait
//!
//! These tools expose the platform operations to the agent. Every tool
//! resolves its operations handle through the shared [`OperationsCache`], so
//! concurrent tool calls against the same org/space reuse one handle.
//!
//! ## Available Tools
//!
//! ### Cloning
//! - `CloneApplicationTool` - clone an app to a new name, buildpack-matched
//!
//! ### Application lifecycle
//! - `ListApplicationsTool`, `ApplicationDetailsTool`
//! - `StartApplicationTool`, `StopApplicationTool`, `RestartApplicationTool`
//! - `ScaleApplicationTool`, `DeleteApplicationTool`
//!
//! ### Targeting and tenancy
//! - `SetTargetTool`, `CurrentTargetTool`, `ClearTargetTool`
//! - `ListOrganizationsTool`, `ListSpacesTool`
//!
//! ### Routing, services and network policy
//! - `ListRoutesTool`, `MapRouteTool`, `UnmapRouteTool`
//! - `ListServiceInstancesTool`, `BindServiceTool`, `UnbindServiceTool`
//! - `ListNetworkPoliciesTool`, `AddNetworkPolicyTool`, `RemoveNetworkPolicyTool`

pub mod apps;
pub mod clone_app;
pub mod error;
pub mod network;
pub mod routes;
pub mod services;
pub mod target;
pub mod tenancy;

pub use apps::{
    ApplicationDetailsTool, DeleteApplicationTool, ListApplicationsTool, RestartApplicationTool,
    ScaleApplicationTool, StartApplicationTool, StopApplicationTool,
};
pub use clone_app::CloneApplicationTool;
pub use network::{AddNetworkPolicyTool, ListNetworkPoliciesTool, RemoveNetworkPolicyTool};
pub use routes::{ListRoutesTool, MapRouteTool, UnmapRouteTool};
pub use services::{BindServiceTool, ListServiceInstancesTool, UnbindServiceTool};
pub use target::{ClearTargetTool, CurrentTargetTool, SetTargetTool};
pub use tenancy::{ListOrganizationsTool, ListSpacesTool};

use error::{format_error_for_llm, ErrorCategory};

use crate::cf::{OperationsCache, OperationsHandle, TargetContext};

/// Resolve the operations handle a tool call should use.
///
/// Organization and space must be given together or not at all; when absent
/// the current default target applies. The error side is the formatted JSON
/// a tool returns to the agent directly.
pub(crate) fn resolve_handle(
    tool_name: &str,
    cache: &OperationsCache,
    organization: Option<&str>,
    space: Option<&str>,
) -> Result<OperationsHandle, String> {
    let context = match (organization, space) {
        (Some(org), Some(space)) => Some(TargetContext::new(org, space)),
        (None, None) => None,
        _ => {
            return Err(format_error_for_llm(
                tool_name,
                ErrorCategory::ValidationFailed,
                "organization and space must be provided together",
                Some(vec![
                    "Pass both organization and space, or neither to use the current target",
                ]),
            ))
        }
    };
    cache
        .resolve(context.as_ref())
        .map_err(|e| error::format_api_error(tool_name, &e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::NullOperations;
    use std::sync::Arc;

    fn test_cache() -> OperationsCache {
        OperationsCache::new(TargetContext::new("acme", "dev"), |_| {
            Ok(Arc::new(NullOperations) as _)
        })
    }

    #[test]
    fn test_resolve_handle_rejects_org_without_space() {
        let cache = test_cache();
        let err = resolve_handle("list_applications", &cache, Some("acme"), None)
            .err()
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&err).unwrap();
        assert_eq!(parsed["code"], "VALIDATION_FAILED");
    }

    #[test]
    fn test_resolve_handle_defaults_without_context() {
        let cache = test_cache();
        assert!(resolve_handle("list_applications", &cache, None, None).is_ok());
    }
}
