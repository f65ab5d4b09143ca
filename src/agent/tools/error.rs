//! Common error utilities for agent tools
//!
//! Each tool keeps its own error type deriving `thiserror::Error` but uses
//! these utilities for consistent formatting. Tool failures are returned to
//! the agent as structured JSON rather than raised, so the model can read
//! what went wrong and decide how to proceed.

use serde::Serialize;
use serde_json::json;
use std::fmt;

use crate::cf::CfApiError;
use crate::clone::CloneError;

/// Common error categories for tool errors
///
/// These categories help the LLM understand what kind of error occurred
/// and how to potentially recover from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Application, org, space or other platform resource not found
    NotFound,
    /// Permission denied for operation
    PermissionDenied,
    /// Input validation failed
    ValidationFailed,
    /// Operation timed out
    Timeout,
    /// Network or connection error
    NetworkError,
    /// Resource temporarily not available
    ResourceUnavailable,
    /// The platform reported a failure
    PlatformError,
    /// The platform violated an expected invariant
    ConsistencyViolation,
    /// Internal tool error
    InternalError,
}

impl ErrorCategory {
    /// Returns whether this error is potentially recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotFound
                | Self::ValidationFailed
                | Self::Timeout
                | Self::NetworkError
                | Self::ResourceUnavailable
        )
    }

    /// Returns the error code string for this category
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::Timeout => "TIMEOUT",
            Self::NetworkError => "NETWORK_ERROR",
            Self::ResourceUnavailable => "RESOURCE_UNAVAILABLE",
            Self::PlatformError => "PLATFORM_ERROR",
            Self::ConsistencyViolation => "CONSISTENCY_VIOLATION",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Format an error for LLM consumption
///
/// Returns a JSON string with structured error information that helps
/// the LLM understand what went wrong and how to potentially fix it.
pub fn format_error_for_llm(
    tool_name: &str,
    category: ErrorCategory,
    message: &str,
    suggestions: Option<Vec<&str>>,
) -> String {
    let mut error_obj = json!({
        "error": true,
        "tool": tool_name,
        "category": category,
        "code": category.code(),
        "message": message,
        "recoverable": category.is_recoverable(),
    });

    if let Some(suggs) = suggestions {
        if !suggs.is_empty() {
            error_obj["suggestions"] = json!(suggs);
        }
    }

    serde_json::to_string_pretty(&error_obj).unwrap_or_else(|_| {
        format!(
            r#"{{"error": true, "tool": "{}", "message": "{}"}}"#,
            tool_name, message
        )
    })
}

/// Format a platform API error for LLM consumption
pub fn format_api_error(tool_name: &str, error: &CfApiError) -> String {
    match error {
        CfApiError::Unauthorized => format_error_for_llm(
            tool_name,
            ErrorCategory::PermissionDenied,
            "Not authenticated - check the configured API token",
            Some(vec![
                "The configured token was rejected by the platform",
                "Set a valid token via CF_TOKEN or the config file",
            ]),
        ),
        CfApiError::NotFound(msg) => format_error_for_llm(
            tool_name,
            ErrorCategory::NotFound,
            &format!("Resource not found: {}", msg),
            Some(vec![
                "The requested resource does not exist in the targeted org/space",
            ]),
        ),
        CfApiError::PermissionDenied(msg) => format_error_for_llm(
            tool_name,
            ErrorCategory::PermissionDenied,
            &format!("Permission denied: {}", msg),
            Some(vec!["The user does not have access to this resource"]),
        ),
        CfApiError::RateLimited => format_error_for_llm(
            tool_name,
            ErrorCategory::ResourceUnavailable,
            "Rate limit exceeded - please try again later",
            Some(vec!["Wait a moment before retrying"]),
        ),
        CfApiError::HttpError(e) => format_error_for_llm(
            tool_name,
            ErrorCategory::NetworkError,
            &format!("Network error: {}", e),
            Some(vec![
                "Check network connectivity",
                "The platform API may be temporarily unavailable",
            ]),
        ),
        CfApiError::ParseError(msg) => format_error_for_llm(
            tool_name,
            ErrorCategory::InternalError,
            &format!("Failed to parse API response: {}", msg),
            Some(vec!["This may be a temporary API issue"]),
        ),
        CfApiError::WaitTimeout { .. } => format_error_for_llm(
            tool_name,
            ErrorCategory::Timeout,
            &error.to_string(),
            Some(vec!["The platform did not finish within the wait budget"]),
        ),
        CfApiError::StagingFailed { .. } => format_error_for_llm(
            tool_name,
            ErrorCategory::PlatformError,
            &error.to_string(),
            Some(vec!["Check the application's staging logs on the platform"]),
        ),
        CfApiError::ServerError { status, message } => format_error_for_llm(
            tool_name,
            ErrorCategory::PlatformError,
            &format!("Server error ({}): {}", status, message),
            Some(vec![
                "The platform API is experiencing issues",
                "Try again later",
            ]),
        ),
        CfApiError::ApiError { status, message } => format_error_for_llm(
            tool_name,
            ErrorCategory::PlatformError,
            &format!("API error ({}): {}", status, message),
            Some(vec!["Check the error message for details"]),
        ),
        CfApiError::Io(e) => format_error_for_llm(
            tool_name,
            ErrorCategory::InternalError,
            &format!("Local I/O error: {}", e),
            None,
        ),
    }
}

/// Format a clone pipeline error for LLM consumption
pub fn format_clone_error(tool_name: &str, error: &CloneError) -> String {
    match error {
        CloneError::RuntimeMismatch { .. } => format_error_for_llm(
            tool_name,
            ErrorCategory::ConsistencyViolation,
            &error.to_string(),
            Some(vec![
                "The platform re-detected the buildpack during the source copy",
                "The target application is left in a partially-cloned state",
            ]),
        ),
        CloneError::Timeout { .. } => format_error_for_llm(
            tool_name,
            ErrorCategory::Timeout,
            &error.to_string(),
            Some(vec![
                "The clone did not finish within the overall time budget",
                "The target application may be left partially cloned",
            ]),
        ),
        CloneError::PlaceholderGeneration { .. } => format_error_for_llm(
            tool_name,
            ErrorCategory::InternalError,
            &error.to_string(),
            Some(vec!["Could not write the local placeholder files"]),
        ),
        CloneError::Snapshot { source, .. }
        | CloneError::Deploy { source, .. }
        | CloneError::Environment { source, .. }
        | CloneError::CopySource { source, .. }
        | CloneError::Rescale { source, .. }
        | CloneError::Start { source, .. } => {
            let category = match source {
                CfApiError::NotFound(_) => ErrorCategory::NotFound,
                CfApiError::Unauthorized | CfApiError::PermissionDenied(_) => {
                    ErrorCategory::PermissionDenied
                }
                CfApiError::HttpError(_) => ErrorCategory::NetworkError,
                CfApiError::WaitTimeout { .. } => ErrorCategory::Timeout,
                _ => ErrorCategory::PlatformError,
            };
            format_error_for_llm(tool_name, category, &error.to_string(), None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_codes() {
        assert_eq!(ErrorCategory::NotFound.code(), "NOT_FOUND");
        assert_eq!(ErrorCategory::PermissionDenied.code(), "PERMISSION_DENIED");
        assert_eq!(
            ErrorCategory::ConsistencyViolation.code(),
            "CONSISTENCY_VIOLATION"
        );
    }

    #[test]
    fn test_error_category_recoverable() {
        assert!(ErrorCategory::NotFound.is_recoverable());
        assert!(ErrorCategory::Timeout.is_recoverable());
        assert!(!ErrorCategory::PermissionDenied.is_recoverable());
        assert!(!ErrorCategory::ConsistencyViolation.is_recoverable());
    }

    #[test]
    fn test_format_error_for_llm() {
        let json_str = format_error_for_llm(
            "clone_application",
            ErrorCategory::NotFound,
            "Application 'billing-api' not found",
            Some(vec!["Check the application name", "Use list_applications"]),
        );

        let parsed: serde_json::Value = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed["error"], true);
        assert_eq!(parsed["tool"], "clone_application");
        assert_eq!(parsed["code"], "NOT_FOUND");
        assert_eq!(parsed["recoverable"], true);
        assert!(parsed["suggestions"].is_array());
    }

    #[test]
    fn test_runtime_mismatch_maps_to_consistency_violation() {
        let err = CloneError::RuntimeMismatch {
            app: "billing-api-canary".to_string(),
            expected: "java_buildpack".to_string(),
            actual: "nodejs_buildpack".to_string(),
        };
        let json_str = format_clone_error("clone_application", &err);
        let parsed: serde_json::Value = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed["code"], "CONSISTENCY_VIOLATION");
        assert_eq!(parsed["recoverable"], false);
    }

    #[test]
    fn test_not_found_api_error_category() {
        let json_str = format_api_error(
            "application_details",
            &CfApiError::NotFound("app 'billing-api'".to_string()),
        );
        let parsed: serde_json::Value = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed["code"], "NOT_FOUND");
    }
}
