//! Error types for the Cloud Foundry API client
//!
//! Provides structured error types for all API operations, plus the
//! transient/fatal classification consumed by the retry wrapper.

use thiserror::Error;

/// Errors that can occur when interacting with the Cloud Foundry API
#[derive(Debug, Error)]
pub enum CfApiError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API returned an error response
    #[error("CF API error ({status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse the API response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Credentials missing or rejected by the platform
    #[error("Not authenticated with the Cloud Foundry API - check CF_TOKEN or the configured credentials")]
    Unauthorized,

    /// Requested resource was not found in the targeted org/space
    #[error("Not found: {0}")]
    NotFound(String),

    /// User does not have permission for the requested operation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded - please try again later")]
    RateLimited,

    /// Server error
    #[error("CF server error ({status}): {message}")]
    ServerError {
        /// HTTP status code (5xx)
        status: u16,
        /// Error message
        message: String,
    },

    /// A staging or startup wait exceeded its timeout budget
    #[error("Timed out waiting for {operation} of '{app}' after {seconds}s")]
    WaitTimeout {
        /// What we were waiting for ("staging", "startup")
        operation: &'static str,
        /// Application name
        app: String,
        /// Budget that was exceeded
        seconds: u64,
    },

    /// A staging build finished in a failed state
    #[error("Staging failed for '{app}': {reason}")]
    StagingFailed {
        /// Application name
        app: String,
        /// Error detail reported by the platform
        reason: String,
    },

    /// Local I/O while preparing a request (e.g. packaging source bits)
    #[error("Local I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CfApiError {
    /// Whether this failure is worth retrying.
    ///
    /// Transient: request timeouts, connection failures, rate limiting,
    /// and gateway-class 5xx responses. Everything else is fatal.
    pub fn is_transient(&self) -> bool {
        match self {
            CfApiError::HttpError(e) => e.is_timeout() || e.is_connect(),
            CfApiError::RateLimited => true,
            CfApiError::ServerError { status, .. } => {
                matches!(status, 502 | 503 | 504)
            }
            _ => false,
        }
    }
}

/// Result type alias for Cloud Foundry API operations
pub type Result<T> = std::result::Result<T, CfApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_is_transient() {
        assert!(CfApiError::RateLimited.is_transient());
    }

    #[test]
    fn test_gateway_errors_are_transient() {
        for status in [502u16, 503, 504] {
            let err = CfApiError::ServerError {
                status,
                message: "upstream".into(),
            };
            assert!(err.is_transient(), "{} should be transient", status);
        }
        let err = CfApiError::ServerError {
            status: 500,
            message: "boom".into(),
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn test_fatal_errors_are_not_transient() {
        assert!(!CfApiError::Unauthorized.is_transient());
        assert!(!CfApiError::NotFound("app".into()).is_transient());
        assert!(
            !CfApiError::ApiError {
                status: 422,
                message: "unprocessable".into()
            }
            .is_transient()
        );
        assert!(
            !CfApiError::StagingFailed {
                app: "web".into(),
                reason: "buildpack error".into()
            }
            .is_transient()
        );
    }

    #[test]
    fn test_display_includes_context() {
        let err = CfApiError::WaitTimeout {
            operation: "staging",
            app: "billing-api".into(),
            seconds: 180,
        };
        let msg = err.to_string();
        assert!(msg.contains("staging"));
        assert!(msg.contains("billing-api"));
        assert!(msg.contains("180"));
    }
}
