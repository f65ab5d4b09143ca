use serde::{Deserialize, Serialize};

use crate::cf::TargetContext;

/// Platform connection configuration
///
/// Loaded from `~/.cfpulse.toml`, with `CF_*` environment variables taking
/// precedence over file values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CfConfig {
    /// Base URL of the platform API, e.g. `https://api.sys.example.com`
    pub api_url: String,
    /// Bearer token used for every API call
    pub token: String,
    /// Default organization for context-free operations
    pub organization: String,
    /// Default space for context-free operations
    pub space: String,
    /// Accept invalid TLS certificates (self-signed foundations)
    pub skip_tls_validation: bool,
}

impl CfConfig {
    /// The statically configured default target
    pub fn default_target(&self) -> TargetContext {
        TargetContext::new(self.organization.clone(), self.space.clone())
    }

    /// Validate the configuration, returning every problem at once so a
    /// user can fix their file in one pass. Missing org/space are warnings
    /// (targeting tools can set them later), missing connection settings
    /// are errors.
    pub fn validate(&self) -> ConfigReport {
        let mut report = ConfigReport::default();

        if self.api_url.trim().is_empty() {
            report
                .errors
                .push("api_url is not configured. Set api_url or CF_API_URL.".to_string());
        }
        if self.token.trim().is_empty() {
            report
                .errors
                .push("token is not configured. Set token or CF_TOKEN.".to_string());
        }
        if self.organization.trim().is_empty() {
            report.warnings.push(
                "organization is not configured. Set organization or CF_ORG, or use `target set`."
                    .to_string(),
            );
        }
        if self.space.trim().is_empty() {
            report.warnings.push(
                "space is not configured. Set space or CF_SPACE, or use `target set`.".to_string(),
            );
        }

        report
    }
}

/// Outcome of configuration validation
#[derive(Debug, Default)]
pub struct ConfigReport {
    /// Problems that prevent talking to the platform
    pub errors: Vec<String>,
    /// Problems a later `target set` can still fix
    pub warnings: Vec<String>,
}

impl ConfigReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> CfConfig {
        CfConfig {
            api_url: "https://api.sys.example.com".to_string(),
            token: "bearer-token".to_string(),
            organization: "acme".to_string(),
            space: "dev".to_string(),
            skip_tls_validation: false,
        }
    }

    #[test]
    fn test_complete_config_validates() {
        let report = complete().validate();
        assert!(report.is_ok());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let report = CfConfig::default().validate();
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.warnings.len(), 2);
        assert!(!report.is_ok());
    }

    #[test]
    fn test_missing_target_is_warning_only() {
        let mut config = complete();
        config.organization.clear();
        let report = config.validate();
        assert!(report.is_ok());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_default_target() {
        let config = complete();
        assert_eq!(config.default_target(), TargetContext::new("acme", "dev"));
    }

    #[test]
    fn test_toml_round_trip() {
        let text = r#"
            api_url = "https://api.sys.example.com"
            token = "t0ken"
            organization = "acme"
            space = "dev"
            skip_tls_validation = true
        "#;
        let config: CfConfig = toml::from_str(text).unwrap();
        assert_eq!(config.api_url, "https://api.sys.example.com");
        assert!(config.skip_tls_validation);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: CfConfig = toml::from_str("api_url = \"https://api.example.com\"").unwrap();
        assert!(config.token.is_empty());
        assert!(!config.skip_tls_validation);
    }
}
