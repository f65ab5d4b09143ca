pub mod types;

use crate::error::{PulseError, Result};
use log::debug;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use types::{CfConfig, ConfigReport};

const CONFIG_FILE_NAME: &str = ".cfpulse.toml";

/// Get the global config file path (~/.cfpulse.toml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAME))
}

/// Load configuration: explicit file if given, otherwise the global file if
/// present, otherwise defaults. `CF_*` environment variables override file
/// values either way.
pub fn load_config(explicit_path: Option<&Path>) -> Result<CfConfig> {
    let mut config = match explicit_path {
        Some(path) => read_config_file(path)?,
        None => match global_config_path() {
            Some(global) if global.exists() => read_config_file(&global)?,
            _ => CfConfig::default(),
        },
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<CfConfig> {
    debug!("loading configuration from {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| {
        PulseError::Config(format!("could not read {}: {}", path.display(), e))
    })?;
    toml::from_str(&content)
        .map_err(|e| PulseError::Config(format!("could not parse {}: {}", path.display(), e)))
}

fn apply_env_overrides(config: &mut CfConfig) {
    if let Ok(api_url) = env::var("CF_API_URL") {
        config.api_url = api_url;
    }
    if let Ok(token) = env::var("CF_TOKEN") {
        config.token = token;
    }
    if let Ok(org) = env::var("CF_ORG") {
        config.organization = org;
    }
    if let Ok(space) = env::var("CF_SPACE") {
        config.space = space;
    }
    if let Ok(skip) = env::var("CF_SKIP_TLS_VALIDATION") {
        config.skip_tls_validation = matches!(skip.as_str(), "1" | "true" | "yes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pulse.toml");
        fs::write(
            &path,
            "api_url = \"https://api.sys.example.com\"\ntoken = \"t\"\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.api_url, "https://api.sys.example.com");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_config(Some(&missing)).is_err());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "api_url = [not toml").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }
}
