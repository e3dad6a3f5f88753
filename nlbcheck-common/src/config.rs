//! Configuration loading and credential resolution
//!
//! Settings come from a TOML file plus environment-variable overrides.
//! Resolution priority for credentials: environment → TOML file. The
//! winning source is logged, and a warning is emitted when more than one
//! source defines the same credential.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable carrying the catalogue API key
pub const API_KEY_ENV: &str = "NLBCHECK_API_KEY";

/// Environment variable carrying the spreadsheet upload bearer token
pub const UPLOAD_TOKEN_ENV: &str = "NLBCHECK_UPLOAD_TOKEN";

/// TOML configuration file contents
///
/// All fields are optional; missing values fall back to environment
/// variables or built-in defaults at the point of use.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Catalogue API key
    pub api_key: Option<String>,
    /// Catalogue service base URL override
    pub base_url: Option<String>,
    /// Worker thread count override
    pub workers: Option<usize>,
    /// Destination spreadsheet id for the upload tool
    pub spreadsheet_id: Option<String>,
    /// OAuth bearer token for the upload tool
    pub upload_token: Option<String>,
}

/// Default configuration file path for the platform
/// (`<config dir>/nlbcheck/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("nlbcheck").join("config.toml"))
}

/// Load the TOML configuration.
///
/// An explicitly given path must exist and parse. With no explicit path the
/// default location is tried and a missing file simply yields defaults.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match default_config_path() {
            Some(p) => (p, false),
            None => return Ok(TomlConfig::default()),
        },
    };

    if !path.exists() {
        if explicit {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    info!("Configuration loaded from {}", path.display());
    Ok(config)
}

/// Resolve the catalogue API key from environment or TOML configuration.
///
/// Priority: environment variable → TOML file.
pub fn resolve_api_key(toml_config: &TomlConfig) -> Result<String> {
    resolve_credential(
        "catalogue API key",
        API_KEY_ENV,
        toml_config.api_key.as_deref(),
    )
}

/// Resolve the spreadsheet upload bearer token.
///
/// Priority: environment variable → TOML file.
pub fn resolve_upload_token(toml_config: &TomlConfig) -> Result<String> {
    resolve_credential(
        "upload token",
        UPLOAD_TOKEN_ENV,
        toml_config.upload_token.as_deref(),
    )
}

fn resolve_credential(name: &str, env_var: &str, toml_value: Option<&str>) -> Result<String> {
    let env_value = std::env::var(env_var).ok();

    let mut sources = Vec::new();
    if env_value.as_deref().is_some_and(is_valid_key) {
        sources.push("environment");
    }
    if toml_value.is_some_and(is_valid_key) {
        sources.push("TOML");
    }

    if sources.len() > 1 {
        warn!(
            "{} found in multiple sources: {}. Using environment (highest priority).",
            name,
            sources.join(", ")
        );
    }

    if let Some(value) = env_value {
        if is_valid_key(&value) {
            info!("{} loaded from environment variable", name);
            return Ok(value);
        }
    }

    if let Some(value) = toml_value {
        if is_valid_key(value) {
            info!("{} loaded from TOML config", name);
            return Ok(value.to_string());
        }
    }

    Err(Error::Config(format!(
        "{} not configured. Set {} or add it to the config file \
         (default: ~/.config/nlbcheck/config.toml)",
        name, env_var
    )))
}

/// Validate a credential (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

// ============================================================================
// Tests
// ============================================================================
