//! Configuration loading and provider credential resolution
//!
//! Provides multi-tier credential resolution with ENV → TOML priority.
//! Absent credentials are never an error: a provider without credentials
//! is simply "not configured" and the cascade skips it.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter ("error", "warn", "info", "debug", "trace")
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// TOML configuration file contents (`~/.config/beacon/beacon.toml`)
///
/// All provider credentials are optional; a missing entry leaves the
/// corresponding provider unconfigured.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moz_access_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moz_secret_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataforseo_login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataforseo_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gsc_access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gsc_property: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagespeed_api_key: Option<String>,
    // Table value; keep last so serialized TOML stays well-formed.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Resolved provider credentials after ENV → TOML resolution
#[derive(Debug, Clone, Default)]
pub struct ProviderCredentials {
    pub moz_access_id: Option<String>,
    pub moz_secret_key: Option<String>,
    pub dataforseo_login: Option<String>,
    pub dataforseo_password: Option<String>,
    pub gsc_access_token: Option<String>,
    pub gsc_property: Option<String>,
    pub pagespeed_api_key: Option<String>,
}

impl ProviderCredentials {
    /// Resolve all provider credentials from environment and TOML config
    ///
    /// Priority per key: environment variable → TOML entry.
    pub fn resolve(toml_config: &TomlConfig) -> Self {
        Self {
            moz_access_id: resolve_credential(
                "BEACON_MOZ_ACCESS_ID",
                toml_config.moz_access_id.as_deref(),
            ),
            moz_secret_key: resolve_credential(
                "BEACON_MOZ_SECRET_KEY",
                toml_config.moz_secret_key.as_deref(),
            ),
            dataforseo_login: resolve_credential(
                "BEACON_DATAFORSEO_LOGIN",
                toml_config.dataforseo_login.as_deref(),
            ),
            dataforseo_password: resolve_credential(
                "BEACON_DATAFORSEO_PASSWORD",
                toml_config.dataforseo_password.as_deref(),
            ),
            gsc_access_token: resolve_credential(
                "BEACON_GSC_ACCESS_TOKEN",
                toml_config.gsc_access_token.as_deref(),
            ),
            gsc_property: resolve_credential(
                "BEACON_GSC_PROPERTY",
                toml_config.gsc_property.as_deref(),
            ),
            pagespeed_api_key: resolve_credential(
                "BEACON_PAGESPEED_API_KEY",
                toml_config.pagespeed_api_key.as_deref(),
            ),
        }
    }
}

/// Resolve a single credential with ENV → TOML priority
///
/// Warns when the key is present in multiple sources (potential
/// misconfiguration); the environment variable wins.
pub fn resolve_credential(env_var_name: &str, toml_value: Option<&str>) -> Option<String> {
    let env_value = std::env::var(env_var_name).ok().filter(|v| is_valid_key(v));
    let toml_value = toml_value.filter(|v| is_valid_key(v)).map(String::from);

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            key = env_var_name,
            "credential found in both environment and TOML; using environment"
        );
    }

    match env_value {
        Some(v) => {
            debug!(key = env_var_name, "credential loaded from environment");
            Some(v)
        }
        None => toml_value,
    }
}

/// Validate a credential value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Default configuration file path for the platform
///
/// `~/.config/beacon/beacon.toml` on Linux/macOS (XDG config dir),
/// `%APPDATA%\beacon\beacon.toml` on Windows.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("beacon").join("beacon.toml"))
}

/// Load TOML configuration from a file
///
/// A missing file yields the default (empty) configuration.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(TomlConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Write TOML configuration to a file, creating parent directories
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}
