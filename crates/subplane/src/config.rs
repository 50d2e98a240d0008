//! Configuration for the compatibility behavior.
//!
//! [`CompatConfig`] implements [`serde::Deserialize`] and is usually loaded
//! from a TOML file with [`load_config`]. Every field is optional in the file
//! and falls back to the defaults below.
//!
//! ```toml
//! marker = "http://www.signavio.com"
//! recenter_on_expand = true
//! priority = 2000
//! ```
//!
//! # Example
//!
//! ```
//! # use subplane::config::CompatConfig;
//! let config = CompatConfig::from_toml_str("recenter_on_expand = false").unwrap();
//!
//! assert_eq!(config.marker(), "http://www.signavio.com");
//! assert!(!config.recenter_on_expand());
//! assert_eq!(config.priority(), 2000);
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::info;
use serde::Deserialize;
use thiserror::Error;

/// Namespace URI the vendor declares on the document root.
pub const DEFAULT_MARKER: &str = "http://www.signavio.com";

/// Interceptor priority; higher than the host's own toggle listeners.
pub const DEFAULT_PRIORITY: i32 = 2000;

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Settings of the sub-process compatibility behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompatConfig {
    /// Attribute value on the document root that enables the behavior.
    marker: String,

    /// Whether expanding recenters the children inside the sub-process.
    recenter_on_expand: bool,

    /// Priority of the toggle-collapse interceptor.
    priority: i32,
}

impl Default for CompatConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            recenter_on_expand: true,
            priority: DEFAULT_PRIORITY,
        }
    }
}

impl CompatConfig {
    /// Creates a configuration with explicit values.
    pub fn new(marker: impl Into<String>, recenter_on_expand: bool, priority: i32) -> Self {
        Self {
            marker: marker.into(),
            recenter_on_expand,
            priority,
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys and
    /// [`ConfigError::Validation`] for an empty marker.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the marker attribute value.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Returns whether expanding recenters the children.
    pub fn recenter_on_expand(&self) -> bool {
        self.recenter_on_expand
    }

    /// Returns the interceptor priority.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.marker.trim().is_empty() {
            return Err(ConfigError::Validation(
                "marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Loads a [`CompatConfig`] from a TOML file.
///
/// # Errors
///
/// Returns error if:
/// - The file doesn't exist
/// - The file cannot be read
/// - TOML parsing or validation fails
pub fn load_config(path: impl AsRef<Path>) -> Result<CompatConfig, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }

    info!(path = path.display().to_string(); "Loading configuration");

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    CompatConfig::from_toml_str(&content)
}
