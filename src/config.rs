//! Configuration for the generator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (sketch.toml)
//! - Environment variables (SKETCH_*)
//!
//! ## Example config file (sketch.toml):
//! ```toml
//! [registry]
//! url = "https://registry.npmjs.org"
//! package = "@sketch-hq/sketch-file-format"
//!
//! [output]
//! path = "types.py"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::fetch;

/// Main configuration for the generator
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeneratorConfig {
    /// Registry settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL of the package registry
    #[serde(default = "default_registry_url")]
    pub url: String,

    /// Name of the schema package
    #[serde(default = "default_package")]
    pub package: String,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default path of the generated module
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

fn default_registry_url() -> String {
    fetch::DEFAULT_REGISTRY.to_string()
}

fn default_package() -> String {
    fetch::DEFAULT_PACKAGE.to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from("types.py")
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: default_registry_url(),
            package: default_package(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["sketch.toml", ".sketch.toml", "config/sketch.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "phaiel", "sketch-document")
        {
            let xdg_config = config_dir.config_dir().join("sketch.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (SKETCH_*)
        builder = builder.add_source(
            Environment::with_prefix("SKETCH")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
