//! Configuration management for the schema tooling
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (schemas.toml)
//! - Environment variables (SCHEMAS__*)
//!
//! ## Example config file (schemas.toml):
//! ```toml
//! [registry]
//! path = "./registry"
//! verify_checksums = true
//!
//! [codec]
//! output_format = "pretty"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Registry settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Codec settings
    #[serde(default)]
    pub codec: CodecConfig,
}

/// Registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Directory holding published schema payloads
    #[serde(default = "default_registry_path")]
    pub path: PathBuf,

    /// Check `.sha256` sidecars when fetching
    #[serde(default = "default_true")]
    pub verify_checksums: bool,
}

/// Codec configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Output format used when exporting schemas
    #[serde(default)]
    pub output_format: OutputFormat,
}

/// Output format for JSON
///
/// `Compact` is the canonical wire form and what gets published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Pretty,
    #[default]
    Compact,
}

fn default_registry_path() -> PathBuf {
    PathBuf::from("registry")
}

fn default_true() -> bool {
    true
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: default_registry_path(),
            verify_checksums: true,
        }
    }
}

impl SchemaConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["schemas.toml", ".schemas.toml", "config/schemas.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "records", "schemas") {
            let xdg_config = config_dir.config_dir().join("schemas.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("SCHEMAS")
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

    /// Get the registry path (resolves relative paths)
    pub fn registry_path(&self) -> PathBuf {
        if self.registry.path.is_absolute() {
            self.registry.path.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&self.registry.path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchemaConfig::default();
        assert!(config.registry.verify_checksums);
        assert_eq!(config.codec.output_format, OutputFormat::Compact);
        assert!(config.registry_path().ends_with("registry"));
    }

    #[test]
    fn test_serialize_config() {
        let config = SchemaConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[registry]"));
        assert!(toml_str.contains("[codec]"));
        assert!(toml_str.contains("output_format = \"compact\""));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[registry]\npath = \"/srv/schemas\"\nverify_checksums = false\n\n[codec]\noutput_format = \"pretty\"\n",
        )
        .unwrap();

        let config = SchemaConfig::load_from(path.to_str()).unwrap();
        assert_eq!(config.registry.path, PathBuf::from("/srv/schemas"));
        assert!(!config.registry.verify_checksums);
        assert_eq!(config.codec.output_format, OutputFormat::Pretty);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = SchemaConfig::default();
        config.codec.output_format = OutputFormat::Pretty;
        config.save(path.to_str().unwrap()).unwrap();

        let reloaded = SchemaConfig::load_from(path.to_str()).unwrap();
        assert_eq!(reloaded.codec.output_format, OutputFormat::Pretty);
    }
}
