//! Configuration management for traitgen
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (traitgen.toml)
//! - Environment variables (TRAITGEN__*)
//!
//! Command line flags override whatever is loaded here.
//!
//! ## Example config file (traitgen.toml):
//! ```toml
//! [generation]
//! generator = "cpp"
//! output_dir = "./generated"
//! dry_run = false
//! with = ["../other-package.yaml"]
//!
//! [globals]
//! copyright_owner = "Some Studio Ltd"
//! spdx_license_identifier = "Apache-2.0"
//!
//! [logging]
//! level = "info"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use crate::codegen::TemplateGlobals;
use crate::error::{Result, TraitgenError};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraitgenConfig {
    /// Generation settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Values for generated file headers
    #[serde(default)]
    pub globals: GlobalsConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Generation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Generator to use when none is given on the command line
    #[serde(default)]
    pub generator: Option<String>,

    /// Output directory when none is given on the command line
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Validate and build only, write nothing
    #[serde(default)]
    pub dry_run: bool,

    /// Descriptions loaded for trait resolution only
    #[serde(default)]
    pub with: Vec<PathBuf>,
}

/// Header globals
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalsConfig {
    #[serde(default)]
    pub copyright_owner: Option<String>,

    #[serde(default)]
    pub copyright_date: Option<String>,

    #[serde(default)]
    pub spdx_license_identifier: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default tracing filter, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl GlobalsConfig {
    /// The configured globals under their template names
    pub fn template_globals(&self) -> TemplateGlobals {
        let mut globals = TemplateGlobals::new();
        let entries = [
            ("copyrightOwner", &self.copyright_owner),
            ("copyrightDate", &self.copyright_date),
            ("spdxLicenseIdentifier", &self.spdx_license_identifier),
        ];
        for (key, value) in entries {
            if let Some(value) = value {
                globals.insert(key.to_string(), Value::String(value.clone()));
            }
        }
        globals
    }
}

impl TraitgenConfig {
    /// Load configuration, adding a required file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = ["traitgen.toml", ".traitgen.toml", "config/traitgen.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("org", "openassetio", "traitgen") {
            let xdg_config = config_dir.config_dir().join("traitgen.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (TRAITGEN__*)
        builder = builder.add_source(
            Environment::with_prefix("TRAITGEN")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| TraitgenError::Configuration(format!("Invalid configuration: {}", e)))?;
        config
            .try_deserialize()
            .map_err(|e| TraitgenError::Configuration(format!("Invalid configuration: {}", e)))
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
