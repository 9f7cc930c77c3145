use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::error::{ResolverError, Result};

/// Represents the source of a configuration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Default built-in value
    Default,
    /// From a config file
    File,
    /// From environment variable
    Environment(String),
    /// Programmatically set
    Command,
}

impl ConfigSource {
    pub fn as_str(&self) -> &str {
        match self {
            ConfigSource::Default => "default",
            ConfigSource::File => "file",
            ConfigSource::Environment(var) => var,
            ConfigSource::Command => "command",
        }
    }
}

/// Raw configuration data as it appears in a JSON file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_policy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_import_events: Option<bool>,
}

/// Loads configuration from files and the environment
#[derive(Debug)]
pub struct ConfigLoader {
    use_environment: bool,
}

impl ConfigLoader {
    pub fn new(use_environment: bool) -> Self {
        Self { use_environment }
    }

    /// Get a MODRT_* environment variable, ignoring empty values
    pub fn get_env(&self, var: &str) -> Option<String> {
        if !self.use_environment {
            return None;
        }

        env::var(var).ok().filter(|s| !s.is_empty())
    }

    /// Read and parse a JSON config file. A missing file yields an empty config.
    pub fn load_file(&self, path: &Path) -> Result<RawConfig> {
        if !path.exists() {
            log::debug!("Config file {} not found, using defaults", path.display());
            return Ok(RawConfig::default());
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse JSON config content
    pub fn parse(content: &str) -> Result<RawConfig> {
        if content.trim().is_empty() {
            return Ok(RawConfig::default());
        }
        let raw: RawConfig = serde_json::from_str(content)?;
        Ok(raw)
    }

    /// Parse a boolean environment value
    pub fn parse_bool(var: &str, value: &str) -> Result<bool> {
        match value.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ResolverError::Config(format!(
                "{} must be a boolean, got \"{}\"",
                var, value
            ))),
        }
    }
}
