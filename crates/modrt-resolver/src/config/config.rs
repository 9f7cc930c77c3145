use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::source::{ConfigLoader, ConfigSource, RawConfig};
use crate::error::{ResolverError, Result};
use crate::solver::ProviderPolicy;

/// Resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResolverConfig {
    /// Order in which exporters are tried as providers
    #[serde(default)]
    pub provider_policy: ProviderPolicy,

    /// Whether failed dynamic imports are reported as framework events
    #[serde(default = "default_true")]
    pub dynamic_import_events: bool,

    #[serde(skip)]
    sources: HashMap<String, ConfigSource>,
}

fn default_true() -> bool {
    true
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            provider_policy: ProviderPolicy::default(),
            dynamic_import_events: true,
            sources: HashMap::new(),
        }
    }
}

impl ResolverConfig {
    /// Build the configuration from defaults, an optional file and,
    /// if `use_environment`, the `MODRT_*` variables.
    pub fn build(path: Option<&Path>, use_environment: bool) -> Result<Self> {
        let loader = ConfigLoader::new(use_environment);
        let mut config = Self::default();

        if let Some(path) = path {
            let raw = loader.load_file(path)?;
            config.merge_raw(&raw, ConfigSource::File)?;
        }

        if let Some(value) = loader.get_env("MODRT_PROVIDER_POLICY") {
            config.set_provider_policy(&value, ConfigSource::Environment("MODRT_PROVIDER_POLICY".to_string()))?;
        }

        if let Some(value) = loader.get_env("MODRT_DYNAMIC_IMPORT_EVENTS") {
            config.dynamic_import_events = ConfigLoader::parse_bool("MODRT_DYNAMIC_IMPORT_EVENTS", &value)?;
            config.sources.insert(
                "dynamic-import-events".to_string(),
                ConfigSource::Environment("MODRT_DYNAMIC_IMPORT_EVENTS".to_string()),
            );
        }

        log::debug!(
            "Resolver config: provider-policy={}, dynamic-import-events={}",
            config.provider_policy.as_str(),
            config.dynamic_import_events
        );
        Ok(config)
    }

    /// Parse a JSON document on top of the defaults
    pub fn from_json(content: &str) -> Result<Self> {
        let raw = ConfigLoader::parse(content)?;
        let mut config = Self::default();
        config.merge_raw(&raw, ConfigSource::File)?;
        Ok(config)
    }

    /// Set the provider policy programmatically
    pub fn with_provider_policy(mut self, policy: ProviderPolicy) -> Self {
        self.provider_policy = policy;
        self.sources.insert("provider-policy".to_string(), ConfigSource::Command);
        self
    }

    /// Enable or disable dynamic-import failure events
    pub fn with_dynamic_import_events(mut self, enabled: bool) -> Self {
        self.dynamic_import_events = enabled;
        self.sources.insert("dynamic-import-events".to_string(), ConfigSource::Command);
        self
    }

    /// Where a value came from
    pub fn source_of(&self, key: &str) -> ConfigSource {
        self.sources.get(key).cloned().unwrap_or(ConfigSource::Default)
    }

    fn merge_raw(&mut self, raw: &RawConfig, source: ConfigSource) -> Result<()> {
        if let Some(policy) = &raw.provider_policy {
            self.set_provider_policy(policy, source.clone())?;
        }
        if let Some(enabled) = raw.dynamic_import_events {
            self.dynamic_import_events = enabled;
            self.sources.insert("dynamic-import-events".to_string(), source);
        }
        Ok(())
    }

    fn set_provider_policy(&mut self, value: &str, source: ConfigSource) -> Result<()> {
        let policy = ProviderPolicy::from_str(value).ok_or_else(|| {
            ResolverError::Config(format!(
                "Unknown provider-policy \"{}\" (from {}); expected first-fit or highest-version",
                value,
                source.as_str()
            ))
        })?;
        self.provider_policy = policy;
        self.sources.insert("provider-policy".to_string(), source);
        Ok(())
    }
}
