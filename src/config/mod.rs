//! Configuration management
//!
//! Process-wide, immutable configuration loaded once at startup from optional
//! TOML files and `STACKSCOPE__`-prefixed environment variables, then passed
//! by reference into every component that needs it.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub graph: GraphConfig,
    pub license: LicenseConfig,
    pub persistence: PersistenceConfig,
    pub ingestion: IngestionConfig,
    pub advisory: AdvisoryConfig,
    pub logging: LoggingConfig,
}

/// HTTP server bind settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Inbound request timeout (seconds)
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            request_timeout_seconds: 120,
        }
    }
}

/// Graph store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub url: String,
    /// Maximum packages per traversal query
    pub batch_size: usize,
    pub timeout_seconds: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8182".to_string(),
            batch_size: 100,
            timeout_seconds: 30,
        }
    }
}

impl GraphConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// License-conflict service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LicenseConfig {
    pub url: String,
    pub timeout_seconds: u64,
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6162".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl LicenseConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Result persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub url: String,
    /// Worker name recorded alongside each persisted result
    pub worker_name: String,
    pub timeout_seconds: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6163".to_string(),
            worker_name: "stack_aggregator_v2".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl PersistenceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Unknown-package ingestion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub url: String,
    /// Feature flag: skip the unknown-package ingestion flow entirely
    pub disable_unknown_package_flow: bool,
    pub timeout_seconds: u64,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6164".to_string(),
            disable_unknown_package_flow: false,
            timeout_seconds: 30,
        }
    }
}

impl IngestionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Vulnerability-advisory link settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    /// URL template with `{ecosystem}` and `{package}` placeholders
    pub package_url_template: String,
    /// Sign-in URL appended to free-tier results
    pub signin_url: String,
    /// Ecosystem alias map applied before the template (identity when absent)
    pub ecosystem_aliases: HashMap<String, String>,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        let mut ecosystem_aliases = HashMap::new();
        ecosystem_aliases.insert("pypi".to_string(), "pip".to_string());
        Self {
            package_url_template: "https://snyk.io/vuln/{ecosystem}:{package}".to_string(),
            signin_url: "https://snyk.io/login".to_string(),
            ecosystem_aliases,
        }
    }
}

impl AdvisoryConfig {
    /// Build the external advisory link for one package.
    pub fn package_url(&self, ecosystem: &str, package: &str) -> String {
        let ecosystem = self
            .ecosystem_aliases
            .get(ecosystem)
            .map(String::as_str)
            .unwrap_or(ecosystem);
        self.package_url_template
            .replace("{ecosystem}", ecosystem)
            .replace("{package}", package)
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        // Add environment-specific config if ENV is set
        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        // Environment variables take highest priority
        builder = builder
            .add_source(config::Environment::with_prefix("STACKSCOPE").separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.graph.batch_size == 0 {
            return Err(ConfigLoadError::Validation(
                "graph.batch_size must be > 0".to_string(),
            ));
        }
        if !self.advisory.package_url_template.contains("{package}") {
            return Err(ConfigLoadError::Validation(
                "advisory.package_url_template must contain a {package} placeholder".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigLoadError::Validation(
                "server.port must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_pass_validation() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_advisory_url_applies_alias_map() {
        let advisory = AdvisoryConfig::default();
        assert_eq!(
            advisory.package_url("pypi", "flask"),
            "https://snyk.io/vuln/pip:flask"
        );
        // Unmapped ecosystems pass through unchanged.
        assert_eq!(
            advisory.package_url("npm", "lodash"),
            "https://snyk.io/vuln/npm:lodash"
        );
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let mut config = Config::default();
        config.graph.batch_size = 0;
        assert!(config.validate().is_err());
    }
}
