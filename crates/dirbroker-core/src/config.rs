//! Broker configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file is valid.
//!
//! ```toml
//! plan_name = "get-user-directory"
//!
//! [logging]
//! filter = "dirbroker_core=debug,info"
//! json = false
//!
//! [binding]
//! base_uri = "hdfs://nameservice1/cf/broker"
//!
//! [binding.fields]
//! user = "hdfs"
//! ```

use crate::error::ConfigError;
use crate::plan::GetUserDirectoryPlan;
use dirbroker_path::InstancePath;
use dirbroker_store::CredentialMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Plan served by the operator binary
    #[serde(default = "default_plan_name")]
    pub plan_name: String,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub binding: BindingConfig,
}

fn default_plan_name() -> String {
    GetUserDirectoryPlan::NAME.to_string()
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            plan_name: default_plan_name(),
            logging: LoggingConfig::default(),
            binding: BindingConfig::default(),
        }
    }
}

impl BrokerConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    /// `Parse` for malformed TOML, `Invalid` if validation fails
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// `Io` if the file cannot be read, otherwise as [`from_toml_str`](Self::from_toml_str)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    /// `Invalid` for an empty plan name or an unresolvable binding base
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plan_name.trim().is_empty() {
            return Err(ConfigError::Invalid("plan_name must not be empty".into()));
        }
        InstancePath::resolve(&self.binding.base_uri)
            .map_err(|e| ConfigError::Invalid(format!("binding.base_uri: {e}")))?;
        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn with_plan_name(mut self, name: impl Into<String>) -> Self {
        self.plan_name = name.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.logging.filter = filter.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.binding.base_uri = base_uri.into();
        self
    }
}

/// Tracing output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

/// Settings for the static binding provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingConfig {
    /// Location under which instance directories live
    #[serde(default = "default_base_uri")]
    pub base_uri: String,

    /// Fixed fields returned with every binding
    #[serde(default)]
    pub fields: CredentialMap,
}

fn default_base_uri() -> String {
    "hdfs://localhost:8020/cf/broker".to_string()
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            base_uri: default_base_uri(),
            fields: CredentialMap::new(),
        }
    }
}
