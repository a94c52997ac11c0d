//! Configuration types for the Supagate gateway.
//!
//! Configuration is loaded from an optional TOML file (`supagate.toml`),
//! overridden by command-line flags, and then frozen into a
//! [`GatewayConfig`] that is passed by reference to every component.
//!
//! # Example
//!
//! ```toml
//! environment = "development"
//!
//! [backend]
//! url_env = "SUPABASE_URL"
//! key_env = "SUPABASE_SERVICE_ROLE_KEY"
//! timeout_secs = 30
//!
//! [server]
//! host = "0.0.0.0"
//! port = 3000
//! ```

pub mod backend;
pub mod server;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub use backend::BackendConfig;
pub use server::ServerConfig;

/// Complete gateway configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Deployment environment; controls how much error detail is exposed.
    #[serde(default)]
    pub environment: Environment,

    /// Remote PostgREST backend settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,
}

impl GatewayConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&raw).map_err(|e| match e {
            ConfigError::Parse { reason, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse {
            path: Default::default(),
            reason: e.to_string(),
        })
    }

    /// Whether error text may be returned to callers.
    pub fn expose_error_details(&self) -> bool {
        !self.environment.is_production()
    }
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production: error text is suppressed from responses.
    #[default]
    #[serde(alias = "prod")]
    Production,
    /// Development: error text is included in responses.
    #[serde(alias = "dev")]
    Development,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Development => "development",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            other => Err(format!(
                "unknown environment '{}' (expected production or development)",
                other
            )),
        }
    }
}
