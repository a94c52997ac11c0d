//! CLI command implementations for Supagate.

pub mod call;
pub mod serve;
pub mod tools;

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use supagate_core::{Environment, GatewayConfig};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "supagate.toml";

/// Flags shared by every command. Each one overrides the config file.
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Path to a TOML config file
    #[arg(long, global = true, env = "SUPAGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend base URL, e.g. https://<project>.supabase.co
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Backend access key
    #[arg(long, global = true)]
    pub key: Option<String>,

    /// Deployment environment: production or development
    #[arg(long, global = true, env = "SUPAGATE_ENV")]
    pub environment: Option<Environment>,

    /// Bind host for `serve`
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Bind port for `serve`
    #[arg(long, global = true, env = "PORT")]
    pub port: Option<u16>,

    /// Timeout in seconds for each backend request
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

impl ConfigArgs {
    /// Load the config file (if any) and apply command-line overrides.
    pub fn load(&self) -> Result<GatewayConfig> {
        let config = match &self.config {
            Some(path) => GatewayConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration from {:?}", path))?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                GatewayConfig::from_file(DEFAULT_CONFIG_FILE)
                    .with_context(|| format!("Failed to load {}", DEFAULT_CONFIG_FILE))?
            }
            None => GatewayConfig::default(),
        };
        Ok(self.apply(config))
    }

    fn apply(&self, mut config: GatewayConfig) -> GatewayConfig {
        // A value given on the command line beats any env indirection in the file.
        if let Some(url) = &self.url {
            config.backend.url = Some(url.clone());
            config.backend.url_env = None;
        }
        if let Some(key) = &self.key {
            config.backend.key = Some(key.clone());
            config.backend.key_env = None;
        }
        if let Some(environment) = self.environment {
            config.environment = environment;
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(timeout) = self.timeout_secs {
            config.backend.timeout_secs = Some(timeout);
        }
        config
    }
}
