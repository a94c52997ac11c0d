//! Remote backend configuration.
//!
//! The backend URL and key can each be supplied three ways, in order of
//! precedence:
//! 1. `url_env` / `key_env` - name of an environment variable holding the value
//! 2. `url` / `key` - the value itself
//! 3. the conventional variables `SUPABASE_URL` and
//!    `SUPABASE_SERVICE_ROLE_KEY` (falling back to `SUPABASE_ANON_KEY`)
//!
//! Resolution happens once, at startup. Components never read the
//! environment themselves.

use crate::credentials::CredentialContext;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Conventional environment variable for the backend URL.
pub const DEFAULT_URL_ENV: &str = "SUPABASE_URL";

/// Conventional environment variables for the backend key, in lookup order.
pub const DEFAULT_KEY_ENVS: [&str; 2] = ["SUPABASE_SERVICE_ROLE_KEY", "SUPABASE_ANON_KEY"];

/// Configuration for the PostgREST backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Environment variable containing the backend URL. Highest precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_env: Option<String>,

    /// Backend base URL, e.g. `https://<project>.supabase.co`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Environment variable containing the access key. Highest precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_env: Option<String>,

    /// Access key sent as `apikey` and bearer token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Overall timeout for one backend request. Unset means the HTTP
    /// client's default (no timeout).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl BackendConfig {
    /// Resolve credentials using the process environment.
    pub fn resolve(&self) -> Result<CredentialContext, ConfigError> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve credentials using the given variable lookup.
    pub fn resolve_with<F>(&self, lookup: F) -> Result<CredentialContext, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let url = pick(
            self.url_env.as_deref(),
            self.url.clone(),
            &[DEFAULT_URL_ENV],
            &lookup,
        )
        .and_then(|v| non_empty(Some(v)))
        .ok_or_else(|| ConfigError::MissingUrl {
            env: self.url_env.clone().unwrap_or_else(|| DEFAULT_URL_ENV.to_string()),
        })?;

        let key = pick(
            self.key_env.as_deref(),
            self.key.clone(),
            &DEFAULT_KEY_ENVS,
            &lookup,
        )
        .and_then(|v| non_empty(Some(v)))
        .ok_or_else(|| ConfigError::MissingKey {
            env: self
                .key_env
                .clone()
                .unwrap_or_else(|| DEFAULT_KEY_ENVS[0].to_string()),
        })?;

        CredentialContext::new(&url, key.trim())
    }

    /// Request timeout, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn pick<F>(env: Option<&str>, direct: Option<String>, defaults: &[&str], lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(name) = env
        && let Some(value) = lookup(name)
    {
        return Some(value);
    }
    if direct.is_some() {
        return direct;
    }
    defaults.iter().find_map(|name| lookup(name))
}
