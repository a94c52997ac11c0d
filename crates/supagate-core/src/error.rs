//! Error types for configuration loading and credential resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration or resolving credentials.
///
/// The variants carry owned strings so the error can be cloned into every
/// request that needs to report why the backend is unavailable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The backend base URL was not supplied by any source.
    #[error("backend URL is not configured (set {env} or backend.url)")]
    MissingUrl { env: String },

    /// The backend credential was not supplied by any source.
    #[error("backend key is not configured (set {env} or backend.key)")]
    MissingKey { env: String },

    /// The backend URL could not be parsed.
    #[error("invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The configuration file could not be read.
    #[error("failed to read config file {path:?}: {reason}")]
    Read { path: PathBuf, reason: String },

    /// The configuration file could not be parsed.
    #[error("failed to parse config file {path:?}: {reason}")]
    Parse { path: PathBuf, reason: String },
}
