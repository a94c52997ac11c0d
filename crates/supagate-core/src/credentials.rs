//! Backend credential context.
//!
//! A [`CredentialContext`] is resolved once at startup from
//! [`BackendConfig`](crate::BackendConfig) and shared read-only by every
//! request afterwards.

use crate::error::ConfigError;
use std::fmt;
use url::Url;

/// Placeholder written in place of a secret in logs and error bodies.
pub const REDACTED: &str = "[REDACTED]";

/// Secrets shorter than this are not scrubbed; they would match ordinary
/// words. Supabase keys are JWTs and far longer.
pub const MIN_REDACT_LEN: usize = 8;

/// Base URL and access key for the PostgREST backend.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialContext {
    base_url: Url,
    api_key: String,
}

impl CredentialContext {
    /// Build a credential context from a raw base URL and key.
    ///
    /// The URL path is normalized to end with `/` so that relative joins
    /// (`rest/v1/<table>`) keep any path prefix the deployment uses.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };

        let mut url = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("expected an http(s) base URL".to_string()));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        url.set_query(None);
        url.set_fragment(None);

        Ok(Self {
            base_url: url,
            api_key: api_key.into(),
        })
    }

    /// The normalized backend base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The backend access key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Remove the access key from `text`.
    pub fn redact(&self, text: &str) -> String {
        redact(text, &self.api_key)
    }
}

impl fmt::Debug for CredentialContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialContext")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &REDACTED)
            .finish()
    }
}

/// Replace every occurrence of `secret` in `text` with [`REDACTED`].
///
/// A secret shorter than [`MIN_REDACT_LEN`] leaves the text unchanged.
pub fn redact(text: &str, secret: &str) -> String {
    if secret.len() < MIN_REDACT_LEN {
        return text.to_string();
    }
    text.replace(secret, REDACTED)
}
