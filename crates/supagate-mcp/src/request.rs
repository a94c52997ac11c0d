//! Backend request descriptions.
//!
//! A [`RequestSpec`] is the transport-independent description of one call
//! to the PostgREST backend: method, path, query parameters, headers and an
//! optional JSON body. Components build specs; the
//! [`Transport`](crate::transport::Transport) executes them.

use crate::error::GatewayError;
use serde_json::{Map, Value};
use std::fmt;
use supagate_core::CredentialContext;
use url::Url;

/// Path prefix under which PostgREST is mounted on the backend.
pub const REST_PREFIX: [&str; 2] = ["rest", "v1"];

/// HTTP methods used against the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One backend request, before it is bound to a base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: Method,
    /// Path segments relative to the backend base URL. A trailing empty
    /// segment yields a trailing `/`.
    pub segments: Vec<String>,
    /// Query parameters in insertion order; duplicate keys are allowed.
    pub query: Vec<(String, String)>,
    /// Request headers in insertion order.
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestSpec {
    /// A request against `rest/v1/<table>` carrying the standard auth headers.
    pub fn table(method: Method, table: &str, credentials: &CredentialContext) -> Self {
        let mut segments: Vec<String> = REST_PREFIX.iter().map(|s| s.to_string()).collect();
        segments.push(table.to_string());
        Self::authenticated(method, segments, credentials)
    }

    /// A GET against the PostgREST root (`rest/v1/`), which serves the
    /// OpenAPI description of every exposed entity.
    pub fn root(credentials: &CredentialContext) -> Self {
        let mut segments: Vec<String> = REST_PREFIX.iter().map(|s| s.to_string()).collect();
        segments.push(String::new());
        Self::authenticated(Method::Get, segments, credentials)
    }

    fn authenticated(method: Method, segments: Vec<String>, credentials: &CredentialContext) -> Self {
        let key = credentials.api_key();
        Self {
            method,
            segments,
            query: Vec::new(),
            headers: vec![
                ("apikey".to_string(), key.to_string()),
                ("Authorization".to_string(), format!("Bearer {}", key)),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body: None,
        }
    }

    /// Append a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append one `key=eq.<value>` parameter per filter entry.
    pub fn with_filters(mut self, filters: &Map<String, Value>) -> Self {
        self.query.extend(filter_params(filters));
        self
    }

    /// Append a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// First value of the query parameter `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First value of the header `name` (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Bind the request to a backend base URL.
    ///
    /// Path segments and query values are percent-encoded.
    pub fn url(&self, base: &Url) -> Result<Url, GatewayError> {
        let mut url = base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                GatewayError::Internal(anyhow::anyhow!("backend URL cannot be a base: {}", base))
            })?;
            path.pop_if_empty();
            path.extend(self.segments.iter());
        }
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

/// Encode a filter set as PostgREST equality parameters.
///
/// Only equality (`eq.`) is supported; range, pattern and membership
/// operators are out of scope for this gateway.
pub fn filter_params(filters: &Map<String, Value>) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|(column, value)| (column.clone(), format!("eq.{}", render_filter_value(value))))
        .collect()
}

/// Render a filter value the way it appears after `eq.`.
///
/// Strings are used verbatim; every other value uses its JSON text.
pub fn render_filter_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
