//! Transport adapter for the PostgREST backend.
//!
//! [`Transport`] is the seam between the translation components and the
//! network. [`HttpTransport`] implements it with `reqwest`; tests swap in a
//! recording implementation.

use crate::error::GatewayError;
use crate::request::{Method, RequestSpec};
use async_trait::async_trait;
use serde_json::Value;
use std::time::{Duration, Instant};
use supagate_core::CredentialContext;
use url::Url;

/// Raw backend response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendResponse {
    pub status: u16,
    /// Header names are lower-cased.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl BackendResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.into()));
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First value of header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parse the body as JSON. An empty body is `null`.
    pub fn json(&self) -> Result<Value, GatewayError> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body).map_err(|e| {
            GatewayError::Internal(anyhow::anyhow!(
                "backend returned a non-JSON body (status {}): {}",
                self.status,
                e
            ))
        })
    }
}

/// Executes backend requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `spec` to the fully-bound `url`.
    async fn send(&self, url: &Url, spec: &RequestSpec) -> Result<BackendResponse, GatewayError>;
}

/// `reqwest`-backed transport.
///
/// The client is cheaply cloneable and safe to share across tasks.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport. `timeout` bounds each whole request; `None`
    /// leaves the client default in place.
    pub fn new(timeout: Option<Duration>) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("supagate/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, url: &Url, spec: &RequestSpec) -> Result<BackendResponse, GatewayError> {
        let method = match spec.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut request = self.client.request(method, url.clone());
        for (name, value) in &spec.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &spec.body {
            request = request.body(serde_json::to_vec(body)?);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.without_url().to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.without_url().to_string()))?;

        Ok(BackendResponse {
            status,
            headers,
            body,
        })
    }
}

/// Bind `spec` to the backend, send it, and log the call.
///
/// The logged URL never contains the access key.
pub async fn execute(
    transport: &dyn Transport,
    credentials: &CredentialContext,
    spec: &RequestSpec,
) -> Result<BackendResponse, GatewayError> {
    let url = spec.url(credentials.base_url())?;
    let logged_url = credentials.redact(url.as_str());
    let started = Instant::now();

    tracing::info!(method = %spec.method, url = %logged_url, "Sending backend request");

    match transport.send(&url, spec).await {
        Ok(response) => {
            tracing::info!(
                method = %spec.method,
                url = %logged_url,
                status = response.status,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Backend responded"
            );
            Ok(response)
        }
        Err(e) => {
            tracing::warn!(
                method = %spec.method,
                url = %logged_url,
                error = %credentials.redact(&e.to_string()),
                "Backend request failed"
            );
            Err(e)
        }
    }
}

/// Turn a non-2xx response into [`GatewayError::Backend`] with the key
/// redacted from the echoed body.
pub fn ensure_success(
    response: BackendResponse,
    credentials: &CredentialContext,
) -> Result<BackendResponse, GatewayError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(GatewayError::Backend {
            status: response.status,
            body: credentials.redact(&response.body),
        })
    }
}
