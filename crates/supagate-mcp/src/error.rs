//! Error types for the gateway.
//!
//! Every component returns [`GatewayError`]. The HTTP transport turns it
//! into a status code and a JSON body; see
//! [`http_transport`](crate::http_transport).

use axum::http::StatusCode;
use supagate_core::ConfigError;
use thiserror::Error;

/// Errors that can occur while dispatching or executing a tool call.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Backend URL or key is missing or invalid.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Missing or malformed argument, or an unscoped update/delete.
    #[error("validation error: {0}")]
    Validation(String),

    /// The requested table or resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend schema root could not be read.
    #[error("schema error: {0}")]
    Schema(String),

    /// The backend answered with a non-2xx status.
    #[error("backend returned status {status}: {body}")]
    Backend { status: u16, body: String },

    /// The HTTP call itself failed (connect, TLS, body read).
    #[error("transport error: {0}")]
    Transport(String),

    /// Tool name did not match any known tool.
    #[error("unknown tool: {name}")]
    UnknownTool { name: String },

    /// Top-level method did not match any known method.
    #[error("method not found: {method}")]
    UnknownMethod { method: String },

    /// Request carried no top-level method.
    #[error("request is missing the 'method' field")]
    MissingMethod,

    /// Request body was not a JSON object.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl GatewayError {
    /// Shorthand for [`GatewayError::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        GatewayError::Validation(message.into())
    }

    /// HTTP status reported to the caller.
    ///
    /// Only envelope-level failures are 4xx. Anything that goes wrong once
    /// a `tools/call` has been accepted is reported in the 5xx range, with
    /// configuration and upstream failures kept distinguishable.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MissingMethod | GatewayError::MalformedRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::UnknownMethod { .. } => StatusCode::NOT_FOUND,
            GatewayError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Schema(_) | GatewayError::Backend { .. } | GatewayError::Transport(_) => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::Validation(_)
            | GatewayError::NotFound(_)
            | GatewayError::UnknownTool { .. }
            | GatewayError::Serialization(_)
            | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Generic, detail-free message for the response body.
    pub fn public_message(&self) -> &'static str {
        match self {
            GatewayError::Configuration(_) => "Gateway is not configured",
            GatewayError::Validation(_) => "Invalid arguments",
            GatewayError::NotFound(_) => "Not found",
            GatewayError::Schema(_) => "Schema inspection failed",
            GatewayError::Backend { .. } => "Backend request failed",
            GatewayError::Transport(_) => "Backend unreachable",
            GatewayError::UnknownTool { .. } => "Unknown tool",
            GatewayError::UnknownMethod { .. } => "Method not found",
            GatewayError::MissingMethod => "Missing method",
            GatewayError::MalformedRequest(_) => "Malformed request",
            GatewayError::Serialization(_) | GatewayError::Internal(_) => "Internal server error",
        }
    }

    /// Whether this error points at a gateway bug rather than bad input or
    /// an unhealthy backend. Logged at error level.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            GatewayError::Serialization(_) | GatewayError::Internal(_)
        )
    }
}
