//! HTTP transport for the gateway.
//!
//! Exposes the tool-call endpoint on `POST /mcp` (and `POST /`) plus a
//! `GET /health` probe. Every [`GatewayError`] is turned into a status
//! code and a JSON body here; nothing else in the crate knows about HTTP.

use crate::error::GatewayError;
use crate::protocol::{ErrorBody, McpRequest, McpResponse, VALID_METHODS};
use crate::server::McpServer;
use anyhow::Context;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::Value;
use std::sync::Arc;
use supagate_core::{Environment, GatewayConfig};
use tower_http::trace::TraceLayer;
use tracing::Instrument;

/// Shared, read-only state of the HTTP layer.
pub struct AppState {
    pub server: Arc<McpServer>,
    /// Whether error text is returned to callers.
    pub expose_details: bool,
    pub environment: Environment,
}

impl AppState {
    pub fn new(server: Arc<McpServer>, config: &GatewayConfig) -> Self {
        Self {
            server,
            expose_details: config.expose_error_details(),
            environment: config.environment,
        }
    }
}

/// Create the HTTP router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(handle_mcp_post))
        .route("/mcp", post(handle_mcp_post))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle POST requests to /mcp.
async fn handle_mcp_post(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<McpRequest>, JsonRejection>,
) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("mcp_request", %request_id);

    async move {
        let request = match payload {
            Ok(Json(request)) => request,
            Err(rejection) => {
                let err = GatewayError::MalformedRequest(rejection.body_text());
                return error_response(&state, None, err);
            }
        };

        let id = request.id.clone();
        tracing::debug!(method = request.method.as_deref().unwrap_or(""), "Handling request");

        match state.server.handle_request(request).await {
            Ok(result) => (StatusCode::OK, Json(McpResponse { id, result })).into_response(),
            Err(err) => error_response(&state, id, err),
        }
    }
    .instrument(span)
    .await
}

/// Convert a [`GatewayError`] into an HTTP response.
fn error_response(state: &AppState, id: Option<Value>, err: GatewayError) -> Response {
    let status = err.status_code();

    if err.is_internal() {
        tracing::error!(error = %err, "Internal error while handling request");
    } else {
        tracing::warn!(status = status.as_u16(), error = %err, "Request failed");
    }

    let message = state.expose_details.then(|| err.to_string());
    let valid_methods = matches!(err, GatewayError::UnknownMethod { .. })
        .then(|| VALID_METHODS.iter().map(|m| m.to_string()).collect());

    let body = ErrorBody {
        error: err.public_message().to_string(),
        message,
        valid_methods,
        id,
    };
    (status, Json(body)).into_response()
}

/// Handle health check requests.
async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "supagate",
        "version": env!("CARGO_PKG_VERSION"),
        "backendConfigured": state.server.has_credentials(),
        "environment": state.environment.as_str()
    }))
}

/// HTTP server for the gateway.
pub struct HttpServer {
    bind_addr: String,
    state: Arc<AppState>,
}

impl HttpServer {
    pub fn new(bind_addr: impl Into<String>, state: Arc<AppState>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            state,
        }
    }

    /// Build the server from a frozen configuration.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let server = Arc::new(McpServer::from_config(config)?);
        let state = Arc::new(AppState::new(server, config));
        Ok(Self::new(config.server.bind_addr(), state))
    }

    /// Run the HTTP server until Ctrl+C.
    pub async fn run(self) -> Result<(), GatewayError> {
        let app = create_router(self.state);

        let listener = tokio::net::TcpListener::bind(&self.bind_addr)
            .await
            .with_context(|| format!("failed to bind to {}", self.bind_addr))?;

        tracing::info!(addr = %self.bind_addr, "Supagate HTTP server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server error")?;

        tracing::info!("Supagate HTTP server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
