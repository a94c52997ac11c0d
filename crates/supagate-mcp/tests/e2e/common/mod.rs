//! Shared test infrastructure for Supagate end-to-end tests.
//!
//! This module provides:
//! - An in-memory PostgREST stand-in that records every request
//! - Test fixtures (credentials, canned backend responses)
//! - Helper functions for driving the dispatcher and the HTTP router

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use supagate_core::{ConfigError, CredentialContext, Environment, GatewayConfig};
use supagate_mcp::{
    AppState, BackendResponse, GatewayError, McpRequest, McpServer, Method, RequestSpec,
    Transport, create_router,
};
use tower::ServiceExt;
use url::Url;

// =============================================================================
// FIXTURES
// =============================================================================

pub const PROJECT_URL: &str = "https://project-ref.supabase.co";
pub const SERVICE_KEY: &str = "test-service-role-key";

// =============================================================================
// RECORDING TRANSPORT
// =============================================================================

/// One request as the backend would have received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: Url,
    pub spec: RequestSpec,
}

impl RecordedRequest {
    /// Query pairs as decoded from the final URL.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.spec.header_value(name)
    }
}

/// Answers with canned responses, in order, and records each request.
#[derive(Default)]
pub struct RecordingTransport {
    responses: Mutex<VecDeque<BackendResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl RecordingTransport {
    pub fn new(responses: Vec<BackendResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, url: &Url, spec: &RequestSpec) -> Result<BackendResponse, GatewayError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: spec.method,
            url: url.clone(),
            spec: spec.clone(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| GatewayError::Transport("no canned response left".to_string()))
    }
}

// =============================================================================
// TEST CONTEXT
// =============================================================================

pub struct TestContext {
    pub credentials: CredentialContext,
}

impl TestContext {
    pub fn setup() -> Self {
        Self {
            credentials: CredentialContext::new(PROJECT_URL, SERVICE_KEY)
                .expect("fixture credentials are valid"),
        }
    }

    /// A configured server answering with `responses`.
    pub fn server(&self, responses: Vec<BackendResponse>) -> (McpServer, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::new(responses));
        let server = McpServer::new(Ok(self.credentials.clone()), transport.clone());
        (server, transport)
    }

    /// A server started without backend credentials.
    pub fn unconfigured_server(&self) -> (McpServer, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        let server = McpServer::new(
            Err(ConfigError::MissingUrl {
                env: "SUPABASE_URL".to_string(),
            }),
            transport.clone(),
        );
        (server, transport)
    }

    pub fn router(&self, server: McpServer, environment: Environment) -> Router {
        let config = GatewayConfig {
            environment,
            ..GatewayConfig::default()
        };
        create_router(Arc::new(AppState::new(Arc::new(server), &config)))
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Call `tool` through the dispatcher and return the `result` value.
pub async fn call_tool(server: &McpServer, tool: &str, arguments: Value) -> Result<Value, GatewayError> {
    server
        .handle_request(McpRequest::new(
            "tools/call",
            Some(json!({ "name": tool, "arguments": arguments })),
        ))
        .await
}

/// POST a JSON body to `uri` and decode the JSON response.
pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// GET `uri` and decode the JSON response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

pub fn json_response(status: u16, body: Value) -> BackendResponse {
    BackendResponse::new(status, body.to_string())
        .with_header("content-type", "application/json; charset=utf-8")
}

/// The OpenAPI root document PostgREST serves at `rest/v1/`.
pub fn openapi_root(tables: &[&str]) -> BackendResponse {
    let definitions: serde_json::Map<String, Value> = tables
        .iter()
        .map(|t| (t.to_string(), json!({"type": "object", "properties": {}})))
        .collect();
    let mut paths = serde_json::Map::new();
    paths.insert("/".to_string(), json!({}));
    for table in tables {
        paths.insert(format!("/{}", table), json!({}));
    }
    json_response(
        200,
        json!({
            "swagger": "2.0",
            "info": {"title": "PostgREST API"},
            "definitions": definitions,
            "paths": paths
        }),
    )
}

pub fn assert_timestamp(envelope: &Value) {
    let ts = envelope["timestamp"].as_str().expect("envelope has a timestamp");
    assert_eq!(ts.len(), 24, "timestamp {} is not YYYY-MM-DDTHH:MM:SS.mmmZ", ts);
    assert!(ts.ends_with('Z'));
}
