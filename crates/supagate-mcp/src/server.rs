//! Tool dispatcher.
//!
//! [`McpServer`] answers the top-level methods and routes `tools/call` to
//! the query translator, schema inspector or mutation simulator. It is
//! transport-agnostic; the HTTP layer lives in
//! [`http_transport`](crate::http_transport).

use crate::envelope::ResultEnvelope;
use crate::error::GatewayError;
use crate::inspector::{SchemaArgs, SchemaInspector};
use crate::protocol::{CallToolParams, ListToolsResponse, McpRequest, PROTOCOL_VERSION};
use crate::query::{QueryArgs, QueryTranslator};
use crate::simulator::{MutationArgs, simulate};
use crate::tools::{ToolName, catalog};
use crate::transport::{HttpTransport, Transport};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use supagate_core::{ConfigError, CredentialContext, GatewayConfig};

/// The gateway's request handler.
///
/// Missing credentials do not prevent construction: `tools/list`, the
/// simulator and health checks keep working, and data tools fail with
/// [`GatewayError::Configuration`].
pub struct McpServer {
    credentials: Result<CredentialContext, ConfigError>,
    transport: Arc<dyn Transport>,
}

impl McpServer {
    pub fn new(
        credentials: Result<CredentialContext, ConfigError>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            credentials,
            transport,
        }
    }

    /// Resolve credentials from `config` and connect through [`HttpTransport`].
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let credentials = config.backend.resolve();
        match &credentials {
            Ok(ctx) => tracing::info!(backend = %ctx.base_url(), "Backend credentials resolved"),
            Err(e) => tracing::warn!(error = %e, "Backend not configured; data tools are disabled"),
        }
        let transport = HttpTransport::new(config.backend.timeout())?;
        Ok(Self::new(credentials, Arc::new(transport)))
    }

    /// Credentials for a data-touching call.
    pub fn credentials(&self) -> Result<&CredentialContext, GatewayError> {
        self.credentials
            .as_ref()
            .map_err(|e| GatewayError::Configuration(e.clone()))
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_ok()
    }

    /// Handle one request and return its `result` value.
    pub async fn handle_request(&self, request: McpRequest) -> Result<Value, GatewayError> {
        let method = request.method.ok_or(GatewayError::MissingMethod)?;

        match method.as_str() {
            "initialize" => Ok(self.handle_initialize()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(serde_json::to_value(ListToolsResponse { tools: catalog() })?),
            "tools/call" => {
                let params: CallToolParams = match request.params {
                    Some(p) => serde_json::from_value(p)
                        .map_err(|e| GatewayError::validation(format!("invalid params: {}", e)))?,
                    None => return Err(GatewayError::validation("missing params")),
                };
                let envelope = self.call_tool(params).await?;
                Ok(serde_json::to_value(envelope)?)
            }
            _ => Err(GatewayError::UnknownMethod { method }),
        }
    }

    fn handle_initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": "supagate",
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            }
        })
    }

    /// Run one tool.
    pub async fn call_tool(&self, params: CallToolParams) -> Result<ResultEnvelope, GatewayError> {
        let tool: ToolName = params.name.parse()?;
        tracing::info!(tool = %tool, "Calling tool");

        match tool {
            ToolName::SupabaseQuery => {
                let credentials = self.credentials()?;
                let args: QueryArgs = parse_arguments(tool, params.arguments)?;
                QueryTranslator::new(credentials, &*self.transport)
                    .execute(&args)
                    .await
            }
            ToolName::SupabaseSchema => {
                let credentials = self.credentials()?;
                let args: SchemaArgs = parse_arguments(tool, params.arguments)?;
                SchemaInspector::new(credentials, &*self.transport)
                    .execute(&args)
                    .await
            }
            ToolName::SupabaseModifySchema => {
                let args: MutationArgs = parse_arguments(tool, params.arguments)?;
                simulate(&args)
            }
        }
    }
}

fn parse_arguments<T: DeserializeOwned>(tool: ToolName, arguments: Value) -> Result<T, GatewayError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    serde_json::from_value(arguments)
        .map_err(|e| GatewayError::validation(format!("invalid arguments for {}: {}", tool, e)))
}
