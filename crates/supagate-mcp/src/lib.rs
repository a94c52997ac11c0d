//! # supagate-mcp
//!
//! Tool-call gateway for Supabase.
//!
//! This crate accepts MCP-style tool calls over HTTP and translates them
//! into PostgREST requests against a Supabase project. It provides:
//!
//! - **CRUD translation**: `supabase_query` maps select/insert/update/delete
//!   descriptors onto `rest/v1/<table>` requests
//! - **Schema inspection**: `supabase_schema` lists tables, infers column
//!   types from a sampled row and reads exact counts
//! - **Simulated DDL**: `supabase_modify_schema` acknowledges schema changes
//!   without applying them
//!
//! ## Architecture
//!
//! ```text
//! AI Agent
//!       │
//!       │ POST /mcp  {method, params}
//!       ▼
//! ┌──────────────────────┐
//! │  Supagate            │
//! │  1. Dispatch tool    │  ← ToolName
//! │  2. Build request    │  ← CredentialContext
//! │  3. Send             │  ← Transport
//! │  4. Interpret        │
//! │  5. Return envelope  │
//! └──────────┬───────────┘
//!            │
//!            ▼
//!   PostgREST (Supabase)
//! ```
//!
//! ## Example Usage
//!
//! ```ignore
//! use supagate_core::GatewayConfig;
//! use supagate_mcp::HttpServer;
//!
//! let config = GatewayConfig::from_file("supagate.toml")?;
//! HttpServer::from_config(&config)?.run().await?;
//! ```

pub mod envelope;
pub mod error;
pub mod http_transport;
pub mod inspector;
pub mod protocol;
pub mod query;
pub mod request;
pub mod server;
pub mod simulator;
pub mod tools;
pub mod transport;

// Re-export main types
pub use envelope::ResultEnvelope;
pub use error::GatewayError;
pub use http_transport::{AppState, HttpServer, create_router};
pub use inspector::{InferredColumn, InferredType, SchemaArgs, SchemaInspector, SchemaOperation};
pub use protocol::{CallToolParams, ListToolsResponse, McpRequest, McpResponse, ToolDefinition};
pub use query::{QueryAction, QueryArgs, QueryTranslator};
pub use request::{Method, RequestSpec};
pub use server::McpServer;
pub use simulator::{MutationArgs, MutationOperation, simulate};
pub use tools::{ToolName, catalog};
pub use transport::{BackendResponse, HttpTransport, Transport};
