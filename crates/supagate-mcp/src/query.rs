//! CRUD query translation.
//!
//! Turns a `supabase_query` descriptor into one PostgREST request and maps
//! the response back into a [`ResultEnvelope`].

use crate::envelope::{ResultEnvelope, payload_count};
use crate::error::GatewayError;
use crate::request::{Method, RequestSpec};
use crate::transport::{Transport, ensure_success, execute};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use supagate_core::CredentialContext;

/// Header asking PostgREST to return the affected rows.
pub const PREFER_REPRESENTATION: &str = "return=representation";

/// Query parameters PostgREST interprets itself. A filter on a column with
/// one of these names would be read as the parameter, not as `col=eq.v`.
pub const RESERVED_PARAMS: [&str; 8] = [
    "select",
    "order",
    "limit",
    "offset",
    "on_conflict",
    "columns",
    "and",
    "or",
];

/// CRUD action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryAction {
    Select,
    Insert,
    Update,
    Delete,
}

impl QueryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryAction::Select => "select",
            QueryAction::Insert => "insert",
            QueryAction::Update => "update",
            QueryAction::Delete => "delete",
        }
    }

    /// HTTP method used for this action.
    pub fn method(&self) -> Method {
        match self {
            QueryAction::Select => Method::Get,
            QueryAction::Insert => Method::Post,
            QueryAction::Update => Method::Patch,
            QueryAction::Delete => Method::Delete,
        }
    }
}

/// Arguments of the `supabase_query` tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryArgs {
    pub action: QueryAction,
    pub table: String,

    /// Row payload for insert and update.
    #[serde(default = "empty_object")]
    pub data: Value,

    /// Column to value equality filters.
    #[serde(default)]
    pub filters: Option<Map<String, Value>>,

    /// Projection; `*` when absent.
    #[serde(default)]
    pub select: Option<String>,

    #[serde(default)]
    pub limit: Option<u64>,

    /// Passed through verbatim as PostgREST `order`, e.g. `created_at.desc`.
    #[serde(default, rename = "orderBy")]
    pub order_by: Option<String>,
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

impl QueryArgs {
    pub fn new(action: QueryAction, table: impl Into<String>) -> Self {
        Self {
            action,
            table: table.into(),
            data: empty_object(),
            filters: None,
            select: None,
            limit: None,
            order_by: None,
        }
    }

    /// The filter set, empty when none was given.
    pub fn filter_set(&self) -> Map<String, Value> {
        self.filters.clone().unwrap_or_default()
    }
}

/// Translates CRUD descriptors into backend requests.
pub struct QueryTranslator<'a> {
    credentials: &'a CredentialContext,
    transport: &'a dyn Transport,
}

impl<'a> QueryTranslator<'a> {
    pub fn new(credentials: &'a CredentialContext, transport: &'a dyn Transport) -> Self {
        Self {
            credentials,
            transport,
        }
    }

    /// Build the request for `args` without sending it.
    pub fn build_request(&self, args: &QueryArgs) -> Result<RequestSpec, GatewayError> {
        let table = args.table.trim();
        if table.is_empty() {
            return Err(GatewayError::validation("'table' is required"));
        }

        let filters = args.filter_set();
        reject_reserved_filters(&filters)?;
        let spec = RequestSpec::table(args.action.method(), table, self.credentials);

        let spec = match args.action {
            QueryAction::Select => {
                let mut spec = spec;
                if let Some(projection) = args.select.as_deref().map(str::trim)
                    && !projection.is_empty()
                    && projection != "*"
                {
                    spec = spec.with_query("select", projection);
                }
                spec = spec.with_filters(&filters);
                if let Some(limit) = args.limit {
                    spec = spec.with_query("limit", limit.to_string());
                }
                if let Some(order) = args.order_by.as_deref().filter(|o| !o.trim().is_empty()) {
                    spec = spec.with_query("order", order);
                }
                spec
            }
            QueryAction::Insert => spec
                .with_header("Prefer", PREFER_REPRESENTATION)
                .with_body(args.data.clone()),
            QueryAction::Update => {
                require_filters(args.action, &filters)?;
                spec.with_filters(&filters)
                    .with_header("Prefer", PREFER_REPRESENTATION)
                    .with_body(args.data.clone())
            }
            QueryAction::Delete => {
                require_filters(args.action, &filters)?;
                spec.with_filters(&filters)
                    .with_header("Prefer", PREFER_REPRESENTATION)
            }
        };

        Ok(spec)
    }

    /// Build, send and interpret one CRUD request.
    pub async fn execute(&self, args: &QueryArgs) -> Result<ResultEnvelope, GatewayError> {
        let spec = self.build_request(args)?;
        let response = execute(self.transport, self.credentials, &spec).await?;
        let response = ensure_success(response, self.credentials)?;
        let payload = response.json()?;
        let count = payload_count(&payload);

        tracing::debug!(
            action = args.action.as_str(),
            table = %args.table,
            count,
            "Query completed"
        );

        Ok(ResultEnvelope::for_action(args.action.as_str(), args.table.trim())
            .with_data(payload)
            .with_count(count))
    }
}

/// Update and delete must be scoped by at least one filter.
fn require_filters(action: QueryAction, filters: &Map<String, Value>) -> Result<(), GatewayError> {
    if filters.is_empty() {
        return Err(GatewayError::validation(format!(
            "'{}' requires at least one filter",
            action.as_str()
        )));
    }
    Ok(())
}

fn reject_reserved_filters(filters: &Map<String, Value>) -> Result<(), GatewayError> {
    if let Some(column) = filters.keys().find(|k| RESERVED_PARAMS.contains(&k.as_str())) {
        return Err(GatewayError::validation(format!(
            "cannot filter on column '{}': the name is a reserved query parameter",
            column
        )));
    }
    Ok(())
}
