//! Schema inspection over PostgREST.
//!
//! PostgREST exposes no catalog endpoint a client may rely on, so the
//! inspector works from what the REST surface does expose: the OpenAPI
//! root document for table names, a single sampled row for column types,
//! and the `Content-Range` header for exact counts.

use crate::envelope::ResultEnvelope;
use crate::error::GatewayError;
use crate::request::{Method, RequestSpec};
use crate::transport::{Transport, ensure_success, execute};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use supagate_core::CredentialContext;

/// Column name used for the placeholder returned for empty tables.
pub const SENTINEL_COLUMN: &str = "*";

/// Schema operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaOperation {
    ListTables,
    DescribeTable,
    TableStats,
}

impl SchemaOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaOperation::ListTables => "list_tables",
            SchemaOperation::DescribeTable => "describe_table",
            SchemaOperation::TableStats => "table_stats",
        }
    }
}

/// Arguments of the `supabase_schema` tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaArgs {
    pub operation: SchemaOperation,
    #[serde(default)]
    pub table: Option<String>,
}

impl SchemaArgs {
    fn required_table(&self) -> Result<&str, GatewayError> {
        self.table
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                GatewayError::validation(format!("'table' is required for {}", self.operation.as_str()))
            })
    }
}

/// Shape of a sampled JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Null,
    Integer,
    Fractional,
    Boolean,
    Structured,
    Text,
}

impl ValueShape {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueShape::Null,
            Value::Bool(_) => ValueShape::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => ValueShape::Integer,
            Value::Number(n) => match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 => ValueShape::Integer,
                _ => ValueShape::Fractional,
            },
            Value::Object(_) | Value::Array(_) => ValueShape::Structured,
            Value::String(_) => ValueShape::Text,
        }
    }

    pub fn inferred_type(&self) -> InferredType {
        match self {
            ValueShape::Integer => InferredType::Integer,
            ValueShape::Fractional => InferredType::Numeric,
            ValueShape::Boolean => InferredType::Boolean,
            ValueShape::Structured => InferredType::Json,
            ValueShape::Null | ValueShape::Text => InferredType::Text,
        }
    }
}

/// Column type guessed from one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferredType {
    Integer,
    Numeric,
    Boolean,
    Json,
    Text,
    Undeterminable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Nullability {
    #[serde(rename = "YES")]
    Yes,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

/// A column as seen through one sampled row.
///
/// Best effort: a single sample cannot prove a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferredColumn {
    pub name: String,
    pub inferred_type: InferredType,
    pub sample_value: Value,
    pub nullability_hint: Nullability,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl InferredColumn {
    pub fn from_sample(name: &str, value: &Value) -> Self {
        let shape = ValueShape::of(value);
        Self {
            name: name.to_string(),
            inferred_type: shape.inferred_type(),
            sample_value: value.clone(),
            nullability_hint: if shape == ValueShape::Null {
                Nullability::Yes
            } else {
                Nullability::Unknown
            },
            note: None,
        }
    }

    /// Placeholder for a table with no rows to sample.
    pub fn sentinel() -> Self {
        Self {
            name: SENTINEL_COLUMN.to_string(),
            inferred_type: InferredType::Undeterminable,
            sample_value: Value::Null,
            nullability_hint: Nullability::Unknown,
            note: Some("table has no rows; column types cannot be inferred".to_string()),
        }
    }
}

/// Total row count from a `Content-Range` header such as `0-24/3573` or
/// `*/0`. Missing or malformed headers count as zero.
pub fn parse_content_range(header: Option<&str>) -> u64 {
    header
        .and_then(|h| h.rsplit_once('/'))
        .and_then(|(_, total)| total.trim().parse().ok())
        .unwrap_or(0)
}

/// Entity names from a PostgREST OpenAPI root document, with RPC entries
/// removed and sorted.
///
/// The `rpc/` and `rpc_` prefixes are PostgREST conventions; other
/// backends may name procedures differently.
pub fn table_names(root: &Value) -> Vec<String> {
    let keys: Vec<String> = match root.get("definitions").and_then(Value::as_object) {
        Some(definitions) if !definitions.is_empty() => definitions.keys().cloned().collect(),
        _ => root
            .get("paths")
            .and_then(Value::as_object)
            .map(|paths| {
                paths
                    .keys()
                    .map(|p| p.trim_start_matches('/').to_string())
                    .collect()
            })
            .unwrap_or_default(),
    };

    let mut names: Vec<String> = keys
        .into_iter()
        .filter(|name| !name.is_empty())
        .filter(|name| !name.starts_with("rpc/") && !name.starts_with("rpc_"))
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Read-only structural queries against the backend.
pub struct SchemaInspector<'a> {
    credentials: &'a CredentialContext,
    transport: &'a dyn Transport,
}

impl<'a> SchemaInspector<'a> {
    pub fn new(credentials: &'a CredentialContext, transport: &'a dyn Transport) -> Self {
        Self {
            credentials,
            transport,
        }
    }

    pub async fn execute(&self, args: &SchemaArgs) -> Result<ResultEnvelope, GatewayError> {
        match args.operation {
            SchemaOperation::ListTables => self.list_tables().await,
            SchemaOperation::DescribeTable => self.describe_table(args.required_table()?).await,
            SchemaOperation::TableStats => self.table_stats(args.required_table()?).await,
        }
    }

    /// Names of every exposed table or view.
    pub async fn list_tables(&self) -> Result<ResultEnvelope, GatewayError> {
        let spec = RequestSpec::root(self.credentials);
        let response = execute(self.transport, self.credentials, &spec)
            .await
            .map_err(|e| GatewayError::Schema(format!("schema root unreachable: {}", e)))?;
        if !response.is_success() {
            return Err(GatewayError::Schema(format!(
                "schema root returned status {}: {}",
                response.status,
                self.credentials.redact(&response.body)
            )));
        }
        let root = response
            .json()
            .map_err(|e| GatewayError::Schema(e.to_string()))?;

        let names = table_names(&root);
        let count = names.len() as u64;
        tracing::debug!(count, "Listed tables");

        Ok(ResultEnvelope::for_operation(SchemaOperation::ListTables.as_str(), None)
            .with_data(json!(names))
            .with_count(count))
    }

    /// Column names and best-effort types from one sampled row.
    pub async fn describe_table(&self, table: &str) -> Result<ResultEnvelope, GatewayError> {
        let probe = RequestSpec::table(Method::Get, table, self.credentials)
            .with_query("select", "*")
            .with_query("limit", "0");
        let response = execute(self.transport, self.credentials, &probe).await?;
        if !response.is_success() {
            return Err(GatewayError::NotFound(format!("table '{}' does not exist", table)));
        }

        let sample = RequestSpec::table(Method::Get, table, self.credentials)
            .with_query("select", "*")
            .with_query("limit", "1");
        let response = execute(self.transport, self.credentials, &sample).await?;
        let rows = ensure_success(response, self.credentials)?.json()?;

        let columns: Vec<InferredColumn> = match first_row(&rows)? {
            Some(row) => row
                .iter()
                .map(|(name, value)| InferredColumn::from_sample(name, value))
                .collect(),
            None => vec![InferredColumn::sentinel()],
        };
        let count = columns.len() as u64;

        Ok(
            ResultEnvelope::for_operation(SchemaOperation::DescribeTable.as_str(), Some(table))
                .with_data(serde_json::to_value(&columns)?)
                .with_count(count),
        )
    }

    /// Exact row count via `Prefer: count=exact`.
    pub async fn table_stats(&self, table: &str) -> Result<ResultEnvelope, GatewayError> {
        let spec = RequestSpec::table(Method::Get, table, self.credentials)
            .with_query("select", "*")
            .with_query("limit", "0")
            .with_header("Prefer", "count=exact");
        let response = execute(self.transport, self.credentials, &spec).await?;
        let response = ensure_success(response, self.credentials)?;

        let header = response.header("content-range");
        let total_rows = parse_content_range(header);
        if header.is_none() {
            tracing::warn!(table, "Backend sent no Content-Range; reporting zero rows");
        }

        Ok(
            ResultEnvelope::for_operation(SchemaOperation::TableStats.as_str(), Some(table))
                .with_data(json!({ "table": table, "total_rows": total_rows })),
        )
    }
}

fn first_row(rows: &Value) -> Result<Option<&Map<String, Value>>, GatewayError> {
    match rows {
        Value::Null => Ok(None),
        Value::Array(items) => match items.first() {
            None => Ok(None),
            Some(Value::Object(row)) => Ok(Some(row)),
            Some(_) => Err(GatewayError::Internal(anyhow::anyhow!(
                "sampled row is not a JSON object"
            ))),
        },
        Value::Object(row) => Ok(Some(row)),
        _ => Err(GatewayError::Internal(anyhow::anyhow!(
            "sample response is not a JSON array"
        ))),
    }
}
