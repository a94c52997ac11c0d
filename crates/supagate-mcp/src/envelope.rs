//! The uniform result envelope returned by every tool.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Successful tool result.
///
/// Failures never produce an envelope; they propagate as
/// [`GatewayError`](crate::error::GatewayError).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub success: bool,

    /// CRUD action (`supabase_query`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    /// Schema or mutation operation (`supabase_schema`, `supabase_modify_schema`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    pub data: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,

    /// Set when nothing was applied to the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simulated: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,

    /// ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
    pub timestamp: String,
}

impl ResultEnvelope {
    fn new() -> Self {
        Self {
            success: true,
            action: None,
            operation: None,
            table: None,
            data: Value::Null,
            count: None,
            simulated: None,
            message: None,
            warning: None,
            timestamp: timestamp(),
        }
    }

    /// Envelope for a CRUD action.
    pub fn for_action(action: &str, table: &str) -> Self {
        Self {
            action: Some(action.to_string()),
            table: Some(table.to_string()),
            ..Self::new()
        }
    }

    /// Envelope for a schema or mutation operation.
    pub fn for_operation(operation: &str, table: Option<&str>) -> Self {
        Self {
            operation: Some(operation.to_string()),
            table: table.map(str::to_string),
            ..Self::new()
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    /// Mark the envelope as a simulation that changed nothing.
    pub fn simulated(mut self, message: impl Into<String>, warning: impl Into<String>) -> Self {
        self.simulated = Some(true);
        self.message = Some(message.into());
        self.warning = Some(warning.into());
        self
    }
}

/// Current time in the envelope's fixed timestamp format.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Row count of a backend payload: array length, 1 for any other
/// non-null value, 0 for null.
pub fn payload_count(payload: &Value) -> u64 {
    match payload {
        Value::Array(items) => items.len() as u64,
        Value::Null => 0,
        _ => 1,
    }
}
