//! The static tool catalog.
//!
//! The gateway exposes a fixed set of three tools. [`ToolName`] is the
//! closed set the dispatcher matches on; [`catalog`] is what `tools/list`
//! returns.

use crate::error::GatewayError;
use crate::protocol::{ToolAnnotations, ToolDefinition};
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    SupabaseQuery,
    SupabaseSchema,
    SupabaseModifySchema,
}

impl ToolName {
    pub const ALL: [ToolName; 3] = [
        ToolName::SupabaseQuery,
        ToolName::SupabaseSchema,
        ToolName::SupabaseModifySchema,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::SupabaseQuery => "supabase_query",
            ToolName::SupabaseSchema => "supabase_schema",
            ToolName::SupabaseModifySchema => "supabase_modify_schema",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolName::SupabaseQuery => {
                "Select, insert, update or delete rows in a Supabase table. \
                 Filters are equality matches; update and delete require at least one filter."
            }
            ToolName::SupabaseSchema => {
                "Inspect the database: list tables, describe a table's columns \
                 (types inferred from a sampled row) or count a table's rows."
            }
            ToolName::SupabaseModifySchema => {
                "Describe a schema change (create/drop table, add/drop column). \
                 Changes are simulated and never applied."
            }
        }
    }

    /// Whether the tool leaves the backend untouched.
    pub fn is_read_only(&self) -> bool {
        !matches!(self, ToolName::SupabaseQuery)
    }

    /// JSON Schema of the tool's arguments.
    pub fn input_schema(&self) -> Value {
        match self {
            ToolName::SupabaseQuery => json!({
                "type": "object",
                "properties": {
                    "action": {
                        "type": "string",
                        "enum": ["select", "insert", "update", "delete"]
                    },
                    "table": {"type": "string", "description": "Table name"},
                    "data": {
                        "description": "Row (or array of rows) to insert, or fields to update",
                        "type": ["object", "array"]
                    },
                    "filters": {
                        "type": "object",
                        "description": "Column to value equality filters",
                        "additionalProperties": true
                    },
                    "select": {
                        "type": "string",
                        "description": "Comma-separated projection",
                        "default": "*"
                    },
                    "limit": {"type": "integer", "minimum": 0},
                    "orderBy": {
                        "type": "string",
                        "description": "PostgREST order expression, e.g. created_at.desc"
                    }
                },
                "required": ["action", "table"]
            }),
            ToolName::SupabaseSchema => json!({
                "type": "object",
                "properties": {
                    "operation": {
                        "type": "string",
                        "enum": ["list_tables", "describe_table", "table_stats"]
                    },
                    "table": {
                        "type": "string",
                        "description": "Required for describe_table and table_stats"
                    }
                },
                "required": ["operation"]
            }),
            ToolName::SupabaseModifySchema => json!({
                "type": "object",
                "properties": {
                    "operation": {
                        "type": "string",
                        "enum": ["create_table", "add_column", "drop_column", "drop_table"]
                    },
                    "table": {"type": "string"},
                    "column": {
                        "type": "string",
                        "description": "Required for add_column and drop_column"
                    },
                    "dataType": {
                        "type": "string",
                        "description": "Required for add_column"
                    },
                    "columns": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "name": {"type": "string"},
                                "dataType": {"type": "string"}
                            },
                            "required": ["name"]
                        }
                    }
                },
                "required": ["operation", "table"]
            }),
        }
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.as_str().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
            annotations: Some(ToolAnnotations {
                read_only: Some(self.is_read_only()),
                simulated: (*self == ToolName::SupabaseModifySchema).then_some(true),
            }),
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| GatewayError::UnknownTool {
                name: s.to_string(),
            })
    }
}

/// Every tool, in a stable order.
pub fn catalog() -> Vec<ToolDefinition> {
    ToolName::ALL.iter().map(ToolName::definition).collect()
}
