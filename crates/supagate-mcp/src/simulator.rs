//! Schema mutation simulator.
//!
//! DDL cannot be issued through PostgREST, so `supabase_modify_schema`
//! validates the request and describes what it would do. Nothing is sent
//! to the backend.

use crate::envelope::ResultEnvelope;
use crate::error::GatewayError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Warning attached to every simulated result.
pub const SIMULATION_WARNING: &str =
    "Simulation only: no change was made to the database. Apply schema changes through a migration.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationOperation {
    CreateTable,
    AddColumn,
    DropColumn,
    DropTable,
}

impl MutationOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationOperation::CreateTable => "create_table",
            MutationOperation::AddColumn => "add_column",
            MutationOperation::DropColumn => "drop_column",
            MutationOperation::DropTable => "drop_table",
        }
    }

    /// Whether the change would lose data if it were applied.
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            MutationOperation::DropColumn | MutationOperation::DropTable
        )
    }
}

/// Column of a `create_table` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(default, rename = "dataType", alias = "type")]
    pub data_type: Option<String>,
}

/// Arguments of the `supabase_modify_schema` tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationArgs {
    pub operation: MutationOperation,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default, rename = "dataType")]
    pub data_type: Option<String>,
    #[serde(default)]
    pub columns: Option<Vec<ColumnDefinition>>,
}

/// Validate `args` and acknowledge the change without applying it.
pub fn simulate(args: &MutationArgs) -> Result<ResultEnvelope, GatewayError> {
    let operation = args.operation;
    let table = required(&args.table, "table", operation)?;

    let message = match operation {
        MutationOperation::CreateTable => {
            let columns = args.columns.as_deref().unwrap_or_default();
            if columns.is_empty() {
                format!("Would create table '{}'", table)
            } else {
                let list: Vec<String> = columns
                    .iter()
                    .map(|c| match c.data_type.as_deref() {
                        Some(t) => format!("{} {}", c.name, t),
                        None => c.name.clone(),
                    })
                    .collect();
                format!("Would create table '{}' ({})", table, list.join(", "))
            }
        }
        MutationOperation::AddColumn => {
            let column = required(&args.column, "column", operation)?;
            let data_type = required(&args.data_type, "dataType", operation)?;
            format!("Would add column '{}' ({}) to table '{}'", column, data_type, table)
        }
        MutationOperation::DropColumn => {
            let column = required(&args.column, "column", operation)?;
            format!(
                "Would drop column '{}' from table '{}'. This is destructive: the column's data would be lost.",
                column, table
            )
        }
        MutationOperation::DropTable => format!(
            "Would drop table '{}'. This is destructive: every row in the table would be lost.",
            table
        ),
    };

    tracing::info!(
        operation = operation.as_str(),
        table,
        "Simulated schema change"
    );

    let mut change = json!({
        "operation": operation.as_str(),
        "table": table,
        "destructive": operation.is_destructive(),
    });
    if let Some(column) = non_blank(&args.column) {
        change["column"] = Value::String(column.to_string());
    }
    if let Some(data_type) = non_blank(&args.data_type) {
        change["dataType"] = Value::String(data_type.to_string());
    }
    if let Some(columns) = &args.columns {
        change["columns"] = serde_json::to_value(columns)?;
    }

    Ok(ResultEnvelope::for_operation(operation.as_str(), Some(table))
        .with_data(change)
        .simulated(message, SIMULATION_WARNING))
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(
    value: &'a Option<String>,
    field: &str,
    operation: MutationOperation,
) -> Result<&'a str, GatewayError> {
    non_blank(value).ok_or_else(|| {
        GatewayError::validation(format!("'{}' is required for {}", field, operation.as_str()))
    })
}
