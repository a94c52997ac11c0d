//! One-shot tool call.
//!
//! `supagate call <tool> --args '<json>'` - Run a tool against the
//! configured backend and print the result envelope.

use anyhow::{Context, Result};
use serde_json::Value;
use supagate_core::GatewayConfig;
use supagate_mcp::{CallToolParams, McpServer};

pub async fn run(config: GatewayConfig, tool: &str, args: &str) -> Result<()> {
    let arguments: Value =
        serde_json::from_str(args).context("--args must be a JSON object")?;
    if !arguments.is_object() {
        anyhow::bail!("--args must be a JSON object, got: {}", arguments);
    }

    let server = McpServer::from_config(&config).context("Failed to initialize gateway")?;
    let envelope = server
        .call_tool(CallToolParams {
            name: tool.to_string(),
            arguments,
        })
        .await
        .with_context(|| format!("Tool call '{}' failed", tool))?;

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}
