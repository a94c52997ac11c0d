//! Tools introspection command.
//!
//! `supagate tools` - Print the tool catalog. Needs no backend.

use anyhow::Result;
use supagate_mcp::{ListToolsResponse, catalog};

pub fn list(json: bool) -> Result<()> {
    let tools = catalog();

    if json {
        let body = ListToolsResponse { tools };
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("\n🔧 Available Tools ({}):", tools.len());

    for tool in &tools {
        let annotations = tool.annotations.as_ref();
        let mut badges = Vec::new();
        if annotations.is_some_and(|a| a.read_only == Some(true)) {
            badges.push("read");
        } else {
            badges.push("write");
        }
        if annotations.is_some_and(|a| a.simulated == Some(true)) {
            badges.push("simulated");
        }

        println!("\n   {} [{}]", tool.name, badges.join(", "));
        println!("      {}", tool.description);

        let required: Vec<&str> = tool.input_schema["required"]
            .as_array()
            .map(|r| r.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();
        if let Some(properties) = tool.input_schema["properties"].as_object() {
            for name in properties.keys() {
                let marker = if required.contains(&name.as_str()) { "*" } else { " " };
                println!("      {} {}", marker, name);
            }
        }
    }

    println!();
    Ok(())
}
