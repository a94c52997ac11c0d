//! Dispatcher tests for Supagate.
//!
//! Drives every tool through `McpServer::handle_request` against the
//! recording transport and checks both the envelope and the exact
//! request PostgREST would have received.

use super::common::*;
use serde_json::json;
use std::collections::HashSet;
use supagate_mcp::{GatewayError, Method};

// =============================================================================
// SUPABASE_QUERY
// =============================================================================

pub async fn test_insert_returns_created_row(ctx: &TestContext) {
    println!("  🧪 test_insert_returns_created_row");

    let (server, transport) = ctx.server(vec![json_response(201, json!([{"id": 1, "name": "Ana"}]))]);

    let result = call_tool(
        &server,
        "supabase_query",
        json!({"action": "insert", "table": "users", "data": {"name": "Ana"}}),
    )
    .await
    .expect("insert should succeed");

    assert_eq!(result["success"], true);
    assert_eq!(result["action"], "insert");
    assert_eq!(result["table"], "users");
    assert_eq!(result["data"], json!([{"id": 1, "name": "Ana"}]));
    assert_eq!(result["count"], 1);
    assert_timestamp(&result);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.url.as_str(), "https://project-ref.supabase.co/rest/v1/users");
    assert_eq!(request.header("apikey"), Some(SERVICE_KEY));
    assert_eq!(
        request.header("Authorization"),
        Some(format!("Bearer {}", SERVICE_KEY).as_str())
    );
    assert_eq!(request.header("Prefer"), Some("return=representation"));
    assert_eq!(request.spec.body, Some(json!({"name": "Ana"})));

    println!("     ✓ Insert posts the row and returns the representation");
}

pub async fn test_select_filters_become_equality_params(ctx: &TestContext) {
    println!("  🧪 test_select_filters_become_equality_params");

    let (server, transport) = ctx.server(vec![json_response(200, json!([]))]);

    let result = call_tool(
        &server,
        "supabase_query",
        json!({
            "action": "select",
            "table": "users",
            "filters": {"status": "active", "id": 7},
            "select": "id,email",
            "limit": 25,
            "orderBy": "created_at.desc"
        }),
    )
    .await
    .expect("select should succeed");

    assert_eq!(result["count"], 0);
    assert_eq!(result["data"], json!([]));

    let request = &transport.requests()[0];
    assert_eq!(request.method, Method::Get);
    assert_eq!(request.url.path(), "/rest/v1/users");
    assert!(request.spec.body.is_none());

    let pairs: HashSet<(String, String)> = request.query_pairs().into_iter().collect();
    let expected: HashSet<(String, String)> = [
        ("status", "eq.active"),
        ("id", "eq.7"),
        ("select", "id,email"),
        ("limit", "25"),
        ("order", "created_at.desc"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    assert_eq!(pairs, expected);

    println!("     ✓ Filters, projection, limit and order encoded");
}

pub async fn test_unscoped_mutations_make_no_call(ctx: &TestContext) {
    println!("  🧪 test_unscoped_mutations_make_no_call");

    let (server, transport) = ctx.server(vec![]);

    for arguments in [
        json!({"action": "update", "table": "users", "data": {"status": "banned"}}),
        json!({"action": "delete", "table": "users", "filters": {}}),
    ] {
        let err = call_tool(&server, "supabase_query", arguments)
            .await
            .expect_err("unscoped mutation must fail");
        assert!(matches!(err, GatewayError::Validation(_)), "got {:?}", err);
    }
    assert_eq!(transport.request_count(), 0);

    println!("     ✓ Update/delete without filters rejected before any request");
}

pub async fn test_update_patches_filtered_rows(ctx: &TestContext) {
    println!("  🧪 test_update_patches_filtered_rows");

    let (server, transport) = ctx.server(vec![json_response(
        200,
        json!([{"id": 3, "status": "inactive"}, {"id": 4, "status": "inactive"}]),
    )]);

    let result = call_tool(
        &server,
        "supabase_query",
        json!({
            "action": "update",
            "table": "users",
            "data": {"status": "inactive"},
            "filters": {"team": "sales"}
        }),
    )
    .await
    .expect("update should succeed");

    assert_eq!(result["count"], 2);

    let request = &transport.requests()[0];
    assert_eq!(request.method, Method::Patch);
    assert_eq!(request.query_pairs(), vec![("team".to_string(), "eq.sales".to_string())]);
    assert_eq!(request.spec.body, Some(json!({"status": "inactive"})));

    println!("     ✓ Update scoped by filters");
}

pub async fn test_backend_error_hides_key(ctx: &TestContext) {
    println!("  🧪 test_backend_error_hides_key");

    let (server, _transport) = ctx.server(vec![json_response(
        401,
        json!({"message": format!("Invalid API key: {}", SERVICE_KEY)}),
    )]);

    let err = call_tool(
        &server,
        "supabase_query",
        json!({"action": "select", "table": "users"}),
    )
    .await
    .expect_err("401 must surface as an error");

    match err {
        GatewayError::Backend { status, body } => {
            assert_eq!(status, 401);
            assert!(!body.contains(SERVICE_KEY));
        }
        other => panic!("expected backend error, got {:?}", other),
    }

    println!("     ✓ Backend error carries status with key redacted");
}

// =============================================================================
// SUPABASE_SCHEMA
// =============================================================================

pub async fn test_list_tables_hides_rpc(ctx: &TestContext) {
    println!("  🧪 test_list_tables_hides_rpc");

    let (server, transport) = ctx.server(vec![openapi_root(&["users", "orders", "rpc_internal"])]);

    let result = call_tool(&server, "supabase_schema", json!({"operation": "list_tables"}))
        .await
        .expect("list_tables should succeed");

    let names: HashSet<&str> = result["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert_eq!(names, HashSet::from(["users", "orders"]));
    assert_eq!(result["count"], 2);
    assert_eq!(result["operation"], "list_tables");
    assert_eq!(transport.requests()[0].url.path(), "/rest/v1/");

    println!("     ✓ RPC entries dropped from the table list");
}

pub async fn test_describe_table_infers_types(ctx: &TestContext) {
    println!("  🧪 test_describe_table_infers_types");

    let (server, transport) = ctx.server(vec![
        json_response(200, json!([])),
        json_response(
            200,
            json!([{"id": 10, "total": 19.99, "paid": false, "notes": null, "items": [1, 2]}]),
        ),
    ]);

    let result = call_tool(
        &server,
        "supabase_schema",
        json!({"operation": "describe_table", "table": "orders"}),
    )
    .await
    .expect("describe_table should succeed");

    let columns = result["data"].as_array().unwrap();
    let types: Vec<(&str, &str)> = columns
        .iter()
        .map(|c| (c["name"].as_str().unwrap(), c["inferred_type"].as_str().unwrap()))
        .collect();
    assert_eq!(
        types,
        vec![
            ("id", "integer"),
            ("total", "numeric"),
            ("paid", "boolean"),
            ("notes", "text"),
            ("items", "json"),
        ]
    );
    assert_eq!(columns[3]["nullability_hint"], "YES");
    assert_eq!(columns[0]["nullability_hint"], "UNKNOWN");
    assert_eq!(transport.request_count(), 2);

    println!("     ✓ Column types inferred from one sampled row");
}

pub async fn test_describe_empty_table(ctx: &TestContext) {
    println!("  🧪 test_describe_empty_table");

    let (server, _transport) =
        ctx.server(vec![json_response(200, json!([])), json_response(200, json!([]))]);

    let result = call_tool(
        &server,
        "supabase_schema",
        json!({"operation": "describe_table", "table": "audit_log"}),
    )
    .await
    .expect("empty table is not an error");

    let columns = result["data"].as_array().unwrap();
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0]["inferred_type"], "undeterminable");

    println!("     ✓ Empty table yields a single sentinel column");
}

pub async fn test_describe_missing_table(ctx: &TestContext) {
    println!("  🧪 test_describe_missing_table");

    let (server, transport) = ctx.server(vec![json_response(
        404,
        json!({"code": "42P01", "message": "relation \"public.ghosts\" does not exist"}),
    )]);

    let err = call_tool(
        &server,
        "supabase_schema",
        json!({"operation": "describe_table", "table": "ghosts"}),
    )
    .await
    .expect_err("missing table must fail");

    assert!(matches!(err, GatewayError::NotFound(_)));
    assert_eq!(transport.request_count(), 1, "no sample after a failed probe");

    println!("     ✓ Failed probe reported as not found");
}

pub async fn test_table_stats(ctx: &TestContext) {
    println!("  🧪 test_table_stats");

    let (server, transport) = ctx.server(vec![
        json_response(206, json!([])).with_header("Content-Range", "0-24/3573"),
        json_response(200, json!([])),
    ]);

    let result = call_tool(
        &server,
        "supabase_schema",
        json!({"operation": "table_stats", "table": "orders"}),
    )
    .await
    .expect("table_stats should succeed");
    assert_eq!(result["data"], json!({"table": "orders", "total_rows": 3573}));

    let request = &transport.requests()[0];
    assert_eq!(request.header("Prefer"), Some("count=exact"));

    // Second response has no Content-Range.
    let result = call_tool(
        &server,
        "supabase_schema",
        json!({"operation": "table_stats", "table": "orders"}),
    )
    .await
    .expect("missing header is not an error");
    assert_eq!(result["data"]["total_rows"], 0);

    println!("     ✓ Exact count read from Content-Range");
}

// =============================================================================
// SUPABASE_MODIFY_SCHEMA
// =============================================================================

pub async fn test_drop_column_requires_column(ctx: &TestContext) {
    println!("  🧪 test_drop_column_requires_column");

    let (server, transport) = ctx.server(vec![]);

    let err = call_tool(
        &server,
        "supabase_modify_schema",
        json!({"operation": "drop_column", "table": "users"}),
    )
    .await
    .expect_err("drop_column without column must fail");

    assert!(matches!(err, GatewayError::Validation(_)));
    assert_eq!(transport.request_count(), 0);

    println!("     ✓ Missing column rejected without a backend call");
}

pub async fn test_modify_schema_is_simulated(ctx: &TestContext) {
    println!("  🧪 test_modify_schema_is_simulated");

    let (server, transport) = ctx.unconfigured_server();

    let result = call_tool(
        &server,
        "supabase_modify_schema",
        json!({"operation": "add_column", "table": "users", "column": "age", "dataType": "int4"}),
    )
    .await
    .expect("simulation needs no credentials");

    assert_eq!(result["simulated"], true);
    assert!(result["warning"].as_str().unwrap().contains("no change"));
    assert_timestamp(&result);
    assert_eq!(transport.request_count(), 0);

    println!("     ✓ Schema change acknowledged, nothing applied");
}

// =============================================================================
// CONFIGURATION
// =============================================================================

pub async fn test_data_tools_fail_without_credentials(ctx: &TestContext) {
    println!("  🧪 test_data_tools_fail_without_credentials");

    let (server, transport) = ctx.unconfigured_server();

    let err = call_tool(
        &server,
        "supabase_schema",
        json!({"operation": "table_stats", "table": "orders"}),
    )
    .await
    .expect_err("no credentials");
    assert!(matches!(err, GatewayError::Configuration(_)));
    assert_eq!(transport.request_count(), 0);

    println!("     ✓ Configuration error before any request");
}

/// Run all dispatcher tests.
pub async fn run_all_tests(ctx: &TestContext) {
    println!("\n📦 Dispatcher Tests");
    println!("{}", "=".repeat(50));

    test_insert_returns_created_row(ctx).await;
    test_select_filters_become_equality_params(ctx).await;
    test_unscoped_mutations_make_no_call(ctx).await;
    test_update_patches_filtered_rows(ctx).await;
    test_backend_error_hides_key(ctx).await;
    test_list_tables_hides_rpc(ctx).await;
    test_describe_table_infers_types(ctx).await;
    test_describe_empty_table(ctx).await;
    test_describe_missing_table(ctx).await;
    test_table_stats(ctx).await;
    test_drop_column_requires_column(ctx).await;
    test_modify_schema_is_simulated(ctx).await;
    test_data_tools_fail_without_credentials(ctx).await;

    println!("\n✅ All dispatcher tests passed!\n");
}
