// ABOUTME: Integration tests for the streamable HTTP transport
// ABOUTME: Validates the health check and MCP session initialization

#![cfg(feature = "server-http")]

use apicatalog_core::{CatalogConfig, CatalogService, HttpConfig};
use apicatalog_mcp_server::{build_http_app, ApiCatalogMcpServer};
use http_body_util::BodyExt;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

fn server() -> ApiCatalogMcpServer {
    let service = CatalogService::from_config(&CatalogConfig::default()).expect("service");
    ApiCatalogMcpServer::new(Arc::new(service))
}

#[tokio::test]
async fn test_health_check() {
    let app = build_http_app(server(), &HttpConfig::default());
    let response = app
        .oneshot(
            axum::http::Request::builder()
                .method("GET")
                .uri("/health")
                .body(axum::body::Body::empty())
                .expect("request"),
        )
        .await
        .expect("health response");

    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let body = response.into_body().collect().await.expect("body").to_bytes();
    assert_eq!(std::str::from_utf8(&body).expect("utf8"), "OK");
}

#[tokio::test]
async fn test_initialize_opens_session() {
    let app = build_http_app(server(), &HttpConfig::default());

    let initialize = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2025-06-18",
            "capabilities": {},
            "clientInfo": {"name": "test-client", "version": "1.0.0"}
        }
    });

    let response = app
        .oneshot(
            axum::http::Request::builder()
                .method("POST")
                .uri("/mcp")
                .header("Accept", "application/json, text/event-stream")
                .header("Content-Type", "application/json")
                .body(axum::body::Body::from(initialize.to_string()))
                .expect("request"),
        )
        .await
        .expect("initialize response");

    assert_eq!(response.status(), axum::http::StatusCode::OK);
    assert!(response.headers().contains_key("mcp-session-id"));
}
