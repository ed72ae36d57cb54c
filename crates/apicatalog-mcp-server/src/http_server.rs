#![cfg(feature = "server-http")]
// ABOUTME: Streamable HTTP transport for the API catalog MCP server
// ABOUTME: Mounts the rmcp session service under /mcp next to a /health check

use crate::server::ApiCatalogMcpServer;
use apicatalog_core::HttpConfig;
use axum::{routing::get, Router};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Router serving MCP sessions at `/mcp` and a liveness check at `/health`
pub fn build_http_app(server: ApiCatalogMcpServer, config: &HttpConfig) -> Router {
    let http_service = StreamableHttpService::new(
        move || Ok(server.clone()),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig {
            sse_keep_alive: Some(config.keep_alive()),
            stateful_mode: true,
        },
    );

    // the service routes its own POST/GET under the nested path
    Router::new()
        .nest_service("/mcp", http_service)
        .route("/health", get(health_check))
}

pub async fn start_http_server(
    server: ApiCatalogMcpServer,
    config: HttpConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| format!("Invalid bind address {}: {}", config.bind_address(), e))?;

    let app = build_http_app(server, &config);

    info!("API catalog MCP server listening on http://{}", addr);
    info!("  POST http://{}/mcp - initialize a session and send MCP requests", addr);
    info!("  GET  http://{}/mcp - SSE stream (requires Mcp-Session-Id header)", addr);
    info!("  GET  http://{}/health - health check", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
