// ABOUTME: Integration tests for the API catalog MCP tool surface
// ABOUTME: Checks tool registration, schemas, server info and error codes over a duplex transport

use apicatalog_core::{
    Catalog, CatalogService, CatalogStore, Result, SnapshotSource, Synchronizer, OPERATION_NAMES,
};
use apicatalog_mcp_server::{ApiCatalogMcpServer, SERVER_INSTRUCTIONS};
use async_trait::async_trait;
use rmcp::model::{CallToolRequestParam, ClientInfo, ErrorCode};
use rmcp::service::ServiceError;
use rmcp::{ClientHandler, ServerHandler, ServiceExt};
use std::sync::Arc;
use std::time::Duration;

struct EmptySource;

#[async_trait]
impl SnapshotSource for EmptySource {
    async fn fetch(&self) -> Result<Catalog> {
        Ok(Catalog::new())
    }

    fn location(&self) -> String {
        "memory://empty".to_string()
    }
}

fn server() -> ApiCatalogMcpServer {
    let sync = Synchronizer::new(
        Arc::new(CatalogStore::new()),
        Arc::new(EmptySource),
        Duration::from_secs(3600),
    );
    ApiCatalogMcpServer::new(Arc::new(CatalogService::new(Arc::new(sync))))
}

#[test]
fn test_every_operation_is_a_tool() {
    let mut names: Vec<String> = server()
        .tools()
        .into_iter()
        .map(|tool| tool.name.to_string())
        .collect();
    names.sort();

    let mut expected: Vec<String> = OPERATION_NAMES.iter().map(|n| n.to_string()).collect();
    expected.sort();

    assert_eq!(names, expected);
}

#[test]
fn test_tool_schemas_use_camel_case_arguments() {
    let tools = server().tools();
    let schema_of = |name: &str| {
        let tool = tools
            .iter()
            .find(|t| t.name == name)
            .unwrap_or_else(|| panic!("missing tool {}", name));
        serde_json::Value::Object((*tool.input_schema).clone())
    };

    let auth = schema_of("filter_apis_by_auth");
    assert!(auth["properties"].get("authType").is_some());

    let project = schema_of("recommend_apis_for_project");
    assert!(project["properties"].get("projectType").is_some());
    assert!(project["properties"].get("requirements").is_some());
}

#[test]
fn test_server_info_advertises_tools() {
    let info = server().get_info();
    assert_eq!(info.instructions.as_deref(), Some(SERVER_INSTRUCTIONS));
    assert!(info.capabilities.tools.is_some());
}

#[tokio::test]
async fn test_statistics_on_empty_catalog() {
    let server = server();
    let text = server
        .service()
        .call("get_api_statistics", serde_json::json!({}))
        .await
        .unwrap();
    assert!(text.starts_with("No API data available"));
}

#[derive(Debug, Clone, Default)]
struct TestClient;

impl ClientHandler for TestClient {
    fn get_info(&self) -> ClientInfo {
        ClientInfo::default()
    }
}

#[tokio::test]
async fn test_error_codes_over_transport() -> anyhow::Result<()> {
    let (server_transport, client_transport) = tokio::io::duplex(4096);

    let server = server();
    let server_handle = tokio::spawn(async move {
        server.serve(server_transport).await?.waiting().await?;
        anyhow::Ok(())
    });

    let client = TestClient.serve(client_transport).await?;

    let listed = client.list_all_tools().await?;
    assert_eq!(listed.len(), OPERATION_NAMES.len());

    let unknown = client
        .call_tool(CallToolRequestParam {
            name: "drop_catalog".into(),
            arguments: None,
        })
        .await;
    match unknown {
        Err(ServiceError::McpError(err)) => {
            assert_eq!(err.code, ErrorCode(-32601));
            assert!(err.message.contains("drop_catalog"));
        }
        other => panic!("expected method-not-found, got {:?}", other),
    }

    let empty = client
        .call_tool(CallToolRequestParam {
            name: "search_apis_by_keyword".into(),
            arguments: serde_json::json!({"keyword": "cat"}).as_object().cloned(),
        })
        .await;
    match empty {
        Err(ServiceError::McpError(err)) => assert_eq!(err.code, ErrorCode(-32603)),
        other => panic!("expected internal error, got {:?}", other),
    }

    client.cancel().await?;
    server_handle.await??;
    Ok(())
}
