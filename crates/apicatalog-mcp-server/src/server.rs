// ABOUTME: MCP tool server exposing public API catalog search and recommendations
// ABOUTME: Each tool forwards its arguments through the catalog request dispatcher

use apicatalog_core::{CatalogError, CatalogService};
use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::ToolCallContext, wrapper::Parameters},
    model::{
        CallToolRequestParam, CallToolResult, Content, ListToolsResult, PaginatedRequestParam,
        ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
    tool, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use crate::error::to_mcp_error;

pub const SERVER_INSTRUCTIONS: &str = "Public API catalog server. \
Search the catalog by category or keyword, filter by authentication, HTTPS or CORS support, \
inspect a single API, get project recommendations or alternatives, and generate integration \
snippets in javascript, python or curl. The catalog is downloaded on first use and refreshed \
at most once per freshness window; call sync_repository_data with force=true to refresh now.";

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CategoryRequest {
    /// Category name; exact match first, then case-insensitive substring
    pub category: String,
    /// Maximum number of APIs to return (default 10)
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct KeywordRequest {
    /// Text matched against API names and descriptions
    pub keyword: String,
    /// Maximum number of APIs to return (default 10)
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthFilterRequest {
    /// Authentication type: No, apiKey, OAuth, X-Mashape-Key or User-Agent
    pub auth_type: String,
    /// Maximum number of APIs to return (default 10)
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HttpsFilterRequest {
    /// true for APIs supporting HTTPS, false for those without (default true)
    #[serde(default)]
    pub https_only: Option<bool>,
    /// Maximum number of APIs to return (default 10)
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CorsFilterRequest {
    /// CORS status: yes, no or unknown
    pub cors_support: String,
    /// Maximum number of APIs to return (default 10)
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiNameRequest {
    /// API name, matched case-insensitively
    pub api_name: String,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct EmptyRequest {}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RandomRequest {
    /// Restrict the pick to this exact category
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequest {
    /// Project type, e.g. "weather app", "e-commerce", "天气应用"
    pub project_type: String,
    /// Extra keywords the APIs should match
    #[serde(default)]
    pub requirements: Vec<String>,
    /// Maximum number of recommendations (default 5)
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AlternativesRequest {
    /// Description of the functionality needed
    pub functionality: String,
    /// Maximum number of alternatives (default 5)
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationCodeRequest {
    /// API name, matched case-insensitively
    pub api_name: String,
    /// javascript, python or curl (default javascript)
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SyncRequest {
    /// Refetch even if the catalog is still fresh
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct NewApisRequest {
    /// Look-back period in days (default 7)
    #[serde(default)]
    pub days: Option<u32>,
}

#[derive(Clone)]
pub struct ApiCatalogMcpServer {
    service: Arc<CatalogService>,
    tool_router: ToolRouter<ApiCatalogMcpServer>,
}

#[tool_router]
impl ApiCatalogMcpServer {
    pub fn new(service: Arc<CatalogService>) -> Self {
        Self {
            service,
            tool_router: Self::tool_router(),
        }
    }

    pub fn service(&self) -> &Arc<CatalogService> {
        &self.service
    }

    /// Every registered tool with its input schema
    pub fn tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    #[tool(
        description = "List APIs in a category. Exact category name first, then the first category containing the text. Required: category. Optional: limit (default 10)."
    )]
    async fn search_apis_by_category(
        &self,
        params: Parameters<CategoryRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch("search_apis_by_category", &params.0).await
    }

    #[tool(
        description = "Find APIs whose name or description contains a keyword. Required: keyword. Optional: limit (default 10)."
    )]
    async fn search_apis_by_keyword(
        &self,
        params: Parameters<KeywordRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch("search_apis_by_keyword", &params.0).await
    }

    #[tool(
        description = "Filter APIs by authentication type (No, apiKey, OAuth, X-Mashape-Key, User-Agent). Required: authType. Optional: limit (default 10)."
    )]
    async fn filter_apis_by_auth(
        &self,
        params: Parameters<AuthFilterRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch("filter_apis_by_auth", &params.0).await
    }

    #[tool(
        description = "Filter APIs by HTTPS support. Optional: httpsOnly (default true), limit (default 10)."
    )]
    async fn filter_apis_by_https(
        &self,
        params: Parameters<HttpsFilterRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch("filter_apis_by_https", &params.0).await
    }

    #[tool(
        description = "Filter APIs by CORS support (yes, no, unknown). Required: corsSupport. Optional: limit (default 10)."
    )]
    async fn filter_apis_by_cors(
        &self,
        params: Parameters<CorsFilterRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch("filter_apis_by_cors", &params.0).await
    }

    #[tool(
        description = "Show everything known about one API, including how to authenticate. Required: apiName."
    )]
    async fn get_api_details(
        &self,
        params: Parameters<ApiNameRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch("get_api_details", &params.0).await
    }

    #[tool(description = "List all API categories with the number of APIs in each.")]
    async fn get_category_list(
        &self,
        params: Parameters<EmptyRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch("get_category_list", &params.0).await
    }

    #[tool(
        description = "Pick a random API, optionally from one category. Optional: category."
    )]
    async fn get_random_api(
        &self,
        params: Parameters<RandomRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch("get_random_api", &params.0).await
    }

    #[tool(
        description = "Catalog statistics: totals, authentication mix, HTTPS and CORS support."
    )]
    async fn get_api_statistics(
        &self,
        params: Parameters<EmptyRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch("get_api_statistics", &params.0).await
    }

    #[tool(
        description = "Break APIs down by authentication type with counts and example APIs."
    )]
    async fn analyze_auth_requirements(
        &self,
        params: Parameters<EmptyRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch("analyze_auth_requirements", &params.0).await
    }

    #[tool(
        description = "Recommend APIs for a project type, ranked by keyword relevance. Required: projectType. Optional: requirements (extra keywords), limit (default 5)."
    )]
    async fn recommend_apis_for_project(
        &self,
        params: Parameters<ProjectRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch("recommend_apis_for_project", &params.0).await
    }

    #[tool(
        description = "Find APIs offering a described functionality, ranked by how many of its words they match. Required: functionality. Optional: limit (default 5)."
    )]
    async fn find_alternative_apis(
        &self,
        params: Parameters<AlternativesRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch("find_alternative_apis", &params.0).await
    }

    #[tool(
        description = "Generate integration code for an API. Required: apiName. Optional: language (javascript, python, curl; default javascript)."
    )]
    async fn generate_api_integration_code(
        &self,
        params: Parameters<IntegrationCodeRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch("generate_api_integration_code", &params.0).await
    }

    #[tool(
        description = "Download the latest catalog. Skipped while the catalog is fresh unless force is true. Optional: force (default false)."
    )]
    async fn sync_repository_data(
        &self,
        params: Parameters<SyncRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch("sync_repository_data", &params.0).await
    }

    #[tool(
        description = "List APIs that appeared in catalog syncs during the last N days. Optional: days (default 7)."
    )]
    async fn check_new_apis(
        &self,
        params: Parameters<NewApisRequest>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch("check_new_apis", &params.0).await
    }

    async fn dispatch<T: Serialize>(
        &self,
        operation: &str,
        params: &T,
    ) -> Result<CallToolResult, McpError> {
        debug!("Tool call: {}", operation);
        let args = serde_json::to_value(params)
            .map_err(|e| to_mcp_error(CatalogError::from(e)))?;
        let text = self
            .service
            .call(operation, args)
            .await
            .map_err(to_mcp_error)?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

impl ServerHandler for ApiCatalogMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    /// Unknown tool names surface as method-not-found, not as a parameter error
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        if !self.tool_router.has_route(&request.name) {
            return Err(to_mcp_error(CatalogError::unknown_operation(
                request.name.to_string(),
            )));
        }
        let tcc = ToolCallContext::new(self, request, context);
        self.tool_router.call(tcc).await
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tool_router.list_all()))
    }
}
