//! Typed operations accepted at the tool boundary.

use crate::codegen::Language;
use crate::error::{CatalogError, Result};
use crate::types::{AuthKind, CorsStatus};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_SEARCH_LIMIT: usize = 10;
pub const DEFAULT_RECOMMEND_LIMIT: usize = 5;
pub const DEFAULT_NEW_API_DAYS: u32 = 7;

/// Every operation name the catalog answers to
pub const OPERATION_NAMES: &[&str] = &[
    "search_apis_by_category",
    "search_apis_by_keyword",
    "filter_apis_by_auth",
    "filter_apis_by_https",
    "filter_apis_by_cors",
    "get_api_details",
    "get_category_list",
    "get_random_api",
    "get_api_statistics",
    "analyze_auth_requirements",
    "recommend_apis_for_project",
    "find_alternative_apis",
    "generate_api_integration_code",
    "sync_repository_data",
    "check_new_apis",
];

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogRequest {
    SearchByCategory { category: String, limit: usize },
    SearchByKeyword { keyword: String, limit: usize },
    FilterByAuth { auth: AuthKind, limit: usize },
    FilterByHttps { https_only: bool, limit: usize },
    FilterByCors { cors: CorsStatus, limit: usize },
    Details { name: String },
    CategoryList,
    RandomEntry { category: Option<String> },
    Statistics,
    AuthAnalysis,
    RecommendForProject {
        project_type: String,
        requirements: Vec<String>,
        limit: usize,
    },
    FindAlternatives { functionality: String, limit: usize },
    IntegrationCode { name: String, language: Language },
    Sync { force: bool },
    CheckNew { days: u32 },
}

// Raw argument bags, camelCase as sent by tool callers

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryArgs {
    #[serde(default)]
    category: String,
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct KeywordArgs {
    #[serde(default)]
    keyword: String,
    limit: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthArgs {
    #[serde(default)]
    auth_type: String,
    limit: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HttpsArgs {
    https_only: Option<bool>,
    limit: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CorsArgs {
    #[serde(default)]
    cors_support: String,
    limit: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NameArgs {
    #[serde(default)]
    api_name: String,
}

#[derive(Deserialize)]
struct RandomArgs {
    category: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectArgs {
    #[serde(default)]
    project_type: String,
    #[serde(default)]
    requirements: Vec<String>,
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct FunctionalityArgs {
    #[serde(default)]
    functionality: String,
    limit: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodeArgs {
    #[serde(default)]
    api_name: String,
    language: Option<String>,
}

#[derive(Deserialize)]
struct SyncArgs {
    #[serde(default)]
    force: bool,
}

#[derive(Deserialize)]
struct DaysArgs {
    days: Option<u32>,
}

impl CatalogRequest {
    /// Resolve an operation name and its loosely typed arguments
    pub fn from_call(name: &str, args: Value) -> Result<Self> {
        let args = if args.is_null() {
            Value::Object(Default::default())
        } else {
            args
        };

        let request = match name {
            "search_apis_by_category" => {
                let a: CategoryArgs = parse(name, args)?;
                Self::SearchByCategory {
                    category: required("category", a.category)?,
                    limit: limit(a.limit, DEFAULT_SEARCH_LIMIT)?,
                }
            }
            "search_apis_by_keyword" => {
                let a: KeywordArgs = parse(name, args)?;
                Self::SearchByKeyword {
                    keyword: required("keyword", a.keyword)?,
                    limit: limit(a.limit, DEFAULT_SEARCH_LIMIT)?,
                }
            }
            "filter_apis_by_auth" => {
                let a: AuthArgs = parse(name, args)?;
                Self::FilterByAuth {
                    auth: AuthKind::parse(&required("authType", a.auth_type)?),
                    limit: limit(a.limit, DEFAULT_SEARCH_LIMIT)?,
                }
            }
            "filter_apis_by_https" => {
                let a: HttpsArgs = parse(name, args)?;
                Self::FilterByHttps {
                    https_only: a.https_only.unwrap_or(true),
                    limit: limit(a.limit, DEFAULT_SEARCH_LIMIT)?,
                }
            }
            "filter_apis_by_cors" => {
                let a: CorsArgs = parse(name, args)?;
                Self::FilterByCors {
                    cors: parse_cors(&a.cors_support)?,
                    limit: limit(a.limit, DEFAULT_SEARCH_LIMIT)?,
                }
            }
            "get_api_details" => {
                let a: NameArgs = parse(name, args)?;
                Self::Details {
                    name: required("apiName", a.api_name)?,
                }
            }
            "get_category_list" => Self::CategoryList,
            "get_random_api" => {
                let a: RandomArgs = parse(name, args)?;
                Self::RandomEntry {
                    category: a.category.filter(|c| !c.trim().is_empty()),
                }
            }
            "get_api_statistics" => Self::Statistics,
            "analyze_auth_requirements" => Self::AuthAnalysis,
            "recommend_apis_for_project" => {
                let a: ProjectArgs = parse(name, args)?;
                Self::RecommendForProject {
                    project_type: required("projectType", a.project_type)?,
                    requirements: a.requirements,
                    limit: limit(a.limit, DEFAULT_RECOMMEND_LIMIT)?,
                }
            }
            "find_alternative_apis" => {
                let a: FunctionalityArgs = parse(name, args)?;
                Self::FindAlternatives {
                    functionality: required("functionality", a.functionality)?,
                    limit: limit(a.limit, DEFAULT_RECOMMEND_LIMIT)?,
                }
            }
            "generate_api_integration_code" => {
                let a: CodeArgs = parse(name, args)?;
                Self::IntegrationCode {
                    name: required("apiName", a.api_name)?,
                    language: a
                        .language
                        .as_deref()
                        .unwrap_or("javascript")
                        .parse()?,
                }
            }
            "sync_repository_data" => {
                let a: SyncArgs = parse(name, args)?;
                Self::Sync { force: a.force }
            }
            "check_new_apis" => {
                let a: DaysArgs = parse(name, args)?;
                Self::CheckNew {
                    days: a.days.unwrap_or(DEFAULT_NEW_API_DAYS),
                }
            }
            other => return Err(CatalogError::unknown_operation(other)),
        };

        Ok(request)
    }

    /// Operation name this request answers to
    pub fn operation(&self) -> &'static str {
        match self {
            Self::SearchByCategory { .. } => "search_apis_by_category",
            Self::SearchByKeyword { .. } => "search_apis_by_keyword",
            Self::FilterByAuth { .. } => "filter_apis_by_auth",
            Self::FilterByHttps { .. } => "filter_apis_by_https",
            Self::FilterByCors { .. } => "filter_apis_by_cors",
            Self::Details { .. } => "get_api_details",
            Self::CategoryList => "get_category_list",
            Self::RandomEntry { .. } => "get_random_api",
            Self::Statistics => "get_api_statistics",
            Self::AuthAnalysis => "analyze_auth_requirements",
            Self::RecommendForProject { .. } => "recommend_apis_for_project",
            Self::FindAlternatives { .. } => "find_alternative_apis",
            Self::IntegrationCode { .. } => "generate_api_integration_code",
            Self::Sync { .. } => "sync_repository_data",
            Self::CheckNew { .. } => "check_new_apis",
        }
    }

    /// Whether answering needs a loaded catalog. Aggregate views and sync
    /// describe an empty catalog themselves.
    pub fn scans_entries(&self) -> bool {
        !matches!(
            self,
            Self::CategoryList
                | Self::Statistics
                | Self::AuthAnalysis
                | Self::Sync { .. }
                | Self::CheckNew { .. }
        )
    }
}

fn parse<T: DeserializeOwned>(operation: &str, args: Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| {
        CatalogError::invalid_input(format!("invalid arguments for {}: {}", operation, e))
    })
}

fn required(field: &str, value: String) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CatalogError::invalid_input(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

/// Validate a caller-supplied limit, applying the operation default
pub fn limit(value: Option<usize>, default: usize) -> Result<usize> {
    match value {
        None => Ok(default),
        Some(0) => Err(CatalogError::invalid_input("limit must be a positive integer")),
        Some(n) => Ok(n),
    }
}

/// CORS filter values are restricted to yes, no and unknown
pub fn parse_cors(raw: &str) -> Result<CorsStatus> {
    match raw.trim().to_lowercase().as_str() {
        "yes" | "no" | "unknown" => Ok(CorsStatus::parse(raw)),
        other => Err(CatalogError::invalid_input(format!(
            "corsSupport must be one of yes, no, unknown (got '{}')",
            other
        ))),
    }
}
