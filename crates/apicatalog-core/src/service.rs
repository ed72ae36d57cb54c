//! Request execution over the current catalog snapshot.

use crate::codegen::integration_guide;
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::format::{
    format_auth_analysis, format_category_list, format_category_match, format_details,
    format_entries, format_ranking, format_statistics,
};
use crate::query::QueryEngine;
use crate::request::CatalogRequest;
use crate::scoring::RelevanceScorer;
use crate::stats::{auth_analysis, statistics};
use crate::store::{CatalogSnapshot, CatalogStore};
use crate::sync::Synchronizer;
use crate::types::CatalogEntry;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Entry point for every catalog operation.
///
/// Cheap to share behind an `Arc`; every call reads one consistent snapshot
/// even if a sync replaces it mid-request.
pub struct CatalogService {
    synchronizer: Arc<Synchronizer>,
    rng: Mutex<fastrand::Rng>,
}

impl CatalogService {
    pub fn new(synchronizer: Arc<Synchronizer>) -> Self {
        Self::with_rng(synchronizer, fastrand::Rng::new())
    }

    /// Use a seeded generator for reproducible random picks
    pub fn with_rng(synchronizer: Arc<Synchronizer>, rng: fastrand::Rng) -> Self {
        Self {
            synchronizer,
            rng: Mutex::new(rng),
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        let store = Arc::new(CatalogStore::new());
        let synchronizer = Synchronizer::from_config(store, &config.sync)?;
        Ok(Self::new(Arc::new(synchronizer)))
    }

    pub fn synchronizer(&self) -> &Arc<Synchronizer> {
        &self.synchronizer
    }

    /// Resolve a named operation with loose arguments and run it
    pub async fn call(&self, operation: &str, args: Value) -> Result<String> {
        let request = CatalogRequest::from_call(operation, args)?;
        self.execute(request).await
    }

    pub async fn execute(&self, request: CatalogRequest) -> Result<String> {
        debug!("Executing {}", request.operation());

        match request {
            CatalogRequest::Sync { .. } => {}
            CatalogRequest::CheckNew { .. } => {
                self.ensure_fresh().await;
                // no-op inside the freshness window
                self.synchronizer.sync(false).await;
            }
            _ => self.ensure_fresh().await,
        }

        let snapshot = self.synchronizer.store().snapshot();
        let catalog = &snapshot.catalog;
        if request.scans_entries() && catalog.is_empty() {
            return Err(CatalogError::EmptyCatalog);
        }

        let engine = QueryEngine::new(catalog);
        let scorer = RelevanceScorer::new(catalog);

        let text = match request {
            CatalogRequest::SearchByCategory { category, limit } => {
                format_category_match(&category, limit, &engine.by_category(&category, limit))
            }
            CatalogRequest::SearchByKeyword { keyword, limit } => listing(
                &engine.by_keyword(&keyword, limit),
                format!("APIs matching \"{}\"", keyword),
                format!("No APIs found matching \"{}\".", keyword),
            ),
            CatalogRequest::FilterByAuth { auth, limit } => listing(
                &engine.by_auth(&auth, limit),
                format!("APIs using {} authentication", auth),
                format!("No APIs found with authentication type \"{}\".", auth),
            ),
            CatalogRequest::FilterByHttps { https_only, limit } => {
                let label = if https_only { "supporting" } else { "without" };
                listing(
                    &engine.by_https(https_only, limit),
                    format!("APIs {} HTTPS", label),
                    format!("No APIs found {} HTTPS.", label),
                )
            }
            CatalogRequest::FilterByCors { cors, limit } => listing(
                &engine.by_cors(cors, limit),
                format!("APIs with CORS status \"{}\"", cors),
                format!("No APIs found with CORS status \"{}\".", cors),
            ),
            CatalogRequest::Details { name } => match engine.details(&name) {
                Some(entry) => format_details(entry),
                None => missing_entry(&name),
            },
            CatalogRequest::CategoryList => format_category_list(&engine.category_list()),
            CatalogRequest::RandomEntry { category } => {
                let mut rng = self.rng.lock();
                match engine.random_entry(category.as_deref(), &mut rng) {
                    Ok(entry) => format!("🎲 Random API pick:\n\n{}", format_details(entry)),
                    Err(CatalogError::NotFound(what)) => {
                        format!("No random API available: {} not found.", what)
                    }
                    Err(e) => return Err(e),
                }
            }
            CatalogRequest::Statistics => format_statistics(statistics(catalog).as_ref()),
            CatalogRequest::AuthAnalysis => format_auth_analysis(&auth_analysis(catalog)),
            CatalogRequest::RecommendForProject {
                project_type,
                requirements,
                limit,
            } => {
                let ranking = scorer.recommend_for_project(&project_type, &requirements, limit);
                if ranking.is_empty() {
                    format!(
                        "No APIs matched project type \"{}\" (keywords: {}).",
                        project_type,
                        ranking.keywords.join(", ")
                    )
                } else {
                    format_ranking(
                        &format!("## API recommendations for \"{}\"", project_type),
                        &ranking,
                    )
                }
            }
            CatalogRequest::FindAlternatives {
                functionality,
                limit,
            } => {
                let ranking = scorer.find_alternatives(&functionality, limit);
                if ranking.is_empty() {
                    format!("No APIs found providing \"{}\".", functionality)
                } else {
                    format_ranking(
                        &format!("## APIs providing \"{}\"", functionality),
                        &ranking,
                    )
                }
            }
            CatalogRequest::IntegrationCode { name, language } => match engine.details(&name) {
                Some(entry) => integration_guide(entry, language),
                None => missing_entry(&name),
            },
            CatalogRequest::Sync { force } => {
                let outcome = self.synchronizer.sync(force).await;
                serde_json::to_string_pretty(&outcome)?
            }
            CatalogRequest::CheckNew { days } => check_new(&snapshot, days),
        };

        Ok(text)
    }

    async fn ensure_fresh(&self) {
        if let Some(outcome) = self.synchronizer.ensure_fresh().await {
            if !outcome.success {
                warn!("Serving without a loaded catalog: {}", outcome.message);
            }
        }
    }
}

fn check_new(snapshot: &CatalogSnapshot, days: u32) -> String {
    let Some(synced_at) = snapshot.last_synced_at else {
        return "The catalog has not been loaded yet, so no new APIs can be detected."
            .to_string();
    };

    let now = Utc::now();
    let cutoff = now
        .checked_sub_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let fresh: Vec<&CatalogEntry> = snapshot
        .catalog
        .entries()
        .filter(|entry| {
            snapshot
                .arrivals
                .get(&entry.name.to_lowercase())
                .is_some_and(|at| *at >= cutoff)
        })
        .collect();

    if fresh.is_empty() {
        return format!(
            "No new APIs detected in the last {} days (last sync: {}). \
             APIs are tracked from the first catalog load of this session.",
            days,
            synced_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    format!(
        "{} APIs added in the last {} days:\n\n{}",
        fresh.len(),
        days,
        format_entries(fresh)
    )
}

fn listing(entries: &[&CatalogEntry], heading: String, empty: String) -> String {
    if entries.is_empty() {
        return empty;
    }
    format!(
        "{} ({} found):\n\n{}",
        heading,
        entries.len(),
        format_entries(entries.iter().copied())
    )
}

fn missing_entry(name: &str) -> String {
    format!(
        "API \"{}\" not found. Try search_apis_by_keyword to look for similar names.",
        name
    )
}
