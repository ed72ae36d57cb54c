use crate::config::SyncConfig;
use crate::error::{CatalogError, Result};
use crate::store::{CatalogSnapshot, CatalogStore};
use crate::types::Catalog;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Somewhere a complete catalog document can be fetched from
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch one full catalog; a single attempt, no retries
    async fn fetch(&self) -> Result<Catalog>;

    /// Human-readable location, used in messages
    fn location(&self) -> String;
}

/// Fetches the catalog with a single HTTP GET
#[derive(Clone)]
pub struct HttpSnapshotSource {
    client: Client,
    url: String,
}

impl HttpSnapshotSource {
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            url: config.source_url.clone(),
        })
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch(&self) -> Result<Catalog> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(CatalogError::sync(format!(
                "{} responded with status {}",
                self.url, status
            )));
        }

        let body = response.bytes().await?;
        let catalog: Catalog = serde_json::from_slice(&body)?;
        Ok(catalog)
    }

    fn location(&self) -> String {
        self.url.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    Fetched,
    AlreadyFresh,
    Failed,
}

/// Result of a sync attempt; failures are reported here rather than raised
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub success: bool,
    pub status: SyncStatus,
    pub message: String,
}

impl SyncOutcome {
    fn fetched(message: String) -> Self {
        Self {
            success: true,
            status: SyncStatus::Fetched,
            message,
        }
    }

    fn already_fresh() -> Self {
        Self {
            success: true,
            status: SyncStatus::AlreadyFresh,
            message: "Catalog is already fresh; no sync needed".to_string(),
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: false,
            status: SyncStatus::Failed,
            message,
        }
    }
}

/// Keeps the catalog store populated from a [`SnapshotSource`]
pub struct Synchronizer {
    store: Arc<CatalogStore>,
    source: Arc<dyn SnapshotSource>,
    freshness_window: Duration,
}

impl Synchronizer {
    pub fn new(
        store: Arc<CatalogStore>,
        source: Arc<dyn SnapshotSource>,
        freshness_window: Duration,
    ) -> Self {
        Self {
            store,
            source,
            freshness_window,
        }
    }

    pub fn from_config(store: Arc<CatalogStore>, config: &SyncConfig) -> Result<Self> {
        let source = Arc::new(HttpSnapshotSource::new(config)?);
        Ok(Self::new(store, source, config.freshness_window()))
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    /// Sync when nothing usable has been loaded yet
    pub async fn ensure_fresh(&self) -> Option<SyncOutcome> {
        if self.store.snapshot().is_loaded() {
            return None;
        }
        debug!("Catalog not loaded, forcing sync");
        Some(self.sync(true).await)
    }

    /// Replace the stored snapshot with a freshly fetched one.
    ///
    /// Unforced calls are no-ops while the current snapshot is younger than
    /// the freshness window. On failure the previous snapshot stays in place.
    pub async fn sync(&self, force: bool) -> SyncOutcome {
        let previous = self.store.snapshot();

        if !force && self.is_fresh(&previous) {
            debug!("Catalog is within the freshness window, skipping fetch");
            return SyncOutcome::already_fresh();
        }

        let location = self.source.location();
        info!("Syncing API catalog from {}", location);
        let started = Instant::now();

        let catalog = match self.source.fetch().await {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!("Catalog sync from {} failed: {}", location, e);
                return SyncOutcome::failed(format!(
                    "Failed to load catalog from {}: {}",
                    location, e
                ));
            }
        };

        for (name, declared, actual) in catalog.count_mismatches() {
            warn!(
                "Category '{}' declares {} entries but lists {}",
                name, declared, actual
            );
        }

        let categories = catalog.category_count();
        let entries = catalog.entry_count();
        self.store
            .replace(CatalogSnapshot::succeed(&previous, catalog, Utc::now()));

        info!(
            "Catalog synced: {} categories, {} APIs in {:?}",
            categories,
            entries,
            started.elapsed()
        );

        SyncOutcome::fetched(format!(
            "Loaded {} categories with {} APIs from {}",
            categories, entries, location
        ))
    }

    fn is_fresh(&self, snapshot: &CatalogSnapshot) -> bool {
        let Some(last) = snapshot.last_synced_at else {
            return false;
        };
        // A clock that moved backwards counts as zero age
        let age = (Utc::now() - last).to_std().unwrap_or(Duration::ZERO);
        age < self.freshness_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuthKind, CatalogEntry, CorsStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl SnapshotSource for CountingSource {
        async fn fetch(&self) -> Result<Catalog> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CatalogError::sync("connection refused"));
            }
            Ok(Catalog::from_entries(vec![(
                "Weather",
                vec![CatalogEntry {
                    name: "WeatherAPI".to_string(),
                    description: "current weather data".to_string(),
                    auth: AuthKind::ApiKey,
                    https: true,
                    cors: CorsStatus::Yes,
                    link: "api.weather.com".to_string(),
                    category: "Weather".to_string(),
                }],
            )]))
        }

        fn location(&self) -> String {
            "memory://test".to_string()
        }
    }

    fn synchronizer(fail: bool, window: Duration) -> (Synchronizer, Arc<CountingSource>) {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
            fail,
        });
        let sync = Synchronizer::new(Arc::new(CatalogStore::new()), source.clone(), window);
        (sync, source)
    }

    #[tokio::test]
    async fn test_second_unforced_sync_is_a_noop() {
        let (sync, source) = synchronizer(false, Duration::from_secs(3600));

        let first = sync.sync(false).await;
        assert_eq!(first.status, SyncStatus::Fetched);
        let second = sync.sync(false).await;
        assert!(second.success);
        assert_eq!(second.status, SyncStatus::AlreadyFresh);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_forced_sync_always_fetches() {
        let (sync, source) = synchronizer(false, Duration::from_secs(3600));
        sync.sync(false).await;
        sync.sync(true).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stale_snapshot_is_refetched() {
        let (sync, source) = synchronizer(false, Duration::ZERO);
        sync.sync(false).await;
        sync.sync(false).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_snapshot() {
        let (sync, _) = synchronizer(true, Duration::from_secs(3600));
        let outcome = sync.sync(true).await;
        assert!(!outcome.success);
        assert_eq!(outcome.status, SyncStatus::Failed);
        assert!(outcome.message.contains("connection refused"));
        assert!(!sync.store().snapshot().is_loaded());
    }

    #[tokio::test]
    async fn test_ensure_fresh_only_syncs_when_unloaded() {
        let (sync, source) = synchronizer(false, Duration::from_secs(3600));
        assert!(sync.ensure_fresh().await.is_some());
        assert!(sync.ensure_fresh().await.is_none());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
