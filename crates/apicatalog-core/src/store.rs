use crate::types::Catalog;
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// A complete catalog plus the time it was fetched
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub catalog: Catalog,
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Lowercased entry name -> first sync that contained it, for entries
    /// absent from the baseline load
    pub arrivals: HashMap<String, DateTime<Utc>>,
}

impl CatalogSnapshot {
    pub fn is_loaded(&self) -> bool {
        self.last_synced_at.is_some() && !self.catalog.is_empty()
    }

    /// Build the successor of `previous` from a freshly fetched catalog.
    ///
    /// The first load is the baseline and records no arrivals; later loads
    /// carry earlier arrivals forward and stamp names never seen before.
    pub fn succeed(previous: &CatalogSnapshot, catalog: Catalog, now: DateTime<Utc>) -> Self {
        let mut arrivals = HashMap::new();

        if previous.last_synced_at.is_some() {
            let known: std::collections::HashSet<String> = previous
                .catalog
                .entries()
                .map(|e| e.name.to_lowercase())
                .collect();

            for entry in catalog.entries() {
                let key = entry.name.to_lowercase();
                if let Some(at) = previous.arrivals.get(&key) {
                    arrivals.insert(key, *at);
                } else if !known.contains(&key) {
                    arrivals.entry(key).or_insert(now);
                }
            }
        }

        Self {
            catalog,
            last_synced_at: Some(now),
            arrivals,
        }
    }
}

/// Holds the current snapshot behind an atomically swappable pointer.
///
/// Readers get an `Arc` to a consistent snapshot that stays valid while a
/// replacement is published.
#[derive(Debug)]
pub struct CatalogStore {
    current: ArcSwap<CatalogSnapshot>,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(CatalogSnapshot::default()),
        }
    }

    pub fn with_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current.load_full()
    }

    pub fn replace(&self, snapshot: CatalogSnapshot) {
        self.current.store(Arc::new(snapshot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuthKind, CatalogEntry, CorsStatus};
    use chrono::Duration;

    fn entry(name: &str) -> CatalogEntry {
        CatalogEntry {
            name: name.to_string(),
            description: String::new(),
            auth: AuthKind::None,
            https: true,
            cors: CorsStatus::Unknown,
            link: String::new(),
            category: "Test".to_string(),
        }
    }

    #[test]
    fn test_baseline_load_records_no_arrivals() {
        let now = Utc::now();
        let catalog = Catalog::from_entries(vec![("Test", vec![entry("A")])]);
        let snapshot = CatalogSnapshot::succeed(&CatalogSnapshot::default(), catalog, now);
        assert!(snapshot.is_loaded());
        assert!(snapshot.arrivals.is_empty());
    }

    #[test]
    fn test_arrivals_are_carried_forward() {
        let t0 = Utc::now() - Duration::days(3);
        let t1 = t0 + Duration::days(1);
        let t2 = t1 + Duration::days(1);

        let base = CatalogSnapshot::succeed(
            &CatalogSnapshot::default(),
            Catalog::from_entries(vec![("Test", vec![entry("A")])]),
            t0,
        );
        let second = CatalogSnapshot::succeed(
            &base,
            Catalog::from_entries(vec![("Test", vec![entry("A"), entry("B")])]),
            t1,
        );
        let third = CatalogSnapshot::succeed(
            &second,
            Catalog::from_entries(vec![("Test", vec![entry("A"), entry("B"), entry("C")])]),
            t2,
        );

        assert_eq!(second.arrivals.get("b"), Some(&t1));
        assert_eq!(third.arrivals.get("b"), Some(&t1));
        assert_eq!(third.arrivals.get("c"), Some(&t2));
        assert!(!third.arrivals.contains_key("a"));
    }

    #[test]
    fn test_readers_keep_their_snapshot_across_replace() {
        let store = CatalogStore::new();
        let before = store.snapshot();
        store.replace(CatalogSnapshot::succeed(
            &before,
            Catalog::from_entries(vec![("Test", vec![entry("A")])]),
            Utc::now(),
        ));
        assert!(!before.is_loaded());
        assert!(store.snapshot().is_loaded());
    }
}
