use crate::types::{AuthKind, Catalog, CorsStatus};
use serde::Serialize;

/// Number of example names kept per auth kind
pub const AUTH_EXAMPLE_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct Share<K> {
    pub key: K,
    pub count: usize,
    pub percentage: f64,
}

/// Aggregate counts over every entry in the catalog
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStatistics {
    pub total_categories: usize,
    pub total_entries: usize,
    /// Sum of the counts categories declare; may differ from `total_entries`
    pub declared_total: usize,
    pub auth_kinds: Vec<Share<AuthKind>>,
    pub https: Share<bool>,
    pub cors: Vec<Share<CorsStatus>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthGroup {
    pub kind: AuthKind,
    pub count: usize,
    pub percentage: f64,
    /// First names encountered in scan order
    pub examples: Vec<String>,
}

/// Returns `None` when there are no entries, so no percentage is ever
/// computed against zero.
pub fn statistics(catalog: &Catalog) -> Option<CatalogStatistics> {
    let total = catalog.entry_count();
    if total == 0 {
        return None;
    }

    let mut auth_counts: Vec<(AuthKind, usize)> = Vec::new();
    let mut cors_counts: Vec<(CorsStatus, usize)> = Vec::new();
    let mut https_count = 0;

    for entry in catalog.entries() {
        bump(&mut auth_counts, &entry.auth, |a, b| a.matches(b));
        bump(&mut cors_counts, &entry.cors, |a, b| a == b);
        if entry.https {
            https_count += 1;
        }
    }

    Some(CatalogStatistics {
        total_categories: catalog.category_count(),
        total_entries: total,
        declared_total: catalog.declared_total(),
        auth_kinds: into_shares(auth_counts, total),
        https: Share {
            key: true,
            count: https_count,
            percentage: percentage(https_count, total),
        },
        cors: into_shares(cors_counts, total),
    })
}

/// Per auth kind: how many entries use it and a few example names,
/// most common kind first
pub fn auth_analysis(catalog: &Catalog) -> Vec<AuthGroup> {
    let total = catalog.entry_count();
    let mut groups: Vec<AuthGroup> = Vec::new();

    for entry in catalog.entries() {
        let index = match groups.iter().position(|g| g.kind.matches(&entry.auth)) {
            Some(i) => i,
            None => {
                groups.push(AuthGroup {
                    kind: entry.auth.clone(),
                    count: 0,
                    percentage: 0.0,
                    examples: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[index];
        group.count += 1;
        if group.examples.len() < AUTH_EXAMPLE_LIMIT {
            group.examples.push(entry.name.clone());
        }
    }

    for group in &mut groups {
        group.percentage = percentage(group.count, total);
    }
    groups.sort_by(|a, b| b.count.cmp(&a.count));
    groups
}

fn bump<K: Clone>(counts: &mut Vec<(K, usize)>, key: &K, same: impl Fn(&K, &K) -> bool) {
    match counts.iter_mut().find(|(k, _)| same(k, key)) {
        Some((_, n)) => *n += 1,
        None => counts.push((key.clone(), 1)),
    }
}

fn into_shares<K>(mut counts: Vec<(K, usize)>, total: usize) -> Vec<Share<K>> {
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .map(|(key, count)| Share {
            key,
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
