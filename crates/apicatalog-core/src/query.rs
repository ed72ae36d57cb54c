//! Category lookup, keyword search and attribute filters.
//!
//! Filters scan categories in document order and entries in list order and
//! stop as soon as `limit` matches are collected, so results are the first
//! matches encountered rather than the best ones.

use crate::error::{CatalogError, Result};
use crate::types::{AuthKind, Catalog, CatalogEntry, Category, CorsStatus};

/// Outcome of a category lookup
#[derive(Debug)]
pub enum CategoryMatch<'a> {
    /// The query named a category exactly
    Exact {
        category: &'a Category,
        entries: &'a [CatalogEntry],
    },
    /// The first category whose name contains the query, ignoring case
    Fuzzy {
        category: &'a Category,
        entries: &'a [CatalogEntry],
    },
    Missing { available: Vec<&'a str> },
}

pub struct QueryEngine<'a> {
    catalog: &'a Catalog,
}

impl<'a> QueryEngine<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn by_category(&self, name: &str, limit: usize) -> CategoryMatch<'a> {
        if let Some(category) = self.catalog.category(name) {
            return CategoryMatch::Exact {
                category,
                entries: prefix(&category.entries, limit),
            };
        }

        let needle = name.to_lowercase();
        if let Some(category) = self
            .catalog
            .categories()
            .find(|c| c.name.to_lowercase().contains(&needle))
        {
            return CategoryMatch::Fuzzy {
                category,
                entries: prefix(&category.entries, limit),
            };
        }

        CategoryMatch::Missing {
            available: self.catalog.categories().map(|c| c.name.as_str()).collect(),
        }
    }

    /// Entries whose name or description contains `keyword`, ignoring case
    pub fn by_keyword(&self, keyword: &str, limit: usize) -> Vec<&'a CatalogEntry> {
        let needle = keyword.to_lowercase();
        self.first_matching(limit, |entry| {
            entry.name.to_lowercase().contains(&needle)
                || entry.description.to_lowercase().contains(&needle)
        })
    }

    pub fn by_auth(&self, auth: &AuthKind, limit: usize) -> Vec<&'a CatalogEntry> {
        self.first_matching(limit, |entry| entry.auth.matches(auth))
    }

    pub fn by_https(&self, supports_https: bool, limit: usize) -> Vec<&'a CatalogEntry> {
        self.first_matching(limit, |entry| entry.https == supports_https)
    }

    pub fn by_cors(&self, status: CorsStatus, limit: usize) -> Vec<&'a CatalogEntry> {
        self.first_matching(limit, |entry| entry.cors == status)
    }

    /// First entry whose name equals `name`, ignoring case
    pub fn details(&self, name: &str) -> Option<&'a CatalogEntry> {
        let needle = name.trim().to_lowercase();
        self.catalog
            .entries()
            .find(|entry| entry.name.to_lowercase() == needle)
    }

    /// Category names in sorted order with their declared counts
    pub fn category_list(&self) -> Vec<(&'a str, usize)> {
        let mut list: Vec<_> = self
            .catalog
            .categories()
            .map(|c| (c.name.as_str(), c.count))
            .collect();
        list.sort_by(|a, b| a.0.cmp(b.0));
        list
    }

    /// Uniform pick from one category, or from the whole catalog
    pub fn random_entry(
        &self,
        category: Option<&str>,
        rng: &mut fastrand::Rng,
    ) -> Result<&'a CatalogEntry> {
        let pool: Vec<&CatalogEntry> = match category {
            Some(name) => self
                .catalog
                .category(name)
                .ok_or_else(|| CatalogError::not_found(format!("category '{}'", name)))?
                .entries
                .iter()
                .collect(),
            None => self.catalog.entries().collect(),
        };

        if pool.is_empty() {
            return Err(CatalogError::not_found("no APIs available to pick from"));
        }
        Ok(pool[rng.usize(..pool.len())])
    }

    fn first_matching<F>(&self, limit: usize, predicate: F) -> Vec<&'a CatalogEntry>
    where
        F: Fn(&CatalogEntry) -> bool,
    {
        self.catalog
            .entries()
            .filter(|entry| predicate(entry))
            .take(limit)
            .collect()
    }
}

fn prefix(entries: &[CatalogEntry], limit: usize) -> &[CatalogEntry] {
    &entries[..limit.min(entries.len())]
}
