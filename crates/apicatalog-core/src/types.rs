use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Authentication scheme an API expects from its callers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuthKind {
    None,
    ApiKey,
    OAuth,
    /// Marketplace proxy key (`X-Mashape-Key`)
    ProxyKey,
    UserAgent,
    /// Label the catalog carries that none of the known kinds cover
    Other(String),
}

impl AuthKind {
    /// Parse a source label or user-supplied alias, ignoring case
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" | "no" | "none" => Self::None,
            "apikey" | "api_key" | "api-key" => Self::ApiKey,
            "oauth" => Self::OAuth,
            "x-mashape-key" | "proxykey" | "proxy_key" | "proxy-key" => Self::ProxyKey,
            "user-agent" | "useragent" | "user_agent" => Self::UserAgent,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    /// Canonical label as used by the remote catalog
    pub fn label(&self) -> &str {
        match self {
            Self::None => "No",
            Self::ApiKey => "apiKey",
            Self::OAuth => "OAuth",
            Self::ProxyKey => "X-Mashape-Key",
            Self::UserAgent => "User-Agent",
            Self::Other(label) => label,
        }
    }

    pub fn requires_credentials(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Case-insensitive equality, also for unrecognised labels
    pub fn matches(&self, other: &AuthKind) -> bool {
        match (self, other) {
            (Self::Other(a), Self::Other(b)) => a.eq_ignore_ascii_case(b),
            _ => self == other,
        }
    }
}

impl From<String> for AuthKind {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<AuthKind> for String {
    fn from(value: AuthKind) -> Self {
        value.label().to_string()
    }
}

impl FromStr for AuthKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Cross-origin support as reported by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CorsStatus {
    Yes,
    No,
    Unknown,
}

impl CorsStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "yes" => Self::Yes,
            "no" => Self::No,
            _ => Self::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Unknown => "unknown",
        }
    }
}

impl From<String> for CorsStatus {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<CorsStatus> for String {
    fn from(value: CorsStatus) -> Self {
        value.label().to_string()
    }
}

impl fmt::Display for CorsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One third-party API described by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "API")]
    pub name: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Auth", default = "default_auth")]
    pub auth: AuthKind,
    #[serde(rename = "HTTPS", default)]
    pub https: bool,
    #[serde(rename = "Cors", default = "default_cors")]
    pub cors: CorsStatus,
    #[serde(rename = "Link", default)]
    pub link: String,
    #[serde(rename = "Category", default)]
    pub category: String,
}

fn default_auth() -> AuthKind {
    AuthKind::None
}

fn default_cors() -> CorsStatus {
    CorsStatus::Unknown
}

impl CatalogEntry {
    /// Lowercased `name description category`, the text relevance scoring runs against
    pub fn search_text(&self) -> String {
        format!("{} {} {}", self.name, self.description, self.category).to_lowercase()
    }
}

/// A named group of entries with the count the source declares for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub count: usize,
    pub entries: Vec<CatalogEntry>,
}

#[derive(Serialize, Deserialize)]
struct CategoryBody {
    count: usize,
    entries: Vec<CatalogEntry>,
}

/// All known entries grouped by category, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    categories: Vec<Category>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category; a repeated name replaces the earlier one in place
    pub fn insert(&mut self, name: impl Into<String>, count: usize, entries: Vec<CatalogEntry>) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&position) => {
                self.categories[position] = Category {
                    name,
                    count,
                    entries,
                };
            }
            None => {
                self.index.insert(name.clone(), self.categories.len());
                self.categories.push(Category {
                    name,
                    count,
                    entries,
                });
            }
        }
    }

    /// Build a well-formed catalog where every count equals its entry list length
    pub fn from_entries<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<CatalogEntry>)>,
        S: Into<String>,
    {
        let mut catalog = Self::new();
        for (name, entries) in groups {
            let count = entries.len();
            catalog.insert(name, count, entries);
        }
        catalog
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Exact, case-sensitive category lookup
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.index.get(name).map(|&i| &self.categories[i])
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Every entry in scan order: categories in document order, entries in list order
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.categories.iter().flat_map(|c| c.entries.iter())
    }

    /// Number of entries actually present
    pub fn entry_count(&self) -> usize {
        self.categories.iter().map(|c| c.entries.len()).sum()
    }

    /// Sum of the counts the source declares
    pub fn declared_total(&self) -> usize {
        self.categories.iter().map(|c| c.count).sum()
    }

    /// Categories whose declared count disagrees with their entry list
    pub fn count_mismatches(&self) -> Vec<(&str, usize, usize)> {
        self.categories
            .iter()
            .filter(|c| c.count != c.entries.len())
            .map(|c| (c.name.as_str(), c.count, c.entries.len()))
            .collect()
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for category in &self.categories {
            map.serialize_entry(
                &category.name,
                &CategoryBodyRef {
                    count: category.count,
                    entries: &category.entries,
                },
            )?;
        }
        map.end()
    }
}

#[derive(Serialize)]
struct CategoryBodyRef<'a> {
    count: usize,
    entries: &'a [CatalogEntry],
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = Catalog;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping category names to {count, entries}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Catalog, A::Error> {
                let mut catalog = Catalog::new();
                while let Some((name, body)) = access.next_entry::<String, CategoryBody>()? {
                    catalog.insert(name, body.count, body.entries);
                }
                Ok(catalog)
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_kind_parsing() {
        assert_eq!(AuthKind::parse("No"), AuthKind::None);
        assert_eq!(AuthKind::parse(""), AuthKind::None);
        assert_eq!(AuthKind::parse("APIKEY"), AuthKind::ApiKey);
        assert_eq!(AuthKind::parse("oauth"), AuthKind::OAuth);
        assert_eq!(AuthKind::parse("X-Mashape-Key"), AuthKind::ProxyKey);
        assert_eq!(AuthKind::parse("proxyKey"), AuthKind::ProxyKey);
        assert_eq!(AuthKind::parse("user-agent"), AuthKind::UserAgent);
        assert_eq!(
            AuthKind::parse("Token"),
            AuthKind::Other("Token".to_string())
        );
        assert!(AuthKind::parse("token").matches(&AuthKind::parse("TOKEN")));
        assert_eq!(AuthKind::OAuth.to_string(), "OAuth");
    }

    #[test]
    fn test_cors_parsing() {
        assert_eq!(CorsStatus::parse("YES"), CorsStatus::Yes);
        assert_eq!(CorsStatus::parse("no"), CorsStatus::No);
        assert_eq!(CorsStatus::parse("Unknown"), CorsStatus::Unknown);
        assert_eq!(CorsStatus::parse("maybe"), CorsStatus::Unknown);
    }

    #[test]
    fn test_catalog_preserves_document_order() {
        let json = r#"{
            "Weather": {"count": 1, "entries": [{"API": "WeatherAPI", "Description": "current weather data", "Auth": "apiKey", "HTTPS": true, "Cors": "yes", "Link": "api.weather.com", "Category": "Weather"}]},
            "Animals": {"count": 0, "entries": []},
            "Books": {"count": 0, "entries": []}
        }"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        let names: Vec<_> = catalog.categories().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Weather", "Animals", "Books"]);

        let entry = &catalog.category("Weather").unwrap().entries[0];
        assert_eq!(entry.auth, AuthKind::ApiKey);
        assert_eq!(entry.cors, CorsStatus::Yes);
        assert!(entry.https);
        assert!(catalog.category("weather").is_none());
    }

    #[test]
    fn test_count_mismatch_is_tolerated_and_reported() {
        let json = r#"{"Books": {"count": 3, "entries": [{"API": "Open Library", "Description": "books", "Auth": "", "HTTPS": true, "Cors": "no", "Link": "openlibrary.org", "Category": "Books"}]}}"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.declared_total(), 3);
        assert_eq!(catalog.entry_count(), 1);
        assert_eq!(catalog.count_mismatches(), vec![("Books", 3, 1)]);
    }

    #[test]
    fn test_catalog_serializes_back_to_source_shape() {
        let entry = CatalogEntry {
            name: "Cat Facts".to_string(),
            description: "Daily cat facts".to_string(),
            auth: AuthKind::None,
            https: true,
            cors: CorsStatus::No,
            link: "https://catfact.ninja".to_string(),
            category: "Animals".to_string(),
        };
        let catalog = Catalog::from_entries(vec![("Animals", vec![entry])]);
        let value = serde_json::to_value(&catalog).unwrap();
        assert_eq!(value["Animals"]["count"], 1);
        assert_eq!(value["Animals"]["entries"][0]["Auth"], "No");
        assert_eq!(value["Animals"]["entries"][0]["Cors"], "no");
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        assert!(serde_json::from_str::<Catalog>("[1, 2, 3]").is_err());
    }
}
