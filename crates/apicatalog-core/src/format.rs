//! Human-readable rendering of catalog results.

use crate::query::CategoryMatch;
use crate::scoring::Ranking;
use crate::stats::{AuthGroup, CatalogStatistics};
use crate::types::{AuthKind, CatalogEntry};

/// How to supply credentials for an auth kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGuide {
    pub setup: &'static str,
    /// Header name and placeholder value, if one is needed
    pub header: Option<(&'static str, &'static str)>,
}

impl AuthGuide {
    pub fn for_kind(kind: &AuthKind) -> Self {
        match kind {
            AuthKind::ApiKey => Self {
                setup: "Requires an API key. Register an account and create a key in the provider's developer console.",
                header: Some(("X-API-Key", "YOUR_API_KEY")),
            },
            AuthKind::OAuth => Self {
                setup: "Requires OAuth. Follow the provider's OAuth flow to obtain an access token.",
                header: Some(("Authorization", "Bearer YOUR_ACCESS_TOKEN")),
            },
            AuthKind::ProxyKey => Self {
                setup: "Requires a Mashape/RapidAPI key. Register on RapidAPI and subscribe to this API.",
                header: Some(("X-Mashape-Key", "YOUR_MASHAPE_KEY")),
            },
            AuthKind::UserAgent => Self {
                setup: "Requires a User-Agent header identifying your application.",
                header: Some(("User-Agent", "YOUR_APP_NAME")),
            },
            AuthKind::None | AuthKind::Other(_) => Self {
                setup: "No authentication required. The API can be called directly.",
                header: None,
            },
        }
    }

    pub fn curl(&self) -> String {
        match self.header {
            Some((name, value)) => format!(
                "curl -H \"{}: {}\" https://api-endpoint.com/resource",
                name, value
            ),
            None => "curl https://api-endpoint.com/resource".to_string(),
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

pub fn format_entry(entry: &CatalogEntry) -> String {
    format!(
        "📌 {}\n📝 Description: {}\n🔑 Auth: {}\n🔒 HTTPS: {}\n🌐 CORS: {}\n🔗 Link: {}\n📂 Category: {}",
        entry.name,
        entry.description,
        entry.auth,
        yes_no(entry.https),
        entry.cors,
        entry.link,
        entry.category
    )
}

pub fn format_entries<'a>(entries: impl IntoIterator<Item = &'a CatalogEntry>) -> String {
    entries
        .into_iter()
        .map(format_entry)
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn format_details(entry: &CatalogEntry) -> String {
    let mut details = format!(
        "# {}\n\n\
         ## Overview\n\n\
         - **Description**: {}\n\
         - **Category**: {}\n\
         - **Link**: {}\n\n\
         ## Technical details\n\n\
         - **Authentication**: {}\n\
         - **HTTPS**: {}\n\
         - **CORS**: {}\n\n",
        entry.name,
        entry.description,
        entry.category,
        entry.link,
        entry.auth,
        yes_no(entry.https),
        entry.cors
    );

    if entry.auth.requires_credentials() {
        let guide = AuthGuide::for_kind(&entry.auth);
        details.push_str(&format!(
            "## Authentication setup\n\n{}\n\n## Example request\n\n```bash\n{}\n```\n\n",
            guide.setup,
            guide.curl()
        ));
    }

    details
}

pub fn format_category_match(query: &str, limit: usize, found: &CategoryMatch<'_>) -> String {
    match found {
        CategoryMatch::Exact { category, entries } => format!(
            "APIs in category {} (showing first {}, {} in total):\n\n{}",
            category.name,
            limit,
            category.count,
            format_entries(entries.iter())
        ),
        CategoryMatch::Fuzzy { category, entries } => format!(
            "Found category \"{}\" with {} APIs:\n\n{}",
            category.name,
            category.count,
            format_entries(entries.iter())
        ),
        CategoryMatch::Missing { available } => format!(
            "Category \"{}\" not found. Available categories: {}",
            query,
            available.join(", ")
        ),
    }
}

pub fn format_category_list(categories: &[(&str, usize)]) -> String {
    if categories.is_empty() {
        return "No API categories are available yet; the catalog may still be loading."
            .to_string();
    }
    let lines: Vec<String> = categories
        .iter()
        .map(|(name, count)| format!("{} ({} APIs)", name, count))
        .collect();
    format!(
        "Available API categories ({} total):\n\n{}",
        categories.len(),
        lines.join("\n")
    )
}

pub fn format_ranking(heading: &str, ranking: &Ranking<'_>) -> String {
    let items: Vec<String> = ranking
        .matches
        .iter()
        .enumerate()
        .map(|(i, m)| {
            format!(
                "### {}. {}\n**Relevance**: {}\n**Description**: {}\n**Auth**: {}\n**Link**: {}\n",
                i + 1,
                m.entry.name,
                m.score,
                m.entry.description,
                m.entry.auth,
                m.entry.link
            )
        })
        .collect();
    format!("{}\n\n{}", heading, items.join("\n"))
}

pub fn format_statistics(stats: Option<&CatalogStatistics>) -> String {
    let Some(stats) = stats else {
        return "No API data available for statistics yet. Try syncing the catalog first."
            .to_string();
    };

    let auth = stats
        .auth_kinds
        .iter()
        .map(|s| format!("{}: {} ({:.1}%)", s.key, s.count, s.percentage))
        .collect::<Vec<_>>()
        .join("\n");
    let cors = stats
        .cors
        .iter()
        .map(|s| format!("{}: {} ({:.1}%)", s.key, s.count, s.percentage))
        .collect::<Vec<_>>()
        .join("\n");

    let mut text = format!(
        "API statistics:\n\n\
         Total categories: {}\n\
         Total APIs: {}\n",
        stats.total_categories, stats.total_entries
    );
    if stats.declared_total != stats.total_entries {
        text.push_str(&format!(
            "Declared by source: {}\n",
            stats.declared_total
        ));
    }
    text.push_str(&format!(
        "\nAuthentication:\n{}\n\nHTTPS support: {} ({:.1}%)\n\nCORS support:\n{}",
        auth, stats.https.count, stats.https.percentage, cors
    ));
    text
}

pub fn format_auth_analysis(groups: &[AuthGroup]) -> String {
    if groups.is_empty() {
        return "No API data available for authentication analysis yet.".to_string();
    }
    let mut text = String::from("API authentication requirements:\n\n");
    for group in groups {
        text.push_str(&format!(
            "{}: {} APIs ({:.1}%)\nExamples: {}\n\n",
            group.kind,
            group.count,
            group.percentage,
            group.examples.join(", ")
        ));
    }
    text
}
