//! Keyword relevance scoring for project recommendations and alternatives.
//!
//! An entry's score is the number of distinct keywords that occur as
//! substrings of its lowercased `name description category` text. Entries
//! scoring zero are dropped; the rest are ranked by descending score with
//! scan order breaking ties.

use crate::types::{Catalog, CatalogEntry};
use serde::Serialize;

/// Project labels and the keywords they expand to. A query matches a label
/// when either one contains the other, ignoring case; every matching row
/// contributes its keywords.
pub const PROJECT_KEYWORDS: &[(&str, &[&str])] = &[
    ("天气应用", &["weather", "forecast", "climate", "temperature"]),
    ("社交媒体", &["social", "media", "twitter", "facebook", "instagram"]),
    ("电商", &["commerce", "product", "shop", "payment", "ecommerce"]),
    ("新闻应用", &["news", "article", "media", "rss"]),
    ("游戏", &["game", "score", "player", "entertainment"]),
    ("教育", &["education", "learning", "school", "course", "academic"]),
    ("健康", &["health", "fitness", "medical", "nutrition"]),
    ("旅行", &["travel", "flight", "hotel", "booking", "destination"]),
    ("金融", &["finance", "banking", "currency", "stock", "payment"]),
    ("音乐", &["music", "audio", "song", "artist", "playlist"]),
    ("视频", &["video", "streaming", "movie", "film", "tv"]),
    ("地图", &["map", "location", "geocoding", "navigation", "place"]),
    ("聊天机器人", &["chat", "bot", "ai", "message", "conversation"]),
    ("数据分析", &["data", "analytics", "statistics", "visualization"]),
    ("开发工具", &["development", "tool", "code", "programming"]),
    ("安全", &["security", "authentication", "encryption", "protection"]),
    ("weather app", &["weather", "forecast", "climate", "temperature"]),
    ("social media", &["social", "media", "twitter", "facebook", "instagram"]),
    ("e-commerce", &["commerce", "product", "shop", "payment", "ecommerce"]),
    ("news app", &["news", "article", "media", "rss"]),
    ("game", &["game", "score", "player", "entertainment"]),
    ("education", &["education", "learning", "school", "course", "academic"]),
    ("health", &["health", "fitness", "medical", "nutrition"]),
    ("travel", &["travel", "flight", "hotel", "booking", "destination"]),
    ("finance", &["finance", "banking", "currency", "stock", "payment"]),
    ("music", &["music", "audio", "song", "artist", "playlist"]),
    ("video", &["video", "streaming", "movie", "film", "tv"]),
    ("maps", &["map", "location", "geocoding", "navigation", "place"]),
    ("chatbot", &["chat", "bot", "ai", "message", "conversation"]),
    ("data analytics", &["data", "analytics", "statistics", "visualization"]),
    ("developer tools", &["development", "tool", "code", "programming"]),
    ("security", &["security", "authentication", "encryption", "protection"]),
];

/// Tokens this short are ignored when looking for alternatives
const MIN_TOKEN_CHARS: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct ScoredEntry<'a> {
    pub entry: &'a CatalogEntry,
    pub score: usize,
}

/// Ranked matches plus the keywords they were scored against
#[derive(Debug, Clone, Serialize)]
pub struct Ranking<'a> {
    pub keywords: Vec<String>,
    pub matches: Vec<ScoredEntry<'a>>,
}

impl Ranking<'_> {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

pub struct RelevanceScorer<'a> {
    catalog: &'a Catalog,
}

impl<'a> RelevanceScorer<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn recommend_for_project(
        &self,
        project_type: &str,
        extra_terms: &[String],
        limit: usize,
    ) -> Ranking<'a> {
        let keywords = resolve_project_keywords(project_type, extra_terms);
        self.rank(keywords, limit)
    }

    pub fn find_alternatives(&self, functionality: &str, limit: usize) -> Ranking<'a> {
        self.rank(tokenize_functionality(functionality), limit)
    }

    /// Score every entry against `keywords` and keep the top `limit`
    pub fn rank(&self, keywords: Vec<String>, limit: usize) -> Ranking<'a> {
        let mut matches: Vec<ScoredEntry<'a>> = Vec::new();

        if !keywords.is_empty() {
            for entry in self.catalog.entries() {
                let text = entry.search_text();
                let score = keywords.iter().filter(|k| text.contains(k.as_str())).count();
                if score > 0 {
                    matches.push(ScoredEntry { entry, score });
                }
            }
        }

        // stable: equal scores keep scan order
        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches.truncate(limit);

        Ranking { keywords, matches }
    }
}

/// Keywords for a project label: every matching table row, then the
/// caller's extra terms; the label itself when both are empty.
pub fn resolve_project_keywords(project_type: &str, extra_terms: &[String]) -> Vec<String> {
    let query = project_type.trim().to_lowercase();
    let mut keywords: Vec<String> = Vec::new();

    if !query.is_empty() {
        for (label, words) in PROJECT_KEYWORDS {
            let label = label.to_lowercase();
            if label.contains(&query) || query.contains(&label) {
                for word in *words {
                    push_unique(&mut keywords, word.to_string());
                }
            }
        }
    }

    for term in extra_terms {
        let term = term.trim().to_lowercase();
        if !term.is_empty() {
            push_unique(&mut keywords, term);
        }
    }

    if keywords.is_empty() && !query.is_empty() {
        keywords.push(query);
    }
    keywords
}

/// Distinct whitespace-separated tokens longer than two characters
pub fn tokenize_functionality(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for token in text.to_lowercase().split_whitespace() {
        if token.chars().count() >= MIN_TOKEN_CHARS {
            push_unique(&mut tokens, token.to_string());
        }
    }
    tokens
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuthKind, CorsStatus};

    fn entry(name: &str, description: &str, category: &str) -> CatalogEntry {
        CatalogEntry {
            name: name.to_string(),
            description: description.to_string(),
            auth: AuthKind::None,
            https: true,
            cors: CorsStatus::Unknown,
            link: String::new(),
            category: category.to_string(),
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_entries(vec![
            (
                "Weather",
                vec![
                    entry("WeatherAPI", "current weather data", "Weather"),
                    entry("OpenMeteo", "weather forecast with temperature", "Weather"),
                ],
            ),
            (
                "Music",
                vec![entry("Lyrics", "song lyrics by artist", "Music")],
            ),
        ])
    }

    #[test]
    fn test_chinese_label_resolves_weather_keywords() {
        let keywords = resolve_project_keywords("天气应用", &[]);
        assert_eq!(keywords, vec!["weather", "forecast", "climate", "temperature"]);
    }

    #[test]
    fn test_bidirectional_label_matching() {
        // query contained in label
        assert!(resolve_project_keywords("weather", &[]).contains(&"forecast".to_string()));
        // label contained in query
        assert!(resolve_project_keywords("a small music player", &[]).contains(&"playlist".to_string()));
    }

    #[test]
    fn test_shared_keywords_are_counted_once() {
        let keywords = resolve_project_keywords("finance", &["PAYMENT".to_string()]);
        assert_eq!(keywords.iter().filter(|k| *k == "payment").count(), 1);
    }

    #[test]
    fn test_unmatched_label_falls_back_to_itself() {
        assert_eq!(resolve_project_keywords("Lyrics Site", &[]), vec!["lyrics site"]);
        assert_eq!(
            resolve_project_keywords("Lyrics Site", &["lyrics".to_string()]),
            vec!["lyrics"]
        );
        assert!(resolve_project_keywords("   ", &[]).is_empty());
    }

    #[test]
    fn test_ranking_orders_by_score_then_scan_order() {
        let catalog = catalog();
        let scorer = RelevanceScorer::new(&catalog);
        let ranking = scorer.recommend_for_project("weather app", &[], 5);
        let names: Vec<_> = ranking.matches.iter().map(|m| m.entry.name.as_str()).collect();
        assert_eq!(names, vec!["OpenMeteo", "WeatherAPI"]);
        assert_eq!(ranking.matches[0].score, 3);
        assert!(ranking.matches.iter().all(|m| m.score > 0));

        let ranking = scorer.recommend_for_project("weather", &[], 1);
        assert_eq!(ranking.matches.len(), 1);
    }

    #[test]
    fn test_alternatives_ignore_short_tokens() {
        assert_eq!(
            tokenize_functionality("an API to get song lyrics lyrics"),
            vec!["api", "get", "song", "lyrics"]
        );

        let catalog = catalog();
        let scorer = RelevanceScorer::new(&catalog);
        let ranking = scorer.find_alternatives("song lyrics", 5);
        assert_eq!(ranking.matches.len(), 1);
        assert_eq!(ranking.matches[0].score, 2);

        assert!(scorer.find_alternatives("to be or", 5).is_empty());
    }
}
