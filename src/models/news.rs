//! News articles and the daily request tracker

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ArticleSource {
    pub name: String,
}

/// One article from the news provider. Cached per (location, days-back)
/// key with a 24-hour expiry.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(rename = "urlToImage", default)]
    pub url_to_image: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: String,
    pub source: ArticleSource,
}

/// Persisted counter enforcing the daily news quota.
///
/// Reset to `{0, now}` whenever more than 24h has elapsed since `timestamp`;
/// incremented on every successful news fetch. The read-modify-write cycle
/// is not atomic across concurrent turns.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct NewsRequestTracker {
    pub count: u32,
    /// Window start, epoch milliseconds
    pub timestamp: i64,
}

impl NewsRequestTracker {
    /// Fresh window starting now
    #[must_use]
    pub fn started_at(now_ms: i64) -> Self {
        Self {
            count: 0,
            timestamp: now_ms,
        }
    }

    /// Whether the 24h window has rolled over
    #[must_use]
    pub fn expired(&self, now_ms: i64) -> bool {
        now_ms - self.timestamp >= 24 * 60 * 60 * 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_window_rollover() {
        let tracker = NewsRequestTracker {
            count: 7,
            timestamp: 1_000,
        };
        let one_day = 24 * 60 * 60 * 1000;
        assert!(!tracker.expired(1_000 + one_day - 1));
        assert!(tracker.expired(1_000 + one_day));
    }

    #[test]
    fn test_article_field_names_match_provider() {
        let json = r#"{
            "title": "Storm warning",
            "description": "Heavy rain expected",
            "url": "https://example.com/a",
            "urlToImage": "https://example.com/a.jpg",
            "publishedAt": "2025-05-01T08:00:00Z",
            "source": {"name": "Example Times"}
        }"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.source.name, "Example Times");
        assert_eq!(article.url_to_image.as_deref(), Some("https://example.com/a.jpg"));
    }
}
