//! News provider client, per-location cache, and the daily quota
//!
//! Articles are cached per `(location, days_back)` key for 24 hours; only
//! non-empty, "ok"-status responses are cached. The quota tracker is a
//! persisted read-modify-write counter over a rolling 24h window; two
//! near-simultaneous turns can under- or over-count it, same as the
//! original storage-backed counter.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{FetchError, FetchResult};
use crate::config::{NewsConfig, ProvidersConfig};
use crate::models::{Article, NewsRequestTracker};
use crate::store::Cache;

const NEWS_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const QUOTA_KEY: &str = "news_requests";
// The tracker manages its own 24h window; the store slot just has to outlive it.
const QUOTA_SLOT_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Raw article lookup against the news provider.
#[async_trait]
pub trait NewsApi: Send + Sync {
    /// Recent articles mentioning `location`, newest first.
    /// `Ok(None)` means the provider answered without usable articles.
    async fn top_articles(
        &self,
        location: &str,
        page_size: u32,
        days_back: u32,
    ) -> FetchResult<Option<Vec<Article>>>;
}

#[derive(Debug, Deserialize)]
struct NewsEnvelope {
    status: String,
    #[serde(default)]
    articles: Vec<Article>,
}

pub struct NewsApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsApiClient {
    #[must_use]
    pub fn new(client: reqwest::Client, config: &ProvidersConfig) -> Self {
        Self {
            client,
            base_url: config.news_base_url.clone(),
            api_key: config.news_api_key.clone(),
        }
    }
}

#[async_trait]
impl NewsApi for NewsApiClient {
    #[instrument(skip(self))]
    async fn top_articles(
        &self,
        location: &str,
        page_size: u32,
        days_back: u32,
    ) -> FetchResult<Option<Vec<Article>>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(FetchError::MissingApiKey { provider: "news" })?;

        let from = (Utc::now() - ChronoDuration::days(i64::from(days_back)))
            .format("%Y-%m-%d")
            .to_string();
        let url = format!(
            "{}/everything?q={}&from={from}&sortBy=publishedAt&pageSize={page_size}&language=en&apiKey={api_key}",
            self.base_url,
            urlencoding::encode(location),
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }

        let envelope: NewsEnvelope = response.json().await?;
        if envelope.status != "ok" {
            return Err(FetchError::provider(format!(
                "news status was {}",
                envelope.status
            )));
        }
        if envelope.articles.is_empty() {
            return Ok(None);
        }
        Ok(Some(envelope.articles))
    }
}

/// Persisted daily request counter.
#[derive(Clone)]
pub struct NewsQuota {
    cache: Cache,
    daily_limit: u32,
}

impl NewsQuota {
    #[must_use]
    pub fn new(cache: Cache, daily_limit: u32) -> Self {
        Self { cache, daily_limit }
    }

    #[must_use]
    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    async fn load(&self, now_ms: i64) -> NewsRequestTracker {
        match self.cache.get::<NewsRequestTracker>(QUOTA_KEY).await {
            Ok(Some(tracker)) => tracker,
            Ok(None) => NewsRequestTracker::started_at(now_ms),
            Err(e) => {
                warn!("Failed to read news quota tracker: {e}");
                NewsRequestTracker::started_at(now_ms)
            }
        }
    }

    async fn save(&self, tracker: NewsRequestTracker) {
        if let Err(e) = self.cache.put(QUOTA_KEY, tracker, QUOTA_SLOT_TTL).await {
            warn!("Failed to persist news quota tracker: {e}");
        }
    }

    /// Whether another request fits in the current 24h window. Resets and
    /// persists the window when it has rolled over.
    pub async fn check(&self) -> bool {
        let now_ms = Utc::now().timestamp_millis();
        let mut tracker = self.load(now_ms).await;
        if tracker.expired(now_ms) {
            tracker = NewsRequestTracker::started_at(now_ms);
            self.save(tracker).await;
        }
        tracker.count < self.daily_limit
    }

    /// Record one successful news fetch.
    pub async fn increment(&self) {
        let now_ms = Utc::now().timestamp_millis();
        let mut tracker = self.load(now_ms).await;
        if tracker.expired(now_ms) {
            tracker = NewsRequestTracker::started_at(now_ms);
        }
        tracker.count += 1;
        tracker.timestamp = now_ms;
        self.save(tracker).await;
    }

    /// Current counter value, window rollover applied.
    pub async fn current_count(&self) -> u32 {
        let now_ms = Utc::now().timestamp_millis();
        let tracker = self.load(now_ms).await;
        if tracker.expired(now_ms) {
            0
        } else {
            tracker.count
        }
    }
}

/// Cache-fronted article lookup.
#[derive(Clone)]
pub struct NewsService {
    api: Arc<dyn NewsApi>,
    cache: Cache,
    page_size: u32,
}

fn cache_key(location: &str, days_back: u32) -> String {
    let slug = location.to_lowercase().split_whitespace().collect::<Vec<_>>().join("_");
    format!("news_{slug}_{days_back}")
}

impl NewsService {
    #[must_use]
    pub fn new(api: Arc<dyn NewsApi>, cache: Cache, config: &NewsConfig) -> Self {
        Self {
            api,
            cache,
            page_size: config.page_size,
        }
    }

    /// Articles for a place, from cache when fresh. Returns `None` on any
    /// provider failure or empty answer; failures never propagate.
    pub async fn location_news(&self, location: &str, days_back: u32) -> Option<Vec<Article>> {
        let key = cache_key(location, days_back);

        match self.cache.get::<Vec<Article>>(&key).await {
            Ok(Some(articles)) => {
                debug!("Using cached news for {location} ({days_back} days)");
                return Some(articles);
            }
            Ok(None) => {}
            Err(e) => warn!("News cache read failed for {key}: {e}"),
        }

        match self.api.top_articles(location, self.page_size, days_back).await {
            Ok(Some(articles)) => {
                if let Err(e) = self.cache.put(&key, articles.clone(), NEWS_CACHE_TTL).await {
                    warn!("News cache write failed for {key}: {e}");
                }
                Some(articles)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("News fetch failed for {location}: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleSource;
    use crate::store::MemoryStore;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn memory_cache() -> Cache {
        Cache::new(Arc::new(MemoryStore::new()))
    }

    fn article(title: &str) -> Article {
        Article {
            title: title.to_string(),
            description: Some("desc".to_string()),
            url: "https://example.com".to_string(),
            url_to_image: None,
            published_at: "2025-05-01T08:00:00Z".to_string(),
            source: ArticleSource {
                name: "Example Times".to_string(),
            },
        }
    }

    struct CountingNewsApi {
        calls: AtomicU32,
        articles: Option<Vec<Article>>,
    }

    #[async_trait]
    impl NewsApi for CountingNewsApi {
        async fn top_articles(
            &self,
            _location: &str,
            _page_size: u32,
            _days_back: u32,
        ) -> FetchResult<Option<Vec<Article>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.articles.clone())
        }
    }

    #[test]
    fn test_cache_key_slugs_location() {
        assert_eq!(cache_key("New York City", 7), "news_new_york_city_7");
        assert_eq!(cache_key("Paris", 30), "news_paris_30");
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_provider_call() {
        let api = Arc::new(CountingNewsApi {
            calls: AtomicU32::new(0),
            articles: Some(vec![article("first")]),
        });
        let service = NewsService::new(api.clone(), memory_cache(), &NewsConfig::default());

        let first = service.location_news("Paris", 7).await.unwrap();
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);

        let second = service.location_news("Paris", 7).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(api.calls.load(Ordering::SeqCst), 1, "cache hit must not refetch");
    }

    #[tokio::test]
    async fn test_expired_cache_refetches() {
        let api = Arc::new(CountingNewsApi {
            calls: AtomicU32::new(0),
            articles: Some(vec![article("first")]),
        });
        let cache = memory_cache();
        let service = NewsService::new(api.clone(), cache.clone(), &NewsConfig::default());

        // Simulate a stale entry by writing with a zero TTL.
        cache
            .put(&cache_key("Paris", 7), vec![article("stale")], Duration::ZERO)
            .await
            .unwrap();

        let articles = service.location_news("Paris", 7).await.unwrap();
        assert_eq!(articles[0].title, "first");
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_answer_is_none_and_not_cached() {
        let api = Arc::new(CountingNewsApi {
            calls: AtomicU32::new(0),
            articles: None,
        });
        let cache = memory_cache();
        let service = NewsService::new(api.clone(), cache.clone(), &NewsConfig::default());

        assert!(service.location_news("Nowhere", 7).await.is_none());
        let cached: Option<Vec<Article>> = cache.get(&cache_key("Nowhere", 7)).await.unwrap();
        assert!(cached.is_none());
    }

    #[tokio::test]
    async fn test_quota_counts_within_window() {
        let quota = NewsQuota::new(memory_cache(), 2);
        assert!(quota.check().await);
        quota.increment().await;
        assert!(quota.check().await);
        quota.increment().await;
        assert!(!quota.check().await);
        assert_eq!(quota.current_count().await, 2);
    }

    #[tokio::test]
    async fn test_quota_resets_after_window_rollover() {
        let cache = memory_cache();
        let quota = NewsQuota::new(cache.clone(), 2);

        let one_day_ms = 24 * 60 * 60 * 1000;
        let stale = NewsRequestTracker {
            count: 2,
            timestamp: Utc::now().timestamp_millis() - one_day_ms - 1,
        };
        cache.put(QUOTA_KEY, stale, QUOTA_SLOT_TTL).await.unwrap();

        assert!(quota.check().await, "rolled-over window must reset the count");
        assert_eq!(quota.current_count().await, 0);
    }
}
