use async_trait::async_trait;
use ratings_core::{ExternalFeed, FeedPage, RatingsError, RatingsResult};
use reqwest::Client;
use std::time::Duration;

const DEFAULT_LIST_PATH: &str = "/production/swechallenge/list";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the rating feed.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub base_url: String,
    pub list_path: String,
    pub token: String,
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("RATINGS_FEED_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            list_path: std::env::var("RATINGS_FEED_PATH")
                .unwrap_or_else(|_| DEFAULT_LIST_PATH.to_string()),
            token: std::env::var("RATINGS_FEED_TOKEN").unwrap_or_default(),
            timeout: Duration::from_secs(
                std::env::var("RATINGS_FEED_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        }
    }
}

impl FeedConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            list_path: DEFAULT_LIST_PATH.to_string(),
            token: token.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_list_path(mut self, path: impl Into<String>) -> Self {
        self.list_path = path.into();
        self
    }

    fn list_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.list_path)
    }
}

/// Bearer-authenticated HTTP client for the paginated rating feed.
#[derive(Clone)]
pub struct FeedClient {
    config: FeedConfig,
    client: Client,
}

impl FeedClient {
    pub fn new(config: FeedConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build feed HTTP client ({}), using defaults without timeout", e);
                Client::new()
            });

        Self { config, client }
    }

    pub fn from_env() -> Self {
        Self::new(FeedConfig::default())
    }
}

#[async_trait]
impl ExternalFeed for FeedClient {
    async fn fetch_page(&self, cursor: Option<&str>) -> RatingsResult<FeedPage> {
        let mut builder = self
            .client
            .get(self.config.list_url())
            .bearer_auth(&self.config.token);

        if let Some(c) = cursor {
            builder = builder.query(&[("next_page", c)]);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RatingsError::ExternalFetch(format!("failed to make request: {}", e)))?;

        if !response.status().is_success() {
            return Err(RatingsError::ExternalFetch(format!(
                "unexpected status code: {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        response
            .json::<FeedPage>()
            .await
            .map_err(|e| RatingsError::ExternalFetch(format!("failed to parse response: {}", e)))
    }
}
