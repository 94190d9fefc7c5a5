//! Social data provider: raw post, profile and search records per platform.
//!
//! The provider's HTTP surface is one resource per platform and query kind:
//!
//! | Query | Request |
//! |-------|---------|
//! | posts | `GET {base}/{platform}/posts?handle=..&limit=..` |
//! | profile | `GET {base}/{platform}/profile?handle=..` |
//! | search | `GET {base}/{platform}/search?q=..&limit=..` |
//!
//! Every response is an envelope `{"items": [...]}` whose records follow the
//! platform's own field naming. Normalization into typed posts happens in
//! `brandscope_metrics::normalize`.

use std::future::Future;
use std::time::Duration;

use brandscope_core::{AppConfig, Platform, ProfileCounts, RawPost};
use brandscope_metrics::{normalize_posts, normalize_profile};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::cache::ProfileCache;
use crate::error::SourceError;
use crate::retry::{check_status, retry_with_backoff, RetryPolicy};

/// What to ask the provider for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchQuery<'a> {
    Posts { handle: &'a str, limit: usize },
    Profile { handle: &'a str },
    Search { query: &'a str, limit: usize },
}

impl FetchQuery<'_> {
    fn resource(&self) -> &'static str {
        match self {
            FetchQuery::Posts { .. } => "posts",
            FetchQuery::Profile { .. } => "profile",
            FetchQuery::Search { .. } => "search",
        }
    }
}

/// A source of raw, platform-shaped records.
pub trait SocialDataProvider: Send + Sync {
    /// Fetch the raw records matching `query` on `platform`.
    fn fetch(
        &self,
        platform: Platform,
        query: FetchQuery<'_>,
    ) -> impl Future<Output = Result<Vec<Value>, SourceError>> + Send;
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    items: Vec<Value>,
}

/// HTTP client for the provider API.
pub struct HttpSocialProvider {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl HttpSocialProvider {
    /// # Errors
    ///
    /// See [`Self::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        Self::with_base_url(
            &config.provider_url,
            config.provider_api_key.as_deref(),
            config.request_timeout_secs,
            &config.user_agent,
            RetryPolicy::new(config.max_retries, config.retry_backoff_base_secs),
        )
    }

    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`SourceError::InvalidUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        api_key: Option<&str>,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| SourceError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.map(str::to_owned),
            retry,
        })
    }

    fn build_url(&self, platform: Platform, query: &FetchQuery<'_>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(platform.as_str()).push(query.resource());
        }
        {
            let mut pairs = url.query_pairs_mut();
            match query {
                FetchQuery::Posts { handle, limit } => {
                    pairs.append_pair("handle", handle);
                    pairs.append_pair("limit", &limit.to_string());
                }
                FetchQuery::Profile { handle } => {
                    pairs.append_pair("handle", handle);
                }
                FetchQuery::Search { query, limit } => {
                    pairs.append_pair("q", query);
                    pairs.append_pair("limit", &limit.to_string());
                }
            }
        }
        url
    }
}

impl SocialDataProvider for HttpSocialProvider {
    async fn fetch(
        &self,
        platform: Platform,
        query: FetchQuery<'_>,
    ) -> Result<Vec<Value>, SourceError> {
        let url = self.build_url(platform, &query);
        retry_with_backoff(self.retry, || {
            let url = url.clone();
            async move {
                let mut request = self.client.get(url.clone());
                if let Some(key) = &self.api_key {
                    request = request.bearer_auth(key);
                }
                let response = check_status(request.send().await?, "provider")?;
                let body = response.text().await?;
                let envelope: Envelope =
                    serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
                        context: format!("{platform} {}", query.resource()),
                        source: e,
                    })?;
                Ok(envelope.items)
            }
        })
        .await
    }
}

/// Fetch and normalize a brand's recent posts on `platform`.
///
/// # Errors
///
/// Propagates any [`SourceError`] from the provider.
pub async fn fetch_posts<P: SocialDataProvider>(
    provider: &P,
    platform: Platform,
    handle: &str,
    limit: usize,
) -> Result<Vec<RawPost>, SourceError> {
    let records = provider
        .fetch(platform, FetchQuery::Posts { handle, limit })
        .await?;
    let posts = normalize_posts(platform, &records);
    tracing::debug!(
        %platform,
        handle,
        records = records.len(),
        posts = posts.len(),
        "fetched posts"
    );
    Ok(posts)
}

/// Look up account counters, consulting `cache` before the provider and
/// caching every successful lookup.
///
/// # Errors
///
/// Propagates any [`SourceError`] from the provider.
pub async fn fetch_profile<P: SocialDataProvider>(
    provider: &P,
    cache: &ProfileCache,
    platform: Platform,
    handle: &str,
) -> Result<ProfileCounts, SourceError> {
    if let Some(hit) = cache.get(platform, handle).await {
        tracing::debug!(%platform, handle, "profile cache hit");
        return Ok(hit);
    }
    let records = provider
        .fetch(platform, FetchQuery::Profile { handle })
        .await?;
    let counts = records.first().map(normalize_profile).unwrap_or_default();
    cache.insert(platform, handle, counts).await;
    Ok(counts)
}

/// Search `platform` for posts matching `query`, normalized.
///
/// # Errors
///
/// Propagates any [`SourceError`] from the provider.
pub async fn search_posts<P: SocialDataProvider>(
    provider: &P,
    platform: Platform,
    query: &str,
    limit: usize,
) -> Result<Vec<RawPost>, SourceError> {
    let records = provider
        .fetch(platform, FetchQuery::Search { query, limit })
        .await?;
    Ok(normalize_posts(platform, &records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base: &str) -> HttpSocialProvider {
        HttpSocialProvider::with_base_url(base, None, 5, "test-agent", RetryPolicy::none())
            .expect("client construction should not fail")
    }

    #[test]
    fn builds_platform_resource_urls() {
        let p = provider("https://data.example.com/v1/");
        let url = p.build_url(
            Platform::TikTok,
            &FetchQuery::Posts {
                handle: "kopikenangan",
                limit: 50,
            },
        );
        assert_eq!(
            url.as_str(),
            "https://data.example.com/v1/tiktok/posts?handle=kopikenangan&limit=50"
        );
    }

    #[test]
    fn search_query_is_encoded() {
        let p = provider("https://data.example.com");
        let url = p.build_url(
            Platform::Twitter,
            &FetchQuery::Search {
                query: "kopi & susu",
                limit: 30,
            },
        );
        assert!(
            url.as_str().contains("q=kopi+%26+susu"),
            "query should be encoded: {url}"
        );
        assert!(url.path().ends_with("/twitter/search"));
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let result =
            HttpSocialProvider::with_base_url("not a url", None, 5, "ua", RetryPolicy::none());
        assert!(matches!(result, Err(SourceError::InvalidUrl { .. })));
    }
}
