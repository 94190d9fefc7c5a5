//! Concurrent mention and conversation searches.

use std::collections::HashSet;

use brandscope_core::{Platform, RawPost};
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use sha2::{Digest, Sha256};

use crate::provider::{search_posts, SocialDataProvider};

/// Results of a multi-source search. Sources that failed are listed rather
/// than failing the whole search.
#[derive(Debug, Default)]
pub struct MentionSearch {
    pub posts: Vec<RawPost>,
    pub failed_sources: Vec<Platform>,
}

/// Search every mention source for `brand_name` concurrently.
///
/// Each source is awaited independently; one failing source is logged and
/// recorded in `failed_sources` while the others still contribute.
pub async fn search_mentions<P: SocialDataProvider>(
    provider: &P,
    brand_name: &str,
    limit: usize,
) -> MentionSearch {
    let results = join_all(
        Platform::MENTION_SOURCES
            .into_iter()
            .map(|platform| async move {
                (platform, search_posts(provider, platform, brand_name, limit).await)
            }),
    )
    .await;

    let mut search = MentionSearch::default();
    for (platform, result) in results {
        match result {
            Ok(posts) => {
                tracing::debug!(
                    brand = brand_name,
                    source = %platform,
                    count = posts.len(),
                    "collected mentions"
                );
                search.posts.extend(posts);
            }
            Err(e) => {
                tracing::warn!(
                    brand = brand_name,
                    source = %platform,
                    error = %e,
                    "mention search failed"
                );
                search.failed_sources.push(platform);
            }
        }
    }
    search.posts = dedup_conversations(search.posts);
    search
}

/// Fetch every conversation matching any universe keyword on the mention
/// sources, deduplicated.
///
/// At most `max_in_flight` searches run at once. Results are consumed in
/// query order, so deduplication keeps the same first occurrence on every run.
pub async fn fetch_universe_conversations<P: SocialDataProvider>(
    provider: &P,
    keywords: &[String],
    limit: usize,
    max_in_flight: usize,
) -> MentionSearch {
    let queries: Vec<(Platform, &str)> = keywords
        .iter()
        .flat_map(|k| {
            Platform::MENTION_SOURCES
                .into_iter()
                .map(move |p| (p, k.as_str()))
        })
        .collect();

    let results: Vec<_> = stream::iter(queries)
        .map(|(platform, keyword)| async move {
            (
                platform,
                keyword,
                search_posts(provider, platform, keyword, limit).await,
            )
        })
        .buffered(max_in_flight.max(1))
        .collect()
        .await;

    let mut search = MentionSearch::default();
    for (platform, keyword, result) in results {
        match result {
            Ok(posts) => search.posts.extend(posts),
            Err(e) => {
                tracing::warn!(
                    keyword,
                    source = %platform,
                    error = %e,
                    "universe search failed"
                );
                if !search.failed_sources.contains(&platform) {
                    search.failed_sources.push(platform);
                }
            }
        }
    }
    let before = search.posts.len();
    search.posts = dedup_conversations(search.posts);
    tracing::debug!(
        fetched = before,
        unique = search.posts.len(),
        keywords = keywords.len(),
        "universe conversations collected"
    );
    search
}

/// Identity of a conversation: its platform id, else its URL, else a hash of
/// its whitespace-collapsed lowercase text.
#[must_use]
pub fn conversation_key(post: &RawPost) -> String {
    if let Some(id) = post.id.as_deref().filter(|s| !s.is_empty()) {
        return format!("id:{}:{id}", post.platform);
    }
    if let Some(url) = post.url.as_deref().filter(|s| !s.is_empty()) {
        return format!("url:{url}");
    }
    let normalized = post
        .text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    format!("text:{:x}", Sha256::digest(normalized.as_bytes()))
}

/// Drop repeated conversations, keeping the first occurrence.
#[must_use]
pub fn dedup_conversations(posts: Vec<RawPost>) -> Vec<RawPost> {
    let mut seen = HashSet::new();
    posts
        .into_iter()
        .filter(|post| seen.insert(conversation_key(post)))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use brandscope_core::MediaType;

    use super::*;
    use crate::error::SourceError;
    use crate::provider::FetchQuery;

    /// Records how many fetches overlap.
    #[derive(Default)]
    struct CountingProvider {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl SocialDataProvider for CountingProvider {
        async fn fetch(
            &self,
            _platform: Platform,
            _query: FetchQuery<'_>,
        ) -> Result<Vec<serde_json::Value>, SourceError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn universe_searches_respect_the_in_flight_limit() {
        let provider = CountingProvider::default();
        let keywords: Vec<String> = (0..8).map(|i| format!("kopi{i}")).collect();

        let search = fetch_universe_conversations(&provider, &keywords, 30, 3).await;

        assert!(search.posts.is_empty());
        assert_eq!(
            provider.calls.load(Ordering::SeqCst),
            keywords.len() * Platform::MENTION_SOURCES.len()
        );
        assert_eq!(provider.peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_limit_still_makes_progress() {
        let provider = CountingProvider::default();
        let keywords = vec!["kopi".to_string()];

        fetch_universe_conversations(&provider, &keywords, 30, 0).await;

        assert_eq!(provider.peak.load(Ordering::SeqCst), 1);
    }

    fn post(platform: Platform, id: Option<&str>, url: Option<&str>, text: &str) -> RawPost {
        RawPost {
            platform,
            id: id.map(str::to_owned),
            url: url.map(str::to_owned),
            text: text.to_owned(),
            author: None,
            author_followers: None,
            published_at: None,
            likes: 0,
            comments: 0,
            shares: 0,
            media_type: MediaType::Text,
        }
    }

    #[test]
    fn dedup_prefers_id_then_url_then_text() {
        let posts = vec![
            post(Platform::Twitter, Some("1"), None, "a"),
            post(Platform::Twitter, Some("1"), None, "different text"),
            post(Platform::Instagram, Some("1"), None, "same id, other platform"),
            post(Platform::TikTok, None, Some("https://t/v/9"), "x"),
            post(Platform::TikTok, None, Some("https://t/v/9"), "y"),
            post(Platform::Facebook, None, None, "Kopi  Kenangan\nenak"),
            post(Platform::Facebook, None, None, "kopi kenangan enak"),
        ];
        let unique = dedup_conversations(posts);
        assert_eq!(unique.len(), 4);
        assert_eq!(unique[0].text, "a");
        assert_eq!(unique[3].text, "Kopi  Kenangan\nenak");
    }

    #[test]
    fn empty_id_falls_through_to_url() {
        let p = post(Platform::Twitter, Some(""), Some("https://x/1"), "t");
        assert_eq!(conversation_key(&p), "url:https://x/1");
    }
}
