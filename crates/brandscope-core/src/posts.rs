use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// Media kind of a post, reduced to the four buckets the dashboards chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Text,
    Image,
    Video,
    Carousel,
}

impl MediaType {
    /// Classify a provider media hint such as `GraphSidecar`, `reel` or `photo`.
    ///
    /// Absent or unrecognized hints classify as [`MediaType::Text`].
    #[must_use]
    pub fn from_hint(hint: Option<&str>) -> Self {
        let Some(hint) = hint else {
            return MediaType::Text;
        };
        let hint = hint.to_ascii_lowercase();
        if ["sidecar", "carousel", "album"].iter().any(|k| hint.contains(k)) {
            MediaType::Carousel
        } else if ["video", "reel", "clip", "short"].iter().any(|k| hint.contains(k)) {
            MediaType::Video
        } else if ["image", "photo", "picture"].iter().any(|k| hint.contains(k)) {
            MediaType::Image
        } else {
            MediaType::Text
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Text => "text",
            MediaType::Image => "image",
            MediaType::Video => "video",
            MediaType::Carousel => "carousel",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One content item from a provider or scraper after field normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPost {
    pub platform: Platform,
    pub id: Option<String>,
    pub url: Option<String>,
    /// Caption, title or body. May be empty.
    pub text: String,
    pub author: Option<String>,
    /// Follower count of the author, when the provider reports it.
    pub author_followers: Option<u64>,
    pub published_at: Option<DateTime<Utc>>,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub media_type: MediaType,
}

impl RawPost {
    /// Per-post engagement: likes and comments, plus shares where the
    /// platform surfaces them as an engagement action.
    #[must_use]
    pub fn engagement(&self) -> u64 {
        let base = self.likes.saturating_add(self.comments);
        if self.platform.counts_shares() {
            base.saturating_add(self.shares)
        } else {
            base
        }
    }
}

/// Account-level counts reported by a profile lookup. `None` means the
/// source did not report that figure, which is distinct from zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCounts {
    pub followers: Option<u64>,
    pub posts: Option<u64>,
    /// Engagement rate in percent.
    pub engagement_rate: Option<f64>,
}

impl ProfileCounts {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.followers.is_none() && self.posts.is_none() && self.engagement_rate.is_none()
    }
}
