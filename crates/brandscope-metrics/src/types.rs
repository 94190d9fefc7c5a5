//! Records shared between the validator, extractor and cross-brand composers.

use std::collections::BTreeMap;

use brandscope_core::{BrandProfile, MediaType, Platform, RawPost};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a [`DataSource`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOrigin {
    /// The social data provider's API: post content is available.
    PrimaryApi,
    /// The browser profile scraper: account counters only.
    Scraper,
}

/// Publish-date span covered by a set of posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Span of the parseable timestamps in `posts`, or `None` if none parse.
    #[must_use]
    pub fn from_posts(posts: &[RawPost]) -> Option<Self> {
        let mut stamps = posts.iter().filter_map(|p| p.published_at);
        let first = stamps.next()?;
        let (start, end) = stamps.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
        Some(Self { start, end })
    }

    /// Length of the range in days, never less than one.
    #[must_use]
    pub fn span_days(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let days = (self.end - self.start).num_seconds() as f64 / 86_400.0;
        days.max(1.0)
    }
}

/// One source's view of a brand's account on one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub origin: SourceOrigin,
    pub followers: Option<u64>,
    pub posts: Option<u64>,
    /// Engagement rate in percent.
    pub engagement: Option<f64>,
    /// Number of posts whose content was actually retrieved.
    pub data_points: Option<usize>,
    pub date_range: Option<DateRange>,
}

impl DataSource {
    #[must_use]
    pub fn new(origin: SourceOrigin) -> Self {
        Self {
            origin,
            followers: None,
            posts: None,
            engagement: None,
            data_points: None,
            date_range: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceTier {
    VeryLow,
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    /// Tier boundaries sit at 40, 60 and 80.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ConfidenceTier::High
        } else if score >= 60.0 {
            ConfidenceTier::Medium
        } else if score >= 40.0 {
            ConfidenceTier::Low
        } else {
            ConfidenceTier::VeryLow
        }
    }
}

/// Reconciled figures produced by the data-quality merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedData {
    pub followers: u64,
    pub posts: u64,
    pub avg_post_per_day: f64,
    pub engagement: f64,
    pub data_points_analyzed: usize,
    pub estimated_total_posts: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQualityReport {
    pub confidence: ConfidenceTier,
    pub confidence_score: f64,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
    pub merged_data: MergedData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashtagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostTypeStat {
    pub count: usize,
    pub avg_engagement: f64,
}

/// Normalized per-brand, per-platform view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSnapshot {
    pub platform: Platform,
    pub handle: Option<String>,
    /// A handle was provided for this platform.
    pub configured: bool,
    /// The fetch succeeded and produced usable data.
    pub data_available: bool,
    pub followers: u64,
    /// `followers` was estimated from engagement because no source reported it.
    pub followers_estimated: bool,
    /// Account-level post count after source reconciliation.
    pub posts: u64,
    pub posts_analyzed: usize,
    /// Average engagement per post as a percent of followers.
    pub engagement_rate: f64,
    pub avg_engagement_per_post: f64,
    pub avg_post_per_day: f64,
    pub top_hashtags: Vec<HashtagCount>,
    pub post_types: BTreeMap<MediaType, PostTypeStat>,
    pub post_times: [u32; 24],
    pub raw_posts: Vec<RawPost>,
    pub data_quality: Option<DataQualityReport>,
}

impl PlatformSnapshot {
    /// An empty snapshot for a platform that was skipped or whose fetch failed.
    #[must_use]
    pub fn unavailable(platform: Platform, handle: Option<String>) -> Self {
        Self {
            platform,
            configured: handle.is_some(),
            handle,
            data_available: false,
            followers: 0,
            followers_estimated: false,
            posts: 0,
            posts_analyzed: 0,
            engagement_rate: 0.0,
            avg_engagement_per_post: 0.0,
            avg_post_per_day: 0.0,
            top_hashtags: Vec::new(),
            post_types: BTreeMap::new(),
            post_times: [0; 24],
            raw_posts: Vec::new(),
            data_quality: None,
        }
    }
}

/// Everything gathered for one brand in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandAnalysis {
    pub brand: BrandProfile,
    pub is_focus: bool,
    pub platforms: Vec<PlatformSnapshot>,
}

impl BrandAnalysis {
    /// Snapshots whose fetch produced data.
    pub fn available(&self) -> impl Iterator<Item = &PlatformSnapshot> {
        self.platforms.iter().filter(|p| p.data_available)
    }

    #[must_use]
    pub fn posts_analyzed(&self) -> usize {
        self.available().map(|p| p.posts_analyzed).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn tier_boundaries_are_inclusive_lower_bounds() {
        assert_eq!(ConfidenceTier::from_score(100.0), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_score(80.0), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_score(79.9), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_score(60.0), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_score(59.9), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::from_score(40.0), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::from_score(39.9), ConfidenceTier::VeryLow);
        assert_eq!(ConfidenceTier::from_score(0.0), ConfidenceTier::VeryLow);
    }

    #[test]
    fn date_range_span_has_one_day_floor() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
        let same_day = DateRange { start: t, end: t };
        assert_eq!(same_day.span_days(), 1.0);

        let ten_days = DateRange {
            start: t,
            end: t + chrono::Duration::days(10),
        };
        assert_eq!(ten_days.span_days(), 10.0);
    }

    #[test]
    fn tier_serializes_screaming_case() {
        let json = serde_json::to_string(&ConfidenceTier::VeryLow).unwrap();
        assert_eq!(json, "\"VERY_LOW\"");
    }
}
