//! Per-platform metric extraction: hashtags, post types, posting-time
//! histogram and engagement.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use brandscope_core::{MediaType, Platform, RawPost};
use chrono::{FixedOffset, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{DateRange, HashtagCount, MergedData, PostTypeStat};
use crate::{as_f64, ratio, round_to};

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([\p{L}\p{N}_]+)").expect("valid regex"));

const TOP_HASHTAGS: usize = 20;
const FALLBACK_WINDOW_DAYS: f64 = 30.0;

/// Engagement rates (as fractions, `0.02` = 2%) assumed when estimating a
/// follower count from average engagement.
///
/// These are heuristics. Any snapshot whose follower count came from them is
/// flagged as estimated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngagementAssumptions {
    pub instagram: f64,
    pub tiktok: f64,
    pub twitter: f64,
    pub facebook: f64,
    pub youtube: f64,
}

impl Default for EngagementAssumptions {
    fn default() -> Self {
        Self {
            instagram: 0.02,
            tiktok: 0.07,
            twitter: 0.01,
            facebook: 0.005,
            youtube: 0.02,
        }
    }
}

impl EngagementAssumptions {
    #[must_use]
    pub fn rate_for(&self, platform: Platform) -> f64 {
        match platform {
            Platform::Instagram => self.instagram,
            Platform::TikTok => self.tiktok,
            Platform::Twitter => self.twitter,
            Platform::Facebook => self.facebook,
            Platform::YouTube => self.youtube,
        }
    }
}

/// Metrics derived from one platform's posts and reconciled counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformMetrics {
    pub followers: u64,
    pub followers_estimated: bool,
    pub engagement_rate: f64,
    pub avg_engagement_per_post: f64,
    pub avg_post_per_day: f64,
    pub top_hashtags: Vec<HashtagCount>,
    pub post_types: BTreeMap<MediaType, PostTypeStat>,
    /// Post counts per local hour of day.
    pub post_times: [u32; 24],
}

/// Derive [`PlatformMetrics`] for `posts` using the follower count from
/// `merged`. `local_offset` sets the clock used for the posting-time
/// histogram.
#[must_use]
pub fn extract_platform_metrics(
    platform: Platform,
    posts: &[RawPost],
    merged: &MergedData,
    assumptions: &EngagementAssumptions,
    local_offset: FixedOffset,
) -> PlatformMetrics {
    let total_engagement: u64 = posts.iter().map(RawPost::engagement).sum();
    let avg_engagement = ratio(as_f64(total_engagement), as_f64(posts.len() as u64));

    let (followers, followers_estimated) = if merged.followers > 0 {
        (merged.followers, false)
    } else {
        estimate_followers(avg_engagement, assumptions.rate_for(platform))
    };

    let engagement_rate = round_to(ratio(avg_engagement, as_f64(followers)) * 100.0, 2);

    let avg_post_per_day = match DateRange::from_posts(posts) {
        Some(range) => as_f64(posts.len() as u64) / range.span_days(),
        None => as_f64(posts.len() as u64) / FALLBACK_WINDOW_DAYS,
    };

    PlatformMetrics {
        followers,
        followers_estimated,
        engagement_rate,
        avg_engagement_per_post: round_to(avg_engagement, 2),
        avg_post_per_day: round_to(avg_post_per_day, 2),
        top_hashtags: top_hashtags(posts, TOP_HASHTAGS),
        post_types: post_type_breakdown(posts),
        post_times: posting_hours(posts, local_offset),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn estimate_followers(avg_engagement: f64, assumed_rate: f64) -> (u64, bool) {
    if avg_engagement <= 0.0 || assumed_rate <= 0.0 {
        return (0, false);
    }
    ((avg_engagement / assumed_rate).round() as u64, true)
}

/// Hashtags by descending frequency, ties in first-seen order.
#[must_use]
pub fn top_hashtags(posts: &[RawPost], limit: usize) -> Vec<HashtagCount> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for post in posts {
        for cap in HASHTAG_RE.captures_iter(&post.text) {
            let tag = cap[1].to_lowercase();
            let count = counts.entry(tag.clone()).or_insert(0);
            if *count == 0 {
                order.push(tag);
            }
            *count += 1;
        }
    }

    let mut ranked: Vec<HashtagCount> = order
        .into_iter()
        .map(|tag| {
            let count = counts.get(&tag).copied().unwrap_or(0);
            HashtagCount { tag, count }
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(limit);
    ranked
}

fn post_type_breakdown(posts: &[RawPost]) -> BTreeMap<MediaType, PostTypeStat> {
    let mut sums: BTreeMap<MediaType, (usize, u64)> = BTreeMap::new();
    for post in posts {
        let entry = sums.entry(post.media_type).or_insert((0, 0));
        entry.0 += 1;
        entry.1 = entry.1.saturating_add(post.engagement());
    }
    sums.into_iter()
        .map(|(kind, (count, engagement))| {
            let avg = ratio(as_f64(engagement), as_f64(count as u64));
            (
                kind,
                PostTypeStat {
                    count,
                    avg_engagement: round_to(avg, 2),
                },
            )
        })
        .collect()
}

/// Posts without a timestamp are left out of the histogram.
fn posting_hours(posts: &[RawPost], offset: FixedOffset) -> [u32; 24] {
    let mut hours = [0u32; 24];
    for ts in posts.iter().filter_map(|p| p.published_at) {
        let hour = ts.with_timezone(&offset).hour() as usize;
        hours[hour] += 1;
    }
    hours
}
