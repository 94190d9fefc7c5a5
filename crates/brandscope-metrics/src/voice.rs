//! Own voice (brand-authored content) versus earned voice (third-party
//! mentions) for one brand.

use std::collections::{BTreeMap, HashMap, HashSet};

use brandscope_core::{BrandProfile, Platform, RawPost};
use serde::{Deserialize, Serialize};

use crate::sentiment::{classify_sentiment, Sentiment};
use crate::types::PlatformSnapshot;
use crate::{as_f64, ratio, round_to};

const TOP_MENTIONERS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformVoice {
    pub platform: Platform,
    pub posts: usize,
    pub reach: u64,
    pub engagement: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnVoice {
    pub total_posts: usize,
    pub total_reach: u64,
    pub total_engagement: f64,
    pub avg_engagement_per_post: f64,
    pub platforms: Vec<PlatformVoice>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentBreakdown {
    fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mentioner {
    pub handle: String,
    pub mentions: usize,
    /// Largest follower count observed for this author.
    pub followers: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarnVoice {
    pub total_mentions: usize,
    /// Followers summed over distinct authors.
    pub total_reach: u64,
    pub total_engagement: u64,
    pub avg_engagement_per_mention: f64,
    pub sentiment: SentimentBreakdown,
    pub platform_mentions: BTreeMap<Platform, usize>,
    pub top_mentioners: Vec<Mentioner>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceMetrics {
    pub brand: String,
    pub own_voice: OwnVoice,
    pub earn_voice: EarnVoice,
    /// Earned mentions per own post; 0 without own posts.
    pub voice_ratio: f64,
    /// Earned engagement over own engagement; 0 without own engagement.
    pub amplification_factor: f64,
}

/// Lowercase identifier with `@` and whitespace removed.
fn normalize_identifier(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '@')
        .collect::<String>()
        .to_lowercase()
}

/// Identifiers that mark a post as brand-authored: every configured handle
/// plus the brand name itself.
fn own_identifiers(brand: &BrandProfile) -> HashSet<String> {
    let mut ids: HashSet<String> = brand
        .handles
        .keys()
        .filter_map(|p| brand.handle(*p))
        .map(normalize_identifier)
        .collect();
    ids.insert(normalize_identifier(&brand.name));
    ids.retain(|id| !id.is_empty());
    ids
}

/// Whether `post` counts as an earned mention of `brand`: written by someone
/// other than the brand, and naming the brand.
#[must_use]
pub fn is_earned_mention(brand: &BrandProfile, post: &RawPost) -> bool {
    let name = brand.name.trim().to_lowercase();
    if name.is_empty() || !post.text.to_lowercase().contains(&name) {
        return false;
    }
    let author = post.author.as_deref().map(normalize_identifier).unwrap_or_default();
    author.is_empty() || !own_identifiers(brand).contains(&author)
}

/// Compute [`VoiceMetrics`] from the brand's platform snapshots and the
/// mention candidates found by searching for the brand.
#[must_use]
pub fn analyze_voice(
    brand: &BrandProfile,
    snapshots: &[PlatformSnapshot],
    mention_candidates: &[RawPost],
) -> VoiceMetrics {
    let own_voice = own_voice(snapshots);
    let earn_voice = earn_voice(brand, mention_candidates);

    VoiceMetrics {
        brand: brand.name.clone(),
        voice_ratio: round_to(
            ratio(
                as_f64(earn_voice.total_mentions as u64),
                as_f64(own_voice.total_posts as u64),
            ),
            2,
        ),
        amplification_factor: round_to(
            ratio(as_f64(earn_voice.total_engagement), own_voice.total_engagement),
            2,
        ),
        own_voice,
        earn_voice,
    }
}

fn own_voice(snapshots: &[PlatformSnapshot]) -> OwnVoice {
    let platforms: Vec<PlatformVoice> = snapshots
        .iter()
        .filter(|s| s.data_available)
        .map(|s| PlatformVoice {
            platform: s.platform,
            posts: s.posts_analyzed,
            reach: s.followers,
            engagement: round_to(
                as_f64(s.followers) * (s.engagement_rate / 100.0)
                    * as_f64(s.posts_analyzed as u64),
                2,
            ),
        })
        .collect();

    let total_posts = platforms.iter().map(|p| p.posts).sum();
    let total_engagement: f64 = platforms.iter().map(|p| p.engagement).sum();

    OwnVoice {
        total_posts,
        total_reach: platforms.iter().map(|p| p.reach).sum(),
        total_engagement: round_to(total_engagement, 2),
        avg_engagement_per_post: round_to(
            ratio(total_engagement, as_f64(total_posts as u64)),
            2,
        ),
        platforms,
    }
}

fn earn_voice(brand: &BrandProfile, candidates: &[RawPost]) -> EarnVoice {
    let mut voice = EarnVoice::default();
    // handle -> (mentions, max followers, first-seen index)
    let mut authors: HashMap<String, (usize, u64, usize)> = HashMap::new();

    for post in candidates.iter().filter(|p| is_earned_mention(brand, p)) {
        voice.total_mentions += 1;
        voice.total_engagement = voice.total_engagement.saturating_add(post.engagement());
        voice.sentiment.record(classify_sentiment(&post.text));
        *voice.platform_mentions.entry(post.platform).or_insert(0) += 1;

        if let Some(handle) = post
            .author
            .as_deref()
            .map(normalize_identifier)
            .filter(|h| !h.is_empty())
        {
            let seen = authors.len();
            let entry = authors.entry(handle).or_insert((0, 0, seen));
            entry.0 += 1;
            entry.1 = entry.1.max(post.author_followers.unwrap_or(0));
        }
    }

    voice.total_reach = authors.values().map(|(_, followers, _)| followers).sum();
    voice.avg_engagement_per_mention = round_to(
        ratio(
            as_f64(voice.total_engagement),
            as_f64(voice.total_mentions as u64),
        ),
        2,
    );

    let mut ranked: Vec<(String, (usize, u64, usize))> = authors.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1 .0
            .cmp(&a.1 .0)
            .then_with(|| b.1 .1.cmp(&a.1 .1))
            .then_with(|| a.1 .2.cmp(&b.1 .2))
    });
    voice.top_mentioners = ranked
        .into_iter()
        .take(TOP_MENTIONERS)
        .map(|(handle, (mentions, followers, _))| Mentioner {
            handle,
            mentions,
            followers,
        })
        .collect();
    voice
}

#[cfg(test)]
#[path = "voice_test.rs"]
mod tests;
