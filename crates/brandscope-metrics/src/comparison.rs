//! Cross-brand tables consumed by the dashboard and report export.

use std::collections::{BTreeMap, HashMap};

use brandscope_core::{MediaType, Platform};
use serde::{Deserialize, Serialize};

use crate::types::{BrandAnalysis, HashtagCount, PostTypeStat};
use crate::{as_f64, ratio, round_to};

const TOP_BRAND_HASHTAGS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudienceRow {
    pub brand: String,
    pub followers: BTreeMap<Platform, u64>,
    pub total_followers: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStat {
    pub posts: u64,
    pub posts_analyzed: usize,
    pub avg_post_per_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostChannelRow {
    pub brand: String,
    pub channels: BTreeMap<Platform, ChannelStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandHashtags {
    pub brand: String,
    pub hashtags: Vec<HashtagCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostTypeRow {
    pub brand: String,
    pub post_types: BTreeMap<MediaType, PostTypeStat>,
}

/// Posts per brand published in one local hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingRow {
    pub hour: u8,
    pub label: String,
    pub counts: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalMetrics {
    pub brand: String,
    pub posts_analyzed: usize,
    pub most_active_platform: Option<Platform>,
    pub peak_posting_hour: Option<u8>,
    pub best_post_type: Option<MediaType>,
    /// Mean data-quality confidence score over platforms with data.
    pub mean_confidence_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonTables {
    pub audience_comparison: Vec<AudienceRow>,
    pub post_channel_data: Vec<PostChannelRow>,
    pub hashtag_analysis: Vec<BrandHashtags>,
    pub post_type_engagement: Vec<PostTypeRow>,
    pub post_timing_data: Vec<TimingRow>,
    pub additional_metrics: Vec<AdditionalMetrics>,
}

#[must_use]
pub fn build_comparison_tables(brands: &[BrandAnalysis]) -> ComparisonTables {
    ComparisonTables {
        audience_comparison: brands.iter().map(audience_row).collect(),
        post_channel_data: brands.iter().map(channel_row).collect(),
        hashtag_analysis: brands
            .iter()
            .map(|b| BrandHashtags {
                brand: b.brand.name.clone(),
                hashtags: merged_hashtags(b, TOP_BRAND_HASHTAGS),
            })
            .collect(),
        post_type_engagement: brands
            .iter()
            .map(|b| PostTypeRow {
                brand: b.brand.name.clone(),
                post_types: merged_post_types(b),
            })
            .collect(),
        post_timing_data: timing_rows(brands),
        additional_metrics: brands.iter().map(additional_metrics).collect(),
    }
}

fn audience_row(analysis: &BrandAnalysis) -> AudienceRow {
    let followers: BTreeMap<Platform, u64> = analysis
        .available()
        .map(|p| (p.platform, p.followers))
        .collect();
    AudienceRow {
        brand: analysis.brand.name.clone(),
        total_followers: followers.values().sum(),
        followers,
    }
}

fn channel_row(analysis: &BrandAnalysis) -> PostChannelRow {
    PostChannelRow {
        brand: analysis.brand.name.clone(),
        channels: analysis
            .available()
            .map(|p| {
                (
                    p.platform,
                    ChannelStat {
                        posts: p.posts,
                        posts_analyzed: p.posts_analyzed,
                        avg_post_per_day: p.avg_post_per_day,
                    },
                )
            })
            .collect(),
    }
}

/// Hashtag counts summed across platforms, ties in platform order.
fn merged_hashtags(analysis: &BrandAnalysis, limit: usize) -> Vec<HashtagCount> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for tag in analysis.available().flat_map(|p| &p.top_hashtags) {
        let entry = counts.entry(tag.tag.as_str()).or_insert(0);
        if *entry == 0 {
            order.push(tag.tag.as_str());
        }
        *entry += tag.count;
    }
    let mut merged: Vec<HashtagCount> = order
        .into_iter()
        .map(|tag| HashtagCount {
            tag: tag.to_string(),
            count: counts.get(tag).copied().unwrap_or(0),
        })
        .collect();
    merged.sort_by(|a, b| b.count.cmp(&a.count));
    merged.truncate(limit);
    merged
}

fn merged_post_types(analysis: &BrandAnalysis) -> BTreeMap<MediaType, PostTypeStat> {
    let mut sums: BTreeMap<MediaType, (usize, f64)> = BTreeMap::new();
    for (kind, stat) in analysis.available().flat_map(|p| &p.post_types) {
        let entry = sums.entry(*kind).or_insert((0, 0.0));
        entry.0 += stat.count;
        entry.1 += stat.avg_engagement * as_f64(stat.count as u64);
    }
    sums.into_iter()
        .map(|(kind, (count, total))| {
            (
                kind,
                PostTypeStat {
                    count,
                    avg_engagement: round_to(ratio(total, as_f64(count as u64)), 2),
                },
            )
        })
        .collect()
}

fn brand_hours(analysis: &BrandAnalysis) -> [u32; 24] {
    let mut hours = [0u32; 24];
    for snapshot in analysis.available() {
        for (slot, count) in hours.iter_mut().zip(snapshot.post_times) {
            *slot += count;
        }
    }
    hours
}

fn timing_rows(brands: &[BrandAnalysis]) -> Vec<TimingRow> {
    let per_brand: Vec<(&str, [u32; 24])> = brands
        .iter()
        .map(|b| (b.brand.name.as_str(), brand_hours(b)))
        .collect();
    (0u8..24)
        .map(|hour| TimingRow {
            hour,
            label: format!("{hour:02}:00"),
            counts: per_brand
                .iter()
                .map(|(name, hours)| ((*name).to_string(), hours[usize::from(hour)]))
                .collect(),
        })
        .collect()
}

fn additional_metrics(analysis: &BrandAnalysis) -> AdditionalMetrics {
    let most_active_platform = analysis
        .available()
        .filter(|p| p.posts_analyzed > 0)
        .fold(None::<(Platform, usize)>, |best, p| match best {
            Some((_, top)) if top >= p.posts_analyzed => best,
            _ => Some((p.platform, p.posts_analyzed)),
        })
        .map(|(platform, _)| platform);

    let hours = brand_hours(analysis);
    let peak_posting_hour = hours
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .fold(None::<(usize, u32)>, |best, (hour, count)| match best {
            Some((_, top)) if top >= *count => best,
            _ => Some((hour, *count)),
        })
        .and_then(|(hour, _)| u8::try_from(hour).ok());

    let best_post_type = merged_post_types(analysis)
        .into_iter()
        .filter(|(_, stat)| stat.count > 0)
        .fold(None::<(MediaType, f64)>, |best, (kind, stat)| match best {
            Some((_, top)) if top >= stat.avg_engagement => best,
            _ => Some((kind, stat.avg_engagement)),
        })
        .map(|(kind, _)| kind);

    let scores: Vec<f64> = analysis
        .available()
        .filter_map(|p| p.data_quality.as_ref().map(|q| q.confidence_score))
        .collect();
    let mean_confidence_score = round_to(
        ratio(scores.iter().sum(), as_f64(scores.len() as u64)),
        1,
    );

    AdditionalMetrics {
        brand: analysis.brand.name.clone(),
        posts_analyzed: analysis.posts_analyzed(),
        most_active_platform,
        peak_posting_hour,
        best_post_type,
        mean_confidence_score,
    }
}

#[cfg(test)]
mod tests {
    use brandscope_core::BrandProfile;

    use super::*;
    use crate::types::PlatformSnapshot;
    use crate::validate_sources;

    fn snapshot(platform: Platform, followers: u64, posts: usize) -> PlatformSnapshot {
        let mut snap = PlatformSnapshot::unavailable(platform, Some("h".to_string()));
        snap.data_available = true;
        snap.followers = followers;
        snap.posts_analyzed = posts;
        snap.posts = posts as u64;
        snap
    }

    fn brand(name: &str, platforms: Vec<PlatformSnapshot>) -> BrandAnalysis {
        BrandAnalysis {
            brand: BrandProfile::new(name),
            is_focus: false,
            platforms,
        }
    }

    fn fixture() -> Vec<BrandAnalysis> {
        let mut ig = snapshot(Platform::Instagram, 10_000, 30);
        ig.top_hashtags = vec![
            HashtagCount { tag: "kopi".into(), count: 5 },
            HashtagCount { tag: "promo".into(), count: 2 },
        ];
        ig.post_types.insert(MediaType::Image, PostTypeStat { count: 20, avg_engagement: 100.0 });
        ig.post_types.insert(MediaType::Video, PostTypeStat { count: 10, avg_engagement: 400.0 });
        ig.post_times[9] = 12;
        ig.post_times[19] = 18;

        let mut tt = snapshot(Platform::TikTok, 4_000, 10);
        tt.top_hashtags = vec![
            HashtagCount { tag: "promo".into(), count: 4 },
            HashtagCount { tag: "fyp".into(), count: 1 },
        ];
        tt.post_types.insert(MediaType::Video, PostTypeStat { count: 10, avg_engagement: 200.0 });
        tt.post_times[9] = 10;

        let offline = PlatformSnapshot::unavailable(Platform::Twitter, None);

        vec![
            brand("Alpha", vec![ig, tt, offline]),
            brand("Beta", Vec::new()),
        ]
    }

    #[test]
    fn audience_and_channels_cover_available_platforms() {
        let tables = build_comparison_tables(&fixture());
        let alpha = &tables.audience_comparison[0];
        assert_eq!(alpha.total_followers, 14_000);
        assert!(!alpha.followers.contains_key(&Platform::Twitter));
        assert_eq!(tables.post_channel_data[0].channels.len(), 2);
        assert!(tables.audience_comparison[1].followers.is_empty());
    }

    #[test]
    fn hashtags_merge_across_platforms() {
        let tables = build_comparison_tables(&fixture());
        let tags: Vec<(&str, usize)> = tables.hashtag_analysis[0]
            .hashtags
            .iter()
            .map(|h| (h.tag.as_str(), h.count))
            .collect();
        assert_eq!(tags, vec![("promo", 6), ("kopi", 5), ("fyp", 1)]);
    }

    #[test]
    fn post_types_are_count_weighted() {
        let tables = build_comparison_tables(&fixture());
        let types = &tables.post_type_engagement[0].post_types;
        assert_eq!(types[&MediaType::Video].count, 20);
        assert_eq!(types[&MediaType::Video].avg_engagement, 300.0);
        assert_eq!(types[&MediaType::Image].avg_engagement, 100.0);
    }

    #[test]
    fn timing_has_one_row_per_hour_for_every_brand() {
        let tables = build_comparison_tables(&fixture());
        assert_eq!(tables.post_timing_data.len(), 24);
        let nine = &tables.post_timing_data[9];
        assert_eq!(nine.label, "09:00");
        assert_eq!(nine.counts["Alpha"], 22);
        assert_eq!(nine.counts["Beta"], 0);
    }

    #[test]
    fn additional_metrics_pick_leaders() {
        let mut brands = fixture();
        brands[0].platforms[0].data_quality = Some(validate_sources(&[]));
        let tables = build_comparison_tables(&brands);

        let alpha = &tables.additional_metrics[0];
        assert_eq!(alpha.posts_analyzed, 40);
        assert_eq!(alpha.most_active_platform, Some(Platform::Instagram));
        assert_eq!(alpha.peak_posting_hour, Some(9));
        assert_eq!(alpha.best_post_type, Some(MediaType::Video));
        assert_eq!(alpha.mean_confidence_score, 0.0);

        let beta = &tables.additional_metrics[1];
        assert_eq!(beta.most_active_platform, None);
        assert_eq!(beta.peak_posting_hour, None);
        assert_eq!(beta.best_post_type, None);
    }

    #[test]
    fn tables_serialize_with_report_field_names() {
        let json = serde_json::to_value(build_comparison_tables(&fixture())).unwrap();
        for key in [
            "audienceComparison",
            "postChannelData",
            "hashtagAnalysis",
            "postTypeEngagement",
            "postTimingData",
            "additionalMetrics",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
