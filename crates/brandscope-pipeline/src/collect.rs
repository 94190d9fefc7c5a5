//! Turning one platform's fetch results into a validated snapshot.

use brandscope_core::{Platform, ProfileCounts, RawPost};
use brandscope_metrics::{
    extract_platform_metrics, validate_sources, DataSource, DateRange, PlatformSnapshot,
    SourceOrigin,
};

use crate::options::AnalysisOptions;

/// Data sources for the validator.
///
/// The provider contributes one source when either its posts or its profile
/// lookup succeeded; the scraper contributes one when it returned counts.
/// An empty result means the platform produced nothing usable.
#[must_use]
pub fn data_sources(
    posts: Option<&[RawPost]>,
    profile: Option<ProfileCounts>,
    scraped: Option<ProfileCounts>,
) -> Vec<DataSource> {
    let mut sources = Vec::with_capacity(2);

    let has_posts = posts.is_some_and(|p| !p.is_empty());
    let profile = profile.filter(|p| !p.is_empty());
    if has_posts || profile.is_some() {
        let counts = profile.unwrap_or_default();
        sources.push(DataSource {
            origin: SourceOrigin::PrimaryApi,
            followers: counts.followers,
            posts: counts.posts,
            engagement: counts.engagement_rate,
            data_points: posts.map(<[RawPost]>::len),
            date_range: posts.and_then(DateRange::from_posts),
        });
    }

    if let Some(scraped) = scraped.filter(|s| !s.is_empty()) {
        sources.push(DataSource {
            origin: SourceOrigin::Scraper,
            followers: scraped.followers,
            posts: scraped.posts,
            engagement: scraped.engagement_rate,
            data_points: None,
            date_range: None,
        });
    }

    sources
}

/// Validate `sources`, extract metrics from `posts` and assemble the
/// snapshot. Estimated follower counts are reported as a data-quality issue.
#[must_use]
pub fn build_snapshot(
    platform: Platform,
    handle: &str,
    posts: Vec<RawPost>,
    sources: &[DataSource],
    options: &AnalysisOptions,
) -> PlatformSnapshot {
    let mut report = validate_sources(sources);
    let metrics = extract_platform_metrics(
        platform,
        &posts,
        &report.merged_data,
        &options.engagement,
        options.local_offset,
    );

    if metrics.followers_estimated {
        report.issues.push(format!(
            "Follower count estimated from average engagement assuming a {:.1}% engagement \
             rate on {platform}; treat it as an approximation",
            options.engagement.rate_for(platform) * 100.0
        ));
    }

    let posts_analyzed = posts.len();
    let account_posts = match report.merged_data.posts {
        0 => posts_analyzed as u64,
        n => n,
    };

    PlatformSnapshot {
        platform,
        handle: Some(handle.to_string()),
        configured: true,
        data_available: true,
        followers: metrics.followers,
        followers_estimated: metrics.followers_estimated,
        posts: account_posts,
        posts_analyzed,
        engagement_rate: metrics.engagement_rate,
        avg_engagement_per_post: metrics.avg_engagement_per_post,
        avg_post_per_day: metrics.avg_post_per_day,
        top_hashtags: metrics.top_hashtags,
        post_types: metrics.post_types,
        post_times: metrics.post_times,
        raw_posts: posts,
        data_quality: Some(report),
    }
}

#[cfg(test)]
mod tests {
    use brandscope_core::MediaType;
    use chrono::{TimeZone, Utc};

    use super::*;

    fn post(likes: u64, day: u32) -> RawPost {
        RawPost {
            platform: Platform::Instagram,
            id: Some(format!("p{day}")),
            url: None,
            text: "Kopi susu #promo".to_string(),
            author: Some("brand".to_string()),
            author_followers: None,
            published_at: Utc.with_ymd_and_hms(2025, 3, day, 2, 0, 0).single(),
            likes,
            comments: 0,
            shares: 0,
            media_type: MediaType::Image,
        }
    }

    #[test]
    fn no_posts_and_no_counts_yields_no_sources() {
        assert!(data_sources(Some(&[][..]), Some(ProfileCounts::default()), None).is_empty());
        assert!(data_sources(None, None, None).is_empty());
    }

    #[test]
    fn provider_and_scraper_each_contribute_a_source() {
        let posts = vec![post(10, 1), post(20, 5)];
        let profile = ProfileCounts {
            followers: Some(1_000),
            posts: Some(300),
            engagement_rate: None,
        };
        let scraped = ProfileCounts {
            followers: Some(1_050),
            posts: None,
            engagement_rate: None,
        };

        let sources = data_sources(Some(&posts), Some(profile), Some(scraped));
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].origin, SourceOrigin::PrimaryApi);
        assert_eq!(sources[0].data_points, Some(2));
        assert!(sources[0].date_range.is_some());
        assert_eq!(sources[1].origin, SourceOrigin::Scraper);
        assert_eq!(sources[1].followers, Some(1_050));
    }

    #[test]
    fn profile_failure_still_keeps_posts() {
        let posts = vec![post(10, 1)];
        let sources = data_sources(Some(&posts), None, None);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].followers, None);
    }

    #[test]
    fn estimated_followers_are_flagged_as_an_issue() {
        // Average engagement 1000 at the assumed 2% Instagram rate.
        let posts = vec![post(1_000, 1), post(1_000, 2)];
        let sources = data_sources(Some(&posts), None, None);
        let snapshot = build_snapshot(
            Platform::Instagram,
            "brand",
            posts,
            &sources,
            &AnalysisOptions::default(),
        );

        assert!(snapshot.data_available);
        assert!(snapshot.followers_estimated);
        assert_eq!(snapshot.followers, 50_000);
        let report = snapshot.data_quality.expect("report attached");
        assert!(
            report.issues.iter().any(|i| i.contains("estimated")),
            "issues: {:?}",
            report.issues
        );
    }

    #[test]
    fn account_post_count_falls_back_to_analyzed_posts() {
        let posts = vec![post(5, 1), post(5, 2), post(5, 3)];
        let sources = data_sources(Some(&posts), None, None);
        let snapshot = build_snapshot(
            Platform::Instagram,
            "brand",
            posts,
            &sources,
            &AnalysisOptions::default(),
        );
        assert_eq!(snapshot.posts, 3);
        assert_eq!(snapshot.posts_analyzed, 3);
    }
}
