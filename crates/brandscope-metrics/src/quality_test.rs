use chrono::{Duration, TimeZone, Utc};

use super::*;

fn range(days: i64) -> DateRange {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    DateRange {
        start,
        end: start + Duration::days(days),
    }
}

fn primary(followers: u64, posts: u64, data_points: usize) -> DataSource {
    DataSource {
        followers: Some(followers),
        posts: Some(posts),
        engagement: Some(2.5),
        data_points: Some(data_points),
        date_range: Some(range(25)),
        ..DataSource::new(SourceOrigin::PrimaryApi)
    }
}

fn scraper(followers: u64, posts: u64) -> DataSource {
    DataSource {
        followers: Some(followers),
        posts: Some(posts),
        ..DataSource::new(SourceOrigin::Scraper)
    }
}

#[test]
fn agreeing_sources_with_large_sample_score_high() {
    let report = validate_sources(&[primary(10_000, 400, 50), scraper(10_500, 410)]);

    assert_eq!(report.confidence_score, 100.0);
    assert_eq!(report.confidence, ConfidenceTier::High);
    assert!(report.issues.is_empty(), "unexpected issues: {:?}", report.issues);
    assert_eq!(report.recommendations.len(), 1);
}

#[test]
fn single_source_with_five_posts_is_low_confidence() {
    let report = validate_sources(&[primary(1_000, 40, 5)]);

    // 7.5 + 7.5 + 0 + 10
    assert_eq!(report.confidence_score, 25.0);
    assert!(matches!(
        report.confidence,
        ConfidenceTier::Low | ConfidenceTier::VeryLow
    ));
    assert!(report.issues.iter().any(|i| i.contains("Only one data source")));
    assert!(report.issues.iter().any(|i| i.contains("Only 5 posts analyzed")));
    assert!(report
        .recommendations
        .iter()
        .any(|r| r.contains("Enable profile scraping")));
}

#[test]
fn scraper_wins_followers_and_primary_wins_sample() {
    let report = validate_sources(&[primary(9_000, 300, 30), scraper(12_000, 320)]);
    let merged = &report.merged_data;

    assert_eq!(merged.followers, 12_000);
    assert_eq!(merged.posts, 320);
    assert_eq!(merged.data_points_analyzed, 30);
    assert_eq!(merged.engagement, 2.5);
    // 30 posts over 25 days
    assert_eq!(merged.avg_post_per_day, 1.2);
}

#[test]
fn scraper_zero_followers_falls_back_to_primary() {
    let report = validate_sources(&[primary(9_000, 300, 30), scraper(0, 0)]);
    assert_eq!(report.merged_data.followers, 9_000);
    assert_eq!(report.merged_data.posts, 300);
}

#[test]
fn wide_follower_spread_earns_no_agreement_points() {
    let report = validate_sources(&[primary(5_000, 300, 50), scraper(10_000, 300)]);

    // 20 + 0 + 25 + 20 + 10
    assert_eq!(report.confidence_score, 75.0);
    assert_eq!(report.confidence, ConfidenceTier::Medium);
    assert!(report
        .issues
        .iter()
        .any(|i| i.contains("Follower counts differ by 50%")));
}

#[test]
fn moderate_spread_earns_half_credit() {
    let report = validate_sources(&[primary(8_000, 300, 50), scraper(10_000, 300)]);
    // 20 + 12.5 + 25 + 20 + 10
    assert_eq!(report.confidence_score, 87.5);
}

#[test]
fn missing_dates_fall_back_to_account_age_and_flag_it() {
    let mut source = primary(2_000, 365, 25);
    source.date_range = None;
    let report = validate_sources(&[source]);

    assert_eq!(report.merged_data.avg_post_per_day, 0.5);
    assert!(report.issues.iter().any(|i| i.contains("without publish dates")));
}

#[test]
fn low_coverage_is_reported() {
    let report = validate_sources(&[primary(50_000, 2_000, 50), scraper(50_000, 2_000)]);
    assert!(report.issues.iter().any(|i| i.contains("cover only 2.5%")));
}

#[test]
fn empty_input_degrades_without_panicking() {
    let report = validate_sources(&[]);

    assert_eq!(report.confidence_score, 0.0);
    assert_eq!(report.confidence, ConfidenceTier::VeryLow);
    assert_eq!(report.merged_data, MergedData::default());
    assert!(report.issues.iter().any(|i| i.contains("No data sources")));
    assert!(report.issues.iter().any(|i| i.contains("fewer than 5 posts")));
}

#[test]
fn score_and_tier_stay_consistent_across_inputs() {
    let cases = [
        vec![],
        vec![primary(1, 1, 1)],
        vec![primary(100, 10, 10), scraper(1_000, 100)],
        vec![primary(100, 10, 60), scraper(100, 10)],
        vec![scraper(100, 10)],
    ];
    for sources in &cases {
        let report = validate_sources(sources);
        assert!((0.0..=100.0).contains(&report.confidence_score));
        assert_eq!(
            report.confidence,
            ConfidenceTier::from_score(report.confidence_score)
        );
        assert_eq!(report, validate_sources(sources));
    }
}
