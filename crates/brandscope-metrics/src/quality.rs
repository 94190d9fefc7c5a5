//! Multi-source reconciliation and confidence scoring for one brand on one
//! platform.
//!
//! The confidence score is a fixed point budget spread over five checks:
//!
//! | Check | Points |
//! |-------|--------|
//! | two or more sources | 20 |
//! | follower counts agree | 25 |
//! | post counts agree | 25 |
//! | analyzed post sample size | 20 |
//! | publish-date range known | 10 |
//!
//! Counts "agree" when their spread is within 10% (full credit) or 30%
//! (half credit). A single reported value earns 30% of the budget.

use crate::types::{
    ConfidenceTier, DataQualityReport, DataSource, DateRange, MergedData, SourceOrigin,
};
use crate::{as_f64, ratio, round_to};

const MULTI_SOURCE_POINTS: f64 = 20.0;
const FOLLOWER_AGREEMENT_POINTS: f64 = 25.0;
const POST_AGREEMENT_POINTS: f64 = 25.0;
const SAMPLE_SIZE_POINTS: f64 = 20.0;
const DATE_RANGE_POINTS: f64 = 10.0;

const TIGHT_VARIANCE: f64 = 0.10;
const LOOSE_VARIANCE: f64 = 0.30;
const SINGLE_VALUE_CREDIT: f64 = 0.3;

/// Account age assumed when no publish dates are available.
pub const FALLBACK_ACCOUNT_AGE_DAYS: f64 = 730.0;

/// Below this many analyzed posts, posting-pattern insights are withheld.
pub const MIN_POSTS_FOR_FREQUENCY: usize = 20;
const MIN_POSTS_FOR_ENGAGEMENT: usize = 10;
const MIN_ACCOUNT_POSTS: u64 = 5;
const MIN_COVERAGE: f64 = 0.10;

/// Reconcile `sources` into a [`DataQualityReport`].
///
/// Never fails: missing data lowers the score and adds issues.
#[must_use]
pub fn validate_sources(sources: &[DataSource]) -> DataQualityReport {
    let primary = sources.iter().find(|s| s.origin == SourceOrigin::PrimaryApi);
    let scraper = sources.iter().find(|s| s.origin == SourceOrigin::Scraper);

    let follower_values: Vec<u64> = sources.iter().filter_map(|s| s.followers).collect();
    let post_values: Vec<u64> = sources.iter().filter_map(|s| s.posts).collect();

    let data_points = primary
        .and_then(|s| s.data_points)
        .or_else(|| sources.iter().filter_map(|s| s.data_points).max())
        .unwrap_or(0);

    let date_range = primary
        .and_then(|s| s.date_range)
        .or_else(|| sources.iter().find_map(|s| s.date_range));

    let follower_variance = spread(&follower_values);

    let mut score = 0.0;
    if sources.len() >= 2 {
        score += MULTI_SOURCE_POINTS;
    }
    score += agreement_points(&follower_values, FOLLOWER_AGREEMENT_POINTS);
    score += agreement_points(&post_values, POST_AGREEMENT_POINTS);
    score += sample_size_points(data_points);
    if date_range.is_some() {
        score += DATE_RANGE_POINTS;
    }
    let score = round_to(score.clamp(0.0, 100.0), 1);
    let confidence = ConfidenceTier::from_score(score);

    let merged_data = merge(primary, scraper, sources, data_points, date_range);

    let mut issues = Vec::new();
    if sources.is_empty() {
        issues.push("No data sources returned data for this platform".to_string());
    } else if sources.len() < 2 {
        issues.push(
            "Only one data source available; figures could not be cross-validated".to_string(),
        );
    }
    if let Some(variance) = follower_variance.filter(|v| *v > LOOSE_VARIANCE) {
        issues.push(format!(
            "Follower counts differ by {:.0}% between sources",
            variance * 100.0
        ));
    }
    if data_points < MIN_POSTS_FOR_ENGAGEMENT {
        issues.push(format!(
            "Only {data_points} posts analyzed; engagement metrics are unreliable"
        ));
    } else if data_points < MIN_POSTS_FOR_FREQUENCY {
        issues.push(format!(
            "Only {data_points} posts analyzed; posting-pattern metrics have limited reliability"
        ));
    }
    if date_range.is_none() {
        issues.push(format!(
            "Posting frequency computed without publish dates (assumes a {FALLBACK_ACCOUNT_AGE_DAYS:.0}-day account age)"
        ));
    }
    if merged_data.estimated_total_posts < MIN_ACCOUNT_POSTS {
        issues.push(format!(
            "Account has fewer than {MIN_ACCOUNT_POSTS} posts on record"
        ));
    }
    if merged_data.estimated_total_posts > 0 {
        let coverage = ratio(
            as_f64(data_points as u64),
            as_f64(merged_data.estimated_total_posts),
        );
        if coverage < MIN_COVERAGE {
            issues.push(format!(
                "Analyzed posts cover only {:.1}% of the account's {} posts",
                coverage * 100.0,
                merged_data.estimated_total_posts
            ));
        }
    }

    let recommendations = recommendations(confidence, data_points, scraper.is_some());

    DataQualityReport {
        confidence,
        confidence_score: score,
        issues,
        recommendations,
        merged_data,
    }
}

/// Relative spread `(max - min) / max`, or `None` with fewer than two values.
fn spread(values: &[u64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let max = values.iter().copied().max().unwrap_or(0);
    let min = values.iter().copied().min().unwrap_or(0);
    Some(ratio(as_f64(max - min), as_f64(max)))
}

fn agreement_points(values: &[u64], budget: f64) -> f64 {
    match (values.len(), spread(values)) {
        (0, _) => 0.0,
        (_, None) => budget * SINGLE_VALUE_CREDIT,
        (_, Some(v)) if v <= TIGHT_VARIANCE => budget,
        (_, Some(v)) if v <= LOOSE_VARIANCE => budget * 0.5,
        _ => 0.0,
    }
}

fn sample_size_points(data_points: usize) -> f64 {
    if data_points >= 50 {
        SAMPLE_SIZE_POINTS
    } else if data_points >= 20 {
        SAMPLE_SIZE_POINTS * 0.7
    } else if data_points >= 10 {
        SAMPLE_SIZE_POINTS * 0.4
    } else {
        0.0
    }
}

/// Scraper wins for account counters; the primary API wins for anything
/// derived from retrieved content.
fn merge(
    primary: Option<&DataSource>,
    scraper: Option<&DataSource>,
    sources: &[DataSource],
    data_points: usize,
    date_range: Option<DateRange>,
) -> MergedData {
    let followers = prefer_count(|s| s.followers, scraper, primary, sources);
    let posts = prefer_count(|s| s.posts, scraper, primary, sources);

    let engagement = primary
        .and_then(|s| s.engagement)
        .or_else(|| scraper.and_then(|s| s.engagement))
        .or_else(|| sources.iter().find_map(|s| s.engagement))
        .unwrap_or(0.0);

    let estimated_total_posts = posts.max(data_points as u64);

    let avg_post_per_day = match date_range {
        Some(range) => ratio(as_f64(data_points as u64), range.span_days()),
        None => as_f64(estimated_total_posts) / FALLBACK_ACCOUNT_AGE_DAYS,
    };

    MergedData {
        followers,
        posts,
        avg_post_per_day: round_to(avg_post_per_day, 2),
        engagement: round_to(engagement, 2),
        data_points_analyzed: data_points,
        estimated_total_posts,
    }
}

fn prefer_count(
    pick: fn(&DataSource) -> Option<u64>,
    first: Option<&DataSource>,
    second: Option<&DataSource>,
    sources: &[DataSource],
) -> u64 {
    first
        .and_then(pick)
        .filter(|v| *v > 0)
        .or_else(|| second.and_then(pick))
        .or_else(|| sources.iter().find_map(pick))
        .unwrap_or(0)
}

fn recommendations(tier: ConfidenceTier, data_points: usize, has_scraper: bool) -> Vec<String> {
    let mut out = vec![match tier {
        ConfidenceTier::High => {
            "Data is consistent across sources; metrics can support planning decisions."
        }
        ConfidenceTier::Medium => {
            "Metrics are broadly reliable; confirm major decisions against native platform analytics."
        }
        ConfidenceTier::Low => {
            "Treat these metrics as directional only and re-run the analysis once more data is available."
        }
        ConfidenceTier::VeryLow => {
            "Data is too sparse for reliable conclusions; verify the account handle and re-run the analysis."
        }
    }
    .to_string()];

    if data_points < MIN_POSTS_FOR_FREQUENCY {
        out.push(format!(
            "Analyze at least {MIN_POSTS_FOR_FREQUENCY} posts before acting on posting-frequency insights."
        ));
    }
    if !has_scraper {
        out.push(
            "Enable profile scraping to cross-validate follower and post counts.".to_string(),
        );
    }
    out
}

#[cfg(test)]
#[path = "quality_test.rs"]
mod tests;
