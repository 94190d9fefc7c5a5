//! Brand equity: a 0-100 composite of reach, engagement and content
//! velocity.
//!
//! ```text
//! reach      = min(followers / 500_000 * 100, 100)
//! engagement = min(avg_engagement_rate * 10, 100)
//! content    = min(posts_per_day / 2 * 100, 100)
//! equity     = 0.4 * reach + 0.4 * engagement + 0.2 * content
//! ```

use serde::{Deserialize, Serialize};

use crate::types::BrandAnalysis;
use crate::{as_f64, ratio, round_to};

/// Follower count that earns a full reach score.
pub const REACH_CEILING: f64 = 500_000.0;
/// Posts per day that earn a full content score.
pub const VELOCITY_CEILING: f64 = 2.0;

const REACH_WEIGHT: f64 = 0.4;
const ENGAGEMENT_WEIGHT: f64 = 0.4;
const CONTENT_WEIGHT: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquityBreakdown {
    pub reach_score: f64,
    pub engagement_score: f64,
    pub content_score: f64,
    pub equity_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandEquityRow {
    pub brand: String,
    pub is_focus: bool,
    pub total_followers: u64,
    /// Follower-weighted mean engagement rate in percent.
    pub avg_engagement: f64,
    /// Sum of posts per day across platforms.
    pub content_velocity: f64,
    #[serde(flatten)]
    pub scores: EquityBreakdown,
}

fn clamp_score(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Score one brand from its aggregated signals.
#[must_use]
pub fn score_equity(total_followers: u64, avg_engagement: f64, content_velocity: f64) -> EquityBreakdown {
    let reach = clamp_score(as_f64(total_followers) / REACH_CEILING * 100.0);
    let engagement = clamp_score(avg_engagement * 10.0);
    let content = clamp_score(content_velocity / VELOCITY_CEILING * 100.0);
    let equity = reach * REACH_WEIGHT + engagement * ENGAGEMENT_WEIGHT + content * CONTENT_WEIGHT;

    EquityBreakdown {
        reach_score: round_to(reach, 2),
        engagement_score: round_to(engagement, 2),
        content_score: round_to(content, 2),
        equity_score: round_to(equity, 1),
    }
}

/// Engagement rates weighted by followers, or their plain mean when no
/// platform reports followers.
#[must_use]
pub fn weighted_engagement(platforms: &[(u64, f64)]) -> f64 {
    let total_followers: u64 = platforms.iter().map(|(f, _)| f).sum();
    if total_followers > 0 {
        let weighted: f64 = platforms.iter().map(|(f, rate)| as_f64(*f) * rate).sum();
        weighted / as_f64(total_followers)
    } else {
        let sum: f64 = platforms.iter().map(|(_, rate)| rate).sum();
        ratio(sum, as_f64(platforms.len() as u64))
    }
}

/// One equity row per brand, in input order. Only platforms with data
/// contribute.
#[must_use]
pub fn compose_brand_equity(brands: &[BrandAnalysis]) -> Vec<BrandEquityRow> {
    brands
        .iter()
        .map(|analysis| {
            let platforms: Vec<(u64, f64)> = analysis
                .available()
                .map(|p| (p.followers, p.engagement_rate))
                .collect();
            let total_followers = platforms.iter().map(|(f, _)| f).sum();
            let avg_engagement = weighted_engagement(&platforms);
            let content_velocity: f64 = analysis.available().map(|p| p.avg_post_per_day).sum();

            BrandEquityRow {
                brand: analysis.brand.name.clone(),
                is_focus: analysis.is_focus,
                total_followers,
                avg_engagement: round_to(avg_engagement, 2),
                content_velocity: round_to(content_velocity, 2),
                scores: score_equity(total_followers, avg_engagement, content_velocity),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use brandscope_core::{BrandProfile, Platform};

    use super::*;
    use crate::types::PlatformSnapshot;

    fn snapshot(platform: Platform, followers: u64, rate: f64, per_day: f64) -> PlatformSnapshot {
        let mut snap = PlatformSnapshot::unavailable(platform, Some("h".to_string()));
        snap.data_available = true;
        snap.followers = followers;
        snap.engagement_rate = rate;
        snap.avg_post_per_day = per_day;
        snap
    }

    #[test]
    fn reference_brand_scores_46() {
        let scores = score_equity(250_000, 3.5, 1.2);
        assert_eq!(scores.reach_score, 50.0);
        assert_eq!(scores.engagement_score, 35.0);
        assert_eq!(scores.content_score, 60.0);
        assert_eq!(scores.equity_score, 46.0);
    }

    #[test]
    fn sub_scores_are_capped() {
        let scores = score_equity(10_000_000, 50.0, 9.0);
        assert_eq!(scores.equity_score, 100.0);
        assert_eq!(score_equity(0, -3.0, f64::NAN).equity_score, 0.0);
    }

    #[test]
    fn equity_is_bounded_and_monotonic() {
        let followers = [0, 1_000, 250_000, 499_999, 500_000, 2_000_000];
        let engagement = [0.0, 0.5, 3.5, 9.99, 10.0, 40.0];
        let velocity = [0.0, 0.1, 1.2, 1.99, 2.0, 7.0];

        for &f in &followers {
            for &e in &engagement {
                for &v in &velocity {
                    let base = score_equity(f, e, v).equity_score;
                    assert!((0.0..=100.0).contains(&base));
                    assert!(score_equity(f + 50_000, e, v).equity_score >= base);
                    assert!(score_equity(f, e + 0.5, v).equity_score >= base);
                    assert!(score_equity(f, e, v + 0.1).equity_score >= base);
                }
            }
        }
    }

    #[test]
    fn engagement_is_follower_weighted_with_mean_fallback() {
        assert_eq!(weighted_engagement(&[(9_000, 1.0), (1_000, 11.0)]), 2.0);
        assert_eq!(weighted_engagement(&[(0, 1.0), (0, 3.0)]), 2.0);
        assert_eq!(weighted_engagement(&[]), 0.0);
    }

    #[test]
    fn compose_sums_available_platforms_only() {
        let mut skipped = snapshot(Platform::Twitter, 1_000_000, 9.0, 9.0);
        skipped.data_available = false;
        let analysis = BrandAnalysis {
            brand: BrandProfile::new("Acme"),
            is_focus: true,
            platforms: vec![
                snapshot(Platform::Instagram, 200_000, 3.0, 0.7),
                snapshot(Platform::TikTok, 50_000, 5.5, 0.5),
                skipped,
            ],
        };
        let rows = compose_brand_equity(&[analysis]);
        let row = &rows[0];

        assert_eq!(row.total_followers, 250_000);
        assert_eq!(row.avg_engagement, 3.5);
        assert_eq!(row.content_velocity, 1.2);
        assert_eq!(row.scores.equity_score, 46.0);
        assert!(row.is_focus);
    }

    #[test]
    fn row_serializes_flat() {
        let row = BrandEquityRow {
            brand: "Acme".to_string(),
            is_focus: false,
            total_followers: 250_000,
            avg_engagement: 3.5,
            content_velocity: 1.2,
            scores: score_equity(250_000, 3.5, 1.2),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["equityScore"], 46.0);
        assert_eq!(json["totalFollowers"], 250_000);
    }
}
