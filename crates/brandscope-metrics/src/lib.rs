//! Comparative social analytics for brandscope.
//!
//! Every function in this crate is pure and synchronous: it takes normalized
//! posts and profile counts and returns derived metrics. Missing or sparse
//! input degrades the output (zeros, empty lists, low confidence) rather than
//! producing an error. Network access, caching and persistence live in the
//! `brandscope-sources`, `brandscope-db` and `brandscope-pipeline` crates.

pub mod comparison;
pub mod equity;
pub mod extract;
pub mod keywords;
pub mod normalize;
pub mod quality;
pub mod sentiment;
pub mod share_of_voice;
pub mod text;
pub mod types;
pub mod universe;
pub mod voice;

pub use comparison::{build_comparison_tables, ComparisonTables};
pub use equity::{compose_brand_equity, score_equity, BrandEquityRow, EquityBreakdown};
pub use extract::{extract_platform_metrics, EngagementAssumptions, PlatformMetrics};
pub use keywords::{
    analyze_keywords, BrandKeywordAnalysis, KeywordCluster, KeywordClusteringOptions, Theme,
};
pub use normalize::{normalize_posts, normalize_profile};
pub use quality::validate_sources;
pub use sentiment::{classify_sentiment, Sentiment};
pub use share_of_voice::{analyze_share_of_voice, ShareOfVoiceAnalysis};
pub use types::{
    BrandAnalysis, ConfidenceTier, DataQualityReport, DataSource, DateRange, MergedData,
    PlatformSnapshot, SourceOrigin,
};
pub use universe::{UniverseCatalog, UniverseCatalogError};
pub use voice::{analyze_voice, VoiceMetrics};

/// Round `value` to `decimals` places, mapping non-finite input to `0.0`.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `numerator / denominator`, or `0.0` when the denominator is zero.
pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Lossy `usize`/`u64` to `f64` for averaging counts.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn as_f64(value: u64) -> f64 {
    value as f64
}
