use brandscope_core::AppConfig;
use brandscope_metrics::{
    EngagementAssumptions, KeywordClusteringOptions, UniverseCatalog, UniverseCatalogError,
};
use chrono::{FixedOffset, Offset, Utc};

/// Knobs for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub posts_per_platform: usize,
    pub mentions_per_source: usize,
    /// Brand pipelines in flight at once; at least 1.
    pub max_concurrent_brands: usize,
    /// Universe searches in flight at once; at least 1.
    pub max_concurrent_searches: usize,
    /// Clock for the posting-hour histogram.
    pub local_offset: FixedOffset,
    pub engagement: EngagementAssumptions,
    pub keywords: KeywordClusteringOptions,
    pub catalog: UniverseCatalog,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            posts_per_platform: 50,
            mentions_per_source: 30,
            max_concurrent_brands: 1,
            max_concurrent_searches: 4,
            local_offset: offset_from_hours(7),
            engagement: EngagementAssumptions::default(),
            keywords: KeywordClusteringOptions::default(),
            catalog: UniverseCatalog::default(),
        }
    }
}

impl AnalysisOptions {
    /// Options from the application config, loading the universe catalog
    /// override when one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`UniverseCatalogError`] if the catalog file cannot be read or
    /// parsed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, UniverseCatalogError> {
        let catalog = match &config.universe_catalog_path {
            Some(path) => UniverseCatalog::load(path)?,
            None => UniverseCatalog::default(),
        };
        Ok(Self {
            posts_per_platform: config.posts_per_platform,
            mentions_per_source: config.mentions_per_source,
            max_concurrent_brands: config.max_concurrent_brands.max(1),
            max_concurrent_searches: config.max_concurrent_searches.max(1),
            local_offset: offset_from_hours(config.utc_offset_hours),
            catalog,
            ..Self::default()
        })
    }
}

/// `hours` east of UTC; out-of-range offsets fall back to UTC.
#[must_use]
pub fn offset_from_hours(hours: i32) -> FixedOffset {
    hours
        .checked_mul(3_600)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}
