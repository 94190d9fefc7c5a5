//! The comparative analysis run.
//!
//! For each brand: fetch every configured platform, validate the sources,
//! extract platform metrics, then cluster keywords and measure voice. Brands
//! run through a bounded, order-preserving stream. Share of voice, equity
//! and the comparison tables are computed once across all brands, and the
//! insight text is generated last.

use std::time::Duration;

use brandscope_core::{BrandProfile, Platform, ProfileCounts, SessionFile};
use brandscope_metrics::{
    analyze_keywords, analyze_share_of_voice, analyze_voice, build_comparison_tables,
    compose_brand_equity, BrandAnalysis, PlatformSnapshot, ShareOfVoiceAnalysis, VoiceMetrics,
};
use brandscope_sources::{
    fetch_posts, fetch_profile, fetch_universe_conversations, search_mentions, BrowserLauncher,
    BrowserSession, DisabledGenerator, ProfileCache, SocialDataProvider, SourceError,
    TextGenerator,
};
use futures::future::join_all;
use futures::stream::{self, StreamExt};

use crate::collect::{build_snapshot, data_sources};
use crate::insights::{build_prompt, finalize_insights, INSIGHT_TEMPERATURE};
use crate::options::AnalysisOptions;
use crate::report::{AnalysisReport, BrandKeywords};

struct BrandRun {
    analysis: BrandAnalysis,
    keywords: BrandKeywords,
    voice: VoiceMetrics,
}

/// Runs comparative analyses against one set of collaborators.
///
/// The browser session, when present, is launched on the first scrape and
/// closed at the end of every [`Analyzer::analyze`] call.
pub struct Analyzer<P, L: BrowserLauncher, G> {
    provider: P,
    browser: Option<BrowserSession<L>>,
    generator: Option<G>,
    profile_cache: ProfileCache,
    scrape_cache: ProfileCache,
    options: AnalysisOptions,
}

impl<P, L, G> Analyzer<P, L, G>
where
    P: SocialDataProvider,
    L: BrowserLauncher,
    G: TextGenerator,
{
    /// `browser: None` disables profile scraping; `generator: None` yields
    /// the "insights unavailable" placeholder.
    #[must_use]
    pub fn new(
        provider: P,
        browser: Option<BrowserSession<L>>,
        generator: Option<G>,
        options: AnalysisOptions,
        profile_cache_ttl: Duration,
    ) -> Self {
        Self {
            provider,
            browser,
            generator,
            profile_cache: ProfileCache::new(profile_cache_ttl),
            scrape_cache: ProfileCache::new(profile_cache_ttl),
            options,
        }
    }

    /// Analyze the focus brand and its competitors.
    ///
    /// Never fails: collaborator errors are logged and degrade the affected
    /// platform, brand or insight text.
    pub async fn analyze(&self, session: &SessionFile) -> AnalysisReport {
        let brands: Vec<(&BrandProfile, bool)> = session
            .brands()
            .enumerate()
            .map(|(i, brand)| (brand, i == 0))
            .collect();
        tracing::info!(brands = brands.len(), "starting comparative analysis");

        let runs: Vec<BrandRun> = stream::iter(brands)
            .map(|(brand, is_focus)| self.analyze_brand(brand, is_focus))
            .buffered(self.options.max_concurrent_brands.max(1))
            .collect()
            .await;

        let share_of_voice = self.share_of_voice(session).await;

        let mut brand_analyses = Vec::with_capacity(runs.len());
        let mut keyword_clustering = Vec::with_capacity(runs.len());
        let mut voice_analysis = Vec::with_capacity(runs.len());
        for run in runs {
            brand_analyses.push(run.analysis);
            keyword_clustering.push(run.keywords);
            voice_analysis.push(run.voice);
        }

        let mut report = AnalysisReport {
            brand_equity_data: compose_brand_equity(&brand_analyses),
            comparison: build_comparison_tables(&brand_analyses),
            brand_analyses,
            keyword_clustering,
            voice_analysis,
            share_of_voice,
            ai_insights: String::new(),
        };
        report.ai_insights = self.insights(&report).await;

        self.close_browser().await;
        tracing::info!("comparative analysis finished");
        report
    }

    async fn analyze_brand(&self, brand: &BrandProfile, is_focus: bool) -> BrandRun {
        tracing::info!(brand = %brand.name, is_focus, "analyzing brand");

        let platforms: Vec<PlatformSnapshot> =
            join_all(Platform::ALL.into_iter().map(|platform| async move {
                match brand.handle(platform) {
                    Some(handle) => self.snapshot_platform(brand, platform, handle).await,
                    None => PlatformSnapshot::unavailable(platform, None),
                }
            }))
            .await;

        let keywords = BrandKeywords {
            brand: brand.name.clone(),
            platforms: platforms
                .iter()
                .filter(|s| s.data_available)
                .map(|s| analyze_keywords(s.platform, &s.raw_posts, &self.options.keywords))
                .collect(),
        };

        let mentions =
            search_mentions(&self.provider, &brand.name, self.options.mentions_per_source).await;
        let voice = analyze_voice(brand, &platforms, &mentions.posts);

        tracing::debug!(
            brand = %brand.name,
            platforms_with_data = platforms.iter().filter(|s| s.data_available).count(),
            mention_candidates = mentions.posts.len(),
            "brand analysis complete"
        );

        BrandRun {
            analysis: BrandAnalysis {
                brand: brand.clone(),
                is_focus,
                platforms,
            },
            keywords,
            voice,
        }
    }

    async fn snapshot_platform(
        &self,
        brand: &BrandProfile,
        platform: Platform,
        handle: &str,
    ) -> PlatformSnapshot {
        let (posts, profile, scraped) = tokio::join!(
            fetch_posts(
                &self.provider,
                platform,
                handle,
                self.options.posts_per_platform
            ),
            fetch_profile(&self.provider, &self.profile_cache, platform, handle),
            self.scrape_profile(platform, handle),
        );

        let posts = log_failure(posts, brand, platform, "post fetch failed");
        let profile = log_failure(profile, brand, platform, "profile fetch failed");

        let sources = data_sources(posts.as_deref(), profile, scraped);
        if sources.is_empty() {
            tracing::warn!(
                brand = %brand.name,
                %platform,
                handle,
                "no usable data; platform marked unavailable"
            );
            return PlatformSnapshot::unavailable(platform, Some(handle.to_string()));
        }

        build_snapshot(
            platform,
            handle,
            posts.unwrap_or_default(),
            &sources,
            &self.options,
        )
    }

    /// Scraped counters, through the scrape cache. Failures read as `None`.
    async fn scrape_profile(&self, platform: Platform, handle: &str) -> Option<ProfileCounts> {
        let browser = self.browser.as_ref()?;
        if let Some(hit) = self.scrape_cache.get(platform, handle).await {
            tracing::debug!(%platform, handle, "scrape cache hit");
            return Some(hit);
        }
        match browser.scrape(platform, handle).await {
            Ok(Some(counts)) => {
                self.scrape_cache.insert(platform, handle, counts).await;
                Some(counts)
            }
            Ok(None) => {
                tracing::debug!(%platform, handle, "scraper returned no profile data");
                None
            }
            Err(e) => {
                tracing::warn!(%platform, handle, error = %e, "profile scrape failed");
                None
            }
        }
    }

    async fn share_of_voice(&self, session: &SessionFile) -> ShareOfVoiceAnalysis {
        let names: Vec<&str> = session.brands().map(|b| b.name.as_str()).collect();
        let keywords = self
            .options
            .catalog
            .resolve(session.universe_keywords.as_deref(), &names);

        let conversations = fetch_universe_conversations(
            &self.provider,
            &keywords,
            self.options.mentions_per_source,
            self.options.max_concurrent_searches,
        )
        .await;
        if !conversations.failed_sources.is_empty() {
            tracing::warn!(
                failed = conversations.failed_sources.len(),
                "some universe searches failed; share of voice uses partial data"
            );
        }

        analyze_share_of_voice(keywords, &names, &conversations.posts)
    }

    async fn insights(&self, report: &AnalysisReport) -> String {
        let prompt = build_prompt(report);
        let outcome = match &self.generator {
            Some(generator) => generator.generate(&prompt, INSIGHT_TEMPERATURE).await,
            None => DisabledGenerator.generate(&prompt, INSIGHT_TEMPERATURE).await,
        };
        finalize_insights(outcome, &report.brand_analyses)
    }

    async fn close_browser(&self) {
        if let Some(browser) = &self.browser {
            if let Err(e) = browser.close().await {
                tracing::warn!(error = %e, "failed to close browser session");
            }
        }
    }
}

fn log_failure<T>(
    result: Result<T, SourceError>,
    brand: &BrandProfile,
    platform: Platform,
    message: &'static str,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(brand = %brand.name, %platform, error = %e, "{message}");
            None
        }
    }
}

