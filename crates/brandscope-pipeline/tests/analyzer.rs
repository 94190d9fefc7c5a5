//! End-to-end analyzer runs against in-memory collaborators.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use brandscope_core::{BrandProfile, Platform, ProfileCounts, SessionFile};
use brandscope_db::ResultField;
use brandscope_pipeline::{AnalysisOptions, Analyzer};
use brandscope_sources::{
    BrowserHandle, BrowserLauncher, BrowserSession, FetchQuery, GenerationOutcome,
    SocialDataProvider, SourceError, TextGenerator,
};
use serde_json::{json, Value};

#[derive(Default)]
struct FakeProvider {
    posts: HashMap<(Platform, String), Vec<Value>>,
    profiles: HashMap<(Platform, String), Value>,
    searches: HashMap<(Platform, String), Vec<Value>>,
    failing: HashSet<Platform>,
}

impl SocialDataProvider for FakeProvider {
    async fn fetch(
        &self,
        platform: Platform,
        query: FetchQuery<'_>,
    ) -> Result<Vec<Value>, SourceError> {
        if self.failing.contains(&platform) {
            return Err(SourceError::UnexpectedStatus {
                status: 503,
                url: format!("fake://{platform}"),
            });
        }
        let records = match query {
            FetchQuery::Posts { handle, .. } => self
                .posts
                .get(&(platform, handle.to_string()))
                .cloned()
                .unwrap_or_default(),
            FetchQuery::Profile { handle } => self
                .profiles
                .get(&(platform, handle.to_string()))
                .cloned()
                .into_iter()
                .collect(),
            FetchQuery::Search { query, .. } => self
                .searches
                .get(&(platform, query.to_string()))
                .cloned()
                .unwrap_or_default(),
        };
        Ok(records)
    }
}

#[derive(Clone, Default)]
struct BrowserCounters {
    launches: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

struct FakeLauncher {
    counters: BrowserCounters,
    profiles: HashMap<(Platform, String), ProfileCounts>,
}

struct FakeBrowser {
    counters: BrowserCounters,
    profiles: HashMap<(Platform, String), ProfileCounts>,
}

impl BrowserLauncher for FakeLauncher {
    type Handle = FakeBrowser;

    async fn launch(&self) -> Result<FakeBrowser, SourceError> {
        self.counters.launches.fetch_add(1, Ordering::SeqCst);
        Ok(FakeBrowser {
            counters: self.counters.clone(),
            profiles: self.profiles.clone(),
        })
    }
}

impl BrowserHandle for FakeBrowser {
    async fn scrape_profile(
        &self,
        platform: Platform,
        handle: &str,
    ) -> Result<Option<ProfileCounts>, SourceError> {
        Ok(self.profiles.get(&(platform, handle.to_string())).copied())
    }

    async fn close(self) -> Result<(), SourceError> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FakeGenerator {
    outcome: GenerationOutcome,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl TextGenerator for FakeGenerator {
    async fn generate(&self, prompt: &str, _temperature: f32) -> GenerationOutcome {
        self.prompts
            .lock()
            .expect("prompt log lock")
            .push(prompt.to_string());
        self.outcome.clone()
    }
}

const FOCUS: &str = "Kopi Nusantara";
const RIVAL: &str = "Teh Senja";

fn own_posts(handle: &str, count: u32, likes: u64) -> Vec<Value> {
    (1..=count)
        .map(|i| {
            json!({
                "id": format!("{handle}-{i}"),
                "caption": format!("Promo kopi susu gula aren hari ini #kopi #promo {i}"),
                "ownerUsername": handle,
                "likesCount": likes,
                "commentsCount": 5,
                "timestamp": format!("2025-03-{:02}T03:00:00Z", i.min(28)),
                "type": "Image"
            })
        })
        .collect()
}

fn session() -> SessionFile {
    SessionFile {
        focus: BrandProfile::new(FOCUS)
            .with_handle(Platform::Instagram, "kopinusantara")
            .with_handle(Platform::TikTok, "kopinusantara"),
        competitors: vec![BrandProfile::new(RIVAL).with_handle(Platform::Instagram, "tehsenja")],
        universe_keywords: Some("kopi, teh".to_string()),
    }
}

fn provider() -> FakeProvider {
    let mut provider = FakeProvider::default();
    provider.failing.insert(Platform::TikTok);

    provider.posts.insert(
        (Platform::Instagram, "kopinusantara".to_string()),
        own_posts("kopinusantara", 25, 900),
    );
    provider.profiles.insert(
        (Platform::Instagram, "kopinusantara".to_string()),
        json!({"followersCount": 100_000, "postsCount": 480}),
    );
    provider.posts.insert(
        (Platform::Instagram, "tehsenja".to_string()),
        own_posts("tehsenja", 3, 1_000),
    );

    provider.searches.insert(
        (Platform::Instagram, FOCUS.to_string()),
        vec![
            json!({"id": "m1", "caption": "Ngopi sore di Kopi Nusantara, enak banget", "ownerUsername": "rina", "likesCount": 40}),
            json!({"id": "m2", "caption": "Kopi Nusantara new menu!", "ownerUsername": "kopinusantara", "likesCount": 300}),
        ],
    );
    provider.searches.insert(
        (Platform::Instagram, RIVAL.to_string()),
        vec![json!({"id": "m3", "caption": "Teh Senja terlalu manis", "ownerUsername": "budi", "likesCount": 4})],
    );

    let both = json!({"id": "c1", "caption": "Kopi Nusantara atau Teh Senja, pilih mana?"});
    let rival_only = json!({"id": "c3", "caption": "Teh Senja segar"});
    provider.searches.insert(
        (Platform::Instagram, "kopi".to_string()),
        vec![both.clone(), json!({"id": "c2", "caption": "kopi pagi dulu"})],
    );
    provider.searches.insert(
        (Platform::Instagram, "teh".to_string()),
        vec![both, rival_only],
    );
    provider
}

fn launcher(counters: &BrowserCounters) -> FakeLauncher {
    let mut profiles = HashMap::new();
    profiles.insert(
        (Platform::Instagram, "kopinusantara".to_string()),
        ProfileCounts {
            followers: Some(101_000),
            posts: Some(482),
            engagement_rate: None,
        },
    );
    FakeLauncher {
        counters: counters.clone(),
        profiles,
    }
}

fn generator(text: &str) -> FakeGenerator {
    FakeGenerator {
        outcome: GenerationOutcome::Generated(text.to_string()),
        prompts: Arc::new(Mutex::new(Vec::new())),
    }
}

#[tokio::test]
async fn full_run_degrades_per_platform_and_qualifies_insights() {
    let counters = BrowserCounters::default();
    let generator = generator(
        "Kopi Nusantara dominates reach. Teh Senja should post 3 times a week. \
         Reply to earned mentions quickly.",
    );
    let analyzer = Analyzer::new(
        provider(),
        Some(BrowserSession::new(launcher(&counters))),
        Some(generator),
        AnalysisOptions {
            max_concurrent_brands: 2,
            ..AnalysisOptions::default()
        },
        Duration::from_secs(3_600),
    );

    let report = analyzer.analyze(&session()).await;

    // Brand order and focus flag follow the session.
    assert_eq!(report.brand_analyses.len(), 2);
    let focus = &report.brand_analyses[0];
    assert!(focus.is_focus);
    assert_eq!(focus.brand.name, FOCUS);

    let snapshot = |analysis: &brandscope_metrics::BrandAnalysis, platform: Platform| {
        analysis
            .platforms
            .iter()
            .find(|s| s.platform == platform)
            .cloned()
            .expect("every platform has a snapshot")
    };

    // A failing platform degrades to an empty, configured snapshot.
    let tiktok = snapshot(focus, Platform::TikTok);
    assert!(tiktok.configured);
    assert!(!tiktok.data_available);

    // Scraper counts win for followers, provider posts are analyzed.
    let instagram = snapshot(focus, Platform::Instagram);
    assert!(instagram.data_available);
    assert_eq!(instagram.followers, 101_000);
    assert_eq!(instagram.posts_analyzed, 25);
    let quality = instagram.data_quality.expect("validated");
    assert!(!quality.issues.iter().any(|i| i.contains("Only one data source")));

    // No source reported followers for the rival, so they are estimated.
    let rival_ig = snapshot(&report.brand_analyses[1], Platform::Instagram);
    assert!(rival_ig.followers_estimated);
    assert!(!snapshot(&report.brand_analyses[1], Platform::YouTube).configured);

    assert_eq!(report.brand_equity_data.len(), 2);
    assert!(report
        .brand_equity_data
        .iter()
        .all(|row| (0.0..=100.0).contains(&row.scores.equity_score)));

    // The brand's own post in the mention search is not earned voice.
    let focus_voice = &report.voice_analysis[0];
    assert_eq!(focus_voice.own_voice.total_posts, 25);
    assert_eq!(focus_voice.earn_voice.total_mentions, 1);

    let sov = &report.share_of_voice;
    assert_eq!(sov.universe_keywords, vec!["kopi".to_string(), "teh".to_string()]);
    assert_eq!(sov.total_universe_conversations, 3);
    assert_eq!(sov.brand_shares[0].mentions, 1);
    assert_eq!(sov.brand_shares[1].mentions, 2);

    // Rival analyzed only 3 posts: frequency advice removed, caveat added.
    assert!(report.ai_insights.contains("dominates reach"));
    assert!(!report.ai_insights.contains("3 times a week"));
    assert!(report.ai_insights.contains("Teh Senja: 3 posts"));

    assert_eq!(counters.launches.load(Ordering::SeqCst), 1);
    assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_generator_yields_placeholder_and_complete_blobs() {
    let analyzer: Analyzer<FakeProvider, FakeLauncher, FakeGenerator> = Analyzer::new(
        provider(),
        None,
        None,
        AnalysisOptions::default(),
        Duration::from_secs(60),
    );

    let report = analyzer.analyze(&session()).await;
    assert!(report.ai_insights.contains("unavailable"));

    let document = report.to_blobs().expect("serializable").to_document();
    for field in ResultField::ALL {
        assert!(
            document.get(field.report_key()).is_some(),
            "missing {}",
            field.report_key()
        );
    }
    assert_eq!(
        document["brandEquityData"].as_array().map(Vec::len),
        Some(2)
    );
}

#[tokio::test]
async fn prompt_marks_focus_brand_and_low_data_warning() {
    let generator = generator("Fine.");
    let prompts = Arc::clone(&generator.prompts);
    let analyzer: Analyzer<FakeProvider, FakeLauncher, FakeGenerator> = Analyzer::new(
        provider(),
        None,
        Some(generator),
        AnalysisOptions::default(),
        Duration::from_secs(60),
    );

    let report = analyzer.analyze(&session()).await;
    assert!(report.ai_insights.starts_with("Fine."));

    let prompts = prompts.lock().expect("prompt log lock");
    assert_eq!(prompts.len(), 1, "one generation per run");
    assert!(prompts[0].contains("Kopi Nusantara (focus)"));
    assert!(prompts[0].contains("Do not recommend a posting frequency"));
}
