use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub provider_url: String,
    pub provider_api_key: Option<String>,
    pub scraper_url: Option<String>,
    pub llm_url: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    /// Upper bound on brand pipelines running at once; always within `1..=4`.
    pub max_concurrent_brands: usize,
    /// Provider searches in flight at once during universe collection; within `1..=16`.
    pub max_concurrent_searches: usize,
    pub profile_cache_ttl_secs: u64,
    pub posts_per_platform: usize,
    pub mentions_per_source: usize,
    /// Offset applied to post timestamps before bucketing by hour of day.
    pub utc_offset_hours: i32,
    pub universe_catalog_path: Option<PathBuf>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("provider_url", &self.provider_url)
            .field(
                "provider_api_key",
                &self.provider_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("scraper_url", &self.scraper_url)
            .field("llm_url", &self.llm_url)
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_model", &self.llm_model)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .field("max_concurrent_brands", &self.max_concurrent_brands)
            .field("max_concurrent_searches", &self.max_concurrent_searches)
            .field("profile_cache_ttl_secs", &self.profile_cache_ttl_secs)
            .field("posts_per_platform", &self.posts_per_platform)
            .field("mentions_per_source", &self.mentions_per_source)
            .field("utc_offset_hours", &self.utc_offset_hours)
            .field("universe_catalog_path", &self.universe_catalog_path)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
