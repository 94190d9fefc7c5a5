//! External collaborators for brandscope: the social data provider, the
//! remote browser profile scraper, the text generator, and the caching and
//! retry plumbing around them.

pub mod cache;
pub mod error;
pub mod generate;
pub mod mentions;
pub mod provider;
pub(crate) mod retry;
pub mod scraper;

pub use cache::{normalize_username, ProfileCache};
pub use error::SourceError;
pub use generate::{
    ChatCompletionsGenerator, DisabledGenerator, GenerationFailure, GenerationFailureKind,
    GenerationOutcome, TextGenerator,
};
pub use mentions::{
    conversation_key, dedup_conversations, fetch_universe_conversations, search_mentions,
    MentionSearch,
};
pub use provider::{
    fetch_posts, fetch_profile, search_posts, FetchQuery, HttpSocialProvider, SocialDataProvider,
};
pub use retry::RetryPolicy;
pub use scraper::{
    BrowserHandle, BrowserLauncher, BrowserSession, RemoteBrowser, RemoteBrowserLauncher,
};
