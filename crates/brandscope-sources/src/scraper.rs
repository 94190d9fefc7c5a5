//! Browser-automation profile scraping.
//!
//! A [`BrowserSession`] owns at most one live browser. It is launched on the
//! first scrape, shared by every scrape in an analysis run behind an async
//! mutex (so concurrent brand pipelines take turns), and torn down with
//! [`BrowserSession::close`] when the run ends.

use std::future::Future;
use std::time::Duration;

use brandscope_core::{AppConfig, Platform, ProfileCounts};
use brandscope_metrics::normalize_profile;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::SourceError;
use crate::retry::{check_status, retry_with_backoff, RetryPolicy};

/// Path-segment escaping that leaves the unreserved `-._~` intact, so
/// handles like `kopi.kenangan` reach the scraper verbatim.
const HANDLE_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn handle_segment(handle: &str) -> String {
    utf8_percent_encode(handle.trim().trim_start_matches('@'), HANDLE_SEGMENT).to_string()
}

/// Starts browsers.
pub trait BrowserLauncher: Send + Sync {
    type Handle: BrowserHandle;

    fn launch(&self) -> impl Future<Output = Result<Self::Handle, SourceError>> + Send;
}

/// A running browser.
pub trait BrowserHandle: Send + Sync {
    /// Read account counters from a profile page. `Ok(None)` means the page
    /// yielded nothing usable, which is distinct from zero counts.
    fn scrape_profile(
        &self,
        platform: Platform,
        handle: &str,
    ) -> impl Future<Output = Result<Option<ProfileCounts>, SourceError>> + Send;

    fn close(self) -> impl Future<Output = Result<(), SourceError>> + Send;
}

/// Lazily launched, explicitly closed browser shared across one run.
pub struct BrowserSession<L: BrowserLauncher> {
    launcher: L,
    handle: Mutex<Option<L::Handle>>,
}

impl<L: BrowserLauncher> BrowserSession<L> {
    #[must_use]
    pub fn new(launcher: L) -> Self {
        Self {
            launcher,
            handle: Mutex::new(None),
        }
    }

    /// Scrape a profile, launching the browser if none is running.
    ///
    /// # Errors
    ///
    /// Returns the launcher's error if the browser cannot start, or the
    /// handle's error if the scrape fails.
    pub async fn scrape(
        &self,
        platform: Platform,
        handle: &str,
    ) -> Result<Option<ProfileCounts>, SourceError> {
        let mut guard = self.handle.lock().await;
        if guard.is_none() {
            tracing::info!("launching browser session");
            *guard = Some(self.launcher.launch().await?);
        }
        match guard.as_ref() {
            Some(browser) => browser.scrape_profile(platform, handle).await,
            None => Err(SourceError::Browser("browser handle missing after launch".to_owned())),
        }
    }

    pub async fn is_open(&self) -> bool {
        self.handle.lock().await.is_some()
    }

    /// Close the browser if one is running. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns the handle's error if teardown fails; the session is
    /// considered closed either way.
    pub async fn close(&self) -> Result<(), SourceError> {
        let browser = self.handle.lock().await.take();
        match browser {
            Some(browser) => {
                tracing::info!("closing browser session");
                browser.close().await
            }
            None => Ok(()),
        }
    }
}

/// Launches browsers on a remote automation service.
///
/// `POST {base}/sessions` returns `{"id": ".."}`; profiles are read with
/// `GET {base}/sessions/{id}/profiles/{platform}/{handle}`, which answers
/// with a profile record or `null`; `DELETE {base}/sessions/{id}` closes.
#[derive(Clone)]
pub struct RemoteBrowserLauncher {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

#[derive(Debug, Deserialize)]
struct SessionCreated {
    id: String,
}

impl RemoteBrowserLauncher {
    /// # Errors
    ///
    /// Returns [`SourceError::Disabled`] when no scraper URL is configured,
    /// or [`SourceError::Http`] if the client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        let base_url = config
            .scraper_url
            .as_deref()
            .ok_or(SourceError::Disabled("profile scraper"))?;
        Self::new(
            base_url,
            config.request_timeout_secs,
            &config.user_agent,
            RetryPolicy::new(config.max_retries, config.retry_backoff_base_secs),
        )
    }

    /// # Errors
    ///
    /// Returns [`SourceError::Http`] if the client cannot be built.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            retry,
        })
    }
}

impl BrowserLauncher for RemoteBrowserLauncher {
    type Handle = RemoteBrowser;

    async fn launch(&self) -> Result<RemoteBrowser, SourceError> {
        let url = format!("{}/sessions", self.base_url);
        let created: SessionCreated = retry_with_backoff(self.retry, || {
            let url = url.clone();
            async move {
                let response = check_status(self.client.post(&url).send().await?, "scraper")?;
                let body = response.text().await?;
                serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
                    context: "scraper session".to_owned(),
                    source: e,
                })
            }
        })
        .await?;

        Ok(RemoteBrowser {
            client: self.client.clone(),
            session_url: format!("{}/sessions/{}", self.base_url, created.id),
            retry: self.retry,
        })
    }
}

pub struct RemoteBrowser {
    client: Client,
    session_url: String,
    retry: RetryPolicy,
}

impl BrowserHandle for RemoteBrowser {
    async fn scrape_profile(
        &self,
        platform: Platform,
        handle: &str,
    ) -> Result<Option<ProfileCounts>, SourceError> {
        let url = format!(
            "{}/profiles/{}/{}",
            self.session_url,
            platform.as_str(),
            handle_segment(handle)
        );
        let record: serde_json::Value = retry_with_backoff(self.retry, || {
            let url = url.clone();
            async move {
                let response = check_status(self.client.get(&url).send().await?, "scraper")?;
                let body = response.text().await?;
                serde_json::from_str(&body).map_err(|e| SourceError::Deserialize {
                    context: format!("scraped {platform} profile"),
                    source: e,
                })
            }
        })
        .await?;

        if record.is_null() {
            return Ok(None);
        }
        let counts = normalize_profile(&record);
        Ok((!counts.is_empty()).then_some(counts))
    }

    async fn close(self) -> Result<(), SourceError> {
        let response = self.client.delete(&self.session_url).send().await?;
        check_status(response, "scraper")?;
        Ok(())
    }
}
