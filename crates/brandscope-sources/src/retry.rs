//! Exponential back-off with jitter for provider and scraper calls.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! errors for which [`SourceError::is_retriable`] holds. Everything else is
//! returned on the first failure.

use std::future::Future;
use std::time::Duration;

use crate::error::SourceError;

const MAX_DELAY_MS: u64 = 60_000;

/// Retry policy shared by the HTTP clients in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    /// Base delay; the n-th retry waits `base * 2^(n-1)` ms ± 25%.
    pub backoff_base_ms: u64,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, backoff_base_secs: u64) -> Self {
        Self {
            max_retries,
            backoff_base_ms: backoff_base_secs.saturating_mul(1_000),
        }
    }

    /// No retries; used in tests against mock servers.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_base_ms: 0,
        }
    }
}

/// Runs `operation`, retrying transient failures per `policy`.
///
/// | Attempt | Sleep before next attempt |
/// |---------|---------------------------|
/// | 1       | base × 2⁰ ± 25 % jitter   |
/// | 2       | base × 2¹ ± 25 % jitter   |
/// | 3       | base × 2² ± 25 % jitter   |
///
/// Delay is capped at 60 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_retriable() || attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = policy
                    .backoff_base_ms
                    .saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms,
                    error = %err,
                    "transient source error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// Map a non-success response to the matching [`SourceError`].
pub(crate) fn check_status(
    response: reqwest::Response,
    service: &str,
) -> Result<reqwest::Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(SourceError::RateLimited {
            service: service.to_owned(),
            retry_after_secs,
        });
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(SourceError::NotFound { url });
    }
    Err(SourceError::UnexpectedStatus {
        status: status.as_u16(),
        url,
    })
}
