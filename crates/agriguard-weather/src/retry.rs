//! Exponential backoff for weather requests.
//!
//! Transient failures are retried: timeouts, connection failures, 5xx,
//! 408 and 429. Everything else, including 4xx answers from the geocoder,
//! is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use reqwest::{Response, StatusCode};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 200;
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 5000;

/// How many times a request is sent and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one; never below 1
    pub max_attempts: u32,
    /// Wait before the second attempt (doubles for each later one)
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_ATTEMPTS,
            DEFAULT_INITIAL_BACKOFF_MS,
            DEFAULT_MAX_BACKOFF_MS,
        )
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff: Duration::from_millis(initial_backoff_ms),
            max_backoff: Duration::from_millis(max_backoff_ms),
        }
    }

    /// Single attempt, no waiting. Used by tests and one-shot probes.
    pub fn no_retry() -> Self {
        Self::new(1, 0, 0)
    }

    /// Wait before attempt number `attempt` (1-based; attempt 1 never waits).
    pub fn backoff_before(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let factor = 2u64.saturating_pow(attempt - 2);
        let initial_ms = u64::try_from(self.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max_backoff.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(initial_ms.saturating_mul(factor).min(max_ms))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    GiveUp,
}

/// Classify a transport error.
pub fn classify_error(error: &reqwest::Error) -> RetryDecision {
    if error.is_timeout() || error.is_connect() {
        return RetryDecision::Retry;
    }
    if let Some(status) = error.status() {
        return classify_status(status);
    }
    RetryDecision::GiveUp
}

/// Classify a response status.
pub fn classify_status(status: StatusCode) -> RetryDecision {
    if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
    {
        RetryDecision::Retry
    } else {
        RetryDecision::GiveUp
    }
}

/// Send a request until it succeeds, fails permanently, or attempts run out.
///
/// A retryable status on the final attempt is handed back as a response so
/// the caller can read the body for its error message.
pub async fn send_with_retry<F, Fut>(
    policy: &RetryPolicy,
    send: F,
) -> Result<Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Response, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        let wait = policy.backoff_before(attempt);
        if !wait.is_zero() {
            tracing::debug!(attempt, ?wait, "Backing off before retry");
            tokio::time::sleep(wait).await;
        }

        let exhausted = attempt >= policy.max_attempts;
        match send().await {
            Ok(response) => {
                let status = response.status();
                if classify_status(status) == RetryDecision::Retry && !exhausted {
                    tracing::warn!(
                        "Request returned {}, attempt {} of {}",
                        status,
                        attempt,
                        policy.max_attempts
                    );
                } else {
                    if attempt > 1 {
                        tracing::info!("Request completed after {} attempts", attempt);
                    }
                    return Ok(response);
                }
            }
            Err(e) => {
                if classify_error(&e) == RetryDecision::GiveUp || exhausted {
                    if exhausted && attempt > 1 {
                        tracing::error!("All {} attempts failed: {}", policy.max_attempts, e);
                    }
                    return Err(e);
                }
                tracing::warn!(
                    "Transient error on attempt {} of {}: {}",
                    attempt,
                    policy.max_attempts,
                    e
                );
            }
        }
        attempt += 1;
    }
}
