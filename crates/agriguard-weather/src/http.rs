//! Shared GET client: response cache in front, retry behind.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::instrument;
use url::Url;

use crate::cache::{cache_key, ResponseCache};
use crate::retry::{send_with_retry, RetryPolicy};
use crate::types::HttpError;

const USER_AGENT: &str = concat!("AgriGuard/", env!("CARGO_PKG_VERSION"));

#[derive(Debug)]
pub struct CachedHttpClient {
    client: Client,
    cache: Arc<ResponseCache>,
    retry: RetryPolicy,
}

impl CachedHttpClient {
    pub fn new(
        timeout: Duration,
        cache: Arc<ResponseCache>,
        retry: RetryPolicy,
    ) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            cache,
            retry,
        })
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// GET `base_url` with `query` and return the body text.
    ///
    /// Only 2xx bodies are cached. Any other status comes back as
    /// [`HttpError::Status`] carrying the body, after retries for transient
    /// statuses are exhausted.
    #[instrument(skip(self, query))]
    pub async fn get_text(
        &self,
        base_url: &str,
        query: &[(&str, String)],
    ) -> Result<String, HttpError> {
        let url = Url::parse_with_params(base_url, query)?;
        let key = cache_key(&url);

        if let Some(body) = self.cache.get(&key) {
            tracing::debug!("Cache hit");
            return Ok(body);
        }

        let response = send_with_retry(&self.retry, || self.client.get(url.clone()).send()).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "Request failed");
            return Err(HttpError::Status {
                status: status.as_u16(),
                body,
            });
        }

        self.cache.insert(key, body.clone());
        Ok(body)
    }
}
