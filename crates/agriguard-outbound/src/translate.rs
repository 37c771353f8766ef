//! DeepL translation client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::OutboundError;

pub const DEFAULT_DEEPL_URL: &str = "https://api-free.deepl.com/v2";

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into `target_lang` (a DeepL language code such as "SW").
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, OutboundError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranslationSettings {
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_DEEPL_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    text: [&'a str; 1],
    target_lang: &'a str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
struct Translation {
    text: String,
}

pub struct DeepLTranslator {
    client: reqwest::Client,
    auth_key: String,
    api_url: String,
}

impl std::fmt::Debug for DeepLTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepLTranslator")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl DeepLTranslator {
    /// Fails with `MissingCredential` when no auth key is configured.
    pub fn new(auth_key: Option<String>, settings: TranslationSettings) -> Result<Self, OutboundError> {
        let auth_key = auth_key
            .filter(|k| !k.is_empty())
            .ok_or(OutboundError::MissingCredential("DEEPL_AUTH_KEY"))?;
        let client = reqwest::Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            auth_key,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Translator for DeepLTranslator {
    #[instrument(skip(self, text), fields(chars = text.len()))]
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, OutboundError> {
        let url = format!("{}/translate", self.api_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("DeepL-Auth-Key {}", self.auth_key))
            .json(&TranslateRequest {
                text: [text],
                target_lang,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Translation rejected");
            return Err(OutboundError::from_body(status.as_u16(), &body));
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| OutboundError::Parse(e.to_string()))?;
        if parsed.translations.is_empty() {
            return Err(OutboundError::Parse("No translations returned".to_string()));
        }

        Ok(parsed
            .translations
            .into_iter()
            .map(|t| t.text)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
