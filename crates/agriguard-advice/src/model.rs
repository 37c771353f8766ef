//! Hosted language model strategy over an OpenAI-compatible
//! chat-completions endpoint (Hugging Face inference router by default).

use std::fmt;
use std::time::Duration;

use agriguard_weather::ForecastMetrics;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::ModelError;
use crate::parse::parse_reply;
use crate::prompt::build_prompt;
use crate::strategy::{AdviceOutcome, AdvisoryResult, AdvisoryStrategy};

pub const DEFAULT_MODEL_ID: &str = "meta-llama/Llama-3.1-8B-Instruct";
pub const DEFAULT_INFERENCE_URL: &str = "https://router.huggingface.co/v1";

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model_id: String,
    /// Base URL; `/chat/completions` is appended
    pub inference_url: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            inference_url: DEFAULT_INFERENCE_URL.to_string(),
            max_tokens: 256,
            temperature: 0.3,
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct ModelAdvisor {
    client: Client,
    settings: ModelSettings,
    token: Option<String>,
}

impl fmt::Debug for ModelAdvisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelAdvisor")
            .field("settings", &self.settings)
            .field("configured", &self.token.is_some())
            .finish()
    }
}

impl ModelAdvisor {
    /// `token` is the inference API credential; `None` makes every call
    /// return [`AdviceOutcome::Unconfigured`].
    pub fn new(settings: ModelSettings, token: Option<String>) -> Result<Self, ModelError> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            settings,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Send one user prompt and return the reply text (possibly empty).
    #[instrument(skip(self, token, prompt), fields(model = %self.settings.model_id))]
    async fn complete(&self, token: &str, prompt: &str) -> Result<String, ModelError> {
        let url = format!(
            "{}/chat/completions",
            self.settings.inference_url.trim_end_matches('/')
        );
        let request = ChatRequest {
            model: &self.settings.model_id,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Chat completion rejected");
            return Err(ModelError::Api {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Parse(e.to_string()))?;
        let choice = reply
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::Parse("No completion choices returned".to_string()))?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

#[async_trait]
impl AdvisoryStrategy for ModelAdvisor {
    fn name(&self) -> &'static str {
        "model"
    }

    async fn advise(&self, location: &str, metrics: &ForecastMetrics) -> AdviceOutcome {
        let Some(token) = self.token.as_deref() else {
            tracing::info!("No inference token configured, skipping model advice");
            return AdviceOutcome::Unconfigured;
        };

        let prompt = build_prompt(location, metrics);
        let text = match self.complete(token, &prompt).await {
            Ok(text) => text,
            Err(e) => return AdviceOutcome::Failed(e.to_string()),
        };

        match parse_reply(&text) {
            Ok(lines) => {
                tracing::debug!(lines = lines.len(), "Parsed model advice");
                AdviceOutcome::Advice(AdvisoryResult::new(lines))
            }
            Err(reason) => AdviceOutcome::Unusable(reason.to_string()),
        }
    }
}
