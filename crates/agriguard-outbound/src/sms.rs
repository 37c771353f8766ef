//! SMS delivery through the Twilio Messages API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use crate::error::OutboundError;

pub const DEFAULT_TWILIO_URL: &str = "https://api.twilio.com/2010-04-01";
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_millis(500);

/// Per-recipient result of a bulk send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub recipient: String,
    pub success: bool,
    /// Provider message id on success, error text on failure
    pub detail: String,
}

impl DeliveryOutcome {
    pub fn delivered(recipient: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            success: true,
            detail: message_id.into(),
        }
    }

    pub fn failed(recipient: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            success: false,
            detail: error.into(),
        }
    }
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    /// Send one message; returns the provider message id.
    async fn send(&self, to: &str, body: &str) -> Result<String, OutboundError>;

    /// Pause after every send in a bulk run.
    fn send_delay(&self) -> Duration {
        DEFAULT_SEND_DELAY
    }

    /// Send `body` to every recipient in order. A failure for one recipient
    /// never stops the rest.
    async fn send_bulk(&self, recipients: &[String], body: &str) -> Vec<DeliveryOutcome> {
        let delay = self.send_delay();
        let mut outcomes = Vec::with_capacity(recipients.len());
        for to in recipients {
            let outcome = match self.send(to, body).await {
                Ok(id) => DeliveryOutcome::delivered(to.as_str(), id),
                Err(e) => {
                    tracing::warn!(recipient = %to, "SMS failed: {}", e);
                    DeliveryOutcome::failed(to.as_str(), e.to_string())
                }
            };
            outcomes.push(outcome);
            tokio::time::sleep(delay).await;
        }
        outcomes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TwilioSettings {
    pub api_url: String,
    pub send_delay: Duration,
    pub timeout: Duration,
}

impl Default for TwilioSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_TWILIO_URL.to_string(),
            send_delay: DEFAULT_SEND_DELAY,
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Deserialize)]
struct MessageResource {
    sid: String,
}

pub struct TwilioClient {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
    settings: TwilioSettings,
}

impl std::fmt::Debug for TwilioClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioClient")
            .field("account_sid", &self.account_sid)
            .field("from_number", &self.from_number)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl TwilioClient {
    /// Every credential is required; the first missing one is reported.
    pub fn new(
        account_sid: Option<String>,
        auth_token: Option<String>,
        from_number: Option<String>,
        settings: TwilioSettings,
    ) -> Result<Self, OutboundError> {
        let account_sid = required(account_sid, "TWILIO_ACCOUNT_SID")?;
        let auth_token = required(auth_token, "TWILIO_AUTH_TOKEN")?;
        let from_number = required(from_number, "TWILIO_FROM_NUMBER")?;
        let client = reqwest::Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            account_sid,
            auth_token,
            from_number,
            settings,
        })
    }
}

fn required(value: Option<String>, key: &'static str) -> Result<String, OutboundError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(OutboundError::MissingCredential(key))
}

#[async_trait]
impl SmsSender for TwilioClient {
    #[instrument(skip(self, body))]
    async fn send(&self, to: &str, body: &str) -> Result<String, OutboundError> {
        let url = format!(
            "{}/Accounts/{}/Messages.json",
            self.settings.api_url.trim_end_matches('/'),
            self.account_sid
        );
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("From", self.from_number.as_str()), ("To", to), ("Body", body)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(OutboundError::from_body(status.as_u16(), &text));
        }

        let message: MessageResource = response
            .json()
            .await
            .map_err(|e| OutboundError::Parse(e.to_string()))?;
        tracing::debug!(sid = %message.sid, "SMS accepted");
        Ok(message.sid)
    }

    fn send_delay(&self) -> Duration {
        self.settings.send_delay
    }
}
