//! Translation and SMS delivery errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutboundError {
    /// Required environment credential is not set
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Provider rejected the request; `message` is the provider's own text
    #[error("{status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid provider response: {0}")]
    Parse(String),
}

impl OutboundError {
    /// Build an `Api` error from a provider error body, preferring its
    /// JSON `message` field.
    pub(crate) fn from_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or_else(|| body.trim().to_string());
        Self::Api { status, message }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::MissingCredential(key) => format!("Set {} in .env or environment and retry.", key),
            Self::Network(_) => "Network error. Check your connection.".to_string(),
            Self::Api { message, .. } => message.clone(),
            Self::Parse(_) => "Unexpected response from provider".to_string(),
        }
    }
}
