use thiserror::Error;

/// Failures talking to the hosted model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx answer: auth, quota, unknown model and the like
    #[error("{status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid model response: {0}")]
    Parse(String),
}

/// Why a successful reply could not be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UnusableReply {
    #[error("Model returned empty response")]
    Empty,
    #[error("Model returned no parseable advice")]
    NoAdvice,
}
