//! Centralized error types for AgriGuard.
//!
//! Every failure that reaches the operator is one of these variants. The
//! pipeline never aborts on a single provider outage; instead the failure is
//! turned into a display line with `user_message()`.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No coordinates could be obtained for the requested place.
    #[error("Location error: {0}")]
    Location(String),

    /// The primary hourly forecast could not be fetched or parsed.
    #[error("Forecast unavailable: {0}")]
    Forecast(String),

    /// The language model was configured but did not produce usable advice.
    #[error("Advice unavailable: {0}")]
    Advice(String),

    /// Translation or SMS delivery failed.
    #[error("Delivery error: {0}")]
    Outbound(String),
}

impl AppError {
    /// Returns the line shown to the operator in place of the advisory.
    ///
    /// Location and forecast failures deliberately hide the underlying reason;
    /// advice failures carry the provider's error text because the remedy
    /// (quota, token, model id) depends on it.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(e) => e.user_message().to_string(),
            AppError::Location(_) => "Location Error".to_string(),
            AppError::Forecast(_) => "⚠️ Forecast unavailable.".to_string(),
            AppError::Advice(reason) => format!("⚠️ AI advice unavailable: {}", reason),
            AppError::Outbound(reason) => format!("⚠️ Delivery failed: {}", reason),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No config path was given and the platform has no config directory.
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    /// Validation failed; carries the joined field errors.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "No configuration directory. Pass --config <file>.",
            ConfigError::Io { .. } => "Configuration file could not be read or written.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_conversion() {
        let err: AppError = ConfigError::io(
            Path::new("/nonexistent/config.toml"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        )
        .into();
        assert!(matches!(err, AppError::Config(ConfigError::Io { .. })));
        assert_eq!(
            err.user_message(),
            "Configuration file could not be read or written."
        );
        assert!(err.to_string().contains("/nonexistent/config.toml"));
    }

    #[test]
    fn test_location_and_forecast_hide_reason() {
        let err = AppError::Location("No coordinates found for 'Atlantis'".into());
        assert_eq!(err.user_message(), "Location Error");

        let err = AppError::Forecast("HTTP 503".into());
        assert_eq!(err.user_message(), "⚠️ Forecast unavailable.");
    }

    #[test]
    fn test_advice_message_carries_provider_text() {
        let err = AppError::Advice("401 Unauthorized".into());
        assert_eq!(err.user_message(), "⚠️ AI advice unavailable: 401 Unauthorized");
    }
}
