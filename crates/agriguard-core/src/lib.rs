pub mod config;
pub mod error;

pub use config::{
    AdviceConfig, AdvisoryStrategyKind, Config, Credentials, Secret, SmsConfig,
    TranslationConfig, ValidationResult, WeatherConfig,
};
pub use error::{AppError, ConfigError};

use anyhow::Result;

/// Initialize logging and load a `.env` file from the working directory, if any.
pub fn init() -> Result<()> {
    // A missing .env is normal; credentials may already be in the environment.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match dotenv {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => tracing::debug!("No .env file found"),
        Err(e) => tracing::warn!("Failed to read .env file: {}", e),
    }

    tracing::info!("AgriGuard core initialized");
    Ok(())
}
