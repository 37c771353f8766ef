use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Forecast and geocoding settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Advisory generation settings
    #[serde(default)]
    pub advice: AdviceConfig,

    /// Translation service settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// SMS delivery settings
    #[serde(default)]
    pub sms: SmsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Forecast endpoint (hourly and 15-minutely requests)
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,

    /// Place-name search endpoint
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// How long a cached response stays fresh, in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Total attempts per request, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry; doubles on each further retry
    #[serde(default = "default_backoff_initial")]
    pub backoff_initial_ms: u64,

    /// Upper bound for a single retry delay
    #[serde(default = "default_backoff_max")]
    pub backoff_max_ms: u64,

    /// Optional file the response cache is loaded from and persisted to
    #[serde(default)]
    pub cache_file: Option<PathBuf>,
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_max_attempts() -> u32 {
    5
}

fn default_backoff_initial() -> u64 {
    200
}

fn default_backoff_max() -> u64 {
    5000
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            forecast_url: default_forecast_url(),
            geocoding_url: default_geocoding_url(),
            request_timeout_secs: default_request_timeout(),
            cache_ttl_secs: default_cache_ttl(),
            max_attempts: default_max_attempts(),
            backoff_initial_ms: default_backoff_initial(),
            backoff_max_ms: default_backoff_max(),
            cache_file: None,
        }
    }
}

/// Which advisory strategy turns metrics into advice lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryStrategyKind {
    /// Hosted language model; needs an inference token
    #[default]
    Model,
    /// Fixed threshold table; no network call
    Rules,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceConfig {
    #[serde(default)]
    pub strategy: AdvisoryStrategyKind,

    /// Instruction-tuned model id on the inference provider
    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// OpenAI-compatible base URL; `/chat/completions` is appended
    #[serde(default = "default_inference_url")]
    pub inference_url: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Timeout for the completion call, in seconds
    #[serde(default = "default_inference_timeout")]
    pub timeout_secs: u64,
}

fn default_model_id() -> String {
    "meta-llama/Llama-3.1-8B-Instruct".to_string()
}

fn default_inference_url() -> String {
    "https://router.huggingface.co/v1".to_string()
}

fn default_max_tokens() -> u32 {
    256
}

fn default_temperature() -> f32 {
    0.3
}

fn default_inference_timeout() -> u64 {
    60
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            strategy: AdvisoryStrategyKind::default(),
            model_id: default_model_id(),
            inference_url: default_inference_url(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_inference_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default = "default_translation_url")]
    pub api_url: String,

    /// Target language code, e.g. "SW" or "FR"
    #[serde(default = "default_target_lang")]
    pub target_lang: String,

    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

fn default_translation_url() -> String {
    "https://api-free.deepl.com/v2".to_string()
}

fn default_target_lang() -> String {
    "SW".to_string()
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_url: default_translation_url(),
            target_lang: default_target_lang(),
            timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsConfig {
    #[serde(default = "default_sms_url")]
    pub api_url: String,

    /// Sender number; `TWILIO_FROM_NUMBER` takes precedence when set
    #[serde(default)]
    pub from_number: Option<String>,

    /// Pause after each message in a bulk send, in milliseconds
    #[serde(default = "default_send_delay")]
    pub send_delay_ms: u64,

    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

fn default_sms_url() -> String {
    "https://api.twilio.com/2010-04-01".to_string()
}

fn default_send_delay() -> u64 {
    500
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            api_url: default_sms_url(),
            from_number: None,
            send_delay_ms: default_send_delay(),
            timeout_secs: default_request_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, writing defaults there if missing
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| ConfigError::io(config_path, e))?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(config_path: Option<&Path>) -> Result<(Self, ValidationResult), ConfigError> {
        let config = match config_path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.forecast_url, "weather.forecast_url", &mut result);
        self.validate_url(&self.weather.geocoding_url, "weather.geocoding_url", &mut result);
        self.validate_url(&self.advice.inference_url, "advice.inference_url", &mut result);
        self.validate_url(&self.translation.api_url, "translation.api_url", &mut result);
        self.validate_url(&self.sms.api_url, "sms.api_url", &mut result);

        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if self.weather.max_attempts == 0 {
            result.add_error("weather.max_attempts", "At least one attempt is required");
        } else if self.weather.max_attempts > 10 {
            result.add_warning(
                "weather.max_attempts",
                "More than 10 attempts per request is unusually high",
            );
        }

        if self.weather.cache_ttl_secs == 0 {
            result.add_warning("weather.cache_ttl_secs", "Response caching disabled (0 seconds)");
        }

        if self.weather.backoff_initial_ms > self.weather.backoff_max_ms {
            result.add_warning(
                "weather.backoff_initial_ms",
                "Initial backoff exceeds the maximum; every retry will wait the maximum",
            );
        }

        if self.advice.max_tokens == 0 {
            result.add_error("advice.max_tokens", "Max tokens must be greater than 0");
        }

        if !(0.0..=2.0).contains(&self.advice.temperature) {
            result.add_error("advice.temperature", "Temperature must be between 0.0 and 2.0");
        }

        if self.advice.timeout_secs == 0 {
            result.add_error("advice.timeout_secs", "Inference timeout must be greater than 0");
        }

        if self.translation.target_lang.trim().is_empty() {
            result.add_error("translation.target_lang", "Target language code is empty");
        }

        if self.sms.from_number.is_none() {
            result.add_warning(
                "sms.from_number",
                "No sender number configured - SMS needs TWILIO_FROM_NUMBER",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to a file
    pub fn save_to(&self, config_path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        std::fs::write(config_path, contents).map_err(|e| ConfigError::io(config_path, e))
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound("no platform config directory".to_string()))?
            .join("agriguard");

        Ok(config_dir.join("config.toml"))
    }
}

/// A credential that never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Provider credentials, read from the environment only.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Inference token; absence disables the model strategy without an error
    pub inference_token: Option<Secret>,
    pub deepl_auth_key: Option<Secret>,
    pub twilio_account_sid: Option<Secret>,
    pub twilio_auth_token: Option<Secret>,
    pub twilio_from_number: Option<String>,
}

impl Credentials {
    /// Read credentials from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            inference_token: get("HF_TOKEN")
                .or_else(|| get("HUGGING_FACE_HUB_TOKEN"))
                .map(Secret::new),
            deepl_auth_key: get("DEEPL_AUTH_KEY").map(Secret::new),
            twilio_account_sid: get("TWILIO_ACCOUNT_SID").map(Secret::new),
            twilio_auth_token: get("TWILIO_AUTH_TOKEN").map(Secret::new),
            twilio_from_number: get("TWILIO_FROM_NUMBER"),
        }
    }
}
