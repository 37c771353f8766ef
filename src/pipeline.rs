//! Resolver → forecast → metrics → advice, producing one report.

use std::sync::Arc;
use std::time::Duration;

use agriguard_advice::{
    AdviceOutcome, AdvisoryStrategy, ModelAdvisor, ModelSettings, RuleAdvisor,
};
use agriguard_core::{AdvisoryStrategyKind, AppError, Config, Credentials, WeatherConfig};
use agriguard_outbound::{advice_lines, Report};
use agriguard_weather::{
    CachedHttpClient, ForecastClient, Geocoder, LocationError, LocationQuery, LocationResolver,
    ResolveOutcome, ResponseCache, RetryPolicy,
};
use anyhow::Result;

/// Outcome of one run.
#[derive(Debug)]
pub struct DailyAdvice {
    /// Geocoding confirmation or failure, when a place name was looked up
    pub status_line: Option<String>,
    pub report: Report,
    /// Whether the report holds real advice rather than an error line
    pub advised: bool,
}

pub struct Pipeline {
    resolver: LocationResolver,
    forecast: ForecastClient,
    cache: Arc<ResponseCache>,
    strategy: Box<dyn AdvisoryStrategy>,
}

impl Pipeline {
    pub fn new(
        resolver: LocationResolver,
        forecast: ForecastClient,
        cache: Arc<ResponseCache>,
        strategy: Box<dyn AdvisoryStrategy>,
    ) -> Self {
        Self {
            resolver,
            forecast,
            cache,
            strategy,
        }
    }

    pub fn from_config(
        config: &Config,
        credentials: &Credentials,
        strategy: AdvisoryStrategyKind,
    ) -> Result<Self> {
        let weather = &config.weather;
        let cache = Arc::new(open_cache(weather));
        let http = Arc::new(CachedHttpClient::new(
            Duration::from_secs(weather.request_timeout_secs),
            cache.clone(),
            RetryPolicy::new(
                weather.max_attempts,
                weather.backoff_initial_ms,
                weather.backoff_max_ms,
            ),
        )?);

        let resolver = LocationResolver::new(Geocoder::new_with_url(
            http.clone(),
            weather.geocoding_url.clone(),
        ));
        let forecast = ForecastClient::new_with_url(http, weather.forecast_url.clone());

        let strategy: Box<dyn AdvisoryStrategy> = match strategy {
            AdvisoryStrategyKind::Rules => Box::new(RuleAdvisor::new()),
            AdvisoryStrategyKind::Model => {
                let advice = &config.advice;
                let settings = ModelSettings {
                    model_id: advice.model_id.clone(),
                    inference_url: advice.inference_url.clone(),
                    max_tokens: advice.max_tokens,
                    temperature: advice.temperature,
                    timeout: Duration::from_secs(advice.timeout_secs),
                };
                let token = credentials
                    .inference_token
                    .as_ref()
                    .map(|t| t.expose().to_string());
                Box::new(ModelAdvisor::new(settings, token)?)
            }
        };

        Ok(Self::new(resolver, forecast, cache, strategy))
    }

    pub async fn run(&self, query: &LocationQuery) -> DailyAdvice {
        let outcome = self.resolver.resolve(query).await;
        let status_line = outcome.status_line();

        let (display_name, location) = match outcome {
            ResolveOutcome::Found(location) => (location.display_name.clone(), location),
            ResolveOutcome::NotFound { query: name } => {
                let reason = LocationError::NotFound(name.clone()).to_string();
                return failed(status_line, name, AppError::Location(reason));
            }
            ResolveOutcome::ProviderError { reason } => {
                return failed(status_line, query_label(query), AppError::Location(reason));
            }
        };

        let metrics = match self
            .forecast
            .fetch(&location.coordinates)
            .await
            .and_then(|raw| raw.metrics())
        {
            Ok(metrics) => metrics,
            Err(e) => {
                return failed(status_line, display_name, AppError::Forecast(e.to_string()));
            }
        };
        tracing::debug!(?metrics, "Derived forecast metrics");

        tracing::info!(strategy = self.strategy.name(), "Generating advice");
        let advice = self.strategy.advise(&display_name, &metrics).await;
        if let AdviceOutcome::Failed(reason) | AdviceOutcome::Unusable(reason) = &advice {
            tracing::warn!("Advice unavailable: {}", reason);
        }

        DailyAdvice {
            status_line,
            advised: advice.is_advice(),
            report: Report::new(display_name, advice_lines(&advice)),
        }
    }

    /// Write the response cache back to disk, if it is file-backed.
    pub fn persist_cache(&self) {
        if let Err(e) = self.cache.persist() {
            tracing::warn!("Failed to persist response cache: {}", e);
        }
    }
}

/// A report whose only line is the operator message for `error`.
fn failed(status_line: Option<String>, display_name: String, error: AppError) -> DailyAdvice {
    tracing::warn!("{}", error);
    DailyAdvice {
        status_line,
        report: Report::new(display_name, vec![error.user_message()]),
        advised: false,
    }
}

fn open_cache(weather: &WeatherConfig) -> ResponseCache {
    let ttl = Duration::from_secs(weather.cache_ttl_secs);
    match &weather.cache_file {
        Some(path) => ResponseCache::with_file(path, ttl).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable cache file {}: {}", path.display(), e);
            ResponseCache::new(ttl)
        }),
        None => ResponseCache::new(ttl),
    }
}

fn query_label(query: &LocationQuery) -> String {
    match query {
        LocationQuery::Place(name) => name.clone(),
        LocationQuery::Coordinates(coordinates) => coordinates.label(),
    }
}
