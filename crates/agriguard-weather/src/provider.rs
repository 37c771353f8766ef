//! Open-Meteo forecast client: one-day hourly forecast plus the
//! 15-minute precipitation nowcast.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::instrument;

use crate::http::CachedHttpClient;
use crate::types::{Coordinates, ForecastError, HourlySeries, RawForecast};

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

const HOURLY_VARIABLES: &str = "temperature_2m,soil_moisture_3_to_9cm,precipitation";
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Deserialize)]
struct HourlyResponse {
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    utc_offset_seconds: i32,
    #[serde(default)]
    hourly: Option<HourlyBlock>,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Option<Vec<Option<f64>>>,
    #[serde(default)]
    soil_moisture_3_to_9cm: Option<Vec<Option<f64>>>,
    #[serde(default)]
    precipitation: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct NowcastResponse {
    #[serde(default)]
    minutely_15: Option<NowcastBlock>,
}

#[derive(Debug, Deserialize)]
struct NowcastBlock {
    #[serde(default)]
    precipitation: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Clone)]
pub struct ForecastClient {
    http: Arc<CachedHttpClient>,
    forecast_url: String,
}

impl ForecastClient {
    pub fn new(http: Arc<CachedHttpClient>) -> Self {
        Self::new_with_url(http, DEFAULT_FORECAST_URL)
    }

    pub fn new_with_url(http: Arc<CachedHttpClient>, forecast_url: impl Into<String>) -> Self {
        Self {
            http,
            forecast_url: forecast_url.into(),
        }
    }

    /// Hourly forecast plus nowcast. Only the hourly request can fail the
    /// whole fetch; a failed nowcast leaves the quarter-hour series empty.
    #[instrument(skip(self))]
    pub async fn fetch(&self, coordinates: &Coordinates) -> Result<RawForecast, ForecastError> {
        let mut forecast = self.fetch_hourly(coordinates).await?;
        forecast.quarter_hour_precipitation_mm = self.fetch_nowcast(coordinates).await;
        Ok(forecast)
    }

    pub async fn fetch_hourly(&self, coordinates: &Coordinates) -> Result<RawForecast, ForecastError> {
        let query = [
            ("latitude", coordinates.latitude().to_string()),
            ("longitude", coordinates.longitude().to_string()),
            ("hourly", HOURLY_VARIABLES.to_string()),
            ("forecast_days", "1".to_string()),
            ("timezone", "auto".to_string()),
        ];
        let body = self.http.get_text(&self.forecast_url, &query).await?;
        parse_hourly(&body)
    }

    /// 15-minute precipitation samples, or `None` on any failure.
    pub async fn fetch_nowcast(&self, coordinates: &Coordinates) -> Option<Vec<Option<f64>>> {
        let query = [
            ("latitude", coordinates.latitude().to_string()),
            ("longitude", coordinates.longitude().to_string()),
            ("minutely_15", "precipitation".to_string()),
            ("forecast_days", "1".to_string()),
            ("timezone", "auto".to_string()),
        ];
        let body = match self.http.get_text(&self.forecast_url, &query).await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("Nowcast unavailable: {}", e);
                return None;
            }
        };
        match serde_json::from_str::<NowcastResponse>(&body) {
            Ok(response) => response.minutely_15.and_then(|block| block.precipitation),
            Err(e) => {
                tracing::debug!("Nowcast response unreadable: {}", e);
                None
            }
        }
    }
}

fn parse_hourly(body: &str) -> Result<RawForecast, ForecastError> {
    let response: HourlyResponse =
        serde_json::from_str(body).map_err(|e| ForecastError::Parse(e.to_string()))?;
    let block = response.hourly.ok_or(ForecastError::MissingSeries("hourly"))?;
    let temperature_c = block
        .temperature_2m
        .ok_or(ForecastError::MissingSeries("temperature_2m"))?;

    let time = block
        .time
        .iter()
        .map(|t| match NaiveDateTime::parse_from_str(t, TIME_FORMAT) {
            Ok(time) => Some(time),
            Err(e) => {
                tracing::debug!("Unreadable forecast timestamp '{}': {}", t, e);
                None
            }
        })
        .collect();

    Ok(RawForecast {
        timezone: response.timezone,
        utc_offset_seconds: response.utc_offset_seconds,
        hourly: HourlySeries {
            time,
            temperature_c,
            soil_moisture: block.soil_moisture_3_to_9cm,
            precipitation_mm: block.precipitation,
        },
        quarter_hour_precipitation_mm: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResponseCache;
    use crate::retry::RetryPolicy;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ForecastClient {
        let http = CachedHttpClient::new(
            Duration::from_secs(5),
            Arc::new(ResponseCache::default()),
            RetryPolicy::no_retry(),
        )
        .unwrap();
        ForecastClient::new_with_url(Arc::new(http), format!("{}/v1/forecast", server.uri()))
    }

    fn hourly_body() -> serde_json::Value {
        serde_json::json!({
            "latitude": 3.125,
            "longitude": 35.625,
            "timezone": "Africa/Nairobi",
            "utc_offset_seconds": 10800,
            "hourly": {
                "time": ["2026-10-16T00:00", "2026-10-16T01:00", "2026-10-16T02:00"],
                "temperature_2m": [24.1, null, 30.5],
                "soil_moisture_3_to_9cm": [0.12, 0.11, null],
                "precipitation": [0.0, 1.2, 0.3]
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_combines_hourly_and_nowcast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("hourly", HOURLY_VARIABLES))
            .and(query_param("forecast_days", "1"))
            .and(query_param("timezone", "auto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(hourly_body()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("minutely_15", "precipitation"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "minutely_15": { "time": [], "precipitation": [0.1, 0.2, null, 0.4, 0.5] }
            })))
            .mount(&server)
            .await;

        let coords = Coordinates::new(3.1191, 35.5973).unwrap();
        let forecast = client(&server).fetch(&coords).await.unwrap();

        assert_eq!(forecast.timezone.as_deref(), Some("Africa/Nairobi"));
        assert_eq!(forecast.utc_offset_seconds, 10800);
        assert_eq!(forecast.hourly.time.len(), 3);
        assert_eq!(forecast.hourly.temperature_c[1], None);
        assert_eq!(
            forecast.quarter_hour_precipitation_mm.map(|s| s.len()),
            Some(5)
        );
    }

    #[tokio::test]
    async fn test_nowcast_failure_is_not_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("minutely_15", "precipitation"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("hourly", HOURLY_VARIABLES))
            .respond_with(ResponseTemplate::new(200).set_body_json(hourly_body()))
            .mount(&server)
            .await;

        let coords = Coordinates::new(0.5, 35.0).unwrap();
        let forecast = client(&server).fetch(&coords).await.unwrap();
        assert!(forecast.quarter_hour_precipitation_mm.is_none());
    }

    #[tokio::test]
    async fn test_hourly_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let coords = Coordinates::new(0.5, 35.0).unwrap();
        let err = client(&server).fetch(&coords).await.unwrap_err();
        assert!(matches!(err, ForecastError::Http(_)));
    }

    #[test]
    fn test_missing_temperature_series() {
        let body = r#"{"hourly":{"time":["2026-10-16T00:00"],"precipitation":[0.0]}}"#;
        assert!(matches!(
            parse_hourly(body),
            Err(ForecastError::MissingSeries("temperature_2m"))
        ));
    }

    #[test]
    fn test_optional_series_absent() {
        let body = r#"{"hourly":{"time":["2026-10-16T00:00","2026-10-16T01:00"],"temperature_2m":[18.0,22.0]}}"#;
        let forecast = parse_hourly(body).unwrap();
        assert!(forecast.hourly.soil_moisture.is_none());
        assert!(forecast.hourly.precipitation_mm.is_none());

        let metrics = forecast.metrics().unwrap();
        assert_eq!(metrics.avg_temp_c, 20.0);
        assert_eq!(metrics.min_soil_moisture, None);
        assert_eq!(metrics.total_precip_mm, 0.0);
    }

    #[test]
    fn test_unreadable_timestamp_is_kept_as_unknown() {
        let body = r#"{"hourly":{"time":["1760572800","2026-10-16T01:00"],"temperature_2m":[20.0,24.0]}}"#;
        let forecast = parse_hourly(body).unwrap();
        assert_eq!(forecast.hourly.time.len(), 2);
        assert!(forecast.hourly.time[0].is_none());
        assert!(forecast.hourly.time[1].is_some());
        assert_eq!(forecast.metrics().unwrap().avg_temp_c, 22.0);
    }

    #[test]
    fn test_malformed_body() {
        assert!(matches!(parse_hourly("<html>"), Err(ForecastError::Parse(_))));
    }
}
