use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A validated latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Validate and build a coordinate pair.
    ///
    /// Latitude must lie in [-90, 90] and longitude in [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        let lat_ok = latitude.is_finite() && (-90.0..=90.0).contains(&latitude);
        let lon_ok = longitude.is_finite() && (-180.0..=180.0).contains(&longitude);
        if !lat_ok || !lon_ok {
            return Err(LocationError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Label used in place of a city name, e.g. "3.12°N, 35.60°E".
    pub fn label(&self) -> String {
        format!("{:.2}°N, {:.2}°E", self.latitude, self.longitude)
    }
}

/// Hourly series for the one-day horizon, aligned to `time`.
///
/// Samples are `None` where the provider returned `null`. Soil moisture and
/// precipitation may be missing entirely for some locations.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlySeries {
    /// Local timestamps; `None` where the provider sent an unreadable one
    pub time: Vec<Option<NaiveDateTime>>,
    pub temperature_c: Vec<Option<f64>>,
    pub soil_moisture: Option<Vec<Option<f64>>>,
    pub precipitation_mm: Option<Vec<Option<f64>>>,
}

/// Everything fetched for one location before metrics are derived.
#[derive(Debug, Clone, PartialEq)]
pub struct RawForecast {
    /// IANA zone the provider resolved for the location
    pub timezone: Option<String>,
    pub utc_offset_seconds: i32,
    pub hourly: HourlySeries,
    /// 15-minute precipitation samples; `None` when the nowcast fetch failed
    pub quarter_hour_precipitation_mm: Option<Vec<Option<f64>>>,
}

/// Location errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Coordinates out of range: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
    #[error("No coordinates found for '{0}'")]
    NotFound(String),
    #[error("{0}")]
    Provider(String),
}

/// Transport-level errors shared by every weather request
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Forecast fetch errors
#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Forecast response has no usable '{0}' data")]
    MissingSeries(&'static str),
}

/// Response cache persistence errors
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cache format error: {0}")]
    Format(#[from] serde_json::Error),
}
