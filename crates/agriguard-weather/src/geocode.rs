//! Forward geocoding: place name to coordinates via the Open-Meteo
//! geocoding API. Free, no API key required.

use std::sync::Arc;

use serde::Deserialize;
use tracing::instrument;

use crate::http::CachedHttpClient;
use crate::types::{Coordinates, HttpError, LocationError};

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Option<Vec<PlaceMatch>>,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
}

/// Best match for a place name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlaceMatch {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    http: Arc<CachedHttpClient>,
    search_url: String,
}

impl Geocoder {
    pub fn new(http: Arc<CachedHttpClient>) -> Self {
        Self::new_with_url(http, DEFAULT_GEOCODING_URL)
    }

    pub fn new_with_url(http: Arc<CachedHttpClient>, search_url: impl Into<String>) -> Self {
        Self {
            http,
            search_url: search_url.into(),
        }
    }

    /// Look up the single best match for `name`.
    ///
    /// `Ok(None)` means the provider answered but knows no such place.
    #[instrument(skip(self))]
    pub async fn search(&self, name: &str) -> Result<Option<PlaceMatch>, LocationError> {
        let query = [
            ("name", name.to_string()),
            ("count", "1".to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ];

        let body = match self.http.get_text(&self.search_url, &query).await {
            Ok(body) => body,
            Err(HttpError::Status { status, body }) => {
                return Err(LocationError::Provider(
                    provider_reason(&body).unwrap_or_else(|| format!("HTTP {}: {}", status, body)),
                ));
            }
            Err(e) => return Err(LocationError::Provider(e.to_string())),
        };

        let response: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| LocationError::Provider(format!("Invalid geocoding response: {}", e)))?;

        if response.error {
            return Err(LocationError::Provider(
                response
                    .reason
                    .unwrap_or_else(|| "Geocoding request rejected".to_string()),
            ));
        }

        let best = response.results.and_then(|r| r.into_iter().next());
        match &best {
            Some(place) => tracing::debug!(name = %place.name, "Geocoded place"),
            None => tracing::debug!("No geocoding results"),
        }
        Ok(best)
    }
}

impl PlaceMatch {
    pub fn coordinates(&self) -> Result<Coordinates, LocationError> {
        Coordinates::new(self.latitude, self.longitude)
    }
}

fn provider_reason(body: &str) -> Option<String> {
    serde_json::from_str::<SearchResponse>(body)
        .ok()
        .and_then(|r| r.reason)
}
