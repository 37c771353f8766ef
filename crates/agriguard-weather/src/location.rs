//! Location resolution: a place name or explicit coordinates become a
//! [`ResolvedLocation`] with a display name.

use crate::geocode::Geocoder;
use crate::types::{Coordinates, LocationError};

/// What the operator asked for.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Place(String),
    Coordinates(Coordinates),
}

impl LocationQuery {
    pub fn place(name: impl Into<String>) -> Self {
        Self::Place(name.into())
    }

    /// Validated explicit coordinates.
    pub fn coordinates(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        Coordinates::new(latitude, longitude).map(Self::Coordinates)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub coordinates: Coordinates,
    /// Name shown in the report header and the advice prompt
    pub display_name: String,
    /// Provider's name for the match; `None` for explicit coordinates
    pub matched_name: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolveOutcome {
    Found(ResolvedLocation),
    NotFound { query: String },
    ProviderError { reason: String },
}

impl ResolveOutcome {
    /// Confirmation or failure line for the operator; explicit coordinates
    /// resolve silently.
    pub fn status_line(&self) -> Option<String> {
        match self {
            ResolveOutcome::Found(location) => {
                location.matched_name.as_ref().map(|name| match &location.country {
                    Some(country) => format!("📍 Location: {}, {}", name, country),
                    None => format!("📍 Location: {}", name),
                })
            }
            ResolveOutcome::NotFound { query } => Some(format!(
                "❌ Geocoding: {}",
                LocationError::NotFound(query.clone())
            )),
            ResolveOutcome::ProviderError { reason } => Some(format!("❌ Geocoding: {}", reason)),
        }
    }

    pub fn into_result(self) -> Result<ResolvedLocation, LocationError> {
        match self {
            ResolveOutcome::Found(location) => Ok(location),
            ResolveOutcome::NotFound { query } => Err(LocationError::NotFound(query)),
            ResolveOutcome::ProviderError { reason } => Err(LocationError::Provider(reason)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LocationResolver {
    geocoder: Geocoder,
}

impl LocationResolver {
    pub fn new(geocoder: Geocoder) -> Self {
        Self { geocoder }
    }

    pub async fn resolve(&self, query: &LocationQuery) -> ResolveOutcome {
        match query {
            LocationQuery::Coordinates(coordinates) => ResolveOutcome::Found(ResolvedLocation {
                coordinates: *coordinates,
                display_name: coordinates.label(),
                matched_name: None,
                country: None,
            }),
            LocationQuery::Place(name) => self.resolve_place(name).await,
        }
    }

    async fn resolve_place(&self, name: &str) -> ResolveOutcome {
        let place = match self.geocoder.search(name).await {
            Ok(Some(place)) => place,
            Ok(None) => {
                return ResolveOutcome::NotFound {
                    query: name.to_string(),
                }
            }
            Err(e) => {
                tracing::warn!("Geocoding failed for '{}': {}", name, e);
                return ResolveOutcome::ProviderError {
                    reason: e.to_string(),
                };
            }
        };

        match place.coordinates() {
            Ok(coordinates) => ResolveOutcome::Found(ResolvedLocation {
                coordinates,
                display_name: name.to_string(),
                matched_name: Some(place.name),
                country: place.country,
            }),
            Err(e) => ResolveOutcome::ProviderError {
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResponseCache;
    use crate::http::CachedHttpClient;
    use crate::retry::RetryPolicy;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn resolver(uri: &str) -> LocationResolver {
        let http = CachedHttpClient::new(
            Duration::from_secs(5),
            Arc::new(ResponseCache::default()),
            RetryPolicy::no_retry(),
        )
        .unwrap();
        LocationResolver::new(Geocoder::new_with_url(Arc::new(http), format!("{uri}/v1/search")))
    }

    #[tokio::test]
    async fn test_explicit_coordinates_skip_network() {
        let server = MockServer::start().await;
        let query = LocationQuery::coordinates(-1.2921, 36.8219).unwrap();

        let outcome = resolver(&server.uri()).resolve(&query).await;

        let location = outcome.clone().into_result().unwrap();
        assert_eq!(location.display_name, "-1.29°N, 36.82°E");
        assert!(outcome.status_line().is_none());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn test_invalid_explicit_coordinates() {
        assert!(matches!(
            LocationQuery::coordinates(120.0, 0.0),
            Err(LocationError::InvalidCoordinates { .. })
        ));
    }

    #[tokio::test]
    async fn test_place_found_keeps_query_as_display_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{ "name": "Kitale", "latitude": 1.0157, "longitude": 35.0062, "country": "Kenya" }]
            })))
            .mount(&server)
            .await;

        let outcome = resolver(&server.uri())
            .resolve(&LocationQuery::place("kitale"))
            .await;

        assert_eq!(
            outcome.status_line().as_deref(),
            Some("📍 Location: Kitale, Kenya")
        );
        let location = outcome.into_result().unwrap();
        assert_eq!(location.display_name, "kitale");
        assert_eq!(location.matched_name.as_deref(), Some("Kitale"));
    }

    #[test]
    fn test_status_line_without_country() {
        let outcome = ResolveOutcome::Found(ResolvedLocation {
            coordinates: Coordinates::new(1.0157, 35.0062).unwrap(),
            display_name: "Kitale".into(),
            matched_name: Some("Kitale".into()),
            country: None,
        });
        assert_eq!(outcome.status_line().as_deref(), Some("📍 Location: Kitale"));
    }

    #[tokio::test]
    async fn test_place_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let outcome = resolver(&server.uri())
            .resolve(&LocationQuery::place("Atlantis"))
            .await;

        assert_eq!(
            outcome,
            ResolveOutcome::NotFound {
                query: "Atlantis".into()
            }
        );
        assert_eq!(
            outcome.status_line().as_deref(),
            Some("❌ Geocoding: No coordinates found for 'Atlantis'")
        );
    }

    #[tokio::test]
    async fn test_provider_failure_distinct_from_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let outcome = resolver(&server.uri())
            .resolve(&LocationQuery::place("Lodwar"))
            .await;

        assert!(matches!(outcome, ResolveOutcome::ProviderError { .. }));
        assert!(outcome.into_result().is_err());
    }
}
