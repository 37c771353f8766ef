//! Weather data for AgriGuard
//!
//! Resolves a place name or coordinates, fetches today's Open-Meteo
//! forecast and nowcast through a cached, retrying HTTP client, and reduces
//! them to [`ForecastMetrics`].

pub mod cache;
pub mod geocode;
pub mod http;
pub mod location;
pub mod metrics;
pub mod provider;
pub mod retry;
pub mod types;

pub use cache::ResponseCache;
pub use geocode::{Geocoder, PlaceMatch};
pub use http::CachedHttpClient;
pub use location::{LocationQuery, LocationResolver, ResolveOutcome, ResolvedLocation};
pub use metrics::{derive_metrics, next_hour_precipitation, ForecastMetrics};
pub use provider::ForecastClient;
pub use retry::RetryPolicy;
pub use types::*;
