//! End-to-end weather flow against a mock Open-Meteo server.

use std::sync::Arc;
use std::time::Duration;

use agriguard_weather::{
    CachedHttpClient, ForecastClient, Geocoder, LocationQuery, LocationResolver, ResponseCache,
    RetryPolicy,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Services {
    resolver: LocationResolver,
    forecast: ForecastClient,
}

fn services(server: &MockServer, retry: RetryPolicy) -> Services {
    let http = Arc::new(
        CachedHttpClient::new(
            Duration::from_secs(5),
            Arc::new(ResponseCache::default()),
            retry,
        )
        .unwrap(),
    );
    Services {
        resolver: LocationResolver::new(Geocoder::new_with_url(
            http.clone(),
            format!("{}/v1/search", server.uri()),
        )),
        forecast: ForecastClient::new_with_url(http, format!("{}/v1/forecast", server.uri())),
    }
}

async fn mount_open_meteo(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Lodwar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{ "name": "Lodwar", "latitude": 3.1191, "longitude": 35.5973, "country": "Kenya" }]
        })))
        .mount(server)
        .await;

    let times: Vec<String> = (0..24).map(|h| format!("2026-10-16T{h:02}:00")).collect();
    let temps: Vec<f64> = (0..24).map(|h| 28.0 + f64::from(h % 8)).collect();
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "3.1191"))
        .and(query_param("longitude", "35.5973"))
        .and(query_param("forecast_days", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "timezone": "Africa/Nairobi",
            "utc_offset_seconds": 10800,
            "hourly": {
                "time": times,
                "temperature_2m": temps,
                "soil_moisture_3_to_9cm": vec![0.1; 24],
                "precipitation": vec![0.5; 24]
            },
            "minutely_15": {
                "precipitation": [0.2, 0.2, 0.2, 0.2, 0.0]
            }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn place_and_coordinates_yield_same_metrics() {
    let server = MockServer::start().await;
    mount_open_meteo(&server).await;
    let svc = services(&server, RetryPolicy::no_retry());

    let by_name = svc
        .resolver
        .resolve(&LocationQuery::place("Lodwar"))
        .await
        .into_result()
        .unwrap();
    let by_coords = svc
        .resolver
        .resolve(&LocationQuery::coordinates(3.1191, 35.5973).unwrap())
        .await
        .into_result()
        .unwrap();

    assert_eq!(by_name.coordinates, by_coords.coordinates);
    assert_eq!(by_name.display_name, "Lodwar");
    assert_eq!(by_coords.display_name, "3.12°N, 35.60°E");

    let a = svc.forecast.fetch(&by_name.coordinates).await.unwrap().metrics().unwrap();
    let b = svc.forecast.fetch(&by_coords.coordinates).await.unwrap().metrics().unwrap();
    assert_eq!(a, b);

    assert_eq!(a.min_temp_c, 28.0);
    assert_eq!(a.max_temp_c, 35.0);
    assert!((a.total_precip_mm - 12.0).abs() < 1e-9);
    assert_eq!(a.min_soil_moisture, Some(0.1));
    assert!((a.rain_next_hour_mm.unwrap() - 0.8).abs() < 1e-9);
}

#[tokio::test]
async fn repeated_fetch_hits_cache() {
    let server = MockServer::start().await;
    mount_open_meteo(&server).await;
    let svc = services(&server, RetryPolicy::no_retry());
    let coords = LocationQuery::coordinates(3.1191, 35.5973).unwrap();
    let location = svc.resolver.resolve(&coords).await.into_result().unwrap();

    svc.forecast.fetch(&location.coordinates).await.unwrap();
    svc.forecast.fetch(&location.coordinates).await.unwrap();

    // hourly + nowcast once each
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn transient_outage_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_open_meteo(&server).await;

    let svc = services(&server, RetryPolicy::new(5, 1, 4));
    let location = svc
        .resolver
        .resolve(&LocationQuery::coordinates(3.1191, 35.5973).unwrap())
        .await
        .into_result()
        .unwrap();

    let metrics = svc.forecast.fetch(&location.coordinates).await.unwrap().metrics();
    assert!(metrics.is_ok());
}
