//! Place names and explicit coordinates go through the same
//! metrics and advisory path.

use std::sync::Arc;
use std::time::Duration;

use agriguard_advice::{AdviceOutcome, AdvisoryStrategy, RuleAdvisor};
use agriguard_weather::{
    CachedHttpClient, ForecastClient, Geocoder, LocationQuery, LocationResolver, ResponseCache,
    RetryPolicy,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn advise(server: &MockServer, query: LocationQuery, strategy: &dyn AdvisoryStrategy) -> Vec<String> {
    let http = Arc::new(
        CachedHttpClient::new(
            Duration::from_secs(5),
            Arc::new(ResponseCache::default()),
            RetryPolicy::no_retry(),
        )
        .unwrap(),
    );
    let resolver = LocationResolver::new(Geocoder::new_with_url(
        http.clone(),
        format!("{}/v1/search", server.uri()),
    ));
    let forecast = ForecastClient::new_with_url(http, format!("{}/v1/forecast", server.uri()));

    let location = resolver.resolve(&query).await.into_result().unwrap();
    let metrics = forecast
        .fetch(&location.coordinates)
        .await
        .unwrap()
        .metrics()
        .unwrap();

    match strategy.advise(&location.display_name, &metrics).await {
        AdviceOutcome::Advice(result) => result.into_lines(),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn hot_dry_wet_day_triggers_every_rule() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{ "name": "Lodwar", "latitude": 3.1191, "longitude": 35.5973, "country": "Kenya" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "hourly": {
                "time": ["2026-10-16T12:00", "2026-10-16T13:00"],
                "temperature_2m": [33.0, 33.0],
                "soil_moisture_3_to_9cm": [0.12, 0.10],
                "precipitation": [6.0, 6.0]
            }
        })))
        .mount(&server)
        .await;

    let rules = RuleAdvisor::new();
    let by_name = advise(&server, LocationQuery::place("Lodwar"), &rules).await;
    let by_coords = advise(
        &server,
        LocationQuery::coordinates(3.1191, 35.5973).unwrap(),
        &rules,
    )
    .await;

    assert_eq!(by_name, by_coords);
    assert_eq!(by_name.len(), 3);
    assert!(by_name[0].starts_with("Heat:"));
    assert!(by_name[1].starts_with("Irrigation:"));
    assert!(by_name[2].starts_with("Flood:"));
}
