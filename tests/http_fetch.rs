//! Live fetcher tests against a local mock server.
//!
//! The blocking client must not run on the async runtime threads, so every
//! fetch goes through `spawn_blocking`.

use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rest_router::sdk::batch::BatchRunner;
use rest_router::sdk::config::{DeploymentVariant, OutputMode, Provider, RunConfig};
use rest_router::sdk::input::{InputRow, LatLon};
use rest_router::sdk::output::write_results;
use rest_router::sdk::routing::fetch::{Fetcher, HttpFetcher};
use rest_router::sdk::routing::request::RequestFactory;
use rest_router::sdk::routing::RoutingError;
use rest_router::sdk::util::{log::try_init_test_logging, rate_limit::Limiter};
use rest_router::BatchResult;

fn directions_row(id: &str) -> InputRow {
    InputRow::directions(
        id,
        LatLon { lat: 49.49331, lon: 5.98375 },
        LatLon { lat: 49.6005, lon: 6.13336 },
    )
}

fn ors_config(server: &MockServer) -> RunConfig {
    let base_url = format!("{}/ors/v2/directions", server.uri());
    RunConfig {
        provider: Provider::OpenRouteService,
        variant: DeploymentVariant::infer(Some(base_url.as_str())),
        base_url: Some(base_url),
        api_key: "KEY".to_string(),
        ..RunConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn tomtom_get_returns_parsed_body() {
    try_init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/routing/49.49331,5.98375:49.6005,6.13336/json"))
        .and(query_param("key", "KEY"))
        .and(query_param("travelMode", "car"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "routes": [{"legs": [{"points": [
                {"latitude": 49.49331, "longitude": 5.98375},
                {"latitude": 49.6005, "longitude": 6.13336}
            ]}]}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = RunConfig {
        base_url: Some(format!("{}/routing", server.uri())),
        api_key: "KEY".to_string(),
        ..RunConfig::default()
    };
    let raw = tokio::task::spawn_blocking(move || {
        let request = RequestFactory::new(&config).build(&directions_row("1"))?;
        HttpFetcher::new(Limiter::unlimited(), Some(Duration::from_secs(5)))?.fetch(&request)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(raw.status, Some(200));
    let points = &raw.body().unwrap()["routes"][0]["legs"][0]["points"];
    assert_eq!(points.as_array().unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn ors_error_payload_becomes_http_error() {
    try_init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ors/v2/directions/driving-car/geojson"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 2010, "message": "Could not find routable point"}
        })))
        .mount(&server)
        .await;

    let config = ors_config(&server);
    let err = tokio::task::spawn_blocking(move || {
        let request = RequestFactory::new(&config).build(&directions_row("2"))?;
        HttpFetcher::new(Limiter::unlimited(), None)?.fetch(&request)
    })
    .await
    .unwrap()
    .unwrap_err();

    match err {
        RoutingError::Http { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Could not find routable point (code 2010)");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn ors_batch_posts_body_and_writes_summary() {
    try_init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ors/v2/directions/driving-car/geojson"))
        .and(header("Authorization", "KEY"))
        .and(body_partial_json(json!({
            "coordinates": [[5.98375, 49.49331], [6.13336, 49.6005]],
            "preference": "shortest",
            "units": "m"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "features": [{
                "geometry": {"type": "LineString", "coordinates": [
                    [5.98375, 49.49331, 290.0], [6.05, 49.55, 310.0], [6.13336, 49.6005, 300.0]
                ]},
                "properties": {"summary": {"distance": 21000.5, "duration": 1500.0,
                    "ascent": 40.0, "descent": 30.0}}
            }]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let outfile = dir.path().join("summary.csv");
    let cache_dir = dir.path().join("json");
    let mut config = ors_config(&server);
    config.output_mode = OutputMode::Summary;
    config.include_geometry = true;
    config.use_cache = true;
    config.cache_dir = cache_dir.clone();
    assert_eq!(config.variant, DeploymentVariant::SelfHostedV2);

    let written = outfile.clone();
    let (result, sibling) = tokio::task::spawn_blocking(move || {
        let fetcher = HttpFetcher::new(Limiter::unlimited(), None).unwrap();
        let rows = vec![directions_row("a"), directions_row("b"), directions_row("a")];
        let (result, _) = BatchRunner::new(&config, &fetcher).run(&rows);
        let sibling = write_results(&result, &written, true).unwrap();
        (result, sibling)
    })
    .await
    .unwrap();

    // the repeated id is served from the cache
    assert!(cache_dir.join("a.json").exists());
    assert!(cache_dir.join("b.json").exists());
    let BatchResult::Summaries(summaries) = result else {
        panic!("expected summaries");
    };
    assert_eq!(summaries.len(), 3);
    let metrics = summaries[0].metrics.unwrap();
    assert_eq!(metrics.length_in_meters, 21000.5);
    assert_eq!(metrics.ascent, Some(40.0));
    assert_eq!(sibling, Some(dir.path().join("summary.geojson")));

    let csv_text = std::fs::read_to_string(&outfile).unwrap();
    assert!(csv_text.starts_with("id,lengthInMeters,travelTimeInSeconds,ascent,descent,geometry\n"));
    assert_eq!(csv_text.lines().count(), 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn limiter_spaces_live_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"features": []})))
        .mount(&server)
        .await;

    let config = ors_config(&server);
    let elapsed = tokio::task::spawn_blocking(move || {
        let fetcher =
            HttpFetcher::new(Limiter::with_interval(Duration::from_millis(200)), None).unwrap();
        let request = RequestFactory::new(&config).build(&directions_row("r")).unwrap();
        let start = Instant::now();
        for _ in 0..3 {
            fetcher.fetch(&request).unwrap();
        }
        start.elapsed()
    })
    .await
    .unwrap();

    assert!(elapsed >= Duration::from_millis(350));
}
