//! Integration tests for SearchController using wiremock.

use std::sync::Arc;
use std::time::Duration;

use nimbus_core::{ErrorCategory, Locale};
use nimbus_http::{HttpClient, HttpConfig, RetryPolicy};
use nimbus_search::{
    MapTab, SearchController, SearchOptions, SearchOutcome, SearchPhase, CURRENT_LOCATION_LABEL,
};
use nimbus_storage::Storage;
use nimbus_weather::{
    ApiSettings, Coordinate, FixedLocation, LocationProvider, NoLocation, WeatherClient,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn weather_body(name: &str, lat: f64, lon: f64) -> serde_json::Value {
    json!({
        "coord": {"lat": lat, "lon": lon},
        "weather": [{"main": "Clear", "description": "clear sky", "icon": "01d"}],
        "main": {"temp": 21.0, "temp_min": 19.0, "temp_max": 23.0, "pressure": 1015, "humidity": 40},
        "wind": {"speed": 3.0, "deg": 90},
        "sys": {"sunrise": 1700000000, "sunset": 1700040000},
        "timezone": 3600,
        "name": name
    })
}

fn forecast_body() -> serde_json::Value {
    json!({
        "list": [
            {"dt_txt": "2024-05-01 12:00:00", "main": {"temp": 20.0, "humidity": 40},
             "wind": {"speed": 3.0, "deg": 90}, "weather": [{"main": "Clear", "icon": "01d"}]}
        ]
    })
}

async fn mount_forecast(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(server)
        .await;
}

async fn mount_city(server: &MockServer, city: &str, lat: f64, lon: f64) {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", city))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body(city, lat, lon)))
        .mount(server)
        .await;
}

fn controller_with(
    server: &MockServer,
    storage: Storage,
    location: Arc<dyn LocationProvider>,
    debounce: Duration,
) -> SearchController {
    let config = HttpConfig {
        timeout: Duration::from_secs(5),
        retry: RetryPolicy::new(1, 5),
        ..HttpConfig::default()
    };
    let http = HttpClient::new(&config).unwrap();
    let weather = WeatherClient::new(ApiSettings::new(server.uri(), "test-key"), http);
    SearchController::new(
        weather,
        storage,
        location,
        SearchOptions {
            locale: Locale::En,
            debounce,
        },
    )
}

fn controller(server: &MockServer, storage: Storage) -> SearchController {
    controller_with(server, storage, Arc::new(NoLocation), Duration::from_millis(50))
}

#[tokio::test]
async fn test_city_search_settles_and_records_history() {
    let server = MockServer::start().await;
    mount_city(&server, "Paris", 48.85, 2.35).await;
    mount_forecast(&server).await;

    let storage = Storage::memory();
    let controller = controller(&server, storage.clone());

    let outcome = controller.search_city("  Paris ").await;
    assert_eq!(outcome, SearchOutcome::Applied);

    let state = controller.state();
    assert_eq!(state.search.phase, SearchPhase::Settled);
    assert_eq!(state.search.result.as_ref().map(|s| s.name.as_str()), Some("Paris"));
    assert_eq!(state.search.forecast.as_ref().map(Vec::len), Some(1));
    assert!(!state.search.is_geolocation_origin);

    let location = state.search.last_location.unwrap();
    assert_eq!((location.lat, location.lon), (48.85, 2.35));

    assert_eq!(state.map.user_weather.map(|w| w.name), Some("Paris".to_string()));
    assert_eq!(state.map.user_location, None);

    assert_eq!(storage.search_history(), vec!["Paris".to_string()]);
    assert!(storage.last_location().is_none());
}

#[tokio::test]
async fn test_failed_city_search_is_still_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_string("city not found"))
        .mount(&server)
        .await;

    let controller = controller(&server, Storage::memory());
    let outcome = controller.search_city("Atlantis").await;

    assert_eq!(outcome, SearchOutcome::Failed(ErrorCategory::CityNotFound));
    let state = controller.search_state();
    assert_eq!(state.phase, SearchPhase::Failed);
    assert_eq!(state.error, Some(ErrorCategory::CityNotFound));
    assert!(state.result.is_none());
    assert_eq!(controller.history(), vec!["Atlantis".to_string()]);

    controller.try_again();
    assert_eq!(controller.search_state().phase, SearchPhase::Idle);
    assert_eq!(controller.history(), vec!["Atlantis".to_string()]);
}

#[tokio::test]
async fn test_slow_older_search_does_not_overwrite_newer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Slowtown"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(weather_body("Slowtown", 1.0, 1.0))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    mount_city(&server, "Fastville", 2.0, 2.0).await;
    mount_forecast(&server).await;

    let controller = controller(&server, Storage::memory());

    let slow = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.search_city("Slowtown").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    let fast = controller.search_city("Fastville").await;
    let slow = slow.await.unwrap();

    assert_eq!(fast, SearchOutcome::Applied);
    assert_eq!(slow, SearchOutcome::Superseded);

    let state = controller.search_state();
    assert_eq!(state.result.map(|s| s.name), Some("Fastville".to_string()));
    assert_eq!(
        controller.history(),
        vec!["Fastville".to_string(), "Slowtown".to_string()]
    );
}

#[tokio::test]
async fn test_coordinate_search_remembers_location() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "35.68"))
        .and(query_param("lon", "139.69"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("Tokyo", 35.7, 139.7)))
        .mount(&server)
        .await;
    mount_forecast(&server).await;

    let storage = Storage::memory();
    let controller = controller(&server, storage.clone());

    let outcome = controller.search_coordinates(35.68, 139.69).await;
    assert_eq!(outcome, SearchOutcome::Applied);

    let state = controller.state();
    assert!(state.search.is_geolocation_origin);
    let location = state.search.last_location.unwrap();
    assert_eq!((location.lat, location.lon), (35.68, 139.69));
    assert_eq!(location.name, "Tokyo");
    assert_eq!(state.map.user_location, Some(Coordinate::new(35.68, 139.69)));

    let stored = storage.last_location().unwrap();
    assert_eq!((stored.lat, stored.lon), (35.68, 139.69));
    assert_eq!(stored.name, CURRENT_LOCATION_LABEL);
    assert!(storage.search_history().is_empty());
}

#[tokio::test]
async fn test_locate_uses_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "52.52"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("Berlin", 52.52, 13.4)))
        .mount(&server)
        .await;
    mount_forecast(&server).await;

    let controller = controller_with(
        &server,
        Storage::memory(),
        Arc::new(FixedLocation::new(Coordinate::new(52.52, 13.4))),
        Duration::from_millis(50),
    );

    assert_eq!(controller.locate().await, SearchOutcome::Applied);
    assert_eq!(
        controller.search_state().result.map(|s| s.name),
        Some("Berlin".to_string())
    );
}

#[tokio::test]
async fn test_locate_failure_sets_geolocation_error() {
    let server = MockServer::start().await;
    let controller = controller(&server, Storage::memory());

    let outcome = controller.on_mount().await;

    assert_eq!(
        outcome,
        SearchOutcome::Failed(ErrorCategory::GeolocationUnavailable)
    );
    let state = controller.state();
    assert_eq!(state.search.phase, SearchPhase::Failed);
    assert!(state.search.is_geolocation_origin);
    assert!(state.map.user_weather.is_none());
}

#[tokio::test]
async fn test_mount_resumes_from_last_location() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "59.91"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("Oslo", 59.91, 10.75)))
        .expect(1)
        .mount(&server)
        .await;
    mount_forecast(&server).await;

    let storage = Storage::memory();
    assert!(storage.set_last_location(59.91, 10.75, "Oslo"));
    let controller = controller(&server, storage);

    assert_eq!(controller.on_mount().await, SearchOutcome::Applied);
    // A settled result means a second mount does nothing.
    assert_eq!(controller.on_mount().await, SearchOutcome::Ignored);
    assert_eq!(
        controller.search_state().result.map(|s| s.name),
        Some("Oslo".to_string())
    );
}

#[tokio::test]
async fn test_debounced_search_runs_last_query_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Madrid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("Madrid", 40.4, -3.7)))
        .expect(1)
        .mount(&server)
        .await;
    mount_forecast(&server).await;

    let controller = controller(&server, Storage::memory());
    let mut rx = controller.subscribe();

    controller.search_city_debounced("Ma");
    controller.search_city_debounced("Mad");
    controller.search_city_debounced("Madrid");
    assert_eq!(controller.search_state().query, "Madrid");
    assert_eq!(controller.search_state().phase, SearchPhase::Idle);

    tokio::time::timeout(
        Duration::from_secs(5),
        rx.wait_for(|state| state.search.phase == SearchPhase::Settled),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(controller.history(), vec!["Madrid".to_string()]);
}

#[tokio::test]
async fn test_shutdown_cancels_pending_debounced_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body("Lima", 0.0, 0.0)))
        .expect(0)
        .mount(&server)
        .await;

    let controller = controller(&server, Storage::memory());
    controller.search_city_debounced("Lima");
    controller.shutdown();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(controller.search_state().phase, SearchPhase::Idle);
    assert!(controller.history().is_empty());
}

#[tokio::test]
async fn test_tab_switch_and_clear_keep_history() {
    let server = MockServer::start().await;
    mount_city(&server, "Rome", 41.9, 12.5).await;
    mount_forecast(&server).await;

    let controller = controller(&server, Storage::memory());
    controller.search_city("Rome").await;
    controller.dispatch(nimbus_search::MapEvent::SetActiveTab(MapTab::Analytics));

    controller.clear();
    let state = controller.state();
    assert_eq!(state.search.phase, SearchPhase::Idle);
    assert!(state.search.result.is_none());
    assert_eq!(state.map.active_tab, MapTab::Analytics);
    assert_eq!(controller.history(), vec!["Rome".to_string()]);

    assert!(controller.clear_history());
    assert!(controller.history().is_empty());
}
