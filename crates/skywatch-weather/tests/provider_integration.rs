//! Integration tests for WeatherProvider and IP location using wiremock.
//!
//! These tests verify the current-then-forecast fetch sequence against a
//! mock HTTP server.

use std::time::Duration;

use skywatch_weather::{
    daily, hourly, resolve_by_device, Coordinates, LocationError, LocationSettings, Locator,
    ProviderSettings, WeatherError, WeatherProvider,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key";

fn provider_for(server: &MockServer) -> WeatherProvider {
    WeatherProvider::new(&ProviderSettings::new(API_KEY).with_base_url(server.uri())).unwrap()
}

/// Helper to create a current-conditions body
fn current_body(name: &str, lat: f64, lon: f64) -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": lon, "lat": lat },
        "weather": [{ "id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d" }],
        "main": {
            "temp": 11.2,
            "feels_like": 10.4,
            "temp_min": 9.9,
            "temp_max": 12.3,
            "pressure": 1012,
            "humidity": 81
        },
        "wind": { "speed": 4.12, "deg": 240 },
        "sys": { "country": "GB", "sunrise": 1767686280, "sunset": 1767715020 },
        "name": name,
        "cod": 200
    })
}

/// Helper to create a 40-entry, 3-hour forecast body starting 2026-01-06 00:00 UTC
fn forecast_body() -> serde_json::Value {
    let start = 1_767_657_600_i64;
    let list: Vec<serde_json::Value> = (0..40)
        .map(|i| {
            let dt = start + i * 3 * 3600;
            let hour = (i * 3) % 24;
            let day = 6 + (i * 3) / 24;
            serde_json::json!({
                "dt": dt,
                "main": { "temp": 5.0 + i as f64 * 0.5, "temp_min": 4.0, "temp_max": 9.0 },
                "weather": [{ "icon": "10d", "description": "light rain" }],
                "dt_txt": format!("2026-01-{:02} {:02}:00:00", day, hour)
            })
        })
        .collect();
    serde_json::json!({ "cod": "200", "cnt": 40, "list": list })
}

#[tokio::test]
async fn test_london_current_then_forecast() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "London"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("London", 51.5085, -0.1257)))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Forecast must use the coordinates returned by the current-conditions call
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("lat", "51.5085"))
        .and(query_param("lon", "-0.1257"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server);
    let report = provider
        .fetch_current_and_forecast(&Locator::ByName("London".to_string()))
        .await
        .unwrap();

    assert_eq!(report.current.name, "London");
    assert_eq!(report.current.country, "GB");
    assert!(!report.is_partial());
    assert_eq!(report.forecast.len(), 40);

    let hours = hourly(&report.forecast);
    assert_eq!(hours, report.forecast[..4].to_vec());

    let days = daily(&report.forecast);
    assert_eq!(days.len(), 5);
    assert!(days.iter().all(|d| d.dt_txt.ends_with(" 12:00:00")));
    let mut dates: Vec<&str> = days.iter().map(|d| &d.dt_txt[..10]).collect();
    dates.dedup();
    assert_eq!(dates.len(), 5);
}

#[tokio::test]
async fn test_unknown_city_is_not_found_and_skips_forecast() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Zzzznotacity"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let provider = provider_for(&mock_server);
    let result = provider
        .fetch_current_and_forecast(&Locator::ByName("Zzzznotacity".to_string()))
        .await;

    match result {
        Err(WeatherError::NotFound { query, status }) => {
            assert_eq!(query, "Zzzznotacity");
            assert_eq!(status, 404);
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_forecast_timeout_is_partial_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("London", 51.5085, -0.1257)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(forecast_body())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let provider = WeatherProvider::new(
        &ProviderSettings::new(API_KEY)
            .with_base_url(mock_server.uri())
            .with_timeout(Duration::from_millis(500)),
    )
    .unwrap();

    let report = provider
        .fetch_current_and_forecast(&Locator::ByName("London".to_string()))
        .await
        .unwrap();

    assert_eq!(report.current.name, "London");
    assert!(report.forecast.is_empty());
    assert!(matches!(
        report.forecast_error,
        Some(WeatherError::PartialFailure(_))
    ));
}

#[tokio::test]
async fn test_forecast_server_error_is_partial_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Paris", 48.8534, 2.3488)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let report = provider_for(&mock_server)
        .fetch_current_and_forecast(&Locator::ByName("paris".to_string()))
        .await
        .unwrap();

    assert_eq!(report.current.name, "Paris");
    assert!(report.is_partial());
    assert!(report.forecast.is_empty());
}

#[tokio::test]
async fn test_coordinates_locator_keeps_requested_position() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "47.6"))
        .and(query_param("lon", "-122.3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body("Seattle", 47.6062, -122.3321)))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("lat", "47.6"))
        .and(query_param("lon", "-122.3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let coords = Coordinates::new(47.6, -122.3).unwrap();
    let report = provider_for(&mock_server)
        .fetch_current_and_forecast(&Locator::ByCoordinates(coords))
        .await
        .unwrap();

    assert_eq!(report.current.name, "Seattle");
    assert_eq!(report.forecast.len(), 40);
}

#[tokio::test]
async fn test_malformed_current_body_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let result = provider_for(&mock_server)
        .fetch_current(&Locator::ByName("London".to_string()))
        .await;

    assert!(matches!(result, Err(WeatherError::Parse(_))));
}

#[tokio::test]
async fn test_unreachable_provider_is_network_error() {
    // Nothing listens on the discard port
    let provider = WeatherProvider::new(
        &ProviderSettings::new(API_KEY)
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2)),
    )
    .unwrap();

    let result = provider
        .fetch_current_and_forecast(&Locator::ByName("London".to_string()))
        .await;

    match result {
        Err(WeatherError::Network(e)) => {
            assert!(!e.to_string().contains(API_KEY), "API key leaked: {}", e);
        }
        other => panic!("expected Network error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_ip_lookup_location() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "lat": 51.5074,
            "lon": -0.1278
        })))
        .mount(&mock_server)
        .await;

    let settings = LocationSettings {
        fixed: None,
        ip_lookup_url: Some(format!("{}/json", mock_server.uri())),
    };
    let coords = resolve_by_device(&settings).await.unwrap();
    assert_eq!(coords, Coordinates::new(51.5074, -0.1278).unwrap());
}

#[tokio::test]
async fn test_ip_lookup_accepts_long_field_names() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "latitude": 35.6895,
            "longitude": 139.6917
        })))
        .mount(&mock_server)
        .await;

    let settings = LocationSettings {
        fixed: None,
        ip_lookup_url: Some(format!("{}/geo", mock_server.uri())),
    };
    let coords = resolve_by_device(&settings).await.unwrap();
    assert_eq!(coords.latitude, 35.6895);
}

#[tokio::test]
async fn test_ip_lookup_failure_is_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let settings = LocationSettings {
        fixed: None,
        ip_lookup_url: Some(format!("{}/json", mock_server.uri())),
    };
    assert!(matches!(
        resolve_by_device(&settings).await,
        Err(LocationError::ServiceUnavailable)
    ));
}
