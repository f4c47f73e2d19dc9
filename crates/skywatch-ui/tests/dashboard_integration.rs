//! Integration tests for DashboardController using wiremock.
//!
//! The controller owns its own runtime, so these are plain `#[test]`s and
//! the mock server is started on a separate helper runtime.

use std::time::Duration;

use skywatch_services::PreferenceStore;
use skywatch_ui::{AppServices, DashboardController, PreferencesModel};
use skywatch_weather::{Coordinates, LocationSettings, ProviderSettings, UnitSystem};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAIT: Duration = Duration::from_secs(10);

// The server is declared first so it is dropped (and verified) before the runtime
struct Harness {
    server: MockServer,
    runtime: tokio::runtime::Runtime,
}

impl Harness {
    fn start() -> Self {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    fn controller(&self, location: LocationSettings) -> DashboardController {
        let settings = ProviderSettings::new("test-key")
            .with_base_url(self.server.uri())
            .with_timeout(Duration::from_secs(2));
        let services = AppServices::new(Some(&settings), location).unwrap();
        DashboardController::new(
            services,
            PreferencesModel::load(PreferenceStore::in_memory()),
        )
    }
}

fn current_body(name: &str, lat: f64, lon: f64) -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": lon, "lat": lat },
        "weather": [{ "description": "broken clouds", "icon": "04d" }],
        "main": {
            "temp": 11.2,
            "feels_like": 10.4,
            "temp_min": 9.9,
            "temp_max": 12.3,
            "humidity": 81
        },
        "wind": { "speed": 4.12 },
        "sys": { "country": "GB", "sunrise": 1767686280, "sunset": 1767715020 },
        "name": name
    })
}

fn forecast_body() -> serde_json::Value {
    let list: Vec<serde_json::Value> = (0..40)
        .map(|i: i64| {
            serde_json::json!({
                "dt": 1_767_657_600_i64 + i * 10_800,
                "main": { "temp": 20.0, "temp_min": 18.0, "temp_max": 22.0 },
                "weather": [{ "icon": "01d", "description": "clear sky" }],
                "dt_txt": format!("2026-01-{:02} {:02}:00:00", 6 + (i * 3) / 24, (i * 3) % 24)
            })
        })
        .collect();
    serde_json::json!({ "list": list })
}

fn city(name: &str, query: &str) -> Mock {
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body(name, 51.5, -0.12)))
}

fn forecast() -> Mock {
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
}

#[test]
fn test_search_populates_dashboard() {
    let harness = Harness::start();
    harness.mount(city("London", "london"));
    harness.mount(forecast());

    let mut controller = harness.controller(LocationSettings::default());
    assert!(controller.search("  london "));
    assert!(controller.wait_idle(WAIT));

    let weather = controller.weather();
    assert_eq!(weather.query(), "London");
    assert_eq!(weather.hourly().len(), 4);
    assert_eq!(weather.daily().len(), 5);
    assert!(weather.error_message().is_none());

    let text = controller.render(false);
    assert!(text.contains("London, GB"));
    assert!(text.contains("11.2°C"));
}

#[test]
fn test_blank_search_does_nothing() {
    let harness = Harness::start();
    let mut controller = harness.controller(LocationSettings::default());

    assert!(!controller.search("   "));
    assert!(!controller.is_busy());
    assert!(controller.weather().current().is_none());
}

#[test]
fn test_unknown_city_clears_state() {
    let harness = Harness::start();
    harness.mount(city("London", "London"));
    harness.mount(forecast());
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Zzzznotacity"))
            .respond_with(ResponseTemplate::new(404)),
    );

    let mut controller = harness.controller(LocationSettings::default());
    controller.search("London");
    assert!(controller.wait_idle(WAIT));
    assert!(controller.weather().has_data());

    controller.search("Zzzznotacity");
    assert!(controller.wait_idle(WAIT));

    let weather = controller.weather();
    assert!(weather.current().is_none());
    assert!(weather.forecast().is_empty());
    assert!(weather
        .error_message()
        .is_some_and(|m| m.contains("City not found")));
}

#[test]
fn test_latest_search_wins() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Slowtown"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(current_body("Slowtown", 10.0, 10.0))
                    .set_delay(Duration::from_millis(800)),
            ),
    );
    harness.mount(city("Paris", "Paris"));
    harness.mount(forecast());

    let mut controller = harness.controller(LocationSettings::default());
    controller.search("Slowtown");
    controller.search("Paris");
    assert!(controller.wait_idle(WAIT));
    assert_eq!(controller.weather().query(), "Paris");

    // Let the slow response land, then make sure it changed nothing
    std::thread::sleep(Duration::from_millis(1500));
    controller.pump();
    assert_eq!(controller.weather().query(), "Paris");
    assert_eq!(
        controller.weather().current().map(|c| c.name.as_str()),
        Some("Paris")
    );
}

#[test]
fn test_forecast_failure_keeps_current() {
    let harness = Harness::start();
    harness.mount(city("London", "London"));
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5))),
    );

    let mut controller = harness.controller(LocationSettings::default());
    controller.search("London");
    assert!(controller.wait_idle(WAIT));

    let weather = controller.weather();
    assert!(weather.has_data());
    assert!(weather.hourly().is_empty());
    assert_eq!(
        weather.error_message(),
        Some("Current conditions loaded, but the forecast is unavailable.")
    );

    let text = controller.render(false);
    assert!(text.contains("No hourly data"));
    assert!(text.contains("No daily data"));
}

#[test]
fn test_location_denied_is_silent() {
    let harness = Harness::start();
    harness.mount(forecast().expect(0));
    let mut controller = harness.controller(LocationSettings::default());

    controller.locate_device();
    assert!(controller.wait_idle(WAIT));
    assert!(controller.weather().current().is_none());
    assert!(controller.weather().error_message().is_none());
}

#[test]
fn test_device_location_fetches_by_coordinates() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("lat", "47.6"))
            .and(query_param("lon", "-122.3"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(current_body("Seattle", 47.6, -122.3)),
            ),
    );
    harness.mount(forecast());

    let location = LocationSettings {
        fixed: Some(Coordinates::new(47.6, -122.3).unwrap()),
        ip_lookup_url: None,
    };
    let mut controller = harness.controller(location);
    controller.locate_device();
    assert!(controller.wait_idle(WAIT));

    assert_eq!(controller.weather().query(), "Seattle");
}

#[test]
fn test_favorites_flow() {
    let harness = Harness::start();
    harness.mount(city("London", "london"));
    harness.mount(city("Paris", "Paris"));
    harness.mount(forecast());

    let mut controller = harness.controller(LocationSettings::default());
    assert_eq!(controller.save_favorite(), None);

    controller.search("london");
    assert!(controller.wait_idle(WAIT));
    assert_eq!(controller.save_favorite().as_deref(), Some("London"));
    assert!(controller.add_favorite("Paris"));
    assert!(!controller.add_favorite("Paris"));
    assert_eq!(controller.preferences().favorites(), ["London", "Paris"]);

    assert!(controller.open_favorite("2"));
    assert!(controller.wait_idle(WAIT));
    assert_eq!(controller.weather().query(), "Paris");

    assert!(!controller.open_favorite("9"));
    assert!(controller.remove_favorite("London"));
    assert_eq!(controller.preferences().favorites(), ["Paris"]);
}

#[test]
fn test_failed_search_saves_no_favorite() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Zzzznotacity"))
            .respond_with(ResponseTemplate::new(404)),
    );

    let mut controller = harness.controller(LocationSettings::default());
    controller.search("Zzzznotacity");
    assert!(controller.wait_idle(WAIT));

    assert_eq!(controller.save_favorite(), None);
    assert!(controller.preferences().favorites().is_empty());
}

#[test]
fn test_missing_api_key_saves_no_favorite() {
    let services = AppServices::new(None, LocationSettings::default()).unwrap();
    let mut controller =
        DashboardController::new(services, PreferencesModel::load(PreferenceStore::in_memory()));

    controller.search("Zzzznotacity");
    assert!(controller.wait_idle(WAIT));

    assert_eq!(controller.save_favorite(), None);
    assert!(controller.preferences().favorites().is_empty());
}

#[test]
fn test_unit_toggle_only_changes_display() {
    let harness = Harness::start();
    harness.mount(city("London", "London"));
    harness.mount(forecast());

    let mut controller = harness.controller(LocationSettings::default());
    controller.search("London");
    assert!(controller.wait_idle(WAIT));
    let metric = controller.render(false);

    assert_eq!(controller.toggle_unit(), UnitSystem::Imperial);
    let imperial = controller.render(false);
    assert!(imperial.contains("52.2°F"));
    assert_eq!(controller.weather().current().map(|c| c.temperature), Some(11.2));

    assert_eq!(controller.toggle_unit(), UnitSystem::Metric);
    assert_eq!(controller.render(false), metric);
}

#[test]
fn test_missing_api_key_reports_error() {
    let services = AppServices::new(None, LocationSettings::default()).unwrap();
    let mut controller =
        DashboardController::new(services, PreferencesModel::load(PreferenceStore::in_memory()));

    controller.search("London");
    assert!(controller.wait_idle(WAIT));
    assert!(controller
        .weather()
        .error_message()
        .is_some_and(|m| m.contains("API key")));
}
