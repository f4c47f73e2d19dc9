//! Dashboard controller
//!
//! Owns the services and both models, turns user actions into requests, and
//! applies results from the weather service channel on the calling thread.

use std::time::{Duration, Instant};

use skywatch_core::Config;
use skywatch_weather::{location, resolve_by_name, Locator, UnitSystem};

use crate::app_services::AppServices;
use crate::models::{PreferencesModel, WeatherModel};
use crate::render::{render_dashboard, View};
use crate::services::{request_weather_fetch, request_weather_locate, WeatherServiceMessage};

pub struct DashboardController {
    services: AppServices,
    weather: WeatherModel,
    preferences: PreferencesModel,
    /// A device location request is in flight
    locating: bool,
}

impl DashboardController {
    pub fn new(services: AppServices, preferences: PreferencesModel) -> Self {
        Self {
            services,
            weather: WeatherModel::new(),
            preferences,
            locating: false,
        }
    }

    /// Build services and load preferences from the application config
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let services = AppServices::from_config(config)?;
        let preferences = PreferencesModel::open(&config.preferences_path());
        Ok(Self::new(services, preferences))
    }

    pub fn weather(&self) -> &WeatherModel {
        &self.weather
    }

    pub fn preferences(&self) -> &PreferencesModel {
        &self.preferences
    }

    /// Whether any request is still outstanding
    pub fn is_busy(&self) -> bool {
        self.weather.loading() || self.locating
    }

    /// Fetch weather for typed text. Blank text does nothing and returns `false`.
    pub fn search(&mut self, text: &str) -> bool {
        let Some(locator) = resolve_by_name(text) else {
            tracing::debug!("Ignoring blank search");
            return false;
        };
        self.weather.set_query(text.trim());
        self.fetch(locator);
        true
    }

    /// Ask for the device position; a result triggers a fetch, a failure is ignored
    pub fn locate_device(&mut self) {
        if !location::is_available(self.services.location_settings()) {
            tracing::debug!("No device location source configured");
            return;
        }
        self.locating = true;
        request_weather_locate(
            &self.services.runtime(),
            self.services.weather_service_tx(),
            self.services.location_settings().clone(),
        );
    }

    /// Fetch a favorite by 1-based position or by name
    pub fn open_favorite(&mut self, selector: &str) -> bool {
        let selector = selector.trim();
        let name = match selector.parse::<usize>() {
            Ok(n) => match n
                .checked_sub(1)
                .and_then(|i| self.preferences.favorites().get(i))
            {
                Some(name) => name.clone(),
                None => {
                    tracing::debug!("No favorite at position {}", n);
                    return false;
                }
            },
            Err(_) => selector.to_string(),
        };
        self.search(&name)
    }

    /// Save the location whose conditions are on screen, by its provider name.
    /// Does nothing while no current conditions are loaded.
    pub fn save_favorite(&mut self) -> Option<String> {
        let name = self.weather.current()?.name.trim().to_string();
        if name.is_empty() {
            return None;
        }
        self.preferences.add_favorite(&name);
        Some(name)
    }

    pub fn add_favorite(&mut self, name: &str) -> bool {
        self.preferences.add_favorite(name.trim())
    }

    pub fn remove_favorite(&mut self, name: &str) -> bool {
        self.preferences.remove_favorite(name)
    }

    pub fn toggle_unit(&mut self) -> UnitSystem {
        self.preferences.toggle_unit()
    }

    pub fn set_unit(&mut self, unit: UnitSystem) -> bool {
        self.preferences.set_unit(unit)
    }

    pub fn toggle_dark_mode(&mut self) -> bool {
        self.preferences.toggle_dark_mode()
    }

    pub fn set_dark_mode(&mut self, dark_mode: bool) -> bool {
        self.preferences.set_dark_mode(dark_mode)
    }

    /// Apply every message that has already arrived. Returns how many.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Some(message) = self.services.try_recv_weather_message() {
            self.handle_message(message);
            handled += 1;
        }
        handled
    }

    /// Apply messages until nothing is outstanding or `timeout` passes.
    /// Returns `true` when idle.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.is_busy() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            if let Some(message) = self.services.recv_weather_message_timeout(remaining) {
                self.handle_message(message);
            }
        }
        true
    }

    pub fn render(&self, color: bool) -> String {
        render_dashboard(&View {
            weather: &self.weather,
            favorites: self.preferences.favorites(),
            unit: self.preferences.unit(),
            dark_mode: self.preferences.dark_mode(),
            color,
        })
    }

    pub fn shutdown(&self) {
        self.services.shutdown();
    }

    fn fetch(&mut self, locator: Locator) {
        let token = self.weather.begin_request();
        request_weather_fetch(
            &self.services.runtime(),
            self.services.weather_service_tx(),
            self.services.weather_provider(),
            token,
            locator,
        );
    }

    fn handle_message(&mut self, message: WeatherServiceMessage) {
        match message {
            WeatherServiceMessage::FetchDone { token, result } => {
                self.weather.apply_fetch(token, result);
            }
            WeatherServiceMessage::LocateDone(result) => {
                self.locating = false;
                match result {
                    Ok(coords) => {
                        tracing::info!("Fetching weather for device location {}", coords);
                        self.fetch(Locator::ByCoordinates(coords));
                    }
                    Err(e) => {
                        tracing::info!("Device location unavailable: {}", e);
                    }
                }
            }
        }
    }
}
