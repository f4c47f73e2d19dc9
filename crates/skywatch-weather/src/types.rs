use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Provider icon images, addressed by icon id (e.g. `10d`)
pub const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn";

/// Format of the provider's `dt_txt` field
pub const FORECAST_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// URL of the large variant of a provider icon
pub fn icon_url(icon: &str) -> String {
    format!("{}/{}@2x.png", ICON_BASE_URL, icon)
}

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build a position, rejecting values outside the valid ranges
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, LocationError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(LocationError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// What to ask the provider about: a free-text city or a position
#[derive(Debug, Clone, PartialEq)]
pub enum Locator {
    ByName(String),
    ByCoordinates(Coordinates),
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locator::ByName(name) => write!(f, "{}", name),
            Locator::ByCoordinates(coords) => write!(f, "{}", coords),
        }
    }
}

/// Current weather conditions. Always metric (°C, m/s).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Canonical location name as spelled by the provider
    pub name: String,
    /// ISO country code, empty when the provider omits it
    pub country: String,
    pub description: String,
    pub icon: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Relative humidity in percent
    pub humidity: u8,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Unix timestamp (seconds)
    pub sunrise: i64,
    /// Unix timestamp (seconds)
    pub sunset: i64,
    /// Where the provider resolved the location to
    pub coordinates: Coordinates,
}

impl CurrentConditions {
    /// "London, GB", or just the name when no country is known
    pub fn display_name(&self) -> String {
        if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        }
    }

    pub fn icon_url(&self) -> String {
        icon_url(&self.icon)
    }
}

/// One 3-hour forecast step. Always metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Unix timestamp (seconds)
    pub dt: i64,
    /// Provider timestamp text, `YYYY-MM-DD HH:MM:SS`
    pub dt_txt: String,
    pub temperature: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub icon: String,
    pub description: String,
}

impl ForecastSample {
    /// The `HH:MM:SS` part of `dt_txt`
    pub fn time_of_day(&self) -> Option<&str> {
        self.dt_txt
            .split_once(|c: char| c == ' ' || c == 'T')
            .map(|(_, time)| time)
    }

    /// `dt_txt` parsed as a wall-clock date and time
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.dt_txt, FORECAST_TIMESTAMP_FORMAT).ok()
    }

    pub fn icon_url(&self) -> String {
        icon_url(&self.icon)
    }
}

/// Result of one current-then-forecast fetch sequence
#[derive(Debug)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    /// Raw 3-hour samples in provider order; empty when the forecast failed
    pub forecast: Vec<ForecastSample>,
    /// Set (to `WeatherError::PartialFailure`) when current conditions
    /// succeeded but the forecast request did not
    pub forecast_error: Option<WeatherError>,
}

impl WeatherReport {
    pub fn is_partial(&self) -> bool {
        self.forecast_error.is_some()
    }
}

/// Location service errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Invalid coordinates: {latitude}, {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
    #[error("Location error: {0}")]
    Other(String),
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("No weather found for '{query}' (HTTP {status})")]
    NotFound { query: String, status: u16 },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Forecast request failed: {0}")]
    PartialFailure(String),
    #[error("Provider returned HTTP {status} for {endpoint}")]
    Api { endpoint: &'static str, status: u16 },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Location error: {0}")]
    Location(#[from] LocationError),
    #[error("Invalid provider URL: {0}")]
    InvalidUrl(String),
}
