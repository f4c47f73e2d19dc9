//! OpenWeatherMap-compatible provider: current conditions then forecast.

use crate::types::{
    Coordinates, CurrentConditions, ForecastSample, Locator, WeatherError, WeatherReport,
};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("Skywatch/", env!("CARGO_PKG_VERSION"));

/// Everything needed to talk to the provider
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl ProviderSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct ApiCurrentResponse {
    name: String,
    #[serde(default)]
    sys: ApiSys,
    coord: ApiCoord,
    #[serde(default)]
    weather: Vec<ApiWeather>,
    main: ApiMain,
    #[serde(default)]
    wind: ApiWind,
}

#[derive(Debug, Default, Deserialize)]
struct ApiSys {
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    sunrise: i64,
    #[serde(default)]
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct ApiCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ApiWeather {
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    /// Integer in practice; some compatible providers send a float
    humidity: f64,
}

#[derive(Debug, Default, Deserialize)]
struct ApiWind {
    #[serde(default)]
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct ApiForecastResponse {
    #[serde(default)]
    list: Vec<ApiForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct ApiForecastEntry {
    dt: i64,
    dt_txt: String,
    main: ApiForecastMain,
    #[serde(default)]
    weather: Vec<ApiWeather>,
}

#[derive(Debug, Deserialize)]
struct ApiForecastMain {
    temp: f64,
    #[serde(default)]
    temp_min: Option<f64>,
    #[serde(default)]
    temp_max: Option<f64>,
}

impl ApiCurrentResponse {
    fn into_conditions(self) -> CurrentConditions {
        let weather = self.weather.into_iter().next().unwrap_or_default();
        CurrentConditions {
            name: self.name,
            country: self.sys.country.unwrap_or_default(),
            description: weather.description,
            icon: weather.icon,
            temperature: self.main.temp,
            feels_like: self.main.feels_like,
            temp_min: self.main.temp_min,
            temp_max: self.main.temp_max,
            humidity: self.main.humidity.round().clamp(0.0, 100.0) as u8,
            wind_speed: self.wind.speed,
            sunrise: self.sys.sunrise,
            sunset: self.sys.sunset,
            coordinates: Coordinates {
                latitude: self.coord.lat,
                longitude: self.coord.lon,
            },
        }
    }
}

impl From<ApiForecastEntry> for ForecastSample {
    fn from(entry: ApiForecastEntry) -> Self {
        let weather = entry.weather.into_iter().next().unwrap_or_default();
        Self {
            dt: entry.dt,
            dt_txt: entry.dt_txt,
            temperature: entry.main.temp,
            temp_min: entry.main.temp_min.unwrap_or(entry.main.temp),
            temp_max: entry.main.temp_max.unwrap_or(entry.main.temp),
            icon: weather.icon,
            description: weather.description,
        }
    }
}

/// Weather provider client. Always requests metric units.
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl WeatherProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    /// Fetch current conditions, then the forecast for the same place.
    ///
    /// A failed current-conditions request fails the whole sequence and the
    /// forecast is never requested. A failed forecast request still returns
    /// the current conditions, with an empty forecast and `forecast_error` set.
    #[instrument(skip(self, locator), fields(locator = %locator), level = "info")]
    pub async fn fetch_current_and_forecast(
        &self,
        locator: &Locator,
    ) -> Result<WeatherReport, WeatherError> {
        let current = self.fetch_current(locator).await?;

        // By name: use where the provider resolved the city to.
        // By position: keep asking about the exact position we were given.
        let coords = match locator {
            Locator::ByName(_) => current.coordinates,
            Locator::ByCoordinates(coords) => *coords,
        };

        match self.fetch_forecast(coords).await {
            Ok(forecast) => {
                tracing::info!(
                    "Fetched weather for {} ({} forecast samples)",
                    current.name,
                    forecast.len()
                );
                Ok(WeatherReport {
                    current,
                    forecast,
                    forecast_error: None,
                })
            }
            Err(e) => {
                tracing::warn!("Forecast for {} failed: {}", current.name, e);
                Ok(WeatherReport {
                    current,
                    forecast: Vec::new(),
                    forecast_error: Some(WeatherError::PartialFailure(e.to_string())),
                })
            }
        }
    }

    /// Fetch current conditions by city name or position
    #[instrument(skip(self, locator), fields(locator = %locator), level = "debug")]
    pub async fn fetch_current(&self, locator: &Locator) -> Result<CurrentConditions, WeatherError> {
        let mut url = self.endpoint("weather")?;
        match locator {
            Locator::ByName(name) => {
                url.query_pairs_mut().append_pair("q", name);
            }
            Locator::ByCoordinates(coords) => {
                url.query_pairs_mut()
                    .append_pair("lat", &coords.latitude.to_string())
                    .append_pair("lon", &coords.longitude.to_string());
            }
        }
        self.append_common(&mut url);

        let response = self.client.get(url).send().await.map_err(redact)?;
        let status = response.status();
        if !status.is_success() {
            tracing::info!("Current conditions for '{}' returned {}", locator, status);
            return Err(WeatherError::NotFound {
                query: locator.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(redact)?;
        let parsed: ApiCurrentResponse = serde_json::from_str(&body)
            .map_err(|e| WeatherError::Parse(format!("current conditions: {}", e)))?;

        Ok(parsed.into_conditions())
    }

    /// Fetch the 3-hour forecast list for a position
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_forecast(
        &self,
        coords: Coordinates,
    ) -> Result<Vec<ForecastSample>, WeatherError> {
        let mut url = self.endpoint("forecast")?;
        url.query_pairs_mut()
            .append_pair("lat", &coords.latitude.to_string())
            .append_pair("lon", &coords.longitude.to_string());
        self.append_common(&mut url);

        let response = self.client.get(url).send().await.map_err(redact)?;
        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Api {
                endpoint: "forecast",
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(redact)?;
        let parsed: ApiForecastResponse = serde_json::from_str(&body)
            .map_err(|e| WeatherError::Parse(format!("forecast: {}", e)))?;

        tracing::debug!("Forecast returned {} samples", parsed.list.len());
        Ok(parsed.list.into_iter().map(ForecastSample::from).collect())
    }

    fn endpoint(&self, path: &str) -> Result<Url, WeatherError> {
        let raw = format!("{}/{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| WeatherError::InvalidUrl(format!("{}: {}", raw, e)))
    }

    fn append_common(&self, url: &mut Url) {
        url.query_pairs_mut()
            .append_pair("units", "metric")
            .append_pair("appid", &self.api_key);
    }
}

/// Drop the request URL from transport errors; it carries the API key.
fn redact(error: reqwest::Error) -> WeatherError {
    WeatherError::Network(error.without_url())
}
