//! Weather backend: current-then-forecast fetches and device location.
//! All network work runs off the UI thread; results sent via mpsc.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use skywatch_core::{NetworkError, ReqwestErrorExt};
use skywatch_weather::{Coordinates, LocationSettings, Locator, WeatherProvider, WeatherReport};

/// Error type for weather operations
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherError {
    NotFound(String),
    Network(String),
    Timeout,
    PartialFailure(String),
    Api(String),
    Parse(String),
    Location(String),
    MissingApiKey,
}

impl std::fmt::Display for WeatherError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherError::NotFound(s) => write!(f, "Location not found: {}", s),
            WeatherError::Network(s) => write!(f, "Weather error: {}", s),
            WeatherError::Timeout => write!(f, "Weather request timed out"),
            WeatherError::PartialFailure(s) => write!(f, "Forecast unavailable: {}", s),
            WeatherError::Api(s) => write!(f, "Weather API error: {}", s),
            WeatherError::Parse(s) => write!(f, "Unexpected weather response: {}", s),
            WeatherError::Location(s) => write!(f, "Location error: {}", s),
            WeatherError::MissingApiKey => write!(f, "Weather API key not configured"),
        }
    }
}

impl std::error::Error for WeatherError {}

impl From<skywatch_weather::WeatherError> for WeatherError {
    fn from(e: skywatch_weather::WeatherError) -> Self {
        use skywatch_weather::WeatherError as Provider;

        match e {
            Provider::NotFound { query, status } => {
                tracing::debug!("Provider rejected '{}' with HTTP {}", query, status);
                WeatherError::NotFound(query)
            }
            Provider::Network(e) => match e.into_network_error() {
                NetworkError::Timeout => WeatherError::Timeout,
                other => WeatherError::Network(other.to_string()),
            },
            Provider::PartialFailure(s) => WeatherError::PartialFailure(s),
            e @ Provider::Api { .. } => WeatherError::Api(e.to_string()),
            Provider::InvalidUrl(s) => WeatherError::Api(s),
            Provider::Parse(s) => WeatherError::Parse(s),
            Provider::Location(e) => WeatherError::Location(e.to_string()),
        }
    }
}

/// Messages sent from async operations back to the UI thread
#[derive(Debug)]
pub enum WeatherServiceMessage {
    /// Result of a fetch, tagged with the token it was issued under
    FetchDone {
        token: u64,
        result: Result<WeatherReport, WeatherError>,
    },
    /// Result of a device location request
    LocateDone(Result<Coordinates, WeatherError>),
}

/// Request current conditions and forecast asynchronously.
/// Sends `FetchDone` with the same `token` on the channel when complete.
pub fn request_fetch(
    runtime: &tokio::runtime::Handle,
    tx: &Sender<WeatherServiceMessage>,
    provider: Option<Arc<WeatherProvider>>,
    token: u64,
    locator: Locator,
) {
    let tx = tx.clone();
    let provider = match provider {
        Some(p) => p,
        None => {
            let _ = tx.send(WeatherServiceMessage::FetchDone {
                token,
                result: Err(WeatherError::MissingApiKey),
            });
            return;
        }
    };

    runtime.spawn(async move {
        tracing::debug!("Fetching weather for {} (request {})", locator, token);
        let result = provider
            .fetch_current_and_forecast(&locator)
            .await
            .map_err(WeatherError::from);
        let _ = tx.send(WeatherServiceMessage::FetchDone { token, result });
    });
}

/// Request the device position asynchronously.
/// Sends `LocateDone` on the channel when complete.
pub fn request_locate(
    runtime: &tokio::runtime::Handle,
    tx: &Sender<WeatherServiceMessage>,
    settings: LocationSettings,
) {
    let tx = tx.clone();
    runtime.spawn(async move {
        let result = skywatch_weather::resolve_by_device(&settings)
            .await
            .map_err(|e| WeatherError::Location(e.to_string()));
        let _ = tx.send(WeatherServiceMessage::LocateDone(result));
    });
}
