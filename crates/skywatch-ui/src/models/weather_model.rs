use skywatch_core::AppError;
use skywatch_weather::{CurrentConditions, ForecastSample, WeatherReport};

use crate::services::WeatherError;

/// Dashboard weather state.
///
/// Every fetch is issued under a token from [`WeatherModel::begin_request`].
/// Only the most recently issued token may change the state; results for
/// older tokens are dropped when they arrive.
#[derive(Debug, Default)]
pub struct WeatherModel {
    query: String,
    current: Option<CurrentConditions>,
    forecast: Vec<ForecastSample>,
    error_message: Option<String>,
    loading: bool,
    latest_token: u64,
}

impl WeatherModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text in the search field
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn current(&self) -> Option<&CurrentConditions> {
        self.current.as_ref()
    }

    /// Raw 3-hour samples from the last successful fetch
    pub fn forecast(&self) -> &[ForecastSample] {
        &self.forecast
    }

    pub fn hourly(&self) -> Vec<ForecastSample> {
        skywatch_weather::hourly(&self.forecast)
    }

    pub fn daily(&self) -> Vec<ForecastSample> {
        skywatch_weather::daily(&self.forecast)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn has_data(&self) -> bool {
        self.current.is_some()
    }

    pub fn latest_token(&self) -> u64 {
        self.latest_token
    }

    /// Issue a token for a new fetch, superseding any in flight
    pub fn begin_request(&mut self) -> u64 {
        self.latest_token += 1;
        self.loading = true;
        self.error_message = None;
        self.latest_token
    }

    /// Apply a finished fetch. Returns `false` if the result was stale.
    pub fn apply_fetch(&mut self, token: u64, result: Result<WeatherReport, WeatherError>) -> bool {
        if token != self.latest_token {
            tracing::debug!(
                "Discarding weather result for request {} (latest is {})",
                token,
                self.latest_token
            );
            return false;
        }

        self.loading = false;

        match result {
            Ok(report) => {
                tracing::info!("Weather loaded for {}", report.current.display_name());
                self.query = report.current.name.clone();
                self.error_message = report.forecast_error.map(|e| {
                    tracing::warn!("Forecast unavailable: {}", e);
                    AppError::from(WeatherError::from(e)).user_message().to_string()
                });
                self.current = Some(report.current);
                self.forecast = report.forecast;
            }
            Err(e) => {
                tracing::error!("Failed to fetch weather: {}", e);
                self.current = None;
                self.forecast.clear();
                self.error_message = Some(AppError::from(e).user_message().to_string());
            }
        }
        true
    }
}
