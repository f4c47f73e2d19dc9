use crate::services::weather_service::WeatherError as UiWeatherError;
use skywatch_core::{AppError, NetworkError, WeatherError};

impl From<UiWeatherError> for AppError {
    fn from(e: UiWeatherError) -> Self {
        match e {
            UiWeatherError::NotFound(s) => AppError::Weather(WeatherError::LocationNotFound(s)),
            UiWeatherError::Network(s) => AppError::Network(NetworkError::ConnectionFailed(s)),
            UiWeatherError::Timeout => AppError::Network(NetworkError::Timeout),
            UiWeatherError::PartialFailure(s) => AppError::Weather(WeatherError::PartialFailure(s)),
            UiWeatherError::Api(s) => AppError::Weather(WeatherError::ApiError(s)),
            UiWeatherError::Parse(s) => AppError::Network(NetworkError::InvalidResponse(s)),
            UiWeatherError::Location(_) => AppError::Weather(WeatherError::ServiceUnavailable),
            UiWeatherError::MissingApiKey => AppError::Weather(WeatherError::MissingApiKey),
        }
    }
}
