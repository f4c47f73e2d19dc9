//! Application services shared by the dashboard.
//!
//! `AppServices` holds the tokio runtime that network work runs on, the
//! weather provider, the device location settings, and the channel that
//! carries results back to the UI thread.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use parking_lot::{Mutex, RwLock};

use skywatch_core::Config;
use skywatch_weather::{Coordinates, LocationSettings, ProviderSettings, WeatherProvider};

/// Message types for the weather service channel
pub use crate::services::WeatherServiceMessage;

pub struct AppServices {
    /// Tokio runtime for async operations
    runtime: tokio::runtime::Runtime,

    /// Weather provider, absent until an API key is configured
    weather_provider: RwLock<Option<Arc<WeatherProvider>>>,

    /// Where device location comes from
    location: LocationSettings,

    /// Weather service channel sender
    weather_service_tx: Sender<WeatherServiceMessage>,

    /// Weather service channel receiver
    weather_service_rx: Mutex<Receiver<WeatherServiceMessage>>,
}

impl AppServices {
    /// Build services from the application config.
    ///
    /// A missing API key is not an error here: the provider stays empty and
    /// every fetch reports `MissingApiKey`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = match config.api_key() {
            Some(key) => Some(
                ProviderSettings::new(key)
                    .with_base_url(config.weather.api_base_url.clone())
                    .with_timeout(config.request_timeout()),
            ),
            None => {
                tracing::warn!("No weather API key configured; searches will fail");
                None
            }
        };

        Self::new(provider.as_ref(), location_settings(config))
    }

    pub fn new(
        provider: Option<&ProviderSettings>,
        location: LocationSettings,
    ) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .thread_name("skywatch-tokio")
            .build()
            .context("Failed to create tokio runtime")?;

        let weather_provider = match provider {
            Some(settings) => Some(Arc::new(
                WeatherProvider::new(settings).context("Failed to create weather provider")?,
            )),
            None => None,
        };

        let (tx, rx) = mpsc::channel();
        tracing::info!("Weather service initialized");

        Ok(Self {
            runtime,
            weather_provider: RwLock::new(weather_provider),
            location,
            weather_service_tx: tx,
            weather_service_rx: Mutex::new(rx),
        })
    }

    /// Get the tokio runtime handle.
    pub fn runtime(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }

    /// Get the weather provider if initialized.
    pub fn weather_provider(&self) -> Option<Arc<WeatherProvider>> {
        self.weather_provider.read().clone()
    }

    /// Set or update the weather provider.
    pub fn set_weather_provider(&self, provider: Option<Arc<WeatherProvider>>) {
        *self.weather_provider.write() = provider;
    }

    pub fn location_settings(&self) -> &LocationSettings {
        &self.location
    }

    /// Get weather service sender.
    pub fn weather_service_tx(&self) -> &Sender<WeatherServiceMessage> {
        &self.weather_service_tx
    }

    /// Try to receive a message from the weather service channel (non-blocking).
    pub fn try_recv_weather_message(&self) -> Option<WeatherServiceMessage> {
        self.weather_service_rx.lock().try_recv().ok()
    }

    /// Wait up to `timeout` for the next weather service message.
    pub fn recv_weather_message_timeout(&self, timeout: Duration) -> Option<WeatherServiceMessage> {
        match self.weather_service_rx.lock().recv_timeout(timeout) {
            Ok(message) => Some(message),
            Err(RecvTimeoutError::Timeout) => None,
            // The sender lives in `self`, so this cannot happen while we exist
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drop the provider so no new fetches start.
    pub fn shutdown(&self) {
        tracing::info!("AppServices shutdown initiated");
        self.set_weather_provider(None);
    }
}

/// Translate `[location]` config into resolver settings
pub fn location_settings(config: &Config) -> LocationSettings {
    let fixed = config
        .fixed_coordinates()
        .and_then(|(lat, lon)| match Coordinates::new(lat, lon) {
            Ok(coords) => Some(coords),
            Err(e) => {
                tracing::warn!("Ignoring configured location: {}", e);
                None
            }
        });

    let ip_lookup_url = config
        .location
        .ip_lookup
        .then(|| config.location.ip_lookup_url.clone());

    LocationSettings {
        fixed,
        ip_lookup_url,
    }
}
