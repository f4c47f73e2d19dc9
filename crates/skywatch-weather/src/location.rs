//! Location resolution: typed city names and best-effort device position.
//!
//! A terminal has no geolocation prompt, so the "device" position is, in
//! order: fixed coordinates from config, then an IP-geolocation lookup when
//! enabled. With neither configured the request is treated as denied.

use crate::types::{Coordinates, LocationError, Locator};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("Skywatch/", env!("CARGO_PKG_VERSION"));

/// Where the device position comes from
#[derive(Debug, Clone, Default)]
pub struct LocationSettings {
    pub fixed: Option<Coordinates>,
    pub ip_lookup_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    #[serde(alias = "latitude")]
    lat: Option<f64>,
    #[serde(alias = "longitude")]
    lon: Option<f64>,
    #[serde(default)]
    status: Option<String>,
}

/// Turn typed search text into a locator.
///
/// Returns `None` for blank input. Whether the name is a real place is only
/// known once the provider answers.
pub fn resolve_by_name(text: &str) -> Option<Locator> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(Locator::ByName(trimmed.to_string()))
    }
}

/// Whether any device location source is configured
pub fn is_available(settings: &LocationSettings) -> bool {
    settings.fixed.is_some() || settings.ip_lookup_url.is_some()
}

/// Best-effort device position.
///
/// Callers are expected to log and drop the error: a missing position is a
/// normal outcome, not something to show the user.
pub async fn resolve_by_device(settings: &LocationSettings) -> Result<Coordinates, LocationError> {
    if let Some(fixed) = settings.fixed {
        tracing::debug!("Using configured location {}", fixed);
        return Ok(fixed);
    }

    match &settings.ip_lookup_url {
        Some(url) => lookup_ip_location(url).await,
        None => Err(LocationError::PermissionDenied),
    }
}

async fn lookup_ip_location(url: &str) -> Result<Coordinates, LocationError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| LocationError::Other(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            LocationError::Timeout
        } else {
            tracing::debug!("IP location request failed: {}", e);
            LocationError::ServiceUnavailable
        }
    })?;

    if !response.status().is_success() {
        tracing::debug!("IP location returned status {}", response.status());
        return Err(LocationError::ServiceUnavailable);
    }

    let body: IpLookupResponse = response
        .json()
        .await
        .map_err(|e| LocationError::Other(format!("IP location parse error: {}", e)))?;

    if body.status.as_deref() == Some("fail") {
        return Err(LocationError::ServiceUnavailable);
    }

    match (body.lat, body.lon) {
        (Some(lat), Some(lon)) => {
            let coords = Coordinates::new(lat, lon)?;
            tracing::info!("Located device at {}", coords);
            Ok(coords)
        }
        _ => Err(LocationError::Other(
            "IP location response had no coordinates".to_string(),
        )),
    }
}
