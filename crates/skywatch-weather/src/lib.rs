//! Weather data pipeline for Skywatch
//!
//! Fetches current conditions and the 3-hour forecast from an
//! OpenWeatherMap-compatible API, derives the hourly and daily views, and
//! formats metric values for display in the user's unit system.

pub mod forecast;
pub mod location;
pub mod provider;
pub mod types;
pub mod units;

pub use forecast::{daily, hourly};
pub use location::{resolve_by_device, resolve_by_name, LocationSettings};
pub use provider::{ProviderSettings, WeatherProvider};
pub use types::*;
pub use units::UnitSystem;
