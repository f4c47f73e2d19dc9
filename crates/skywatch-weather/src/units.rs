//! Display-time unit conversion.
//!
//! Weather values are stored in metric (°C, m/s). Everything here is a pure
//! read-time function; nothing converts stored data in place.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

/// 1 m/s in miles per hour
pub const MPH_PER_METER_PER_SECOND: f64 = 2.2369362920544;

/// Unit system preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// The other unit system
    pub fn toggled(self) -> Self {
        match self {
            Self::Metric => Self::Imperial,
            Self::Imperial => Self::Metric,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Self::Metric => "°C",
            Self::Imperial => "°F",
        }
    }

    pub fn wind_suffix(&self) -> &'static str {
        match self {
            Self::Metric => "m/s",
            Self::Imperial => "mph",
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UnitSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metric" | "c" | "celsius" => Ok(Self::Metric),
            "imperial" | "f" | "fahrenheit" => Ok(Self::Imperial),
            other => Err(format!("unknown unit system '{}'", other)),
        }
    }
}

/// Round to one decimal place, half away from zero
pub fn round1(value: f64) -> f64 {
    // `+ 0.0` turns -0.0 into 0.0 so it never renders as "-0"
    (value * 10.0).round() / 10.0 + 0.0
}

/// °C to °F, rounded to one decimal place
pub fn to_fahrenheit(celsius: f64) -> f64 {
    round1(celsius * 9.0 / 5.0 + 32.0)
}

/// m/s to mph, rounded to one decimal place
pub fn to_mph(meters_per_second: f64) -> f64 {
    round1(meters_per_second * MPH_PER_METER_PER_SECOND)
}

/// A metric temperature as a rounded number in `unit`
pub fn temperature_value(celsius: f64, unit: UnitSystem) -> f64 {
    match unit {
        UnitSystem::Metric => round1(celsius),
        UnitSystem::Imperial => to_fahrenheit(celsius),
    }
}

/// A metric wind speed as a rounded number in `unit`
pub fn wind_value(meters_per_second: f64, unit: UnitSystem) -> f64 {
    match unit {
        UnitSystem::Metric => round1(meters_per_second),
        UnitSystem::Imperial => to_mph(meters_per_second),
    }
}

/// e.g. `21.5°C`, `70.7°F`
pub fn format_temperature(celsius: f64, unit: UnitSystem) -> String {
    format!(
        "{}{}",
        temperature_value(celsius, unit),
        unit.temperature_suffix()
    )
}

/// e.g. `4.1 m/s`, `9.2 mph`
pub fn format_wind(meters_per_second: f64, unit: UnitSystem) -> String {
    format!(
        "{} {}",
        wind_value(meters_per_second, unit),
        unit.wind_suffix()
    )
}

pub fn format_humidity(percent: u8) -> String {
    format!("{}%", percent)
}

/// Unix seconds as `HH:MM` in the local time zone
pub fn format_clock(unix_seconds: i64) -> String {
    format_clock_in(unix_seconds, &Local)
}

/// Unix seconds as `HH:MM` in `tz`, `--:--` when out of range
pub fn format_clock_in<Tz: TimeZone>(unix_seconds: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    DateTime::from_timestamp(unix_seconds, 0)
        .map(|utc| utc.with_timezone(tz).format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}
