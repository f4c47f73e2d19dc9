//! Hourly and daily views over the provider's 3-hour forecast list.
//!
//! The daily view keeps only samples stamped exactly `12:00:00`. A provider
//! or time zone that never emits that timestamp yields an empty daily view;
//! there is no nearest-to-noon fallback.

use crate::types::ForecastSample;

/// Samples in the hourly view (about 12 hours at 3-hour spacing)
pub const HOURLY_SAMPLES: usize = 4;

/// Days in the daily view
pub const DAILY_SAMPLES: usize = 5;

/// Time of day picked as each day's representative sample
pub const MIDDAY: &str = "12:00:00";

/// The first [`HOURLY_SAMPLES`] samples, in list order
pub fn hourly(list: &[ForecastSample]) -> Vec<ForecastSample> {
    list.iter().take(HOURLY_SAMPLES).cloned().collect()
}

/// The midday samples, in list order, at most [`DAILY_SAMPLES`]
pub fn daily(list: &[ForecastSample]) -> Vec<ForecastSample> {
    list.iter()
        .filter(|sample| sample.time_of_day() == Some(MIDDAY))
        .take(DAILY_SAMPLES)
        .cloned()
        .collect()
}
