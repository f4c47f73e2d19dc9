//! Plain-text dashboard panels.
//!
//! All values arrive in metric and are converted here, at display time, to
//! the unit the user picked. Nothing rendered is fed back into the models.

use std::fmt::Write as _;

use skywatch_weather::units::{
    format_clock, format_humidity, format_temperature, format_wind,
};
use skywatch_weather::{CurrentConditions, ForecastSample, UnitSystem};

use crate::models::WeatherModel;

pub const HOURLY_TITLE: &str = "Next ~12 hours";
pub const DAILY_TITLE: &str = "5-Day Forecast";
pub const NO_HOURLY_DATA: &str = "No hourly data";
pub const NO_DAILY_DATA: &str = "No daily data";

const RESET: &str = "\x1b[0m";

/// Colors for one theme. Empty strings when color is off.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    title: &'static str,
    heading: &'static str,
    text: &'static str,
    muted: &'static str,
    error: &'static str,
    reset: &'static str,
}

impl Palette {
    pub fn new(dark_mode: bool, color: bool) -> Self {
        match (color, dark_mode) {
            (false, _) => Self {
                title: "",
                heading: "",
                text: "",
                muted: "",
                error: "",
                reset: "",
            },
            (true, true) => Self {
                title: "\x1b[1;96m",
                heading: "\x1b[1;97m",
                text: "\x1b[37m",
                muted: "\x1b[90m",
                error: "\x1b[91m",
                reset: RESET,
            },
            (true, false) => Self {
                title: "\x1b[1;34m",
                heading: "\x1b[1;30m",
                text: "\x1b[30m",
                muted: "\x1b[2m",
                error: "\x1b[31m",
                reset: RESET,
            },
        }
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if style.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", style, text, self.reset)
        }
    }
}

/// What to draw and how
#[derive(Debug, Clone)]
pub struct View<'a> {
    pub weather: &'a WeatherModel,
    pub favorites: &'a [String],
    pub unit: UnitSystem,
    pub dark_mode: bool,
    pub color: bool,
}

/// Render every panel, top to bottom
pub fn render_dashboard(view: &View<'_>) -> String {
    let palette = Palette::new(view.dark_mode, view.color);
    let mut out = String::new();

    render_header(&mut out, view, &palette);
    render_favorites(&mut out, view.favorites, &palette);

    if let Some(message) = view.weather.error_message() {
        let _ = writeln!(out, "{}", palette.paint(palette.error, &format!("! {}", message)));
        out.push('\n');
    }

    match view.weather.current() {
        Some(current) => {
            render_current(&mut out, current, view.unit, &palette);
            render_hourly(&mut out, &view.weather.hourly(), view.unit, &palette);
            render_daily(&mut out, &view.weather.daily(), view.unit, &palette);
        }
        None if view.weather.loading() => {
            let _ = writeln!(out, "{}", palette.paint(palette.muted, "Loading..."));
        }
        None => {
            let _ = writeln!(
                out,
                "{}",
                palette.paint(palette.muted, "Search for a city to see its weather.")
            );
        }
    }

    out
}

fn render_header(out: &mut String, view: &View<'_>, palette: &Palette) {
    let theme = if view.dark_mode { "dark" } else { "light" };
    let _ = writeln!(
        out,
        "{}  {}",
        palette.paint(palette.title, "Skywatch"),
        palette.paint(
            palette.muted,
            &format!("[{}] [{}]", view.unit.temperature_suffix(), theme)
        )
    );
    if view.weather.loading() && view.weather.has_data() {
        let _ = writeln!(out, "{}", palette.paint(palette.muted, "Refreshing..."));
    }
    out.push('\n');
}

/// Favorites as a numbered list, in saved order
pub fn render_favorites(out: &mut String, favorites: &[String], palette: &Palette) {
    let _ = writeln!(out, "{}", palette.paint(palette.heading, "Favorites"));
    if favorites.is_empty() {
        let _ = writeln!(out, "  {}", palette.paint(palette.muted, "No favorites yet"));
    }
    for (i, name) in favorites.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, palette.paint(palette.text, name));
    }
    out.push('\n');
}

fn render_current(out: &mut String, current: &CurrentConditions, unit: UnitSystem, palette: &Palette) {
    let _ = writeln!(out, "{}", palette.paint(palette.heading, &current.display_name()));
    let _ = writeln!(
        out,
        "  {}  {}",
        palette.paint(palette.title, &format_temperature(current.temperature, unit)),
        palette.paint(palette.text, &current.description)
    );

    let rows = [
        ("Feels like", format_temperature(current.feels_like, unit)),
        ("Humidity", format_humidity(current.humidity)),
        ("Wind", format_wind(current.wind_speed, unit)),
        (
            "Max / Min",
            format!(
                "{} / {}",
                format_temperature(current.temp_max, unit),
                format_temperature(current.temp_min, unit)
            ),
        ),
        ("Sunrise", format_clock(current.sunrise)),
        ("Sunset", format_clock(current.sunset)),
        ("Icon", current.icon_url()),
    ];
    for (label, value) in rows {
        let _ = writeln!(
            out,
            "  {} {}",
            palette.paint(palette.muted, &format!("{:<10}", label)),
            palette.paint(palette.text, &value)
        );
    }
    out.push('\n');
}

fn render_hourly(out: &mut String, samples: &[ForecastSample], unit: UnitSystem, palette: &Palette) {
    let _ = writeln!(out, "{}", palette.paint(palette.heading, HOURLY_TITLE));
    if samples.is_empty() {
        let _ = writeln!(out, "  {}", palette.paint(palette.muted, NO_HOURLY_DATA));
    }
    for sample in samples {
        let _ = writeln!(
            out,
            "  {}  {:>8}  {}",
            format_clock(sample.dt),
            format_temperature(sample.temperature, unit),
            palette.paint(palette.muted, &sample.description)
        );
    }
    out.push('\n');
}

fn render_daily(out: &mut String, samples: &[ForecastSample], unit: UnitSystem, palette: &Palette) {
    let _ = writeln!(out, "{}", palette.paint(palette.heading, DAILY_TITLE));
    if samples.is_empty() {
        let _ = writeln!(out, "  {}", palette.paint(palette.muted, NO_DAILY_DATA));
    }
    for sample in samples {
        let range = format!(
            "min {} / max {}",
            format_temperature(sample.temp_min, unit),
            format_temperature(sample.temp_max, unit)
        );
        let _ = writeln!(
            out,
            "  {:<11} {:>8}  {:<22} {}",
            day_label(sample),
            format_temperature(sample.temperature, unit),
            range,
            palette.paint(palette.muted, &sample.description)
        );
    }
}

/// e.g. "Tue, Jan 6"; falls back to the raw date text
pub fn day_label(sample: &ForecastSample) -> String {
    sample
        .timestamp()
        .map(|t| t.format("%a, %b %-d").to_string())
        .unwrap_or_else(|| sample.dt_txt.chars().take(10).collect())
}
