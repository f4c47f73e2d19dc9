pub mod preferences_model;
pub mod weather_model;

pub use preferences_model::PreferencesModel;
pub use weather_model::WeatherModel;
