pub mod app_services;
pub mod controller;
pub mod error_mapping;
pub mod models;
pub mod render;
pub mod services;

pub use app_services::AppServices;
pub use controller::DashboardController;
pub use models::{PreferencesModel, WeatherModel};
