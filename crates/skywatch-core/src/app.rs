use anyhow::Result;
use std::path::Path;

use crate::Config;

/// Application configuration and lifecycle manager
pub struct App {
    config: Config,
}

impl App {
    /// Create a new application instance from the default or given config file
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let (config, validation) = Config::load_validated(config_path)?;

        tracing::info!(
            "Loaded configuration from {} ({} warnings)",
            config.config_dir.display(),
            validation.warnings.len()
        );

        Ok(Self { config })
    }

    /// Shutdown the application
    pub fn shutdown(&mut self) -> Result<()> {
        tracing::info!("Shutting down application");
        Ok(())
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }
}
