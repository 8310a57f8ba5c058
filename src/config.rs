//! Configuration management for `localcast`
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings. The weather
//! API key is injected here rather than embedded in code.

use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::LocalcastError;

/// Root configuration structure for the `localcast` application
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LocalcastConfig {
    /// Resolver pipeline configuration
    #[serde(default)]
    pub resolver: ResolverConfig,
    /// Weather API configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Resolver stage endpoints and request behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Base URL of the public-address ("what is my IP") service
    #[serde(default = "default_address_url")]
    pub address_url: String,
    /// Base URL of the IP geolocation service
    #[serde(default = "default_geolocation_url")]
    pub geolocation_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// Weather API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key
    pub api_key: Option<String>,
    /// Base URL for the weather API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_address_url() -> String {
    "https://api64.ipify.org".to_string()
}

fn default_geolocation_url() -> String {
    "https://ipapi.co".to_string()
}

fn default_timeout() -> u32 {
    10
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            address_url: default_address_url(),
            geolocation_url: default_geolocation_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LocalcastConfig {
    /// Load configuration from the default file location and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from the specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. LOCALCAST_WEATHER__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("LOCALCAST")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: LocalcastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("localcast").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate the weather API key
    pub fn validate_api_key(&self) -> Result<()> {
        match &self.weather.api_key {
            None => Err(LocalcastError::config(
                "Weather API key is missing. Set weather.api_key in the config file \
                 or the LOCALCAST_WEATHER__API_KEY environment variable.",
            )
            .into()),
            Some(api_key) if api_key.is_empty() => Err(LocalcastError::config(
                "Weather API key cannot be empty. Please provide a valid key.",
            )
            .into()),
            Some(api_key) if api_key.len() < 8 => Err(LocalcastError::config(
                "Weather API key appears to be invalid (too short). Please check your API key.",
            )
            .into()),
            Some(api_key) if api_key.len() > 100 => Err(LocalcastError::config(
                "Weather API key appears to be invalid (too long). Please check your API key.",
            )
            .into()),
            Some(_) => Ok(()),
        }
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.resolver.timeout_seconds == 0 {
            return Err(
                LocalcastError::config("Request timeout must be at least 1 second").into(),
            );
        }

        if self.resolver.timeout_seconds > 300 {
            return Err(
                LocalcastError::config("Request timeout cannot exceed 300 seconds").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(LocalcastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        for url in [
            &self.resolver.address_url,
            &self.resolver.geolocation_url,
            &self.weather.base_url,
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(LocalcastError::config(format!(
                    "Service URL '{url}' must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
