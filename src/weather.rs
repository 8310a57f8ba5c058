//! Weather lookup by city name
//!
//! Final stage of the resolver pipeline: fetches current conditions for a
//! city from the OpenWeatherMap API. Temperatures come back in Kelvin and
//! are converted for display.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use crate::Result;
use crate::config::WeatherConfig;
use crate::error::{LocalcastError, Stage};

/// URL template for OpenWeatherMap condition icons
const ICON_URL_TEMPLATE: &str = "https://openweathermap.org/img/wn/{icon}@2x.png";

/// Current weather conditions for a city, as projected onto the sink
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    /// Display name of the city, as reported by the provider
    pub city_name: String,
    /// Raw temperature in Kelvin
    pub temperature_kelvin: f64,
    /// Primary condition keyword (e.g. "Clouds")
    pub condition_main: String,
    /// Longer condition description (e.g. "overcast clouds")
    pub condition_description: String,
    /// Provider icon identifier (e.g. "04d")
    pub icon_id: String,
}

impl WeatherReport {
    /// Temperature in whole degrees Celsius, rounded to the nearest integer
    ///
    /// Half-degree values round toward positive infinity, so -0.5°C
    /// displays as 0°C.
    #[must_use]
    pub fn temperature_celsius(&self) -> i32 {
        (self.temperature_kelvin - 273.15 + 0.5).floor() as i32
    }

    /// Format temperature with unit, e.g. "17°C"
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{}°C", self.temperature_celsius())
    }

    /// Icon image URL on the provider's CDN
    #[must_use]
    pub fn icon_url(&self) -> String {
        ICON_URL_TEMPLATE.replace("{icon}", &self.icon_id)
    }
}

/// A stage that retrieves current weather conditions for a city name
#[async_trait]
pub trait WeatherFetcher {
    /// Fetch current conditions for the given city
    async fn fetch_current(&self, city: &str) -> Result<WeatherReport>;
}

/// Current weather response from OpenWeatherMap
#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    name: String,
    main: MainReadings,
    weather: Vec<ConditionEntry>,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionEntry {
    main: String,
    description: String,
    icon: String,
}

/// Error body sent by OpenWeatherMap alongside non-success statuses
#[derive(Debug, Deserialize)]
struct ProviderError {
    message: Option<String>,
}

/// Weather fetcher backed by the OpenWeatherMap current-weather API
pub struct OpenWeatherMapClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherMapClient {
    /// Create a new client from the weather configuration
    ///
    /// # Errors
    /// Returns a configuration error when no API key is set.
    pub fn new(client: Client, config: &WeatherConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| LocalcastError::config("Weather API key is missing"))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl WeatherFetcher for OpenWeatherMapClient {
    async fn fetch_current(&self, city: &str) -> Result<WeatherReport> {
        let url = format!(
            "{}/weather?q={}&appid={}",
            self.base_url,
            urlencoding::encode(city),
            self.api_key
        );
        debug!("Fetching current weather for {}", city);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LocalcastError::network(Stage::Weather, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            // The provider sends a human-readable message with the 404
            let message = response
                .text()
                .await
                .ok()
                .and_then(|body| serde_json::from_str::<ProviderError>(&body).ok())
                .and_then(|e| e.message);
            return Err(match message {
                Some(message) => LocalcastError::not_found_with_message(Stage::Weather, message),
                None => LocalcastError::not_found(Stage::Weather),
            });
        }
        let response = response
            .error_for_status()
            .map_err(|e| LocalcastError::network(Stage::Weather, e))?;

        let body = response
            .text()
            .await
            .map_err(|e| LocalcastError::network(Stage::Weather, e))?;
        let parsed: CurrentWeatherResponse = serde_json::from_str(&body)
            .map_err(|e| LocalcastError::malformed(Stage::Weather, e.to_string()))?;

        let condition = parsed
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| LocalcastError::malformed(Stage::Weather, "weather array is empty"))?;

        let report = WeatherReport {
            city_name: parsed.name,
            temperature_kelvin: parsed.main.temp,
            condition_main: condition.main,
            condition_description: condition.description,
            icon_id: condition.icon,
        };

        info!(
            "Current weather for {}: {} ({})",
            report.city_name,
            report.format_temperature(),
            report.condition_description
        );
        Ok(report)
    }
}
