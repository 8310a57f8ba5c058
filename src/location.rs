//! Address-to-city geolocation
//!
//! Second stage of the resolver pipeline: maps a public network address to
//! a city name via the ipapi.co HTTP API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use crate::Result;
use crate::error::{LocalcastError, Stage};

/// A stage that maps a network address to a city name
#[async_trait]
pub trait LocationResolver {
    /// Resolve the city name for the given textual network address
    async fn resolve_city(&self, address: &str) -> Result<String>;
}

/// Geolocation response from ipapi.co
///
/// For reserved or unknown addresses the service answers 200 with an
/// error envelope instead of a geolocation record.
#[derive(Debug, Deserialize)]
struct IpapiResponse {
    city: Option<String>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

/// Location resolver backed by the ipapi.co HTTP API
pub struct IpapiLocationResolver {
    client: Client,
    base_url: String,
}

impl IpapiLocationResolver {
    /// Create a new resolver against the given service base URL
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl LocationResolver for IpapiLocationResolver {
    async fn resolve_city(&self, address: &str) -> Result<String> {
        let url = format!("{}/{}/json/", self.base_url.trim_end_matches('/'), address);
        debug!("Geolocating address {}", address);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LocalcastError::network(Stage::Location, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(LocalcastError::not_found(Stage::Location));
        }
        let response = response
            .error_for_status()
            .map_err(|e| LocalcastError::network(Stage::Location, e))?;

        let body = response
            .text()
            .await
            .map_err(|e| LocalcastError::network(Stage::Location, e))?;
        let parsed: IpapiResponse = serde_json::from_str(&body)
            .map_err(|e| LocalcastError::malformed(Stage::Location, e.to_string()))?;

        if parsed.error {
            let reason = parsed.reason.unwrap_or_else(|| "unknown address".to_string());
            return Err(LocalcastError::not_found_with_message(Stage::Location, reason));
        }

        let city = parsed
            .city
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LocalcastError::malformed(Stage::Location, "missing city field"))?;

        info!("Resolved address {} to city {}", address, city);
        Ok(city)
    }
}
