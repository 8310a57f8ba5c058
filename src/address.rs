//! Public address discovery
//!
//! First stage of the resolver pipeline: asks a "what is my IP" service
//! (ipify by default) for the caller's public network address.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

use crate::Result;
use crate::error::{LocalcastError, Stage};

/// A stage that discovers the caller's public network address
#[async_trait]
pub trait AddressResolver {
    /// Resolve the caller's public address as a textual IPv4/IPv6 value
    async fn resolve_address(&self) -> Result<String>;
}

/// Address response from ipify
#[derive(Debug, Deserialize)]
struct IpifyResponse {
    ip: String,
}

/// Address resolver backed by the ipify HTTP API
pub struct IpifyAddressResolver {
    client: Client,
    base_url: String,
}

impl IpifyAddressResolver {
    /// Create a new resolver against the given service base URL
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AddressResolver for IpifyAddressResolver {
    async fn resolve_address(&self) -> Result<String> {
        let url = format!("{}/?format=json", self.base_url.trim_end_matches('/'));
        debug!("Requesting public address from {}", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LocalcastError::network(Stage::Address, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(LocalcastError::not_found(Stage::Address));
        }
        let response = response
            .error_for_status()
            .map_err(|e| LocalcastError::network(Stage::Address, e))?;

        let body = response
            .text()
            .await
            .map_err(|e| LocalcastError::network(Stage::Address, e))?;
        let parsed: IpifyResponse = serde_json::from_str(&body)
            .map_err(|e| LocalcastError::malformed(Stage::Address, e.to_string()))?;

        info!("Resolved public address: {}", parsed.ip);
        Ok(parsed.ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_response() {
        let parsed: IpifyResponse = serde_json::from_str(r#"{"ip":"203.0.113.5"}"#).unwrap();
        assert_eq!(parsed.ip, "203.0.113.5");
    }

    #[test]
    fn test_parse_rejects_missing_ip_field() {
        let result = serde_json::from_str::<IpifyResponse>(r#"{"address":"203.0.113.5"}"#);
        assert!(result.is_err());
    }
}
