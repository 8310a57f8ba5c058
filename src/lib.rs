//! `localcast` - locates you by public IP and shows your city's weather
//!
//! This library chains three HTTP lookups in strict sequence: a public
//! address discovery, an address-to-city geolocation, and a weather fetch
//! for that city. The result is projected onto an injectable output sink.

pub mod address;
pub mod config;
pub mod error;
pub mod location;
pub mod pipeline;
pub mod render;
pub mod weather;

// Re-export core types for public API
pub use address::{AddressResolver, IpifyAddressResolver};
pub use config::LocalcastConfig;
pub use error::{LocalcastError, Stage};
pub use location::{IpapiLocationResolver, LocationResolver};
pub use pipeline::{Pipeline, RunOutcome};
pub use render::{ConsoleSink, RenderSink};
pub use weather::{OpenWeatherMapClient, WeatherFetcher, WeatherReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, LocalcastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
