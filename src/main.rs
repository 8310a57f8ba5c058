use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use localcast::{
    ConsoleSink, IpapiLocationResolver, IpifyAddressResolver, LocalcastConfig,
    OpenWeatherMapClient, Pipeline, RunOutcome,
};

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let config = LocalcastConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging.level);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.resolver.timeout_seconds.into()))
        .user_agent(concat!("localcast/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")?;

    let pipeline = Pipeline::new(
        IpifyAddressResolver::new(client.clone(), &config.resolver.address_url),
        IpapiLocationResolver::new(client.clone(), &config.resolver.geolocation_url),
        OpenWeatherMapClient::new(client, &config.weather)?,
    );

    let mut sink = ConsoleSink::new();
    let outcome = match std::env::args().nth(1) {
        Some(city) => pipeline.run_for_city(&city, &mut sink).await,
        None => pipeline.run(&mut sink).await,
    };

    match outcome {
        Ok(RunOutcome::Rendered) => Ok(ExitCode::SUCCESS),
        Ok(RunOutcome::Stopped) => {
            tracing::info!("No location could be determined; nothing to show");
            Ok(ExitCode::SUCCESS)
        }
        Ok(RunOutcome::PlaceNotFound) => Ok(ExitCode::FAILURE),
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}
