//! Resolver pipeline orchestration
//!
//! Sequences the three stages (address → location → weather) and maps each
//! failure kind to a silent stop, a user-visible notification, or a hard
//! error. Stages never interleave within a run, and only one run may be in
//! flight at a time.

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::Result;
use crate::address::AddressResolver;
use crate::error::{LocalcastError, Stage};
use crate::location::LocationResolver;
use crate::render::{RenderSink, render_report};
use crate::weather::WeatherFetcher;

/// How a pipeline run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Weather was fetched and all sink fields were written
    Rendered,
    /// An early stage found nothing; the run stopped without user feedback
    Stopped,
    /// The weather service did not know the city; the user was notified
    PlaceNotFound,
}

/// Orchestrator for one address → location → weather resolution cycle
pub struct Pipeline<A, L, W> {
    address: A,
    location: L,
    weather: W,
    // Held for the duration of a run so overlapping starts are refused
    in_flight: Mutex<()>,
}

impl<A, L, W> Pipeline<A, L, W>
where
    A: AddressResolver,
    L: LocationResolver,
    W: WeatherFetcher,
{
    /// Create a pipeline from its three stages
    pub fn new(address: A, location: L, weather: W) -> Self {
        Self {
            address,
            location,
            weather,
            in_flight: Mutex::new(()),
        }
    }

    /// Run the full resolution cycle and render the result onto `sink`
    ///
    /// # Errors
    /// Returns `Busy` when a prior run is still in flight, and a
    /// malformed-response or network error when a stage fails hard. A
    /// "not found" from the first two stages is not an error: the run
    /// stops silently with [`RunOutcome::Stopped`].
    pub async fn run<S: RenderSink>(&self, sink: &mut S) -> Result<RunOutcome> {
        let guard = self.in_flight.try_lock().map_err(|_| LocalcastError::Busy)?;

        debug!("Pipeline run started");
        let address = match self.address.resolve_address().await {
            Ok(address) => address,
            Err(e @ LocalcastError::NotFound { .. }) => return Self::stop_silently(guard, &e),
            Err(e) => return Err(e),
        };

        let city = match self.location.resolve_city(&address).await {
            Ok(city) => city,
            Err(e @ LocalcastError::NotFound { .. }) => return Self::stop_silently(guard, &e),
            Err(e) => return Err(e),
        };

        self.fetch_and_render(&city, sink).await
    }

    /// Fetch weather for a user-supplied city, skipping the resolver stages
    ///
    /// # Errors
    /// Same as [`Pipeline::run`], except that a "not found" here is the
    /// weather stage's and is surfaced through the sink.
    pub async fn run_for_city<S: RenderSink>(&self, city: &str, sink: &mut S) -> Result<RunOutcome> {
        let _guard = self.in_flight.try_lock().map_err(|_| LocalcastError::Busy)?;

        debug!("Pipeline run started for city {}", city);
        self.fetch_and_render(city, sink).await
    }

    async fn fetch_and_render<S: RenderSink>(&self, city: &str, sink: &mut S) -> Result<RunOutcome> {
        match self.weather.fetch_current(city).await {
            Ok(report) => {
                render_report(sink, &report);
                debug!("Pipeline run finished");
                Ok(RunOutcome::Rendered)
            }
            Err(e @ LocalcastError::NotFound {
                stage: Stage::Weather,
                ..
            }) => {
                warn!("Weather lookup failed: {}", e);
                sink.notify(&e.user_message());
                Ok(RunOutcome::PlaceNotFound)
            }
            Err(e) => Err(e),
        }
    }

    fn stop_silently(
        guard: tokio::sync::MutexGuard<'_, ()>,
        error: &LocalcastError,
    ) -> Result<RunOutcome> {
        drop(guard);
        warn!("Pipeline stopped early: {}", error);
        Ok(RunOutcome::Stopped)
    }
}
