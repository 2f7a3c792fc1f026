//! Upstream weather provider interface

use crate::core_types::error::WeatherError;
use crate::core_types::meteo::MeteoSample;

/// Source of hourly forecasts for a location.
///
/// The HTTP client that talks to a real forecast service lives with the web
/// layer; the engine only needs this blocking call. Implementations return
/// hourly samples starting at the current hour.
pub trait WeatherProvider: Send + Sync {
    /// Fetch at least `hours` hourly samples for the location
    ///
    /// # Errors
    ///
    /// [`WeatherError::UpstreamUnavailable`] when the service cannot be
    /// reached, [`WeatherError::IncompleteSeries`] when it answers with too
    /// few hours.
    fn fetch_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        hours: usize,
    ) -> Result<Vec<MeteoSample>, WeatherError>;

    /// Short name for log messages
    fn name(&self) -> &str {
        "upstream"
    }
}
