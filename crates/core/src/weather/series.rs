//! Assembly of the hourly meteorological series for a run
//!
//! Forecast runs consult the cache, then the upstream provider, and finally
//! fall back to the synthetic series; manual runs use a constant wind.
//! Hourly overrides are applied by index afterwards and every sample is
//! clamped into range, so the series handed to the integrator always has
//! exactly `duration` valid hours.

use crate::core_types::error::WeatherError;
use crate::core_types::meteo::{HourlyWindOverride, MeteoSample};
use crate::core_types::params::{MeteoSource, SimulationParams};
use crate::core_types::units::{Degrees, MetersPerSecond};
use crate::weather::cache::ForecastCache;
use crate::weather::clock::{Clock, SystemClock};
use crate::weather::provider::WeatherProvider;
use crate::weather::synthetic::{constant_wind_series, start_of_hour, synthetic_series};
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds validated meteorological series for simulation runs
///
/// Holds the shared forecast cache and the upstream provider. Cheap to
/// clone; clones share the cache.
#[derive(Clone)]
pub struct MeteoSeriesBuilder {
    cache: Arc<ForecastCache>,
    provider: Option<Arc<dyn WeatherProvider>>,
    clock: Arc<dyn Clock>,
}

impl Default for MeteoSeriesBuilder {
    fn default() -> Self {
        Self::new(Arc::new(ForecastCache::new()))
    }
}

impl MeteoSeriesBuilder {
    /// Builder without an upstream provider; forecast runs use the synthetic
    /// series
    #[must_use]
    pub fn new(cache: Arc<ForecastCache>) -> Self {
        Self {
            cache,
            provider: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `provider` for forecast runs
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn WeatherProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Use `clock` for series start times
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Shared forecast cache
    #[must_use]
    pub fn cache(&self) -> &Arc<ForecastCache> {
        &self.cache
    }

    /// Series for a validated request: exactly `params.duration` samples
    #[must_use]
    pub fn build(&self, params: &SimulationParams) -> Vec<MeteoSample> {
        let hours = params.hours();
        let mut series = match params.meteo_source {
            MeteoSource::Forecast => {
                self.forecast_series(params.source.latitude, params.source.longitude, hours)
            }
            MeteoSource::Manual {
                wind_speed,
                wind_direction,
            } => constant_wind_series(
                start_of_hour(self.clock.now()),
                hours,
                wind_speed,
                wind_direction,
            ),
        };

        apply_overrides(&mut series, &params.hourly_wind_overrides);
        sanitize_series(series)
    }

    /// Forecast for a location: cache, then provider, then synthetic.
    ///
    /// Cached or fetched series shorter than `hours` are not used; longer
    /// ones are truncated.
    #[must_use]
    pub fn forecast_series(&self, latitude: f64, longitude: f64, hours: usize) -> Vec<MeteoSample> {
        if let Some(mut cached) = self.cache.get(latitude, longitude) {
            if cached.len() >= hours {
                cached.truncate(hours);
                return cached;
            }
            debug!(
                cached = cached.len(),
                requested = hours,
                "cached forecast too short, refetching"
            );
        }

        match self.fetch(latitude, longitude, hours) {
            Ok(mut fetched) => {
                self.cache.set(latitude, longitude, fetched.clone());
                fetched.truncate(hours);
                fetched
            }
            Err(err) => {
                warn!(%err, latitude, longitude, "using synthetic meteorology");
                synthetic_series(start_of_hour(self.clock.now()), hours)
            }
        }
    }

    fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        hours: usize,
    ) -> Result<Vec<MeteoSample>, WeatherError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or_else(|| WeatherError::UpstreamUnavailable("no provider configured".into()))?;

        debug!(provider = provider.name(), hours, "fetching forecast");
        let series = provider.fetch_forecast(latitude, longitude, hours)?;
        if series.len() < hours {
            return Err(WeatherError::IncompleteSeries {
                expected: hours,
                received: series.len(),
            });
        }
        Ok(series)
    }
}

/// Replace wind speed and direction for the overridden hours.
///
/// Overrides past the end of the series are ignored.
pub fn apply_overrides(series: &mut [MeteoSample], overrides: &[HourlyWindOverride]) {
    for o in overrides {
        if let Some(sample) = series.get_mut(o.hour) {
            sample.wind_speed = MetersPerSecond::new(o.wind_speed);
            sample.wind_direction = Degrees::new(o.wind_direction).normalized();
        } else {
            debug!(hour = o.hour, len = series.len(), "wind override outside run, ignored");
        }
    }
}

/// Clamp every sample into its physical range
#[must_use]
pub fn sanitize_series(series: Vec<MeteoSample>) -> Vec<MeteoSample> {
    series
        .into_iter()
        .enumerate()
        .map(|(hour, sample)| {
            let (clean, changed) = sample.sanitized();
            if changed {
                warn!(hour, "clamped out-of-range meteorology");
            }
            clean
        })
        .collect()
}
