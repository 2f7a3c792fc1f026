//! Locally generated meteorology
//!
//! Used for manual-wind runs and as the fallback when the upstream forecast
//! is unavailable. Both generators are deterministic for a given start time.

use crate::core_types::error::WeatherError;
use crate::core_types::meteo::MeteoSample;
use crate::weather::clock::{Clock, SystemClock};
use crate::weather::provider::WeatherProvider;
use chrono::{DateTime, DurationRound, TimeDelta, Timelike, Utc};
use std::f64::consts::PI;
use std::sync::Arc;

/// Air temperature used for manual-wind series (°C)
pub const MANUAL_TEMPERATURE_C: f64 = 15.0;

/// Truncate a time to the start of its hour
#[must_use]
pub fn start_of_hour(time: DateTime<Utc>) -> DateTime<Utc> {
    time.duration_trunc(TimeDelta::hours(1)).unwrap_or(time)
}

fn hourly(start: DateTime<Utc>, i: usize) -> DateTime<Utc> {
    start + TimeDelta::hours(i as i64)
}

/// Pseudo-periodic forecast with a diurnal wind and temperature cycle.
///
/// For hour index `i` with UTC hour of day `h`:
///
/// ```text
/// speed       = max(0.5, 5 + 2·sin(hπ/12) + 0.5·sin(0.5 i))
/// direction   = (180 + 15h + 30·cos(0.3 i)) mod 360
/// temperature = 15 + 8·sin(hπ/12)
/// ```
#[must_use]
pub fn synthetic_series(start: DateTime<Utc>, hours: usize) -> Vec<MeteoSample> {
    (0..hours)
        .map(|i| {
            let timestamp = hourly(start, i);
            let h = f64::from(timestamp.hour());
            let step = i as f64;
            let diurnal = (h * PI / 12.0).sin();

            let wind_speed = (5.0 + 2.0 * diurnal + 0.5 * (step * 0.5).sin()).max(0.5);
            let wind_direction = (180.0 + h * 15.0 + (step * 0.3).cos() * 30.0).rem_euclid(360.0);
            let temperature = 15.0 + 8.0 * diurnal;

            MeteoSample::new(timestamp, wind_speed, wind_direction, temperature)
        })
        .collect()
}

/// The same wind every hour, for manual-weather runs
#[must_use]
pub fn constant_wind_series(
    start: DateTime<Utc>,
    hours: usize,
    wind_speed: f64,
    wind_direction: f64,
) -> Vec<MeteoSample> {
    (0..hours)
        .map(|i| {
            MeteoSample::new(
                hourly(start, i),
                wind_speed,
                wind_direction,
                MANUAL_TEMPERATURE_C,
            )
        })
        .collect()
}

/// [`WeatherProvider`] backed by [`synthetic_series`], starting at the
/// current hour of its clock. Ignores location.
pub struct SyntheticForecast {
    clock: Arc<dyn Clock>,
}

impl Default for SyntheticForecast {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl SyntheticForecast {
    /// Synthetic provider on the given clock
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl WeatherProvider for SyntheticForecast {
    fn fetch_forecast(
        &self,
        _latitude: f64,
        _longitude: f64,
        hours: usize,
    ) -> Result<Vec<MeteoSample>, WeatherError> {
        Ok(synthetic_series(start_of_hour(self.clock.now()), hours))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
