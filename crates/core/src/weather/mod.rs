//! Meteorology acquisition
//!
//! Produces the hourly series a run integrates over:
//! - [`ForecastCache`]: 15 minute, location-bucketed forecast store
//! - [`WeatherProvider`]: the upstream forecast interface
//! - [`synthetic_series`]: deterministic stand-in forecast
//! - [`MeteoSeriesBuilder`]: picks a source, applies hourly overrides and
//!   clamps every sample

mod cache;
mod clock;
mod provider;
mod series;
mod synthetic;

pub use cache::{CacheKey, CacheStats, ForecastCache, FORECAST_CACHE_TTL_MINUTES};
pub use clock::{Clock, ManualClock, SystemClock};
pub use provider::WeatherProvider;
pub use series::{apply_overrides, sanitize_series, MeteoSeriesBuilder};
pub use synthetic::{
    constant_wind_series, start_of_hour, synthetic_series, SyntheticForecast,
    MANUAL_TEMPERATURE_C,
};
