//! Gaussian Plume Dispersion Core Library
//!
//! Predicts hourly ground-level concentration of particulate pollution
//! downwind of a continuous point source from a meteorological series.
//!
//! ## Pipeline
//!
//! - Meteorology: forecast (cached 15 minutes per ~100 m location bucket),
//!   synthetic fallback, or constant manual wind, with per-hour overrides
//! - Stability: Pasquill-Gifford class per hour, fixed or classified from
//!   time of day, wind speed and cloud cover
//! - Dispersion: power-law σy/σz and the Gaussian plume equation with
//!   ground reflection, evaluated on a source-centred receptor grid
//! - Integration: first-order deposition and chemical decay since release,
//!   reduced into run statistics
//!
//! ## Example
//!
//! ```rust
//! use plume_sim_core::{run_simulation, MeteoSeriesBuilder, MeteoSource, SimulationParams};
//!
//! let params = SimulationParams {
//!     duration: 2,
//!     meteo_source: MeteoSource::Manual { wind_speed: 5.0, wind_direction: 180.0 },
//!     ..SimulationParams::default()
//! };
//! let output = run_simulation(params, &MeteoSeriesBuilder::default()).unwrap();
//! assert_eq!(output.results.len(), 2);
//! assert!(output.stats.peak_concentration > 0.0);
//! ```

// Core types and utilities
pub mod core_types;

// Stability and dispersion parameters
pub mod atmosphere;

// Per-hour concentration field
pub mod solver;

// Hourly integration and statistics
pub mod simulation;

// Meteorology acquisition and caching
pub mod weather;

// Re-export core types
pub use core_types::{
    Degrees, HourlyWindOverride, Meters, MetersPerSecond, MeteoSample, MeteoSource,
    PollutantType, Seconds, SimulationError, SimulationParams, SimulationResult, SourceParams,
    WeatherError,
};

// Re-export engine types
pub use atmosphere::{classify, classify_series, sigma, StabilityClass};
pub use simulation::{run_simulation, HourResult, PlumeSimulation, RunStatistics, SimulationOutput};
pub use solver::{concentration_at, to_downwind_frame, ConcentrationGrid, GeoOffset};
pub use weather::{ForecastCache, MeteoSeriesBuilder, SyntheticForecast, WeatherProvider};
