//! Core types and utilities

pub mod error;
pub mod meteo;
pub mod params;
pub mod units;

pub use error::{SimulationError, SimulationResult, WeatherError};
pub use meteo::{HourlyWindOverride, MeteoSample, DEFAULT_CLOUD_COVER};
pub use params::{MeteoSource, PollutantType, SimulationParams, SourceParams};
pub use units::{Degrees, Meters, MetersPerSecond, Seconds};
