//! Error types for the dispersion engine
//!
//! Only two things can go wrong from a caller's point of view: the request
//! itself is malformed (rejected before any hour is simulated), or the
//! upstream forecast could not be obtained (recovered internally by
//! substituting a synthetic series). Numerically degenerate cells such as
//! dead air or a receptor on top of the stack are not errors; they are
//! defined to have zero concentration.

use thiserror::Error;

/// Result alias used across the engine
pub type SimulationResult<T> = Result<T, SimulationError>;

/// Errors surfaced to the caller before a run starts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// A request field is outside its accepted range
    #[error("invalid parameter `{name}`: {message}")]
    InvalidParameter {
        /// Field name as the caller knows it
        name: &'static str,
        /// What was wrong with the value
        message: String,
    },
}

impl SimulationError {
    /// Create an invalid-parameter error
    pub fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }

    /// Create an invalid-parameter error for a value outside `[min, max]`
    pub fn out_of_range(name: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::invalid(name, format!("must be between {min} and {max}, got {value}"))
    }
}

/// Failures of the upstream weather collaborator
///
/// These never escape a simulation run: series assembly logs them and falls
/// back to the synthetic forecast.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeatherError {
    /// The provider could not be reached or returned an error
    #[error("upstream forecast unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The provider answered with fewer hours than requested
    #[error("forecast covers {received} hours, {expected} requested")]
    IncompleteSeries {
        /// Hours requested
        expected: usize,
        /// Hours returned
        received: usize,
    },
}
