//! Atmospheric stability and plume spread.
//!
//! This module covers the two meteorological inputs of the Gaussian plume
//! model that do not come straight from the forecast:
//! - Pasquill-Gifford stability classification from time of day, wind and cloud
//! - Dispersion parameters σy and σz as power laws of downwind distance
//!
//! # References
//!
//! - Pasquill, F. (1961). "The estimation of the dispersion of windborne
//!   material." Meteorological Magazine, 90, 33-49.
//! - Turner, D.B. (1970). "Workbook of atmospheric dispersion estimates."

pub mod dispersion;
pub mod stability;

pub use dispersion::{sigma, DispersionCoefficients, Sigmas, COEFFICIENT_TABLE, MIN_SIGMA_M};
pub use stability::{
    classify, classify_sample, classify_series, classify_with_reason, is_daytime,
    Classification, SkyCondition, StabilityClass,
};
