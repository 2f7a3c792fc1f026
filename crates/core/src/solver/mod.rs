//! Concentration field solver module
//!
//! Turns one hour of meteorology into a ground-level concentration grid:
//! receptor geometry, the geographic-to-plume coordinate transform, and the
//! Gaussian plume equation with ground reflection.
//!
//! # Example
//!
//! ```rust
//! use plume_sim_core::atmosphere::StabilityClass;
//! use plume_sim_core::core_types::{Degrees, MetersPerSecond, SourceParams};
//! use plume_sim_core::solver::{solve, GridGeometry};
//!
//! let source = SourceParams::default();
//! let geometry = GridGeometry::new(&source);
//! let grid = solve(
//!     &geometry,
//!     &source,
//!     MetersPerSecond::new(5.0),
//!     Degrees::new(180.0),
//!     StabilityClass::D,
//! );
//! assert!(grid.peak() > 0.0);
//! ```

mod fields;
mod plume;
mod transform;

pub use fields::{ConcentrationGrid, GridGeometry};
pub use plume::{concentration_at, solve, PlumeParams, MIN_DOWNWIND_DISTANCE, MIN_WIND_SPEED};
pub use transform::{
    to_downwind_frame, DownwindFrame, GeoOffset, LocalProjection, PlumeCoordinates,
    METERS_PER_DEGREE,
};
