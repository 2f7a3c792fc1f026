//! Pasquill-Gifford dispersion parameters.
//!
//! Horizontal and vertical plume spread grow with downwind distance as power
//! laws whose coefficients depend on stability class:
//!
//! ```text
//! σy = aY · x^bY
//! σz = aZ · x^bZ        (x in km, σ in m)
//! ```
//!
//! # References
//!
//! - Gifford, F.A. (1961). "Use of routine meteorological observations for
//!   estimating atmospheric dispersion." Nuclear Safety, 2(4), 47-51.
//! - Martin, D.O. (1976). "Comment on the change of concentration standard
//!   deviations with distance." JAPCA, 26(2), 145-147.

use crate::atmosphere::stability::StabilityClass;
use crate::core_types::units::Meters;

/// Smallest distance fed to the power law (km)
pub const MIN_DISTANCE_KM: f64 = 0.001;

/// Floor for both spreads (m); keeps the plume equation's denominator away
/// from zero
pub const MIN_SIGMA_M: f64 = 0.5;

/// Power-law exponent shared by every class in this parameterization
const EXPONENT: f64 = 0.894;

/// Power-law coefficients for one stability class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispersionCoefficients {
    /// Horizontal coefficient (m at 1 km)
    pub a_y: f64,
    /// Horizontal exponent
    pub b_y: f64,
    /// Vertical coefficient (m at 1 km)
    pub a_z: f64,
    /// Vertical exponent
    pub b_z: f64,
}

const fn coefficients(a_y: f64, a_z: f64) -> DispersionCoefficients {
    DispersionCoefficients {
        a_y,
        b_y: EXPONENT,
        a_z,
        b_z: EXPONENT,
    }
}

/// Coefficient table indexed by [`StabilityClass::index`]
pub const COEFFICIENT_TABLE: [DispersionCoefficients; 6] = [
    coefficients(220.0, 200.0), // A
    coefficients(160.0, 120.0), // B
    coefficients(110.0, 80.0),  // C
    coefficients(80.0, 60.0),   // D
    coefficients(60.0, 30.0),   // E
    coefficients(30.0, 16.0),   // F
];

impl DispersionCoefficients {
    /// Coefficients for a stability class
    #[must_use]
    pub fn for_class(class: StabilityClass) -> Self {
        COEFFICIENT_TABLE[class.index()]
    }
}

/// Lateral and vertical plume spread at one downwind distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sigmas {
    /// Crosswind standard deviation σy (m)
    pub sigma_y: f64,
    /// Vertical standard deviation σz (m)
    pub sigma_z: f64,
}

/// Compute σy and σz at `distance` downwind for `class`.
///
/// Distances are floored at 1 m before the power law and both results at
/// [`MIN_SIGMA_M`], so the output is always strictly positive. Callers treat
/// receptors closer than 1 m as being at the source and do not call this.
#[must_use]
pub fn sigma(distance: Meters, class: StabilityClass) -> Sigmas {
    let x_km = if distance.is_nan() {
        MIN_DISTANCE_KM
    } else {
        distance.as_kilometers().max(MIN_DISTANCE_KM)
    };
    let c = DispersionCoefficients::for_class(class);

    Sigmas {
        sigma_y: (c.a_y * x_km.powf(c.b_y)).max(MIN_SIGMA_M),
        sigma_z: (c.a_z * x_km.powf(c.b_z)).max(MIN_SIGMA_M),
    }
}
