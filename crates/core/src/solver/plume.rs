//! Gaussian plume concentration solver
//!
//! Steady-state concentration downwind of a continuous elevated point source
//! with total reflection at the ground (image source):
//!
//! ```text
//!            Q              ⎛  −y²  ⎞ ⎡   ⎛ −(z−H)² ⎞     ⎛ −(z+H)² ⎞ ⎤
//! C = ─────────────── · exp ⎜ ───── ⎟·⎢exp⎜ ─────── ⎟ + exp⎜ ─────── ⎟ ⎥
//!      2π · u · σy · σz     ⎝ 2σy²  ⎠ ⎣   ⎝  2σz²   ⎠     ⎝  2σz²   ⎠ ⎦
//! ```
//!
//! Where:
//! - `Q`: emission rate (g/s)
//! - `u`: wind speed at release height (m/s)
//! - `H`: effective stack height (m)
//! - `z`: receptor height (m)
//! - `σy`, `σz`: Pasquill-Gifford spreads at downwind distance x
//!
//! Grid rows are evaluated in parallel with Rayon. Each cell is independent
//! and the peak is a `max` reduction, so results are identical for any
//! thread count.

use crate::atmosphere::dispersion::sigma;
use crate::atmosphere::stability::StabilityClass;
use crate::core_types::params::SourceParams;
use crate::core_types::units::{Degrees, Meters, MetersPerSecond};
use crate::solver::fields::{ConcentrationGrid, GridGeometry};
use crate::solver::transform::DownwindFrame;
use rayon::prelude::*;
use std::f64::consts::PI;

/// Below this wind speed (m/s) there is no meaningful advection and the
/// plume equation is not evaluated
pub const MIN_WIND_SPEED: f64 = 0.1;

/// Receptors closer than this downwind (m) are treated as at the source
pub const MIN_DOWNWIND_DISTANCE: f64 = 1.0;

/// Inputs to the plume equation that are constant across one hour's grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlumeParams {
    /// Emission rate Q (g/s)
    pub emission_rate: f64,
    /// Wind speed u (m/s)
    pub wind_speed: f64,
    /// Stack height H (m)
    pub stack_height: f64,
    /// Receptor height z (m)
    pub receptor_height: f64,
    /// Stability class driving σy and σz
    pub stability: StabilityClass,
}

impl PlumeParams {
    /// Plume inputs for a source under the given wind and stability
    #[must_use]
    pub fn new(
        source: &SourceParams,
        wind_speed: MetersPerSecond,
        stability: StabilityClass,
    ) -> Self {
        Self {
            emission_rate: source.emission_rate,
            wind_speed: *wind_speed,
            stack_height: source.stack_height,
            receptor_height: source.receptor_height,
            stability,
        }
    }
}

/// Concentration (g/m³) at a receptor given in plume coordinates
///
/// Returns 0 in dead air (`u < 0.1 m/s`) and for receptors less than 1 m
/// downwind, including everything upwind of the source.
///
/// # Arguments
///
/// * `downwind` - Distance along the plume axis (m)
/// * `crosswind` - Distance from the plume axis (m)
/// * `params` - Source, wind and stability for this hour
#[must_use]
pub fn concentration_at(downwind: f64, crosswind: f64, params: &PlumeParams) -> f64 {
    if params.wind_speed.is_nan()
        || params.wind_speed < MIN_WIND_SPEED
        || downwind.is_nan()
        || downwind < MIN_DOWNWIND_DISTANCE
    {
        return 0.0;
    }

    let s = sigma(Meters::new(downwind), params.stability);
    debug_assert!(
        s.sigma_y > 0.0 && s.sigma_z > 0.0,
        "dispersion parameters must stay positive"
    );

    let two_sy2 = 2.0 * s.sigma_y * s.sigma_y;
    let two_sz2 = 2.0 * s.sigma_z * s.sigma_z;
    let z = params.receptor_height;
    let h = params.stack_height;

    let lateral = (-(crosswind * crosswind) / two_sy2).exp();
    let direct = (-((z - h) * (z - h)) / two_sz2).exp();
    let reflected = (-((z + h) * (z + h)) / two_sz2).exp();
    let denominator = 2.0 * PI * params.wind_speed * s.sigma_y * s.sigma_z;

    let c = params.emission_rate / denominator * lateral * (direct + reflected);
    if c.is_nan() {
        0.0
    } else {
        c.max(0.0)
    }
}

/// Evaluate the plume over the whole receptor grid for one hour.
///
/// Each receptor's geographic offset is converted to meters and rotated
/// into the frame of this hour's wind before the plume equation is applied.
/// Pure: identical inputs give bit-identical output.
///
/// # Arguments
///
/// * `geometry` - Receptor layout for the run
/// * `source` - Source parameters
/// * `wind_speed` - Hourly wind speed
/// * `wind_direction` - Bearing the wind blows from
/// * `stability` - Stability class for the hour
#[must_use]
pub fn solve(
    geometry: &GridGeometry,
    source: &SourceParams,
    wind_speed: MetersPerSecond,
    wind_direction: Degrees,
    stability: StabilityClass,
) -> ConcentrationGrid {
    let params = PlumeParams {
        receptor_height: geometry.receptor_height(),
        ..PlumeParams::new(source, wind_speed, stability)
    };
    let frame = DownwindFrame::new(wind_direction);
    let projection = geometry.projection();
    let receptors = geometry.receptors();
    let width = geometry.width();

    let mut values = vec![0.0; receptors.len()];
    values
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, out)| {
            let row_receptors = &receptors[row * width..(row + 1) * width];
            for (cell, receptor) in out.iter_mut().zip(row_receptors) {
                let p = frame.apply(projection.to_meters(*receptor));
                *cell = concentration_at(p.downwind, p.crosswind, &params);
            }
        });

    ConcentrationGrid::from_values(values, geometry.x().to_vec(), geometry.y().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(q: f64, u: f64, h: f64) -> PlumeParams {
        PlumeParams {
            emission_rate: q,
            wind_speed: u,
            stack_height: h,
            receptor_height: 1.5,
            stability: StabilityClass::D,
        }
    }

    fn source(q: f64, h: f64) -> SourceParams {
        SourceParams {
            emission_rate: q,
            stack_height: h,
            latitude: 40.0,
            longitude: -74.0,
            ..SourceParams::default()
        }
    }

    #[test]
    fn matches_hand_evaluated_equation() {
        let p = params(10.0, 5.0, 50.0);
        let (x, y) = (800.0, 40.0);
        let s = sigma(Meters::new(x), StabilityClass::D);
        let expected = 10.0 / (2.0 * PI * 5.0 * s.sigma_y * s.sigma_z)
            * (-(y * y) / (2.0 * s.sigma_y.powi(2))).exp()
            * ((-(1.5_f64 - 50.0).powi(2) / (2.0 * s.sigma_z.powi(2))).exp()
                + (-(51.5_f64).powi(2) / (2.0 * s.sigma_z.powi(2))).exp());
        assert_relative_eq!(concentration_at(x, y, &p), expected, max_relative = 1e-12);
    }

    #[test]
    fn zero_near_source_and_in_dead_air() {
        let p = params(10.0, 5.0, 50.0);
        assert_eq!(concentration_at(0.99, 0.0, &p), 0.0);
        assert_eq!(concentration_at(-500.0, 0.0, &p), 0.0);
        assert_eq!(concentration_at(f64::NAN, 0.0, &p), 0.0);

        let calm = params(10.0, 0.099, 50.0);
        assert_eq!(concentration_at(500.0, 0.0, &calm), 0.0);
    }

    #[test]
    fn ground_level_release_doubles_the_direct_term() {
        // With H = z = 0 both exponentials are 1
        let p = PlumeParams {
            receptor_height: 0.0,
            ..params(1.0, 2.0, 0.0)
        };
        let s = sigma(Meters::new(300.0), StabilityClass::D);
        let expected = 1.0 / (PI * 2.0 * s.sigma_y * s.sigma_z);
        assert_relative_eq!(concentration_at(300.0, 0.0, &p), expected, max_relative = 1e-12);
    }

    #[test]
    fn crosswind_profile_is_symmetric_and_decreasing() {
        let p = params(10.0, 3.0, 20.0);
        let centre = concentration_at(600.0, 0.0, &p);
        let left = concentration_at(600.0, -50.0, &p);
        let right = concentration_at(600.0, 50.0, &p);
        assert_eq!(left, right);
        assert!(centre > left);
    }

    #[test]
    fn stronger_wind_dilutes() {
        let slow = concentration_at(1000.0, 0.0, &params(10.0, 2.0, 30.0));
        let fast = concentration_at(1000.0, 0.0, &params(10.0, 8.0, 30.0));
        assert_relative_eq!(slow / fast, 4.0, max_relative = 1e-12);
    }

    #[test]
    fn zero_emission_gives_zero_field() {
        let src = source(0.0, 50.0);
        let geom = GridGeometry::new(&src);
        let grid = solve(
            &geom,
            &src,
            MetersPerSecond::new(5.0),
            Degrees::new(180.0),
            StabilityClass::D,
        );
        assert_eq!(grid.peak(), 0.0);
        assert!(grid.as_slice().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn plume_follows_the_wind() {
        let src = source(10.0, 50.0);
        let geom = GridGeometry::new(&src);
        let centre = geom.width() / 2;

        // Wind from the west: plume along +x on the centre row
        let grid = solve(
            &geom,
            &src,
            MetersPerSecond::new(5.0),
            Degrees::new(270.0),
            StabilityClass::D,
        );
        let (px, py) = grid.peak_index();
        assert_eq!(py, centre);
        assert!(px > centre);
        // Everything west of the source is upwind
        for x in 0..=centre {
            assert_eq!(grid.get(x, centre), 0.0);
        }

        // Wind from the north: plume along −y on the centre column
        let grid = solve(
            &geom,
            &src,
            MetersPerSecond::new(5.0),
            Degrees::new(0.0),
            StabilityClass::D,
        );
        let (px, py) = grid.peak_index();
        assert_eq!(px, centre);
        assert!(py < centre);
    }

    #[test]
    fn solve_is_deterministic() {
        let src = source(25.0, 30.0);
        let geom = GridGeometry::new(&src);
        let run = || {
            solve(
                &geom,
                &src,
                MetersPerSecond::new(3.3),
                Degrees::new(123.0),
                StabilityClass::B,
            )
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn calm_hour_gives_zero_field() {
        let src = source(10.0, 10.0);
        let geom = GridGeometry::new(&src);
        let grid = solve(
            &geom,
            &src,
            MetersPerSecond::new(0.05),
            Degrees::new(90.0),
            StabilityClass::F,
        );
        assert_eq!(grid.peak(), 0.0);
    }
}
