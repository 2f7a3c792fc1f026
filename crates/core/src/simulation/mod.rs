//! Hour-by-hour plume integration
//!
//! `PlumeSimulation` steps through an hourly meteorological series:
//! - picks the stability class for the hour (fixed, or classified from the
//!   hour's meteorology)
//! - solves the steady-state plume on the receptor grid
//! - scales the hour's field by the removal decay since release
//! - reduces the hourly peaks into [`RunStatistics`]
//!
//! Hours are processed in order; the cells within an hour are evaluated in
//! parallel by the solver.

mod decay;
mod stats;

pub use decay::{decay_factor, hourly_decay_factors};
pub use stats::{RunStatistics, StatsAccumulator};

use crate::atmosphere::{classify_sample, StabilityClass};
use crate::core_types::error::{SimulationError, SimulationResult};
use crate::core_types::meteo::MeteoSample;
use crate::core_types::params::SimulationParams;
use crate::core_types::units::{Degrees, MetersPerSecond};
use crate::solver::{solve, ConcentrationGrid, GridGeometry};
use crate::weather::{sanitize_series, MeteoSeriesBuilder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Stability class used when neither a fixed class nor automatic mapping is
/// requested
pub const DEFAULT_STABILITY: StabilityClass = StabilityClass::D;

/// One simulated hour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourResult {
    /// Zero-based hour index
    pub hour: usize,
    /// Start of the hour (UTC)
    pub timestamp: DateTime<Utc>,
    /// Decayed concentration field (g/m³)
    pub grid: ConcentrationGrid,
    /// Largest value in `grid`
    pub peak: f64,
    /// Wind speed used for the hour
    pub wind_speed: MetersPerSecond,
    /// Wind direction used for the hour (blowing from)
    pub wind_direction: Degrees,
    /// Stability class used for the hour
    pub stability: StabilityClass,
    /// Surviving mass fraction applied to the hour's field
    pub decay_factor: f64,
}

/// Everything a run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOutput {
    /// Per-hour results in time order
    pub results: Vec<HourResult>,
    /// Summary over all hours
    pub stats: RunStatistics,
}

/// A validated simulation ready to run against meteorology
#[derive(Debug, Clone)]
pub struct PlumeSimulation {
    params: SimulationParams,
    geometry: GridGeometry,
}

impl PlumeSimulation {
    /// Validate `params` and lay out the receptor grid
    ///
    /// # Errors
    ///
    /// [`SimulationError::InvalidParameter`] for the first out-of-range field
    pub fn new(params: SimulationParams) -> SimulationResult<Self> {
        params.validate()?;
        let geometry = GridGeometry::new(&params.source);
        Ok(Self { params, geometry })
    }

    /// Parameters of this simulation
    #[must_use]
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Receptor layout shared by every hour
    #[must_use]
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Stability class for one hour of meteorology
    #[must_use]
    pub fn stability_for(&self, sample: &MeteoSample) -> StabilityClass {
        if self.params.auto_map_stability {
            classify_sample(sample).class
        } else {
            self.params.stability_class.unwrap_or(DEFAULT_STABILITY)
        }
    }

    /// Integrate over `meteo`, one sample per hour
    ///
    /// # Arguments
    ///
    /// * `meteo` - Hourly series; must hold exactly `duration` samples.
    ///   Out-of-range values are clamped before use.
    ///
    /// # Errors
    ///
    /// [`SimulationError::InvalidParameter`] if the series length differs
    /// from the duration. Nothing is computed in that case.
    pub fn run(&self, meteo: &[MeteoSample]) -> SimulationResult<SimulationOutput> {
        let hours = self.params.hours();
        if meteo.len() != hours {
            return Err(SimulationError::invalid(
                "meteo",
                format!("expected {hours} hourly samples, got {}", meteo.len()),
            ));
        }

        let meteo = sanitize_series(meteo.to_vec());
        let source = &self.params.source;
        let removal_rate = source.removal_rate();
        let factors = hourly_decay_factors(removal_rate, hours);
        let started = Instant::now();

        info!(
            "Plume run: {} h at ({:.4}, {:.4}), Q={} g/s, H={} m, grid {}x{}, k={:.3e}/s",
            hours,
            source.latitude,
            source.longitude,
            source.emission_rate,
            source.stack_height,
            self.geometry.width(),
            self.geometry.height(),
            removal_rate
        );

        let mut results = Vec::with_capacity(hours);
        let mut acc = StatsAccumulator::new();

        for (hour, (sample, &factor)) in meteo.iter().zip(&factors).enumerate() {
            // 1. Stability for the hour
            let stability = self.stability_for(sample);

            // 2. Steady-state field
            let mut grid = solve(
                &self.geometry,
                source,
                sample.wind_speed,
                sample.wind_direction,
                stability,
            );
            let raw_peak = grid.peak();

            // 3. Decay since release, one uniform factor
            grid.scale(factor);
            let peak = grid.peak();

            debug!(
                "Hour {}: class {}, wind {:.2} m/s from {:.0}°, peak {:.3e} -> {:.3e} (x{:.4})",
                hour,
                stability,
                *sample.wind_speed,
                *sample.wind_direction,
                raw_peak,
                peak,
                factor
            );

            // 4. Record
            acc.record(hour, sample.timestamp, peak);
            results.push(HourResult {
                hour,
                timestamp: sample.timestamp,
                grid,
                peak,
                wind_speed: sample.wind_speed,
                wind_direction: sample.wind_direction,
                stability,
                decay_factor: factor,
            });
        }

        let stats = acc
            .finish()
            .ok_or_else(|| SimulationError::invalid("duration", "no hours to simulate"))?;

        info!(
            "Plume run complete in {:.1} ms: peak {:.3e} g/m³ at hour {}, mean hourly peak {:.3e}",
            started.elapsed().as_secs_f64() * 1000.0,
            stats.peak_concentration,
            stats.peak_hour,
            stats.average_concentration
        );

        Ok(SimulationOutput { results, stats })
    }
}

/// Validate `params`, assemble its meteorology and run it
///
/// # Errors
///
/// [`SimulationError::InvalidParameter`] when the request is malformed.
/// Weather failures are recovered inside `builder` and never surface here.
pub fn run_simulation(
    params: SimulationParams,
    builder: &MeteoSeriesBuilder,
) -> SimulationResult<SimulationOutput> {
    let simulation = PlumeSimulation::new(params)?;
    let meteo = builder.build(simulation.params());
    simulation.run(&meteo)
}
