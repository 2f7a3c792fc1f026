//! Simulation request parameters, defaults and validation
//!
//! Every field is checked by [`SimulationParams::validate`] before any hour
//! is simulated; once a run starts it cannot fail.

use crate::atmosphere::StabilityClass;
use crate::core_types::error::{SimulationError, SimulationResult};
use crate::core_types::meteo::HourlyWindOverride;
use serde::{Deserialize, Serialize};

/// Shortest run accepted (hours)
pub const MIN_DURATION_HOURS: u32 = 1;

/// Longest run accepted (hours), one week of hourly forecast
pub const MAX_DURATION_HOURS: u32 = 168;

/// Largest grid accepted; the grid holds `(N + 1)²` cells
pub const MAX_GRID_SIZE: usize = 200;

/// Side length of the default receptor grid (m)
pub const DEFAULT_GRID_EXTENT_M: f64 = 5000.0;

/// Default grid size N
pub const DEFAULT_GRID_SIZE: usize = 40;

/// Breathing height used when the caller gives no receptor height (m)
pub const DEFAULT_RECEPTOR_HEIGHT_M: f64 = 1.5;

/// Default boundary-layer mixing height (m)
pub const DEFAULT_MIXING_HEIGHT_M: f64 = 500.0;

/// Particulate pollutant being released
///
/// Selects the default dry deposition velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PollutantType {
    /// Fine particulate matter (≤ 2.5 µm)
    #[default]
    #[serde(rename = "PM2.5")]
    Pm25,
    /// Coarse particulate matter (≤ 10 µm)
    #[serde(rename = "PM10")]
    Pm10,
}

impl PollutantType {
    /// Typical dry deposition velocity (m/s)
    #[must_use]
    pub fn deposition_velocity(self) -> f64 {
        match self {
            PollutantType::Pm25 => 0.002,
            PollutantType::Pm10 => 0.01,
        }
    }
}

/// Emission source and receptor-grid description
///
/// Immutable for the duration of a run. When deserialized, a missing
/// `gridSpacing` keeps the grid at its 5 km extent and a missing
/// `depositionVelocity` comes from the pollutant type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SourceRequest")]
pub struct SourceParams {
    /// Emission rate Q (g/s)
    pub emission_rate: f64,
    /// Effective stack height H (m)
    pub stack_height: f64,
    /// Source latitude (degrees)
    pub latitude: f64,
    /// Source longitude (degrees)
    pub longitude: f64,
    /// Dry deposition velocity (m/s)
    pub deposition_velocity: f64,
    /// Mixing height (m)
    pub mixing_height: f64,
    /// First-order chemical loss rate (1/s)
    pub loss_rate: f64,
    /// Receptor height above ground (m)
    pub receptor_height: f64,
    /// Grid size N; the grid has `N + 1` nodes per axis
    pub grid_size: usize,
    /// Distance between grid nodes (m)
    pub grid_spacing: f64,
}

impl Default for SourceParams {
    fn default() -> Self {
        Self {
            emission_rate: 10.0,
            stack_height: 50.0,
            latitude: 0.0,
            longitude: 0.0,
            deposition_velocity: PollutantType::default().deposition_velocity(),
            mixing_height: DEFAULT_MIXING_HEIGHT_M,
            loss_rate: 0.0,
            receptor_height: DEFAULT_RECEPTOR_HEIGHT_M,
            grid_size: DEFAULT_GRID_SIZE,
            grid_spacing: default_grid_spacing(DEFAULT_GRID_SIZE),
        }
    }
}

/// Wire form of [`SourceParams`]; derived fields stay unset until resolved
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SourceRequest {
    emission_rate: f64,
    #[serde(alias = "sourceHeight")]
    stack_height: f64,
    latitude: f64,
    longitude: f64,
    deposition_velocity: Option<f64>,
    mixing_height: f64,
    loss_rate: f64,
    receptor_height: f64,
    grid_size: usize,
    grid_spacing: Option<f64>,
}

impl Default for SourceRequest {
    fn default() -> Self {
        let d = SourceParams::default();
        Self {
            emission_rate: d.emission_rate,
            stack_height: d.stack_height,
            latitude: d.latitude,
            longitude: d.longitude,
            deposition_velocity: None,
            mixing_height: d.mixing_height,
            loss_rate: d.loss_rate,
            receptor_height: d.receptor_height,
            grid_size: d.grid_size,
            grid_spacing: None,
        }
    }
}

impl SourceRequest {
    fn resolve(self, pollutant: PollutantType) -> SourceParams {
        SourceParams {
            emission_rate: self.emission_rate,
            stack_height: self.stack_height,
            latitude: self.latitude,
            longitude: self.longitude,
            deposition_velocity: self
                .deposition_velocity
                .unwrap_or_else(|| pollutant.deposition_velocity()),
            mixing_height: self.mixing_height,
            loss_rate: self.loss_rate,
            receptor_height: self.receptor_height,
            grid_size: self.grid_size,
            grid_spacing: self
                .grid_spacing
                .unwrap_or_else(|| default_grid_spacing(self.grid_size)),
        }
    }
}

impl From<SourceRequest> for SourceParams {
    fn from(raw: SourceRequest) -> Self {
        raw.resolve(PollutantType::default())
    }
}

fn default_grid_spacing(grid_size: usize) -> f64 {
    DEFAULT_GRID_EXTENT_M / grid_size.max(1) as f64
}

impl SourceParams {
    /// Set the grid size, keeping the grid's total extent at 5 km
    #[must_use]
    pub fn with_grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size;
        self.grid_spacing = default_grid_spacing(grid_size);
        self
    }

    /// Combined first-order removal rate (1/s): deposition through the mixed
    /// layer plus chemical loss
    #[must_use]
    pub fn removal_rate(&self) -> f64 {
        self.deposition_velocity / self.mixing_height + self.loss_rate
    }

    /// Check every field against its accepted range
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidParameter`] naming the first bad field.
    pub fn validate(&self) -> SimulationResult<()> {
        check_range("latitude", self.latitude, -90.0, 90.0)?;
        check_range("longitude", self.longitude, -180.0, 180.0)?;
        check_non_negative("emissionRate", self.emission_rate)?;
        check_non_negative("stackHeight", self.stack_height)?;
        check_non_negative("depositionVelocity", self.deposition_velocity)?;
        check_non_negative("lossRate", self.loss_rate)?;
        check_non_negative("receptorHeight", self.receptor_height)?;
        check_positive("mixingHeight", self.mixing_height)?;
        check_positive("gridSpacing", self.grid_spacing)?;
        if self.grid_size == 0 || self.grid_size > MAX_GRID_SIZE {
            return Err(SimulationError::invalid(
                "gridSize",
                format!("must be between 1 and {MAX_GRID_SIZE}, got {}", self.grid_size),
            ));
        }
        Ok(())
    }
}

/// Where a run's meteorology comes from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum MeteoSource {
    /// Hourly forecast for the source location, via the forecast cache
    Forecast,
    /// The same wind every hour
    #[serde(rename_all = "camelCase")]
    Manual {
        /// Wind speed (m/s)
        wind_speed: f64,
        /// Wind direction (degrees, blowing from)
        wind_direction: f64,
    },
}

impl Default for MeteoSource {
    fn default() -> Self {
        MeteoSource::Manual {
            wind_speed: 5.0,
            wind_direction: 270.0,
        }
    }
}

/// A complete simulation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SimulationRequest")]
pub struct SimulationParams {
    /// Source and grid description
    #[serde(flatten)]
    pub source: SourceParams,
    /// Number of simulated hours
    pub duration: u32,
    /// Fixed stability class; ignored when `auto_map_stability` is set
    pub stability_class: Option<StabilityClass>,
    /// Classify stability per hour from the meteorology
    pub auto_map_stability: bool,
    /// Pollutant being released
    pub pollutant_type: PollutantType,
    /// Forecast or manual wind
    #[serde(rename = "weather")]
    pub meteo_source: MeteoSource,
    /// Sparse per-hour wind replacements
    pub hourly_wind_overrides: Vec<HourlyWindOverride>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            source: SourceParams::default(),
            duration: 24,
            stability_class: Some(StabilityClass::D),
            auto_map_stability: false,
            pollutant_type: PollutantType::default(),
            meteo_source: MeteoSource::default(),
            hourly_wind_overrides: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SimulationRequest {
    #[serde(flatten)]
    source: SourceRequest,
    duration: u32,
    stability_class: Option<StabilityClass>,
    auto_map_stability: bool,
    pollutant_type: PollutantType,
    #[serde(rename = "weather")]
    meteo_source: MeteoSource,
    hourly_wind_overrides: Vec<HourlyWindOverride>,
}

impl Default for SimulationRequest {
    fn default() -> Self {
        let d = SimulationParams::default();
        Self {
            source: SourceRequest::default(),
            duration: d.duration,
            stability_class: d.stability_class,
            auto_map_stability: d.auto_map_stability,
            pollutant_type: d.pollutant_type,
            meteo_source: d.meteo_source,
            hourly_wind_overrides: d.hourly_wind_overrides,
        }
    }
}

impl From<SimulationRequest> for SimulationParams {
    fn from(raw: SimulationRequest) -> Self {
        Self {
            source: raw.source.resolve(raw.pollutant_type),
            duration: raw.duration,
            stability_class: raw.stability_class,
            auto_map_stability: raw.auto_map_stability,
            pollutant_type: raw.pollutant_type,
            meteo_source: raw.meteo_source,
            hourly_wind_overrides: raw.hourly_wind_overrides,
        }
    }
}

impl SimulationParams {
    /// Switch pollutant, resetting the deposition velocity to its default
    #[must_use]
    pub fn with_pollutant(mut self, pollutant: PollutantType) -> Self {
        self.pollutant_type = pollutant;
        self.source.deposition_velocity = pollutant.deposition_velocity();
        self
    }

    /// Duration as a count of hours
    #[must_use]
    pub fn hours(&self) -> usize {
        self.duration as usize
    }

    /// Check the whole request
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidParameter`] naming the first bad field.
    pub fn validate(&self) -> SimulationResult<()> {
        self.source.validate()?;

        if !(MIN_DURATION_HOURS..=MAX_DURATION_HOURS).contains(&self.duration) {
            return Err(SimulationError::out_of_range(
                "duration",
                f64::from(self.duration),
                f64::from(MIN_DURATION_HOURS),
                f64::from(MAX_DURATION_HOURS),
            ));
        }

        if let MeteoSource::Manual {
            wind_speed,
            wind_direction,
        } = self.meteo_source
        {
            check_non_negative("windSpeed", wind_speed)?;
            check_finite("windDirection", wind_direction)?;
        }

        for o in &self.hourly_wind_overrides {
            check_non_negative("hourlyWindOverrides.windSpeed", o.wind_speed)?;
            check_finite("hourlyWindOverrides.windDirection", o.wind_direction)?;
        }

        Ok(())
    }
}

fn check_finite(name: &'static str, value: f64) -> SimulationResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::invalid(name, format!("must be finite, got {value}")))
    }
}

fn check_non_negative(name: &'static str, value: f64) -> SimulationResult<()> {
    check_finite(name, value)?;
    if value < 0.0 {
        return Err(SimulationError::invalid(
            name,
            format!("must be non-negative, got {value}"),
        ));
    }
    Ok(())
}

fn check_positive(name: &'static str, value: f64) -> SimulationResult<()> {
    check_finite(name, value)?;
    if value <= 0.0 {
        return Err(SimulationError::invalid(
            name,
            format!("must be positive, got {value}"),
        ));
    }
    Ok(())
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> SimulationResult<()> {
    check_finite(name, value)?;
    if value < min || value > max {
        return Err(SimulationError::out_of_range(name, value, min, max));
    }
    Ok(())
}
