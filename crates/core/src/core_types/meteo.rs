//! Hourly meteorological samples consumed by the dispersion engine

use crate::core_types::units::{Degrees, MetersPerSecond};
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Cloud cover assumed when the upstream forecast does not report one (%)
pub const DEFAULT_CLOUD_COVER: f64 = 50.0;

/// One hour of meteorology
///
/// Wind direction follows the meteorological convention: the bearing the
/// wind blows *from*.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeteoSample {
    /// Start of the hour (UTC)
    #[serde(rename = "time")]
    pub timestamp: DateTime<Utc>,
    /// 10 m wind speed
    pub wind_speed: MetersPerSecond,
    /// Bearing the wind blows from, `[0, 360)`
    pub wind_direction: Degrees,
    /// 2 m air temperature (°C)
    pub temperature: f64,
    /// Total cloud cover (%), when the provider reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_cover: Option<f64>,
}

impl MeteoSample {
    /// Create a sample without cloud cover information
    #[must_use]
    pub fn new(
        timestamp: DateTime<Utc>,
        wind_speed: f64,
        wind_direction: f64,
        temperature: f64,
    ) -> Self {
        Self {
            timestamp,
            wind_speed: MetersPerSecond::new(wind_speed),
            wind_direction: Degrees::new(wind_direction).normalized(),
            temperature,
            cloud_cover: None,
        }
    }

    /// Attach a cloud cover observation (%)
    #[must_use]
    pub fn with_cloud_cover(mut self, cloud_cover: f64) -> Self {
        self.cloud_cover = Some(cloud_cover);
        self
    }

    /// UTC hour of day (0-23), used for day/night stability decisions
    #[must_use]
    pub fn hour_of_day(&self) -> u32 {
        self.timestamp.hour()
    }

    /// Cloud cover with the 50 % default applied
    #[must_use]
    pub fn cloud_cover_or_default(&self) -> f64 {
        self.cloud_cover.unwrap_or(DEFAULT_CLOUD_COVER)
    }

    /// Clamp every field into its physical range.
    ///
    /// Returns the cleaned sample and whether anything had to change.
    #[must_use]
    pub fn sanitized(&self) -> (Self, bool) {
        let wind_speed = MetersPerSecond::new(*self.wind_speed);
        let wind_direction = self.wind_direction.normalized();
        let temperature = if self.temperature.is_finite() {
            self.temperature
        } else {
            0.0
        };
        let cloud_cover = self.cloud_cover.map(|c| {
            if c.is_nan() {
                DEFAULT_CLOUD_COVER
            } else {
                c.clamp(0.0, 100.0)
            }
        });

        let cleaned = Self {
            timestamp: self.timestamp,
            wind_speed,
            wind_direction,
            temperature,
            cloud_cover,
        };
        let changed = cleaned != *self;
        (cleaned, changed)
    }
}

/// Manual wind for one hour, replacing whatever the series held
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyWindOverride {
    /// Zero-based hour index within the run
    pub hour: usize,
    /// Replacement wind speed (m/s)
    pub wind_speed: f64,
    /// Replacement wind direction (degrees, blowing from)
    pub wind_direction: f64,
}
