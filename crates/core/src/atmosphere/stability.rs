//! Pasquill-Gifford stability classification.
//!
//! Assigns a stability class A-F from time of day, 10 m wind speed and cloud
//! cover, following the EPA lookup for surface-based classification.
//!
//! # Scientific Background
//!
//! Strong daytime insolation with light winds drives vigorous convective
//! mixing (class A); overcast skies or strong winds push toward neutral
//! (class D); clear, calm nights let a surface inversion form (class F).
//! Cloud cover stands in for incoming solar radiation by day and for
//! outgoing longwave cooling by night.
//!
//! # References
//!
//! - Turner, D.B. (1970). "Workbook of atmospheric dispersion estimates."
//!   US EPA AP-26.
//! - US EPA 40 CFR Part 51, Appendix W, "Guideline on Air Quality Models."

use crate::core_types::meteo::{MeteoSample, DEFAULT_CLOUD_COVER};
use serde::{Deserialize, Serialize};
use std::fmt;
use SkyCondition::{Clear, Overcast, PartlyCloudy};

/// Pasquill-Gifford stability class, ordered from most to least unstable
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StabilityClass {
    /// Extremely unstable
    A,
    /// Moderately unstable
    B,
    /// Slightly unstable
    C,
    /// Neutral
    D,
    /// Slightly stable
    E,
    /// Moderately stable
    F,
}

impl StabilityClass {
    /// All classes, most unstable first
    pub const ALL: [StabilityClass; 6] = [
        StabilityClass::A,
        StabilityClass::B,
        StabilityClass::C,
        StabilityClass::D,
        StabilityClass::E,
        StabilityClass::F,
    ];

    /// Position in [`Self::ALL`]
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Parse a single letter, case-insensitive
    #[must_use]
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter.trim().to_ascii_uppercase().as_str() {
            "A" => Some(StabilityClass::A),
            "B" => Some(StabilityClass::B),
            "C" => Some(StabilityClass::C),
            "D" => Some(StabilityClass::D),
            "E" => Some(StabilityClass::E),
            "F" => Some(StabilityClass::F),
            _ => None,
        }
    }

    /// Descriptive name
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            StabilityClass::A => "extremely unstable",
            StabilityClass::B => "moderately unstable",
            StabilityClass::C => "slightly unstable",
            StabilityClass::D => "neutral",
            StabilityClass::E => "slightly stable",
            StabilityClass::F => "moderately stable",
        }
    }
}

impl fmt::Display for StabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            StabilityClass::A => "A",
            StabilityClass::B => "B",
            StabilityClass::C => "C",
            StabilityClass::D => "D",
            StabilityClass::E => "E",
            StabilityClass::F => "F",
        };
        f.write_str(letter)
    }
}

/// Daylight window `[DAY_START_HOUR, DAY_END_HOUR)` (UTC hours)
pub const DAY_START_HOUR: u32 = 6;
/// End of the daylight window (exclusive)
pub const DAY_END_HOUR: u32 = 18;

/// Sky condition bucket derived from cloud cover.
///
/// By day this proxies incoming solar radiation (clear = strong insolation);
/// by night it proxies radiative cooling (clear = strong cooling).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkyCondition {
    /// Cloud cover below 25 %
    Clear,
    /// Cloud cover 25-75 %
    PartlyCloudy,
    /// Cloud cover 75 % and above
    Overcast,
}

impl SkyCondition {
    /// Bucket a cloud cover percentage
    #[must_use]
    pub fn from_cloud_cover(cloud_cover: f64) -> Self {
        if cloud_cover < 25.0 {
            SkyCondition::Clear
        } else if cloud_cover < 75.0 {
            SkyCondition::PartlyCloudy
        } else {
            SkyCondition::Overcast
        }
    }
}

/// One row of the decision table: matches when the period and sky agree and
/// the wind speed is below `wind_below`
#[derive(Debug, Clone, Copy)]
struct StabilityRule {
    daytime: bool,
    sky: SkyCondition,
    wind_below: f64,
    class: StabilityClass,
    reason: &'static str,
}

const fn rule(
    daytime: bool,
    sky: SkyCondition,
    wind_below: f64,
    class: StabilityClass,
    reason: &'static str,
) -> StabilityRule {
    StabilityRule {
        daytime,
        sky,
        wind_below,
        class,
        reason,
    }
}

const DAY: bool = true;
const NIGHT: bool = false;

// Wind speed bands (m/s)
const CALM: f64 = 3.0;
const LIGHT: f64 = 5.0;
const ANY: f64 = f64::INFINITY;

// First matching row wins; every (period, sky) group ends with an unbounded row
// so the lookup is total.
const STABILITY_TABLE: [StabilityRule; 15] = [
    rule(DAY, Clear, CALM, StabilityClass::A, "day, strong insolation"),
    rule(DAY, Clear, LIGHT, StabilityClass::B, "day, strong insolation"),
    rule(DAY, Clear, ANY, StabilityClass::C, "day, strong insolation"),
    rule(DAY, PartlyCloudy, CALM, StabilityClass::B, "day, moderate insolation"),
    rule(DAY, PartlyCloudy, LIGHT, StabilityClass::C, "day, moderate insolation"),
    rule(DAY, PartlyCloudy, ANY, StabilityClass::D, "day, moderate insolation"),
    rule(DAY, Overcast, CALM, StabilityClass::C, "day, weak insolation"),
    rule(DAY, Overcast, ANY, StabilityClass::D, "day, weak insolation"),
    rule(NIGHT, Clear, CALM, StabilityClass::F, "night, clear sky, strong cooling"),
    rule(NIGHT, Clear, LIGHT, StabilityClass::E, "night, clear sky, strong cooling"),
    rule(NIGHT, Clear, ANY, StabilityClass::D, "night, clear sky, strong cooling"),
    rule(NIGHT, PartlyCloudy, CALM, StabilityClass::E, "night, partly cloudy"),
    rule(NIGHT, PartlyCloudy, ANY, StabilityClass::D, "night, partly cloudy"),
    rule(NIGHT, Overcast, CALM, StabilityClass::D, "night, overcast"),
    rule(NIGHT, Overcast, ANY, StabilityClass::D, "night, overcast"),
];

/// A stability class together with the table row that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Assigned class
    pub class: StabilityClass,
    /// Short explanation of the conditions
    pub reason: &'static str,
}

/// Whether `hour` (0-23, taken modulo 24) falls in the daylight window
#[must_use]
pub fn is_daytime(hour: u32) -> bool {
    (DAY_START_HOUR..DAY_END_HOUR).contains(&(hour % 24))
}

/// Classify stability and report why.
///
/// Inputs are clamped rather than rejected: negative or NaN wind counts as
/// calm, NaN cloud cover as the 50 % default, and cloud cover is limited to
/// `[0, 100]`.
#[must_use]
pub fn classify_with_reason(hour: u32, wind_speed: f64, cloud_cover: f64) -> Classification {
    let wind = if wind_speed.is_nan() {
        0.0
    } else {
        wind_speed.max(0.0)
    };
    let cloud = if cloud_cover.is_nan() {
        DEFAULT_CLOUD_COVER
    } else {
        cloud_cover.clamp(0.0, 100.0)
    };
    let daytime = is_daytime(hour);
    let sky = SkyCondition::from_cloud_cover(cloud);

    STABILITY_TABLE
        .iter()
        .find(|r| r.daytime == daytime && r.sky == sky && wind < r.wind_below)
        .map_or(
            Classification {
                class: StabilityClass::D,
                reason: "neutral fallback",
            },
            |r| Classification {
                class: r.class,
                reason: r.reason,
            },
        )
}

/// Classify stability from hour of day (UTC), 10 m wind speed (m/s) and
/// cloud cover (%).
///
/// # Example
///
/// ```
/// use plume_sim_core::atmosphere::{classify, StabilityClass};
///
/// assert_eq!(classify(12, 1.0, 10.0), StabilityClass::A);
/// assert_eq!(classify(2, 1.0, 10.0), StabilityClass::F);
/// ```
#[must_use]
pub fn classify(hour: u32, wind_speed: f64, cloud_cover: f64) -> StabilityClass {
    classify_with_reason(hour, wind_speed, cloud_cover).class
}

/// Classify one meteorological sample, defaulting missing cloud cover to 50 %
#[must_use]
pub fn classify_sample(sample: &MeteoSample) -> Classification {
    classify_with_reason(
        sample.hour_of_day(),
        *sample.wind_speed,
        sample.cloud_cover_or_default(),
    )
}

/// Classify every hour of a series
#[must_use]
pub fn classify_series(samples: &[MeteoSample]) -> Vec<Classification> {
    samples.iter().map(classify_sample).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn calm_clear_midday_is_extremely_unstable() {
        assert_eq!(classify(12, 1.0, 10.0), StabilityClass::A);
    }

    #[test]
    fn calm_clear_night_is_stable() {
        assert_eq!(classify(2, 1.0, 10.0), StabilityClass::F);
    }

    #[test]
    fn daytime_table() {
        let cases = [
            (2.9, 10.0, StabilityClass::A),
            (3.0, 10.0, StabilityClass::B),
            (4.9, 10.0, StabilityClass::B),
            (5.0, 10.0, StabilityClass::C),
            (12.0, 10.0, StabilityClass::C),
            (1.0, 50.0, StabilityClass::B),
            (4.0, 50.0, StabilityClass::C),
            (6.0, 50.0, StabilityClass::D),
            (1.0, 90.0, StabilityClass::C),
            (3.5, 90.0, StabilityClass::D),
            (8.0, 90.0, StabilityClass::D),
        ];
        for (wind, cloud, expected) in cases {
            assert_eq!(
                classify(10, wind, cloud),
                expected,
                "day wind={wind} cloud={cloud}"
            );
        }
    }

    #[test]
    fn nighttime_table() {
        let cases = [
            (1.0, 10.0, StabilityClass::F),
            (4.0, 10.0, StabilityClass::E),
            (6.0, 10.0, StabilityClass::D),
            (1.0, 50.0, StabilityClass::E),
            (4.0, 50.0, StabilityClass::D),
            (1.0, 90.0, StabilityClass::D),
            (9.0, 90.0, StabilityClass::D),
        ];
        for (wind, cloud, expected) in cases {
            assert_eq!(
                classify(22, wind, cloud),
                expected,
                "night wind={wind} cloud={cloud}"
            );
        }
    }

    #[test]
    fn day_window_boundaries() {
        assert!(!is_daytime(5));
        assert!(is_daytime(6));
        assert!(is_daytime(17));
        assert!(!is_daytime(18));
        assert!(is_daytime(30)); // 30 % 24 == 6
    }

    #[test]
    fn cloud_cover_boundaries() {
        assert_eq!(SkyCondition::from_cloud_cover(24.9), SkyCondition::Clear);
        assert_eq!(SkyCondition::from_cloud_cover(25.0), SkyCondition::PartlyCloudy);
        assert_eq!(SkyCondition::from_cloud_cover(74.9), SkyCondition::PartlyCloudy);
        assert_eq!(SkyCondition::from_cloud_cover(75.0), SkyCondition::Overcast);
    }

    #[test]
    fn malformed_inputs_are_clamped() {
        // Negative wind behaves as calm
        assert_eq!(classify(12, -4.0, 10.0), StabilityClass::A);
        assert_eq!(classify(12, f64::NAN, 10.0), StabilityClass::A);
        // Cloud cover outside 0-100 is clamped into the end buckets
        assert_eq!(classify(12, 1.0, -50.0), StabilityClass::A);
        assert_eq!(classify(12, 1.0, 400.0), StabilityClass::C);
        // NaN cloud cover uses the 50 % default
        assert_eq!(classify(12, 1.0, f64::NAN), StabilityClass::B);
        // Infinite wind still lands in the last bucket
        assert_eq!(classify(2, f64::INFINITY, 10.0), StabilityClass::D);
    }

    #[test]
    fn table_is_total() {
        for hour in 0..24 {
            for wind in [0.0, 0.5, 2.99, 3.0, 4.99, 5.0, 30.0] {
                for cloud in [0.0, 24.0, 25.0, 74.0, 75.0, 100.0] {
                    let c = classify_with_reason(hour, wind, cloud);
                    assert_ne!(c.reason, "neutral fallback", "{hour} {wind} {cloud}");
                }
            }
        }
    }

    #[test]
    fn classes_order_from_unstable_to_stable() {
        assert!(StabilityClass::A < StabilityClass::F);
        assert_eq!(StabilityClass::ALL[StabilityClass::E.index()], StabilityClass::E);
        assert_eq!(StabilityClass::from_letter(" c "), Some(StabilityClass::C));
        assert_eq!(StabilityClass::from_letter("G"), None);
        assert_eq!(StabilityClass::F.to_string(), "F");
    }

    #[test]
    fn series_uses_timestamp_hour_and_default_cloud() {
        let night = Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap();
        let day = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let series = [
            MeteoSample::new(night, 1.0, 0.0, 5.0).with_cloud_cover(10.0),
            MeteoSample::new(day, 1.0, 0.0, 20.0),
        ];
        let classes = classify_series(&series);
        assert_eq!(classes[0].class, StabilityClass::F);
        // No cloud cover reported: 50 % default gives moderate insolation
        assert_eq!(classes[1].class, StabilityClass::B);
        assert_eq!(classes[1].reason, "day, moderate insolation");
    }
}
