//! Whole-run summary statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary over every simulated hour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatistics {
    /// Largest hourly peak (g/m³)
    pub peak_concentration: f64,
    /// Timestamp of the hour holding the largest peak
    pub peak_time: DateTime<Utc>,
    /// Index of the hour holding the largest peak
    pub peak_hour: usize,
    /// Mean of the hourly peaks (g/m³)
    pub average_concentration: f64,
}

/// Running reduction of hourly peaks into [`RunStatistics`]
///
/// Ties keep the earliest hour.
#[derive(Debug, Clone)]
pub struct StatsAccumulator {
    best: Option<(usize, DateTime<Utc>, f64)>,
    sum: f64,
    count: usize,
}

impl Default for StatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsAccumulator {
    /// Empty accumulator
    #[must_use]
    pub fn new() -> Self {
        Self {
            best: None,
            sum: 0.0,
            count: 0,
        }
    }

    /// Record one hour's peak
    pub fn record(&mut self, hour: usize, timestamp: DateTime<Utc>, peak: f64) {
        let peak = if peak.is_nan() { 0.0 } else { peak.max(0.0) };
        match self.best {
            Some((_, _, best)) if peak <= best => {}
            _ => self.best = Some((hour, timestamp, peak)),
        }
        self.sum += peak;
        self.count += 1;
    }

    /// Number of hours recorded
    #[must_use]
    pub fn hours(&self) -> usize {
        self.count
    }

    /// Final statistics, or `None` if no hour was recorded
    #[must_use]
    pub fn finish(self) -> Option<RunStatistics> {
        let (peak_hour, peak_time, peak_concentration) = self.best?;
        Some(RunStatistics {
            peak_concentration,
            peak_time,
            peak_hour,
            average_concentration: self.sum / self.count as f64,
        })
    }
}
