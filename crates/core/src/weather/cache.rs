//! Short-lived forecast cache
//!
//! Keeps recently fetched hourly forecasts so repeated simulations at the
//! same place do not hit the upstream weather service again. Locations are
//! bucketed to three decimal places (~100 m), entries live for 15 minutes
//! from insertion and are evicted lazily the first time they are read after
//! expiry. Nothing is persisted.

use crate::core_types::meteo::MeteoSample;
use crate::weather::clock::{Clock, SystemClock};
use chrono::{DateTime, TimeDelta, Utc};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Default time-to-live of a cached forecast (minutes)
pub const FORECAST_CACHE_TTL_MINUTES: i64 = 15;

/// Location bucket: latitude and longitude rounded to 0.001°
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    lat_millis: i64,
    lon_millis: i64,
}

impl CacheKey {
    /// Bucket a location
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            lat_millis: (latitude * 1000.0).round() as i64,
            lon_millis: (longitude * 1000.0).round() as i64,
        }
    }

    /// Rounded latitude (degrees)
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.lat_millis as f64 / 1000.0
    }

    /// Rounded longitude (degrees)
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.lon_millis as f64 / 1000.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude(), self.longitude())
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Vec<MeteoSample>,
    inserted_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now - self.inserted_at > ttl
    }
}

/// Snapshot of cache contents for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Number of stored entries, expired ones included until read
    pub entries: usize,
    /// Configured time-to-live (minutes)
    pub ttl_minutes: i64,
    /// Keys as `"lat,lon"`
    pub keys: Vec<String>,
}

/// Time-bounded forecast store, safe to share between threads
///
/// # Example
///
/// ```
/// use plume_sim_core::weather::ForecastCache;
///
/// let cache = ForecastCache::new();
/// cache.set(40.7128, -74.006, Vec::new());
/// assert!(cache.get(40.7129, -74.0059).is_some());
/// ```
pub struct ForecastCache {
    entries: RwLock<FxHashMap<CacheKey, CacheEntry>>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
}

impl fmt::Debug for ForecastCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForecastCache")
            .field("entries", &self.len())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl Default for ForecastCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastCache {
    /// Cache on the system clock with the 15 minute TTL
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Cache on a custom clock with the 15 minute TTL
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, TimeDelta::minutes(FORECAST_CACHE_TTL_MINUTES))
    }

    /// Cache on a custom clock and TTL
    #[must_use]
    pub fn with_ttl(clock: Arc<dyn Clock>, ttl: TimeDelta) -> Self {
        Self {
            entries: RwLock::new(FxHashMap::default()),
            clock,
            ttl,
        }
    }

    /// Configured time-to-live
    #[must_use]
    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Cached forecast for the location's bucket, if present and fresh.
    ///
    /// An entry older than the TTL is removed and reported as a miss.
    pub fn get(&self, latitude: f64, longitude: f64) -> Option<Vec<MeteoSample>> {
        let key = CacheKey::new(latitude, longitude);
        let now = self.clock.now();

        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(&key) {
                None => {
                    debug!(%key, "forecast cache miss");
                    return None;
                }
                Some(entry) if !entry.is_expired(now, self.ttl) => {
                    debug!(%key, hours = entry.data.len(), "forecast cache hit");
                    return Some(entry.data.clone());
                }
                Some(_) => {}
            }
        }

        // Expired under the read lock; a writer may have refreshed it since
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = entries.get(&key) {
            if !entry.is_expired(now, self.ttl) {
                return Some(entry.data.clone());
            }
            entries.remove(&key);
            debug!(%key, "forecast cache entry expired and evicted");
        }
        None
    }

    /// Store a forecast, replacing any entry in the same bucket
    pub fn set(&self, latitude: f64, longitude: f64, data: Vec<MeteoSample>) {
        let key = CacheKey::new(latitude, longitude);
        let entry = CacheEntry {
            data,
            inserted_at: self.clock.now(),
        };
        debug!(%key, hours = entry.data.len(), "forecast cached");
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, entry);
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of stored entries, including expired ones not yet read
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entry count, TTL and keys
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = entries.keys().map(ToString::to_string).collect();
        keys.sort();
        CacheStats {
            entries: entries.len(),
            ttl_minutes: self.ttl.num_minutes(),
            keys,
        }
    }
}
