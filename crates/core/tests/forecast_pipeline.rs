//! Forecast acquisition: cache, upstream provider and synthetic fallback

#![allow(unsafe_code)] // #[ctor] registers an init_array entry

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use plume_sim_core::atmosphere::StabilityClass;
use plume_sim_core::weather::{
    start_of_hour, synthetic_series, ForecastCache, ManualClock, SyntheticForecast,
};
use plume_sim_core::{
    run_simulation, HourlyWindOverride, MeteoSample, MeteoSeriesBuilder, MeteoSource,
    SimulationParams, SourceParams, WeatherError, WeatherProvider,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 20, 8, 12, 0).unwrap()
}

/// Upstream that counts calls and can be switched off
struct FlakyUpstream {
    calls: AtomicUsize,
    fail: bool,
}

impl WeatherProvider for FlakyUpstream {
    fn fetch_forecast(
        &self,
        _latitude: f64,
        _longitude: f64,
        hours: usize,
    ) -> Result<Vec<MeteoSample>, WeatherError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(WeatherError::UpstreamUnavailable("HTTP 503".into()));
        }
        Ok((0..hours)
            .map(|i| {
                MeteoSample::new(
                    start_of_hour(start()) + TimeDelta::hours(i as i64),
                    3.0,
                    225.0,
                    18.0,
                )
                .with_cloud_cover(80.0)
            })
            .collect())
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

fn setup(fail: bool) -> (MeteoSeriesBuilder, Arc<FlakyUpstream>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start()));
    let upstream = Arc::new(FlakyUpstream {
        calls: AtomicUsize::new(0),
        fail,
    });
    let builder = MeteoSeriesBuilder::new(Arc::new(ForecastCache::with_clock(clock.clone())))
        .with_provider(upstream.clone())
        .with_clock(clock.clone());
    (builder, upstream, clock)
}

fn forecast_params(latitude: f64, longitude: f64, duration: u32) -> SimulationParams {
    SimulationParams {
        source: SourceParams {
            latitude,
            longitude,
            ..SourceParams::default().with_grid_size(20)
        },
        duration,
        meteo_source: MeteoSource::Forecast,
        ..SimulationParams::default()
    }
}

#[test]
fn cache_serves_nearby_locations_until_expiry() {
    let clock = Arc::new(ManualClock::new(start()));
    let cache = ForecastCache::with_clock(clock.clone());
    let series = synthetic_series(start_of_hour(start()), 3);

    cache.set(40.7128, -74.006, series.clone());
    assert_eq!(cache.get(40.7129, -74.0059), Some(series));

    clock.advance(TimeDelta::minutes(15) + TimeDelta::seconds(1));
    assert_eq!(cache.get(40.7129, -74.0059), None);
}

#[test]
fn repeated_runs_reuse_the_cached_forecast() {
    let (builder, upstream, _) = setup(false);
    let first = run_simulation(forecast_params(51.5074, -0.1278, 12), &builder).unwrap();
    let second = run_simulation(forecast_params(51.5071, -0.1281, 12), &builder).unwrap();

    assert_eq!(upstream.calls.load(Ordering::SeqCst), 1);
    // Same meteorology for both runs; grids differ only by receptor placement
    for (a, b) in first.results.iter().zip(&second.results) {
        assert_eq!(a.timestamp, b.timestamp);
        assert_eq!(a.wind_speed, b.wind_speed);
        assert_eq!(a.wind_direction, b.wind_direction);
        assert_eq!(a.stability, b.stability);
    }
    assert!(first.results.iter().all(|r| *r.wind_direction == 225.0));
    assert_eq!(builder.cache().stats().keys, vec!["51.507,-0.128"]);
}

#[test]
fn stale_cache_is_refreshed() {
    let (builder, upstream, clock) = setup(false);
    let _ = run_simulation(forecast_params(10.0, 10.0, 3), &builder).unwrap();
    clock.advance(TimeDelta::minutes(20));
    let _ = run_simulation(forecast_params(10.0, 10.0, 3), &builder).unwrap();
    assert_eq!(upstream.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn upstream_outage_never_fails_the_run() {
    let (builder, upstream, _) = setup(true);
    let out = run_simulation(forecast_params(-33.8688, 151.2093, 24), &builder).unwrap();

    assert_eq!(upstream.calls.load(Ordering::SeqCst), 1);
    assert_eq!(out.results.len(), 24);
    let expected = synthetic_series(start_of_hour(start()), 24);
    for (r, s) in out.results.iter().zip(&expected) {
        assert_eq!(r.wind_speed, s.wind_speed);
        assert_eq!(r.wind_direction, s.wind_direction);
        assert_eq!(r.timestamp, s.timestamp);
    }
    assert!(builder.cache().is_empty());
}

#[test]
fn overrides_replace_forecast_hours_before_classification() {
    let (builder, _, _) = setup(false);
    let mut params = forecast_params(0.0, 0.0, 4);
    params.auto_map_stability = true;
    params.hourly_wind_overrides = vec![HourlyWindOverride {
        hour: 2,
        wind_speed: 1.0,
        wind_direction: 90.0,
    }];
    let out = run_simulation(params, &builder).unwrap();

    assert_eq!(*out.results[2].wind_speed, 1.0);
    assert_eq!(*out.results[2].wind_direction, 90.0);
    assert_eq!(*out.results[1].wind_speed, 3.0);
    // Overcast daytime: neutral at 3 m/s, slightly unstable in light wind
    assert_eq!(out.results[1].stability, StabilityClass::D);
    assert_eq!(out.results[2].stability, StabilityClass::C);
    assert_eq!(out.results[3].stability, StabilityClass::D);
}

#[test]
fn synthetic_provider_plugs_into_the_builder() {
    let clock = Arc::new(ManualClock::new(start()));
    let builder = MeteoSeriesBuilder::new(Arc::new(ForecastCache::with_clock(clock.clone())))
        .with_provider(Arc::new(SyntheticForecast::new(clock.clone())))
        .with_clock(clock);
    let out = run_simulation(forecast_params(35.0, 139.0, 6), &builder).unwrap();
    assert_eq!(out.results.len(), 6);
    assert_eq!(builder.cache().len(), 1);
}
