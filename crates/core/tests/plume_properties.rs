//! Physical invariants over randomized sources and meteorology
//!
//! Inputs are drawn from a seeded `StdRng` so failures reproduce.

#![allow(unsafe_code)] // #[ctor] registers an init_array entry

use approx::assert_relative_eq;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use plume_sim_core::atmosphere::{sigma, StabilityClass};
use plume_sim_core::solver::{concentration_at, to_downwind_frame, PlumeParams};
use plume_sim_core::{
    Degrees, GeoOffset, Meters, MetersPerSecond, MeteoSample, PlumeSimulation, SimulationParams,
    SourceParams,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 3, 0, 0, 0).unwrap()
}

fn random_class(rng: &mut StdRng) -> StabilityClass {
    StabilityClass::ALL[rng.random_range(0..StabilityClass::ALL.len())]
}

fn random_series(rng: &mut StdRng, hours: usize) -> Vec<MeteoSample> {
    (0..hours)
        .map(|i| {
            MeteoSample::new(
                start() + TimeDelta::hours(i as i64),
                rng.random_range(0.0..15.0),
                rng.random_range(0.0..360.0),
                rng.random_range(-10.0..35.0),
            )
            .with_cloud_cover(rng.random_range(0.0..=100.0))
        })
        .collect()
}

fn random_params(rng: &mut StdRng, hours: u32) -> SimulationParams {
    SimulationParams {
        source: SourceParams {
            emission_rate: rng.random_range(0.0..100.0),
            stack_height: rng.random_range(0.0..150.0),
            latitude: rng.random_range(-80.0..80.0),
            longitude: rng.random_range(-180.0..180.0),
            loss_rate: rng.random_range(0.0..1e-4),
            ..SourceParams::default().with_grid_size(16)
        },
        duration: hours,
        stability_class: Some(random_class(rng)),
        auto_map_stability: rng.random_bool(0.5),
        ..SimulationParams::default()
    }
}

#[test]
fn fields_are_non_negative_and_peaks_consistent() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..20 {
        let params = random_params(&mut rng, 6);
        let meteo = random_series(&mut rng, 6);
        let out = PlumeSimulation::new(params).unwrap().run(&meteo).unwrap();

        for r in &out.results {
            assert!(r.grid.as_slice().iter().all(|&v| v >= 0.0 && v.is_finite()));
            let max = r.grid.as_slice().iter().copied().fold(0.0, f64::max);
            assert_eq!(r.peak, max);
            assert!((0.0..=1.0).contains(&r.decay_factor));
        }
        let best = out.results.iter().map(|r| r.peak).fold(0.0, f64::max);
        assert_eq!(out.stats.peak_concentration, best);
        assert_eq!(out.results[out.stats.peak_hour].peak, best);
        assert!(out.stats.average_concentration <= best * (1.0 + 1e-12));
    }
}

#[test]
fn decay_never_amplifies() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..10 {
        let mut params = random_params(&mut rng, 4);
        params.auto_map_stability = false;
        let meteo: Vec<_> = (0..4).map(|i| meteo_at(i, 5.0, 180.0)).collect();
        let out = PlumeSimulation::new(params).unwrap().run(&meteo).unwrap();
        for pair in out.results.windows(2) {
            assert!(pair[1].peak <= pair[0].peak);
            assert!(pair[1].decay_factor < pair[0].decay_factor);
        }
    }
}

fn meteo_at(hour: i64, speed: f64, direction: f64) -> MeteoSample {
    MeteoSample::new(start() + TimeDelta::hours(hour), speed, direction, 15.0)
}

#[test]
fn source_maps_to_origin_for_any_wind() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
        let p = to_downwind_frame(
            GeoOffset::new(0.0, 0.0),
            rng.random_range(-89.0..89.0),
            Degrees::new(rng.random_range(-720.0..720.0)),
        );
        assert_eq!(p.downwind.abs(), 0.0);
        assert_eq!(p.crosswind.abs(), 0.0);
    }
}

#[test]
fn rotation_preserves_distance() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..100 {
        let lat = rng.random_range(-60.0..60.0);
        let offset = GeoOffset::new(rng.random_range(-0.05..0.05), rng.random_range(-0.05..0.05));
        let a = to_downwind_frame(offset, lat, Degrees::new(0.0));
        let b = to_downwind_frame(offset, lat, Degrees::new(rng.random_range(0.0..360.0)));
        assert_relative_eq!(
            a.downwind.hypot(a.crosswind),
            b.downwind.hypot(b.crosswind),
            max_relative = 1e-9
        );
    }
}

#[test]
fn degenerate_receptors_are_zero() {
    let mut rng = StdRng::seed_from_u64(3);
    let source = SourceParams::default();
    for _ in 0..100 {
        let class = random_class(&mut rng);
        let calm_wind = MetersPerSecond::new(rng.random_range(0.0..0.0999));
        let calm = PlumeParams::new(&source, calm_wind, class);
        assert_eq!(concentration_at(rng.random_range(1.0..5000.0), 0.0, &calm), 0.0);

        let windy = PlumeParams::new(&source, MetersPerSecond::new(5.0), class);
        assert_eq!(concentration_at(rng.random_range(-5000.0..0.999), 0.0, &windy), 0.0);
    }
}

#[test]
fn sigmas_grow_downwind_and_stay_positive() {
    for class in StabilityClass::ALL {
        let mut previous = sigma(Meters::new(0.0), class);
        assert!(previous.sigma_y > 0.0 && previous.sigma_z > 0.0);
        for d in [10.0, 100.0, 1000.0, 10_000.0] {
            let s = sigma(Meters::new(d), class);
            assert!(s.sigma_y >= previous.sigma_y);
            assert!(s.sigma_z >= previous.sigma_z);
            previous = s;
        }
    }
}
