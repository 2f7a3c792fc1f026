use chrono::SecondsFormat;
use clap::Parser;
use plume_sim_core::atmosphere::{classify_series, StabilityClass};
use plume_sim_core::weather::{ForecastCache, MeteoSeriesBuilder, SyntheticForecast};
use plume_sim_core::{
    HourResult, MeteoSource, PlumeSimulation, PollutantType, SimulationOutput, SimulationParams,
    SourceParams,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Gaussian plume dispersion demo with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "plume-headless")]
#[command(about = "Hourly point-source dispersion forecast", long_about = None)]
struct Args {
    /// Source latitude in degrees
    #[arg(long, default_value_t = 40.7128, allow_negative_numbers = true)]
    lat: f64,

    /// Source longitude in degrees
    #[arg(long, default_value_t = -74.006, allow_negative_numbers = true)]
    lon: f64,

    /// Emission rate in g/s
    #[arg(short, long, default_value_t = 10.0)]
    emission_rate: f64,

    /// Effective stack height in meters
    #[arg(short = 'H', long, default_value_t = 50.0)]
    stack_height: f64,

    /// Simulation duration in hours (1-168)
    #[arg(short, long, default_value_t = 24)]
    duration: u32,

    /// Pasquill-Gifford stability class (A-F)
    #[arg(short, long, default_value = "D")]
    stability: String,

    /// Classify stability per hour from the meteorology instead
    #[arg(long)]
    auto_stability: bool,

    /// Wind speed in m/s (manual weather)
    #[arg(short, long, default_value_t = 5.0)]
    wind_speed: f64,

    /// Direction the wind blows from in degrees (0=North, 90=East)
    #[arg(long, default_value_t = 270.0)]
    wind_direction: f64,

    /// Use the forecast pipeline (synthetic forecast) instead of manual wind
    #[arg(short, long)]
    auto_weather: bool,

    /// Pollutant (PM2.5, PM10)
    #[arg(short, long, default_value = "PM2.5")]
    pollutant: String,

    /// Grid size N; the grid has N+1 nodes per side over 5 km
    #[arg(short, long, default_value_t = 40)]
    grid_size: usize,

    /// Print the full output as JSON instead of a report
    #[arg(long)]
    json: bool,
}

fn build_params(args: &Args) -> Result<SimulationParams, String> {
    let stability = StabilityClass::from_letter(&args.stability)
        .ok_or_else(|| format!("Unknown stability class '{}', expected A-F", args.stability))?;

    let pollutant = match args.pollutant.to_uppercase().as_str() {
        "PM2.5" | "PM25" => PollutantType::Pm25,
        "PM10" => PollutantType::Pm10,
        other => return Err(format!("Unknown pollutant '{other}', expected PM2.5 or PM10")),
    };

    let meteo_source = if args.auto_weather {
        MeteoSource::Forecast
    } else {
        MeteoSource::Manual {
            wind_speed: args.wind_speed,
            wind_direction: args.wind_direction,
        }
    };

    let params = SimulationParams {
        source: SourceParams {
            emission_rate: args.emission_rate,
            stack_height: args.stack_height,
            latitude: args.lat,
            longitude: args.lon,
            ..SourceParams::default().with_grid_size(args.grid_size)
        },
        duration: args.duration,
        stability_class: Some(stability),
        auto_map_stability: args.auto_stability,
        meteo_source,
        ..SimulationParams::default()
    };
    Ok(params.with_pollutant(pollutant))
}

/// Coarse text map of one hour's field, north up
fn print_map(hour: &HourResult) {
    const SHADES: [char; 6] = [' ', '.', ':', '+', '#', '@'];
    let grid = &hour.grid;
    let peak = grid.peak();
    if peak <= 0.0 {
        println!("  (no ground-level concentration)");
        return;
    }
    let step = (grid.width() / 40).max(1);
    for row in (0..grid.height()).rev().step_by(step) {
        let line: String = (0..grid.width())
            .step_by(step)
            .map(|col| {
                let level = (grid.get(col, row) / peak * (SHADES.len() - 1) as f64).round();
                SHADES[(level as usize).min(SHADES.len() - 1)]
            })
            .collect();
        println!("  |{line}|");
    }
}

fn print_report(params: &SimulationParams, output: &SimulationOutput) {
    let source = &params.source;
    println!("=== Plume Dispersion Forecast ===\n");
    println!(
        "Source: ({:.4}, {:.4}), Q={:.2} g/s, H={:.1} m, {:?}",
        source.latitude,
        source.longitude,
        source.emission_rate,
        source.stack_height,
        params.pollutant_type
    );
    println!(
        "Grid: {0}x{0} nodes, {1:.1} m spacing, receptors at {2:.1} m",
        source.grid_size + 1,
        source.grid_spacing,
        source.receptor_height
    );
    println!(
        "Removal: deposition {:.4} m/s over {:.0} m, loss {:.2e}/s\n",
        source.deposition_velocity, source.mixing_height, source.loss_rate
    );

    println!("Hour  Time (UTC)            Wind         Class  Decay   Peak (ug/m3)");
    for r in &output.results {
        println!(
            "{:>4}  {}  {:>5.1} m/s {:>3.0}°  {:>5}  {:.4}  {:>12.3}",
            r.hour,
            r.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            *r.wind_speed,
            *r.wind_direction,
            r.stability,
            r.decay_factor,
            r.peak * 1e6
        );
    }

    let stats = &output.stats;
    println!(
        "\nPeak: {:.3} ug/m3 at hour {} ({})",
        stats.peak_concentration * 1e6,
        stats.peak_hour,
        stats.peak_time.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    println!("Mean hourly peak: {:.3} ug/m3", stats.average_concentration * 1e6);

    if let Some(peak_hour) = output.results.get(stats.peak_hour) {
        println!("\nField at hour {}:", peak_hour.hour);
        print_map(peak_hour);
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let params = match build_params(&args) {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let simulation = match PlumeSimulation::new(params) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Invalid parameters: {e}");
            return ExitCode::FAILURE;
        }
    };

    let builder = MeteoSeriesBuilder::new(Arc::new(ForecastCache::new()))
        .with_provider(Arc::new(SyntheticForecast::default()));
    let meteo = builder.build(simulation.params());
    info!(
        "Meteorology ready: {} hours from {}",
        meteo.len(),
        if args.auto_weather { "forecast" } else { "manual wind" }
    );

    if args.auto_stability && !args.json {
        println!("Stability by hour:");
        for (sample, c) in meteo.iter().zip(classify_series(&meteo)) {
            println!("  {:02}:00  {}  {}", sample.hour_of_day(), c.class, c.reason);
        }
        println!();
    }

    let output = match simulation.run(&meteo) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Simulation failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to serialize output: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_report(simulation.params(), &output);
    }

    ExitCode::SUCCESS
}
