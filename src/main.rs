use std::fs;
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use thiserror::Error;

use skytrace::config::{parse_duration, parse_time, Config, ConfigError};
use skytrace::context::SimulationContext;
use skytrace::footprint::FootprintProjector;
use skytrace::intervals::{IntervalExtractor, Window};
use skytrace::orbital::{
    distance_for_separation_time, follower, separation_time_for_distance, ElementSet,
    ElementSetError,
};
use skytrace::overlay::{compute_beta, GroundMap, MapRequest, PolarPlot, SkyChart};
use skytrace::predict::{access_windows, lighting, predict_passes, PredictError};

#[derive(Parser)]
#[command(name = "skytrace")]
#[command(about = "Satellite visibility, footprint and pass geometry")]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "skytrace.yaml", global = true)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and list loaded satellites
    Validate,
    /// Predict passes over the ground station
    Passes {
        /// Satellites to search; all loaded satellites when omitted
        #[arg(short, long)]
        satellite: Vec<String>,
        /// Start time: now, now+1h or RFC3339
        #[arg(long, default_value = "now")]
        start: String,
        /// End time; start plus the configured search window when omitted
        #[arg(long)]
        end: Option<String>,
    },
    /// Ground-station access windows, open ends included
    Access {
        #[arg(short, long)]
        satellite: Vec<String>,
        #[arg(long, default_value = "now")]
        start: String,
        #[arg(long)]
        end: Option<String>,
    },
    /// Sunlit and eclipse intervals
    Eclipse {
        #[arg(short, long)]
        satellite: String,
        #[arg(long, default_value = "now")]
        start: String,
        #[arg(long)]
        end: Option<String>,
    },
    /// Ground map layers: visibility circle, sensor footprint, ground track
    Map {
        #[arg(short, long)]
        satellite: Vec<String>,
        #[arg(long, default_value = "now")]
        time: String,
    },
    /// Sky chart as seen from a satellite
    Sky {
        #[arg(short, long)]
        satellite: String,
        #[arg(long, default_value = "now")]
        time: String,
    },
    /// Polar sky track over the ground station
    Polar {
        #[arg(short, long)]
        satellite: String,
        #[arg(long, default_value = "now")]
        time: String,
    },
    /// Beta angle and orbit-plane sun geometry
    Beta {
        #[arg(short, long)]
        satellite: String,
        #[arg(long, default_value = "now")]
        time: String,
    },
    /// Print the element set of a virtual satellite trailing a leader
    Follower {
        /// File holding the leader's element set
        tle: String,
        #[arg(short, long)]
        name: String,
        /// Time gap such as 5m
        #[arg(long, conflicts_with = "distance_km")]
        separation: Option<String>,
        /// Along-track distance gap
        #[arg(long)]
        distance_km: Option<f64>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Predict(#[from] PredictError),
    #[error("{0}")]
    ElementSet(#[from] ElementSetError),
    #[error("Error reading file: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid argument: {0}")]
    Argument(String),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let now = Utc::now();

    let result = match cli.command {
        Commands::Validate => validate(&cli.config),
        Commands::Passes {
            satellite,
            start,
            end,
        } => passes(&cli.config, satellite, &start, end.as_deref(), now),
        Commands::Access {
            satellite,
            start,
            end,
        } => access(&cli.config, satellite, &start, end.as_deref(), now),
        Commands::Eclipse {
            satellite,
            start,
            end,
        } => eclipse(&cli.config, &satellite, &start, end.as_deref(), now),
        Commands::Map { satellite, time } => map(&cli.config, satellite, &time, now),
        Commands::Sky { satellite, time } => sky(&cli.config, &satellite, &time, now),
        Commands::Polar { satellite, time } => polar(&cli.config, &satellite, &time, now),
        Commands::Beta { satellite, time } => beta(&cli.config, &satellite, &time, now),
        Commands::Follower {
            tle,
            name,
            separation,
            distance_km,
        } => follower_set(&tle, &name, separation.as_deref(), distance_km),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn time_arg(text: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, CliError> {
    parse_time(text, now).map_err(|e| CliError::Argument(format!("{:?}: {}", text, e)))
}

fn search_window(
    config: &Config,
    start: &str,
    end: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Window<DateTime<Utc>>, CliError> {
    let start = time_arg(start, now)?;
    let end = match end {
        Some(text) => time_arg(text, now)?,
        None => start + config.search.window()?,
    };
    if end < start {
        return Err(CliError::Argument("end is before start".to_string()));
    }
    Ok(Window::new(start, end))
}

fn load_context(path: &str, time: DateTime<Utc>) -> Result<(Config, SimulationContext), CliError> {
    let config = Config::from_file(path)?;
    let satellites = config.load_satellites()?;
    Ok((config, SimulationContext::new(time, satellites)))
}

/// Explicit ids, else the configured ones, else everything loaded.
fn selected(config: &Config, ctx: &SimulationContext, ids: Vec<String>) -> Vec<String> {
    if !ids.is_empty() {
        ids
    } else if !config.satellites.is_empty() {
        config.satellites.iter().map(|s| s.id.clone()).collect()
    } else {
        ctx.satellites.names()
    }
}

fn validate(path: &str) -> Result<(), CliError> {
    let (config, ctx) = load_context(path, Utc::now())?;
    println!("Configuration is valid ({} satellites)", ctx.satellites.len());
    for entry in ctx.satellites.entries() {
        println!(
            "  {} (NORAD {}) from {}, period {:.1} min",
            entry.info.name,
            entry.info.norad_id,
            entry.info.tle_source,
            entry.element_set.period_s() / 60.0
        );
    }
    for sat in &config.satellites {
        if let Err(e) = ctx.satellites.get(&sat.id) {
            eprintln!("  warning: {}", e);
        }
    }
    Ok(())
}

fn passes(
    path: &str,
    ids: Vec<String>,
    start: &str,
    end: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(), CliError> {
    let (config, ctx) = load_context(path, now)?;
    let window = search_window(&config, start, end, now)?;
    let station = config.station.ground_station()?;
    let extractor = IntervalExtractor::new(config.intervals);

    let mut all_passes = Vec::new();
    for id in selected(&config, &ctx, ids) {
        match predict_passes(
            &ctx.satellites,
            &station,
            &id,
            window,
            &extractor,
            config.search.min_peak_elevation_deg,
        ) {
            Ok(passes) => all_passes.extend(passes),
            Err(e) => log::warn!("Failed to predict passes for {}: {}", id, e),
        }
    }
    all_passes.sort_by_key(|p| p.aos);
    print_json(&all_passes)
}

fn access(
    path: &str,
    ids: Vec<String>,
    start: &str,
    end: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(), CliError> {
    let (config, ctx) = load_context(path, now)?;
    let window = search_window(&config, start, end, now)?;
    let station = config.station.ground_station()?;
    let ids = selected(&config, &ctx, ids);
    print_json(&access_windows(&ctx.satellites, &station, &ids, window)?)
}

fn eclipse(
    path: &str,
    id: &str,
    start: &str,
    end: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(), CliError> {
    let (config, ctx) = load_context(path, now)?;
    let window = search_window(&config, start, end, now)?;
    let extractor = IntervalExtractor::new(config.intervals);
    let result = lighting(
        &ctx.satellites,
        id,
        window,
        config.search.lighting_step()?,
        &extractor,
    )?;
    print_json(&result)
}

fn map(path: &str, ids: Vec<String>, time: &str, now: DateTime<Utc>) -> Result<(), CliError> {
    let (config, ctx) = load_context(path, time_arg(time, now)?)?;
    let projector = FootprintProjector::new(config.footprint.ray_samples);
    let requests: Vec<_> = selected(&config, &ctx, ids)
        .into_iter()
        .map(|id| {
            let settings = config.satellite(&id);
            MapRequest {
                pointing: settings.and_then(|s| s.sensor),
                color: settings.and_then(|s| s.color.clone()),
                satellite: id,
            }
        })
        .collect();
    let layers = GroundMap::new(config.raster, projector).compute_all(&ctx, &requests)?;
    print_json(&layers)
}

fn sky(path: &str, id: &str, time: &str, now: DateTime<Utc>) -> Result<(), CliError> {
    let (config, ctx) = load_context(path, time_arg(time, now)?)?;
    let chart = SkyChart::new(config.raster, config.sky_chart.keepouts.clone());
    print_json(&chart.compute(&ctx, id)?)
}

fn polar(path: &str, id: &str, time: &str, now: DateTime<Utc>) -> Result<(), CliError> {
    let (config, ctx) = load_context(path, time_arg(time, now)?)?;
    let plot = PolarPlot::new(config.station.ground_station()?);
    print_json(&plot.compute(&ctx, id)?)
}

fn beta(path: &str, id: &str, time: &str, now: DateTime<Utc>) -> Result<(), CliError> {
    let (_, ctx) = load_context(path, time_arg(time, now)?)?;
    print_json(&compute_beta(&ctx, id)?)
}

fn follower_set(
    path: &str,
    name: &str,
    separation: Option<&str>,
    distance_km: Option<f64>,
) -> Result<(), CliError> {
    let leader = ElementSet::parse(&fs::read_to_string(path)?)?;
    let period = leader.period_s();
    let separation_s = match (separation, distance_km) {
        (Some(text), None) => {
            let d = parse_duration(text).map_err(CliError::Argument)?;
            d.num_milliseconds() as f64 / 1000.0
        }
        (None, Some(km)) => separation_time_for_distance(period, km),
        _ => {
            return Err(CliError::Argument(
                "give one of --separation or --distance-km".to_string(),
            ))
        }
    };

    let trailing = follower(&leader, name, separation_s)?;
    log::info!(
        "{} trails by {:.1} s ({:.1} km along track)",
        name,
        separation_s,
        distance_for_separation_time(period, separation_s)
    );
    println!("{}", trailing);
    Ok(())
}
