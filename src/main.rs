//! spacedb-density - NRLMSISE-00 density for drag calculations
//!
//! Resolves atmospheric density for an epoch and geodetic position using
//! historical space-weather records and an external NRLMSISE-00 driver.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use nalgebra::Vector3;
use serde::Serialize;

use spacedb_density::{
    AtmosphericDrag, DayOfYearInfo, DiagnosticLog, DragState, Epoch, GeodeticPosition,
    ResolverSettings, SpaceWeatherIndices,
};

#[derive(Parser, Debug)]
#[command(name = "spacedb-density", version, about)]
struct Cli {
    /// Resolver settings (JSON); defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve density in kg/m³ at an epoch and position
    Resolve(ResolveArgs),
    /// Show the epoch breakdown and space-weather indices used for it
    Indices(IndicesArgs),
    /// Compute drag acceleration (km/s²) from resolved density
    Drag(DragArgs),
}

#[derive(Args, Debug, Clone)]
struct EpochArg {
    /// UTC datestamp, e.g. "15/03/2020 12:30:45.000000 UTC"; defaults to now
    #[arg(long)]
    epoch: Option<String>,
}

impl EpochArg {
    fn parse(&self) -> Result<Epoch> {
        match &self.epoch {
            Some(text) => Epoch::parse(text).with_context(|| format!("Invalid --epoch '{}'", text)),
            None => Ok(Epoch::from_datetime(&chrono::Utc::now().naive_utc())),
        }
    }
}

#[derive(Args, Debug, Clone)]
struct PositionArgs {
    /// Geodetic latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,
    /// Geodetic longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,
    /// Altitude in km
    #[arg(long, allow_hyphen_values = true)]
    alt: f64,
}

impl PositionArgs {
    fn position(&self) -> GeodeticPosition {
        GeodeticPosition::new(self.lat, self.lon, self.alt)
    }
}

#[derive(Args, Debug, Clone)]
struct ResolveArgs {
    #[command(flatten)]
    epoch: EpochArg,
    #[command(flatten)]
    position: PositionArgs,
    /// Print every intermediate value as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct IndicesArgs {
    #[command(flatten)]
    epoch: EpochArg,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct DragArgs {
    #[command(flatten)]
    epoch: EpochArg,
    #[command(flatten)]
    position: PositionArgs,
    /// Earth-fixed velocity in km/s
    #[arg(long, required = true, num_args = 3, value_names = ["VX", "VY", "VZ"], allow_hyphen_values = true)]
    velocity: Vec<f64>,
    /// Drag coefficient
    #[arg(long, default_value_t = 2.2)]
    cd: f64,
    /// Cross-sectional area in m²
    #[arg(long, default_value_t = 1.0)]
    area: f64,
    /// Mass in kg
    #[arg(long, default_value_t = 100.0)]
    mass: f64,
}

#[derive(Serialize)]
struct IndicesReport {
    datestamp: String,
    epoch: Epoch,
    day: DayOfYearInfo,
    indices: SpaceWeatherIndices,
}

fn load_settings(path: Option<&PathBuf>) -> Result<ResolverSettings> {
    match path {
        Some(path) => ResolverSettings::load(path)
            .with_context(|| format!("Failed to load settings from {:?}", path)),
        None => Ok(ResolverSettings::default()),
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(cli.config.as_ref())?;
    let diagnostics = Arc::new(DiagnosticLog::new());
    let resolver = settings
        .build()
        .context("Failed to set up density resolver")?
        .with_diagnostics(diagnostics.clone());

    match cli.command {
        Command::Resolve(args) => {
            let epoch = args.epoch.parse()?;
            let resolution = resolver.resolve_epoch(&epoch, &args.position.position())?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&resolution)?);
            } else {
                println!("{:e}", resolution.density.rho);
            }
        }
        Command::Indices(args) => {
            let epoch = args.epoch.parse()?;
            let (day, indices) = resolver.inputs(&epoch)?;
            let report = IndicesReport {
                datestamp: epoch.datestamp(),
                epoch,
                day,
                indices,
            };
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("epoch        {}", report.datestamp);
                println!("day of year  {}", day.day_of_year);
                println!("F10.7 key    {} {}", day.f107_lookup_year, day.previous_day_of_year);
                println!("F10.7        {}", indices.f107);
                println!("F10.7A       {}", indices.f107a);
                println!("Ap           {}", indices.ap);
            }
        }
        Command::Drag(args) => {
            let state = DragState {
                epoch: args.epoch.parse()?,
                geodetic: args.position.position(),
                ecef_velocity: Vector3::from_column_slice(&args.velocity),
            };
            let drag = AtmosphericDrag::from_properties(resolver, args.cd, args.area, args.mass);
            if let Some(result) = drag.compute_acceleration(&state)? {
                let a = result.acceleration;
                println!("rho {:e} kg/m³", result.density.rho);
                println!("a   [{:e}, {:e}, {:e}] km/s²", a.x, a.y, a.z);
            }
        }
    }

    let reported = diagnostics.drain();
    if !reported.is_empty() {
        log::info!("{} diagnostic(s) raised during resolution", reported.len());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    run(Cli::parse())
}
