#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI for inspecting a file-backed self-survey point store.
//!
//! ```text
//! sinkhole_map_survey list
//! sinkhole_map_survey find --lat 13.76 --lon 100.5
//! sinkhole_map_survey add --lat 13.76 --lon 100.5 --risk 0.31
//! sinkhole_map_survey delete --lat 13.76 --lon 100.5
//! sinkhole_map_survey purge
//! ```

use clap::{Parser, Subcommand};
use sinkhole_map_risk::{Breakpoints, classify};
use sinkhole_map_spatial::GeoPoint;
use sinkhole_map_survey::{EphemeralPointCache, FileStorage, SurveyPoint};

#[derive(Parser)]
#[command(
    name = "sinkhole_map_survey",
    about = "Inspect and edit cached self-survey points"
)]
struct Cli {
    /// Directory of the survey store
    #[arg(long, default_value = "data/survey")]
    store: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List live survey points
    List,
    /// Show points at an exact location
    Find {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
    /// Record a point
    Add {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long)]
        risk: f64,
    },
    /// Delete every point at an exact location
    Delete {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
    /// Drop expired points
    Purge,
}

fn print_points(points: &[SurveyPoint]) {
    if points.is_empty() {
        println!("No survey points found.");
        return;
    }

    let breakpoints = Breakpoints::default();

    println!(
        "{:<12} {:<12} {:<8} {:<7} EXPIRES",
        "LAT", "LON", "RISK", "TIER"
    );
    println!("{}", "-".repeat(70));

    for p in points {
        println!(
            "{:<12.6} {:<12.6} {:<8.3} {:<7} {}",
            p.location.latitude,
            p.location.longitude,
            p.risk,
            classify(p.risk, breakpoints).to_string(),
            p.expires_at.to_rfc3339()
        );
    }

    println!("\n{} point(s)", points.len());
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mut cache = EphemeralPointCache::new(FileStorage::new(&cli.store));
    cache.initialize_if_absent()?;

    match cli.command {
        Commands::List => print_points(&cache.list_all()?),
        Commands::Find { lat, lon } => {
            let location = GeoPoint::try_new(lon, lat)?;
            print_points(&cache.find_by_location(location)?);
        }
        Commands::Add { lat, lon, risk } => {
            let location = GeoPoint::try_new(lon, lat)?;
            let point = cache.add(location, risk)?;
            println!("Added point, expires {}", point.expires_at.to_rfc3339());
        }
        Commands::Delete { lat, lon } => {
            let location = GeoPoint::try_new(lon, lat)?;
            let removed = cache.delete_by_location(location)?;
            if removed == 0 {
                eprintln!("No survey points at ({lat}, {lon})");
                std::process::exit(1);
            }
            println!("Deleted {removed} point(s)");
        }
        Commands::Purge => {
            let removed = cache.purge_expired()?;
            println!("Purged {removed} expired point(s)");
        }
    }

    Ok(())
}
