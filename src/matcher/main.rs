//! Proximity matching.
//!
//! Joins the authoritative address table with an extracted OSM address
//! table and writes every OSM address that has exactly one authoritative
//! neighbour in range as a labelled pair.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use osm_addr_bench::columnar::{read_addresses, read_reference, write_parquet};
use osm_addr_bench::config::Config;
use osm_addr_bench::spatial::{match_records, MatchParams};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "match")]
#[command(about = "Pair extracted addresses with authoritative ones by proximity")]
struct Args {
    /// TOML config file; command line flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Authoritative address table (Parquet)
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Extracted address table (Parquet)
    #[arg(long)]
    candidates: Option<PathBuf>,

    /// Output Parquet file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Candidate search radius in metres
    #[arg(long)]
    radius: Option<f64>,

    /// Acceptance radius for the single candidate, in metres
    #[arg(long, conflicts_with = "no_accept_radius")]
    accept_radius: Option<f64>,

    /// Accept any unique candidate within the search radius
    #[arg(long)]
    no_accept_radius: bool,

    /// Keep postcodes inside the authoritative full address
    #[arg(long)]
    keep_postcode: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = Config::load_or_default(args.config.as_deref())?.matching;
    if let Some(reference) = args.reference {
        config.reference = Some(reference);
    }
    if let Some(candidates) = args.candidates {
        config.candidates = candidates;
    }
    if let Some(output) = args.output {
        config.output = output;
    }
    if let Some(radius) = args.radius {
        config.radius_m = radius;
    }
    if let Some(accept) = args.accept_radius {
        config.accept_radius_m = Some(accept);
    }
    if args.no_accept_radius {
        config.accept_radius_m = None;
    }
    if args.keep_postcode {
        config.strip_postcode = false;
    }
    config.validate()?;

    let reference_path = config
        .reference
        .clone()
        .context("No reference table given (use --reference or [match].reference)")?;

    info!("Proximity matching");
    info!("Reference: {}", reference_path.display());
    info!("Candidates: {}", config.candidates.display());
    match config.accept_radius_m {
        Some(accept) => info!(
            "Radius: {} m, acceptance radius: {} m",
            config.radius_m, accept
        ),
        None => info!("Radius: {} m, no acceptance radius", config.radius_m),
    }

    // Both inputs are loaded before anything is written
    let (reference, _skipped) = read_reference(
        &reference_path,
        &config.reference_columns,
        config.strip_postcode,
    )
    .with_context(|| format!("Failed to read {}", reference_path.display()))?;

    let candidates = read_addresses(&config.candidates)
        .with_context(|| format!("Failed to read {}", config.candidates.display()))?;

    let params = MatchParams {
        radius_m: config.radius_m,
        accept_radius_m: config.accept_radius_m,
    };
    let (pairs, _stats) = match_records(&reference, &candidates, params);

    let written = write_parquet(&config.output, &pairs)
        .with_context(|| format!("Failed to write {}", config.output.display()))?;

    info!("Matched table complete: {} rows", written);

    Ok(())
}
