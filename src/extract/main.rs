//! Address extraction.
//!
//! Reads an NDJSON GeoJSON export of OSM features, keeps the ones that
//! look like postal addresses and writes them as a Parquet address table.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use osm_addr_bench::address::dedupe;
use osm_addr_bench::columnar::write_parquet;
use osm_addr_bench::config::Config;
use osm_addr_bench::features::{extract_addresses, FilterPolicy};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "extract")]
#[command(about = "Extract postal addresses from an OSM GeoJSON feature dump")]
struct Args {
    /// TOML config file; command line flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// NDJSON feature file (one GeoJSON Feature per line, may be .gz)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output Parquet file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Which features count as addresses
    #[arg(long, value_enum)]
    policy: Option<FilterPolicy>,

    /// Drop rows that repeat every structured field of an earlier row
    #[arg(long)]
    dedupe: bool,
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

    let mut config = Config::load_or_default(args.config.as_deref())?.extract;
    if let Some(input) = args.input {
        config.input = Some(input);
    }
    if let Some(output) = args.output {
        config.output = output;
    }
    if let Some(policy) = args.policy {
        config.policy = policy;
    }
    config.dedupe |= args.dedupe;

    let input = config
        .input
        .context("No input file given (use --input or [extract].input)")?;

    info!("Address extraction");
    info!("Input: {}", input.display());
    info!("Output: {}", config.output.display());

    let (mut records, _stats) = extract_addresses(&input, config.policy)
        .with_context(|| format!("Failed to extract addresses from {}", input.display()))?;

    if config.dedupe {
        records = dedupe(records);
    }

    let written = write_parquet(&config.output, &records)
        .with_context(|| format!("Failed to write {}", config.output.display()))?;

    info!("Address table complete: {} rows", written);

    Ok(())
}
