#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the Milwaukee crime ETL.
//!
//! Chains the excluded collaborators (CKAN fetch, `GeoJSON` boundary
//! reading, CSV output) around the transform core. The core itself has no
//! network, file, or CLI surface.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use mke_crime_load::CsvSink;
use mke_crime_source::boundaries::{DEFAULT_NAME_PROPERTY, load_geojson_file};
use mke_crime_source::ckan::{CkanConfig, fetch_ckan};
use mke_crime_transform::pipeline::{self, PartitionPrecedence, PipelineConfig};

/// Reference system the upstream incident coordinates are expressed in.
const DEFAULT_CRS: &str = "EPSG:32054";

const CURRENT_RAW_FILE: &str = "crime_raw_current.json";
const HISTORICAL_RAW_FILE: &str = "crime_raw_historical.json";

#[derive(Parser)]
#[command(name = "mke_crime", about = "Milwaukee crime ETL pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the current and historical incident partitions to raw
    /// JSON files
    Fetch {
        /// Directory for the raw partition files
        #[arg(long, default_value = "data/raw/api")]
        raw_dir: PathBuf,
        /// Maximum number of records to fetch per partition (for testing)
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Run the transform pipeline over previously fetched raw files and
    /// write the summary CSVs
    Transform {
        #[command(flatten)]
        transform: TransformArgs,
    },
    /// Fetch both partitions and transform them in one run
    Run {
        /// Maximum number of records to fetch per partition (for testing)
        #[arg(long)]
        limit: Option<u64>,
        #[command(flatten)]
        transform: TransformArgs,
    },
}

#[derive(clap::Args)]
struct TransformArgs {
    /// Path to the neighborhood boundary GeoJSON file
    #[arg(long)]
    boundaries: PathBuf,
    /// Directory for the raw partition files
    #[arg(long, default_value = "data/raw/api")]
    raw_dir: PathBuf,
    /// Directory for the output CSV tables
    #[arg(long, default_value = "data/processed")]
    out_dir: PathBuf,
    /// Coordinate reference system tag of the incident coordinates
    #[arg(long, default_value = DEFAULT_CRS)]
    crs: String,
    /// Boundary feature property holding the neighborhood name
    #[arg(long, default_value = DEFAULT_NAME_PROPERTY)]
    name_property: String,
    /// Concatenate the current partition before the historical one
    #[arg(long)]
    current_first: bool,
    /// Skip writing the full joined table (`crimes_joined.csv`)
    #[arg(long)]
    no_joined: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch { raw_dir, limit } => {
            fetch_partitions(&raw_dir, limit).await?;
        }
        Commands::Transform { transform } => {
            run_transform(&transform)?;
        }
        Commands::Run { limit, transform } => {
            fetch_partitions(&transform.raw_dir, limit).await?;
            run_transform(&transform)?;
        }
    }

    Ok(())
}

/// Downloads both partitions and saves them as raw JSON files.
async fn fetch_partitions(
    raw_dir: &Path,
    limit: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(raw_dir)?;

    let current = fetch_ckan(&CkanConfig::current(limit)).await?;
    std::fs::write(
        raw_dir.join(CURRENT_RAW_FILE),
        serde_json::to_string(&current)?,
    )?;

    let historical = fetch_ckan(&CkanConfig::historical(limit)).await?;
    std::fs::write(
        raw_dir.join(HISTORICAL_RAW_FILE),
        serde_json::to_string(&historical)?,
    )?;

    Ok(())
}

/// Runs the transform core over the saved raw files and writes the output
/// tables.
fn run_transform(args: &TransformArgs) -> Result<(), Box<dyn std::error::Error>> {
    let current = read_partition(&args.raw_dir.join(CURRENT_RAW_FILE))?;
    let historical = read_partition(&args.raw_dir.join(HISTORICAL_RAW_FILE))?;
    let boundaries = load_geojson_file(&args.boundaries, &args.name_property, &args.crs)?;

    let config = PipelineConfig {
        crs: args.crs.clone(),
        precedence: if args.current_first {
            PartitionPrecedence::CurrentFirst
        } else {
            PartitionPrecedence::HistoricalFirst
        },
    };
    let output = pipeline::run(current, historical, &boundaries, &config)?;

    let sink = CsvSink::create(&args.out_dir)?;
    sink.write_summaries(&output.summaries)?;
    if !args.no_joined {
        sink.write_joined(&output.joined)?;
    }

    println!(
        "Transformed {} records into {}",
        output.joined.len(),
        sink.dir().display()
    );
    println!(
        "Dropped {} malformed; {} without coordinates, {} without parseable timestamps, {} unassigned",
        output.stats.malformed_records,
        output.stats.missing_coordinates,
        output.stats.unparseable_timestamps,
        output.stats.unassigned
    );

    Ok(())
}

/// Reads a raw partition file. A missing historical file is treated as an
/// empty partition so single-source runs work without a placeholder file.
fn read_partition(path: &Path) -> Result<Vec<serde_json::Value>, Box<dyn std::error::Error>> {
    if !path.exists() {
        log::warn!(
            "Partition file {} not found; using an empty partition",
            path.display()
        );
        return Ok(Vec::new());
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}
