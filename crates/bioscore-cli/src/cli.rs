use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// bioscore - Biodiversity scores for geographic projects
#[derive(Parser, Debug)]
#[command(name = "bioscore")]
#[command(about = "Biodiversity scores from Earth Engine indices", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./bioscore.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Warehouse backend to use (postgres or memory)
    #[arg(long, global = true, default_value = "postgres")]
    pub storage: StorageBackend,

    #[command(subcommand)]
    pub command: Commands,
}

/// Warehouse backend selection
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum StorageBackend {
    /// PostgreSQL warehouse from DATABASE_URL
    Postgres,
    /// In-memory warehouse; scores are discarded on exit
    Memory,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute (or fetch) a project's yearly biodiversity scores
    Score(ScoreArgs),

    /// Render a project's stored boundary as a map figure
    Map(MapArgs),

    /// List the indices of the catalog
    Catalog(CatalogArgs),
}

#[derive(Parser, Debug)]
pub struct ScoreArgs {
    /// Project name
    pub project: String,

    /// Centroid latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Centroid longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// First year to score
    #[arg(long)]
    pub start_year: i32,

    /// Year after the last one to score
    #[arg(long)]
    pub end_year: i32,

    /// Index catalog (TOML or YAML)
    #[arg(long, value_name = "PATH")]
    pub indices: Option<PathBuf>,

    /// Radius of the region of interest in meters
    #[arg(long)]
    pub radius: Option<f64>,

    /// Pixel scale of the zonal mean in meters
    #[arg(long)]
    pub scale: Option<f64>,

    /// Zonal means in flight at once
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Cloud project billed for Earth Engine computations
    #[arg(long, value_name = "PROJECT")]
    pub ee_project: Option<String>,
}

#[derive(Parser, Debug)]
pub struct MapArgs {
    /// Project name
    pub project: String,

    /// Write the figure JSON to this file instead of stdout
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct CatalogArgs {
    /// Index catalog (TOML or YAML)
    #[arg(long, value_name = "PATH")]
    pub indices: Option<PathBuf>,

    /// Also show the effective configuration and where each value came from
    #[arg(long)]
    pub show_config: bool,
}
