//! Command-line interface for Medallion.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Medallion - zoned data lake with a metadata catalog and lineage tracking.
#[derive(Parser)]
#[command(name = "medallion")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "MEDALLION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "MEDALLION_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Lake base directory (overrides configuration)
    #[arg(long, env = "MEDALLION_BASE_PATH")]
    pub base_path: Option<PathBuf>,

    /// Catalog database path (overrides configuration)
    #[arg(long, env = "MEDALLION_CATALOG")]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Start the dashboard server
    Serve {
        /// Bind address for the JSON API
        #[arg(long, default_value = "0.0.0.0:5000")]
        bind: String,
    },

    /// Ingest a dataset file into a zone
    Ingest {
        /// Input file (.parquet, .csv, or .jsonl)
        file: PathBuf,

        /// Dataset name
        #[arg(short, long)]
        name: String,

        /// Recorded owner
        #[arg(short, long, default_value = "unknown")]
        owner: String,

        /// Description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Tags (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Target zone
        #[arg(short, long, default_value = "raw")]
        zone: String,

        /// Storage format
        #[arg(short, long, default_value = "parquet")]
        format: String,
    },

    /// Search cataloged assets
    Search {
        /// Substring query against name and description
        #[arg(default_value = "")]
        query: String,

        /// Tags (comma-separated, conjunctive)
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Show lineage edges for an asset
    Lineage {
        /// Asset id
        asset_id: String,
    },

    /// Print the per-zone summary
    Summary,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
