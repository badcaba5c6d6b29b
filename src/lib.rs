//! Medallion - a zoned data lake with a metadata catalog and lineage tracking.
//!
//! Datasets live in four maturity zones (raw, bronze, silver, gold) as
//! encoded files on disk; every stored version is registered in a SQLite
//! catalog with a durable identity, a captured schema, ownership, and a
//! content checksum; transformations between assets are recorded as an
//! append-only lineage edge list.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                       Medallion                        │
//! ├────────────────────────────────────────────────────────┤
//! │  Access Layer: CLI | Dashboard JSON API                │
//! ├────────────────────────────────────────────────────────┤
//! │  Lake Manager: Ingestion | Transformation | Summaries  │
//! ├───────────────────────────┬────────────────────────────┤
//! │  Zone Store               │  Metadata Catalog          │
//! │  raw/bronze/silver/gold   │  Assets | Lineage | Search │
//! └───────────────────────────┴────────────────────────────┘
//! ```
//!
//! The zone store and catalog never call each other; the manager is the only
//! integration point.
//!
//! # Quick Start
//!
//! ```no_run
//! use medallion::config::MedallionConfig;
//!
//! #[tokio::main]
//! async fn main() -> medallion::Result<()> {
//!     let config = MedallionConfig::development();
//!     medallion::run(config).await
//! }
//! ```

pub mod catalog;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod manager;
pub mod observability;
pub mod sample;
pub mod server;
pub mod store;
pub mod table;

// Re-exports
pub use catalog::{DataAsset, LineageEdge, MetadataCatalog};
pub use codec::Format;
pub use config::MedallionConfig;
pub use error::{MedallionError, Result};
pub use manager::{AssetIdScheme, IngestRequest, LakeManager, ZoneSummary};
pub use store::{FileInfo, ZoneStore, ZONES};
pub use table::{Column, ColumnValues, Table};

use tracing::info;

/// Run the dashboard server with the given configuration.
pub async fn run(config: MedallionConfig) -> Result<()> {
    config.validate()?;

    let manager = LakeManager::from_config(&config)?;
    info!(
        base_path = %config.storage.base_path.display(),
        catalog = %config.catalog.db_path.display(),
        "Starting Medallion"
    );

    server::run_server(&config, manager).await
}
