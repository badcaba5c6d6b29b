//! Medallion CLI - Main entry point.

use medallion::cli::{Cli, Commands};
use medallion::codec::Format;
use medallion::config::MedallionConfig;
use medallion::manager::{IngestRequest, LakeManager};
use medallion::observability;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let mut config = match &cli.config {
        Some(path) => MedallionConfig::from_file(path)?,
        None => MedallionConfig::development(),
    };
    config.observability.log_level = cli.log_level.clone();
    if let Some(base_path) = &cli.base_path {
        config.storage.base_path = base_path.clone();
    }
    if let Some(catalog) = &cli.catalog {
        config.catalog.db_path = catalog.clone();
    }

    observability::init(&config.observability)?;

    match cli.command {
        Commands::Serve { bind } => {
            config.server.bind_addr = bind.parse()?;
            let manager = LakeManager::from_config(&config)?;
            medallion::server::run_server(&config, manager).await?;
        }

        Commands::Ingest {
            file,
            name,
            owner,
            description,
            tags,
            zone,
            format,
        } => {
            let manager = LakeManager::from_config(&config)?;
            let table = manager.store().load(&file)?;

            let request = IngestRequest::new(name, owner)
                .with_description(description)
                .with_tags(tags)
                .with_zone(zone)
                .with_format(Format::parse(&format)?);

            let asset_id = manager.ingest(&table, &request)?;
            println!("{asset_id}");
        }

        Commands::Search { query, tags } => {
            let manager = LakeManager::from_config(&config)?;
            let assets = manager.catalog().search_assets(&query, &tags)?;
            println!("{}", serde_json::to_string_pretty(&assets)?);
        }

        Commands::Lineage { asset_id } => {
            let manager = LakeManager::from_config(&config)?;
            let edges = manager.catalog().lineage_of(&asset_id)?;
            println!("{}", serde_json::to_string_pretty(&edges)?);
        }

        Commands::Summary => {
            let manager = LakeManager::from_config(&config)?;
            let summary = manager.zone_summary()?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
