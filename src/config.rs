//! Configuration module for Medallion.

use crate::error::{MedallionError, Result};
use crate::manager::AssetIdScheme;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Main configuration for a Medallion instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedallionConfig {
    /// Zone storage configuration.
    pub storage: StorageConfig,
    /// Metadata catalog configuration.
    pub catalog: CatalogConfig,
    /// Dashboard server configuration.
    pub server: ServerConfig,
    /// Observability configuration.
    pub observability: ObservabilityConfig,
}

impl MedallionConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MedallionError::Config(format!("Failed to read config file: {e}")))?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| MedallionError::Config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.storage.base_path.as_os_str().is_empty() {
            return Err(MedallionError::InvalidConfig {
                field: "storage.base_path".to_string(),
                reason: "base path must not be empty".to_string(),
            });
        }
        if self.catalog.db_path.as_os_str().is_empty() {
            return Err(MedallionError::InvalidConfig {
                field: "catalog.db_path".to_string(),
                reason: "catalog path must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Create a minimal development configuration.
    pub fn development() -> Self {
        Self {
            storage: StorageConfig {
                base_path: PathBuf::from("data_lake"),
            },
            catalog: CatalogConfig {
                db_path: PathBuf::from("metadata_catalog.db"),
                strict_lineage: false,
                id_scheme: AssetIdScheme::default(),
            },
            server: ServerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Zone storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory holding the four zone directories.
    pub base_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("data_lake"),
        }
    }
}

/// Metadata catalog configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to the SQLite catalog database.
    pub db_path: PathBuf,
    /// Validate lineage endpoints on insertion. Off by default; the catalog
    /// historically accepts dangling edges.
    #[serde(default)]
    pub strict_lineage: bool,
    /// Asset identifier scheme.
    #[serde(default)]
    pub id_scheme: AssetIdScheme,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("metadata_catalog.db"),
            strict_lineage: false,
            id_scheme: AssetIdScheme::default(),
        }
    }
}

/// Dashboard server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind the dashboard JSON API.
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".parse().expect("valid socket address"),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit JSON-structured logs.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
