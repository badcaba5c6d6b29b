//! Error types for the Medallion data lake.
//!
//! This module provides a unified error type [`MedallionError`] for all lake
//! operations, along with a convenient [`Result`] type alias.
//!
//! # Error Categories
//!
//! - **Zone/Format**: Rejected zone names and unrecognized dataset encodings
//! - **Catalog**: Asset lookups and metadata persistence
//! - **Data**: Malformed tabular values (ragged columns, duplicate names)
//! - **Configuration**: Invalid settings or missing configuration
//!
//! # Example
//!
//! ```rust
//! use medallion::error::{MedallionError, Result};
//!
//! fn require_zone(zone: &str) -> Result<()> {
//!     if zone.is_empty() {
//!         return Err(MedallionError::InvalidZone(zone.to_string()));
//!     }
//!     Ok(())
//! }
//! ```

use std::io;
use thiserror::Error;

/// Main error type for Medallion operations.
#[derive(Error, Debug)]
pub enum MedallionError {
    // Zone store errors
    #[error("Invalid zone: {0}")]
    InvalidZone(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    // Catalog errors
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Catalog persistence failed: {0}")]
    PersistenceFailure(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    // Tabular data errors
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Codec error: {0}")]
    Codec(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // External errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MedallionError {
    /// Check whether the error is a caller mistake rather than a lake fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            MedallionError::InvalidZone(_)
                | MedallionError::UnsupportedFormat(_)
                | MedallionError::AssetNotFound(_)
                | MedallionError::InvalidData(_)
        )
    }
}

impl From<rusqlite::Error> for MedallionError {
    fn from(e: rusqlite::Error) -> Self {
        MedallionError::Catalog(e.to_string())
    }
}

impl From<serde_json::Error> for MedallionError {
    fn from(e: serde_json::Error) -> Self {
        MedallionError::Serialization(e.to_string())
    }
}

impl From<csv::Error> for MedallionError {
    fn from(e: csv::Error) -> Self {
        MedallionError::Codec(e.to_string())
    }
}

/// Result type alias for Medallion operations.
pub type Result<T> = std::result::Result<T, MedallionError>;
