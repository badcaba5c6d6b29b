//! Zone store: physical placement of encoded datasets.
//!
//! The lake keeps four fixed maturity zones (raw, bronze, silver, gold) as
//! directories under a base path. Each dataset gets its own subdirectory per
//! zone; each store produces a new timestamped file inside it:
//!
//! ```text
//! <base>/<zone>/<dataset>/<dataset>_<YYYYmmdd_HHMMSS>.<format>
//! ```
//!
//! Two stores of the same dataset within the same second land on the same
//! filename and the later write wins. That window is accepted; there is no
//! collision detection.

use crate::codec::{self, Format};
use crate::error::{MedallionError, Result};
use crate::table::Table;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The fixed zone names, in maturity order.
pub const ZONES: [&str; 4] = ["raw", "bronze", "silver", "gold"];

/// Read size for streaming checksums.
const CHECKSUM_CHUNK_SIZE: usize = 8192;

/// Physical file metadata captured at registration time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    /// File size in bytes.
    pub size_bytes: u64,
    /// Filesystem creation time.
    pub created_at: DateTime<Utc>,
    /// Filesystem modification time.
    pub modified_at: DateTime<Utc>,
    /// Hex SHA-256 of the file contents.
    pub checksum: String,
}

/// Filesystem-backed store for the four lake zones.
#[derive(Debug, Clone)]
pub struct ZoneStore {
    base_path: PathBuf,
}

impl ZoneStore {
    /// Creates a zone store rooted at `base_path`, ensuring every zone
    /// directory exists. Idempotent.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        for zone in ZONES {
            fs::create_dir_all(base_path.join(zone))?;
        }
        Ok(Self { base_path })
    }

    /// The base directory of the lake.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn zone_path(&self, zone: &str) -> Result<PathBuf> {
        if !ZONES.contains(&zone) {
            return Err(MedallionError::InvalidZone(zone.to_string()));
        }
        Ok(self.base_path.join(zone))
    }

    /// Encodes and writes a table into a zone, returning the path written.
    ///
    /// Fails with [`MedallionError::InvalidZone`] before touching the
    /// filesystem when the zone is unrecognized.
    pub fn store(
        &self,
        table: &Table,
        zone: &str,
        dataset_name: &str,
        format: Format,
    ) -> Result<PathBuf> {
        let zone_path = self.zone_path(zone)?;

        if dataset_name.is_empty() || dataset_name.contains(['/', '\\']) {
            return Err(MedallionError::InvalidData(format!(
                "invalid dataset name '{dataset_name}'"
            )));
        }

        let dataset_path = zone_path.join(dataset_name);
        fs::create_dir_all(&dataset_path)?;

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let filename = format!("{dataset_name}_{timestamp}.{}", format.extension());
        let file_path = dataset_path.join(filename);

        let bytes = codec::encode(table, format)?;
        fs::write(&file_path, &bytes)?;

        debug!(
            zone,
            dataset = dataset_name,
            path = %file_path.display(),
            size = bytes.len(),
            "Stored dataset"
        );

        Ok(file_path)
    }

    /// Loads a dataset, dispatching the codec by file extension.
    pub fn load(&self, path: &Path) -> Result<Table> {
        let format = Format::from_extension(path)?;
        let bytes = fs::read(path)?;
        codec::decode(&bytes, format)
    }

    /// Lists dataset names in a zone, sorted.
    ///
    /// Unrecognized zones yield an empty list rather than an error; zone
    /// summaries want missing zones to read as empty.
    pub fn list_datasets(&self, zone: &str) -> Vec<String> {
        let Ok(zone_path) = self.zone_path(zone) else {
            return Vec::new();
        };
        let Ok(entries) = fs::read_dir(&zone_path) else {
            return Vec::new();
        };

        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    }

    /// Stats a stored file and computes its content checksum.
    ///
    /// Returns `Ok(None)` when the path does not exist.
    pub fn file_info(&self, path: &Path) -> Result<Option<FileInfo>> {
        if !path.exists() {
            return Ok(None);
        }

        let meta = fs::metadata(path)?;
        let modified_at: DateTime<Utc> = meta.modified()?.into();
        let created_at: DateTime<Utc> = meta
            .created()
            .map(Into::into)
            .unwrap_or(modified_at);

        Ok(Some(FileInfo {
            size_bytes: meta.len(),
            created_at,
            modified_at,
            checksum: checksum(path)?,
        }))
    }
}

/// Streams a file through SHA-256 in fixed-size chunks.
fn checksum(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; CHECKSUM_CHUNK_SIZE];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let digest = hasher.finalize();
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}
