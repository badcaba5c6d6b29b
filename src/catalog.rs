//! Metadata catalog: durable asset records and lineage edges.
//!
//! The catalog is a SQLite database with two tables. `data_assets` holds one
//! row per asset id (insert-or-replace, so re-registering an id overwrites
//! that record in place); `lineage` is an append-only edge list with an
//! auto-increment ordinal. `schema` and `tags` are persisted as JSON text and
//! round-trip losslessly.
//!
//! Every operation opens its own connection and drops it before returning.
//! Nothing is held across calls, so a catalog handle is freely shareable
//! across threads.

use crate::error::{MedallionError, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// One cataloged version of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataAsset {
    /// Opaque unique identifier, assigned at ingestion, never reused.
    pub asset_id: String,
    /// Human dataset name. Not unique.
    pub name: String,
    /// Locator of the physical artifact.
    pub path: String,
    /// Lowercase encoding tag derived from the stored file's extension.
    pub format: String,
    /// File size at registration time.
    pub size_bytes: u64,
    /// File creation time at registration.
    pub created_at: DateTime<Utc>,
    /// File modification time at registration.
    pub updated_at: DateTime<Utc>,
    /// Column name → type tag, captured from the in-memory table.
    pub schema: BTreeMap<String, String>,
    /// Free-form labels. Order preserved, duplicates permitted.
    pub tags: Vec<String>,
    /// Recorded owner. Not validated or enforced.
    pub owner: String,
    /// Free-form description.
    pub description: String,
    /// Content hash of the physical file at registration time.
    pub checksum: String,
}

/// A directed lineage edge: `source` was transformed into `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineageEdge {
    /// Catalog-wide auto-increment ordinal.
    pub id: i64,
    /// Source asset id.
    pub source_asset_id: String,
    /// Target asset id.
    pub target_asset_id: String,
    /// Transformation label.
    pub transformation: String,
    /// Edge creation time.
    pub created_at: DateTime<Utc>,
}

/// SQLite-backed metadata catalog.
#[derive(Debug, Clone)]
pub struct MetadataCatalog {
    db_path: PathBuf,
    strict_lineage: bool,
}

const ASSET_COLUMNS: &str = "asset_id, name, path, format, size_bytes, created_at, updated_at, \
                             schema, tags, owner, description, checksum";

impl MetadataCatalog {
    /// Opens (or creates) the catalog at `db_path` and runs idempotent
    /// schema initialization.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let catalog = Self {
            db_path: db_path.as_ref().to_path_buf(),
            strict_lineage: false,
        };
        catalog.init_schema()?;
        Ok(catalog)
    }

    /// Enables endpoint validation on lineage insertion. Off by default:
    /// the catalog historically accepts dangling edges, and callers treat
    /// the declared foreign keys as advisory.
    pub fn with_strict_lineage(mut self, strict: bool) -> Self {
        self.strict_lineage = strict;
        self
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        // The lineage foreign keys are advisory; dangling edges are allowed
        // unless strict mode checks them explicitly.
        conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
        Ok(conn)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS data_assets (
                asset_id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                path TEXT NOT NULL,
                format TEXT NOT NULL,
                size_bytes INTEGER,
                created_at TEXT,
                updated_at TEXT,
                schema TEXT,
                tags TEXT,
                owner TEXT,
                description TEXT,
                checksum TEXT
            );
            CREATE TABLE IF NOT EXISTS lineage (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                source_asset_id TEXT,
                target_asset_id TEXT,
                transformation TEXT,
                created_at TEXT,
                FOREIGN KEY (source_asset_id) REFERENCES data_assets (asset_id),
                FOREIGN KEY (target_asset_id) REFERENCES data_assets (asset_id)
            );",
        )?;
        Ok(())
    }

    /// Upserts an asset record by `asset_id`.
    ///
    /// Persistence failures are logged and reported as `false` rather than
    /// propagated; the caller decides whether a failed registration is fatal
    /// to the surrounding workflow.
    pub fn register_asset(&self, asset: &DataAsset) -> bool {
        match self.try_register(asset) {
            Ok(()) => {
                debug!(asset_id = %asset.asset_id, name = %asset.name, "Registered asset");
                true
            }
            Err(e) => {
                error!(asset_id = %asset.asset_id, error = %e, "Failed to register asset");
                false
            }
        }
    }

    fn try_register(&self, asset: &DataAsset) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT OR REPLACE INTO data_assets VALUES \
             (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                asset.asset_id,
                asset.name,
                asset.path,
                asset.format,
                asset.size_bytes,
                asset.created_at.to_rfc3339(),
                asset.updated_at.to_rfc3339(),
                serde_json::to_string(&asset.schema)?,
                serde_json::to_string(&asset.tags)?,
                asset.owner,
                asset.description,
                asset.checksum,
            ],
        )?;
        Ok(())
    }

    /// Point lookup by asset id. A miss is `Ok(None)`, not an error.
    pub fn get_asset(&self, asset_id: &str) -> Result<Option<DataAsset>> {
        let conn = self.connect()?;
        let asset = conn
            .query_row(
                &format!("SELECT {ASSET_COLUMNS} FROM data_assets WHERE asset_id = ?1"),
                params![asset_id],
                row_to_asset,
            )
            .optional()?;
        Ok(asset)
    }

    /// Searches assets by substring query and tag filters.
    ///
    /// `query` matches against name OR description. Each requested tag must
    /// appear as a substring of the serialized tag JSON, so `"a"` matches an
    /// asset tagged `"abc"` (deliberately loose, kept from the catalog's
    /// original contract). Empty query and tags return every asset.
    pub fn search_assets(&self, query: &str, tags: &[String]) -> Result<Vec<DataAsset>> {
        let mut sql = format!("SELECT {ASSET_COLUMNS} FROM data_assets WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        if !query.is_empty() {
            sql.push_str(&format!(
                " AND (name LIKE ?{} OR description LIKE ?{})",
                params.len() + 1,
                params.len() + 2
            ));
            params.push(format!("%{query}%"));
            params.push(format!("%{query}%"));
        }
        for tag in tags {
            sql.push_str(&format!(" AND tags LIKE ?{}", params.len() + 1));
            params.push(format!("%{tag}%"));
        }
        sql.push_str(" ORDER BY name, asset_id");

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), row_to_asset)?;

        let mut assets = Vec::new();
        for row in rows {
            assets.push(row?);
        }
        Ok(assets)
    }

    /// Appends a lineage edge with the current timestamp.
    ///
    /// Without strict mode neither endpoint is validated to exist; a
    /// dangling edge is legal.
    pub fn add_lineage(
        &self,
        source_asset_id: &str,
        target_asset_id: &str,
        transformation: &str,
    ) -> Result<()> {
        if self.strict_lineage {
            for id in [source_asset_id, target_asset_id] {
                if self.get_asset(id)?.is_none() {
                    return Err(MedallionError::AssetNotFound(id.to_string()));
                }
            }
        }

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO lineage (source_asset_id, target_asset_id, transformation, created_at) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                source_asset_id,
                target_asset_id,
                transformation,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// All edges touching an asset, in insertion order.
    pub fn lineage_of(&self, asset_id: &str) -> Result<Vec<LineageEdge>> {
        self.query_lineage(
            "SELECT id, source_asset_id, target_asset_id, transformation, created_at \
             FROM lineage WHERE source_asset_id = ?1 OR target_asset_id = ?1 ORDER BY id",
            asset_id,
        )
    }

    /// Edges whose target is the asset: where its data came from.
    pub fn upstream(&self, asset_id: &str) -> Result<Vec<LineageEdge>> {
        self.query_lineage(
            "SELECT id, source_asset_id, target_asset_id, transformation, created_at \
             FROM lineage WHERE target_asset_id = ?1 ORDER BY id",
            asset_id,
        )
    }

    /// Edges whose source is the asset: what was derived from it.
    pub fn downstream(&self, asset_id: &str) -> Result<Vec<LineageEdge>> {
        self.query_lineage(
            "SELECT id, source_asset_id, target_asset_id, transformation, created_at \
             FROM lineage WHERE source_asset_id = ?1 ORDER BY id",
            asset_id,
        )
    }

    fn query_lineage(&self, sql: &str, asset_id: &str) -> Result<Vec<LineageEdge>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params![asset_id], row_to_edge)?;

        let mut edges = Vec::new();
        for row in rows {
            edges.push(row?);
        }
        Ok(edges)
    }
}

fn row_to_asset(row: &Row<'_>) -> rusqlite::Result<DataAsset> {
    let schema_json: String = row.get(7)?;
    let tags_json: String = row.get(8)?;
    Ok(DataAsset {
        asset_id: row.get(0)?,
        name: row.get(1)?,
        path: row.get(2)?,
        format: row.get(3)?,
        size_bytes: row.get(4)?,
        created_at: parse_timestamp(row.get::<_, String>(5)?, 5)?,
        updated_at: parse_timestamp(row.get::<_, String>(6)?, 6)?,
        schema: serde_json::from_str(&schema_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?,
        tags: serde_json::from_str(&tags_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?,
        owner: row.get(9)?,
        description: row.get(10)?,
        checksum: row.get(11)?,
    })
}

fn row_to_edge(row: &Row<'_>) -> rusqlite::Result<LineageEdge> {
    Ok(LineageEdge {
        id: row.get(0)?,
        source_asset_id: row.get(1)?,
        target_asset_id: row.get(2)?,
        transformation: row.get(3)?,
        created_at: parse_timestamp(row.get::<_, String>(4)?, 4)?,
    })
}

fn parse_timestamp(raw: String, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_asset(id: &str, name: &str) -> DataAsset {
        let now = Utc::now();
        DataAsset {
            asset_id: id.to_string(),
            name: name.to_string(),
            path: format!("/lake/raw/{name}/{name}_20240101_000000.parquet"),
            format: "parquet".to_string(),
            size_bytes: 1024,
            created_at: now,
            updated_at: now,
            schema: BTreeMap::from([
                ("id".to_string(), "int".to_string()),
                ("name".to_string(), "string".to_string()),
            ]),
            tags: vec!["raw".to_string(), "test".to_string()],
            owner: "data_team".to_string(),
            description: "test asset".to_string(),
            checksum: "abc123".to_string(),
        }
    }

    fn catalog(dir: &TempDir) -> MetadataCatalog {
        MetadataCatalog::new(dir.path().join("catalog.db")).unwrap()
    }

    #[test]
    fn test_register_get_round_trip() {
        let dir = TempDir::new().unwrap();
        let catalog = catalog(&dir);
        let asset = test_asset("a1", "events");

        assert!(catalog.register_asset(&asset));
        let fetched = catalog.get_asset("a1").unwrap().unwrap();
        assert_eq!(fetched.asset_id, asset.asset_id);
        assert_eq!(fetched.schema, asset.schema);
        assert_eq!(fetched.tags, asset.tags);
        assert_eq!(fetched.checksum, asset.checksum);
        // RFC 3339 keeps sub-second precision, so timestamps survive intact.
        assert_eq!(fetched.created_at, asset.created_at);
    }

    #[test]
    fn test_get_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let catalog = catalog(&dir);
        assert!(catalog.get_asset("nope").unwrap().is_none());
    }

    #[test]
    fn test_register_idempotent() {
        let dir = TempDir::new().unwrap();
        let catalog = catalog(&dir);
        let asset = test_asset("a1", "events");

        assert!(catalog.register_asset(&asset));
        assert!(catalog.register_asset(&asset));

        let all = catalog.search_assets("", &[]).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], catalog.get_asset("a1").unwrap().unwrap());
    }

    #[test]
    fn test_register_replaces_in_place() {
        let dir = TempDir::new().unwrap();
        let catalog = catalog(&dir);

        catalog.register_asset(&test_asset("a1", "events"));
        let mut updated = test_asset("a1", "events_v2");
        updated.description = "replaced".to_string();
        catalog.register_asset(&updated);

        let fetched = catalog.get_asset("a1").unwrap().unwrap();
        assert_eq!(fetched.name, "events_v2");
        assert_eq!(fetched.description, "replaced");
        assert_eq!(catalog.search_assets("", &[]).unwrap().len(), 1);
    }

    #[test]
    fn test_search_by_query_and_tags() {
        let dir = TempDir::new().unwrap();
        let catalog = catalog(&dir);

        let mut users = test_asset("a1", "users");
        users.description = "user master data".to_string();
        users.tags = vec!["pii".to_string(), "production".to_string()];
        catalog.register_asset(&users);

        let mut orders = test_asset("a2", "orders");
        orders.description = "order facts".to_string();
        orders.tags = vec!["production".to_string()];
        catalog.register_asset(&orders);

        // Query matches name or description.
        assert_eq!(catalog.search_assets("user", &[]).unwrap().len(), 1);
        assert_eq!(catalog.search_assets("facts", &[]).unwrap().len(), 1);
        assert_eq!(catalog.search_assets("nothing", &[]).unwrap().len(), 0);

        // Tags are conjunctive.
        let both = vec!["pii".to_string(), "production".to_string()];
        assert_eq!(catalog.search_assets("", &both).unwrap().len(), 1);

        // Tag matching is a substring over the serialized form: "prod"
        // matches assets tagged "production".
        let loose = vec!["prod".to_string()];
        assert_eq!(catalog.search_assets("", &loose).unwrap().len(), 2);

        // Empty query and tags return everything.
        assert_eq!(catalog.search_assets("", &[]).unwrap().len(), 2);
    }

    #[test]
    fn test_dangling_lineage_allowed_by_default() {
        let dir = TempDir::new().unwrap();
        let catalog = catalog(&dir);

        catalog.add_lineage("ghost-src", "ghost-dst", "phantom").unwrap();
        let edges = catalog.lineage_of("ghost-src").unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].transformation, "phantom");
    }

    #[test]
    fn test_strict_lineage_validates_endpoints() {
        let dir = TempDir::new().unwrap();
        let catalog = catalog(&dir).with_strict_lineage(true);

        let err = catalog.add_lineage("ghost-src", "ghost-dst", "phantom");
        assert!(matches!(err, Err(MedallionError::AssetNotFound(_))));
        assert!(catalog.lineage_of("ghost-src").unwrap().is_empty());

        catalog.register_asset(&test_asset("a1", "src"));
        catalog.register_asset(&test_asset("a2", "dst"));
        catalog.add_lineage("a1", "a2", "clean").unwrap();
        assert_eq!(catalog.downstream("a1").unwrap().len(), 1);
    }

    #[test]
    fn test_lineage_ordinals_increment() {
        let dir = TempDir::new().unwrap();
        let catalog = catalog(&dir);

        catalog.add_lineage("a", "b", "t1").unwrap();
        catalog.add_lineage("b", "c", "t2").unwrap();

        let first = catalog.downstream("a").unwrap();
        let second = catalog.downstream("b").unwrap();
        assert!(second[0].id > first[0].id);

        assert_eq!(catalog.upstream("b").unwrap().len(), 1);
        assert_eq!(catalog.lineage_of("b").unwrap().len(), 2);
    }
}
