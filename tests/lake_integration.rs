//! Integration tests for the full ingest → transform → summarize workflow.

use medallion::{
    Column, ColumnValues, Format, IngestRequest, LakeManager, MedallionError, Table,
};
use tempfile::TempDir;

fn manager(dir: &TempDir) -> LakeManager {
    LakeManager::new(dir.path().join("lake"), dir.path().join("catalog.db")).unwrap()
}

fn three_row_table() -> Table {
    Table::new(vec![
        Column::new("id", ColumnValues::Int(vec![1, 2, 3])),
        Column::new(
            "name",
            ColumnValues::Str(vec!["a".into(), "b".into(), "c".into()]),
        ),
    ])
    .unwrap()
}

#[test]
fn test_ingest_then_transform_end_to_end() {
    let dir = TempDir::new().unwrap();
    let lake = manager(&dir);

    let source_id = lake
        .ingest(
            &three_row_table(),
            &IngestRequest::new("t1", "data_team")
                .with_description("test table")
                .with_tags(vec!["test".into()]),
        )
        .unwrap();

    let source = lake.catalog().get_asset(&source_id).unwrap().unwrap();
    assert_eq!(source.name, "t1");
    assert_eq!(source.schema.get("id").map(String::as_str), Some("int"));
    assert_eq!(source.schema.get("name").map(String::as_str), Some("string"));
    assert!(source.size_bytes > 0);
    assert!(!source.checksum.is_empty());
    assert_eq!(source.format, "parquet");
    assert!(source.path.contains("raw"));

    // Identity transform into silver.
    let target_id = lake
        .transform(&source_id, "identity", Ok, "t1_copy", "silver")
        .unwrap();

    let target = lake.catalog().get_asset(&target_id).unwrap().unwrap();
    assert_eq!(target.name, "t1_copy");
    assert_eq!(target.owner, "data_team");
    assert_eq!(target.description, "Transformed from t1");
    assert!(target.tags.contains(&"transformed".to_string()));
    assert!(target.path.contains("silver"));

    // The copied data survives the round trip.
    let copied = lake
        .store()
        .load(std::path::Path::new(&target.path))
        .unwrap();
    assert_eq!(copied, three_row_table());

    // Exactly one edge, source → target.
    let edges = lake.catalog().lineage_of(&source_id).unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].source_asset_id, source_id);
    assert_eq!(edges[0].target_asset_id, target_id);
    assert_eq!(edges[0].transformation, "identity");
}

#[test]
fn test_transform_missing_source() {
    let dir = TempDir::new().unwrap();
    let lake = manager(&dir);

    let result = lake.transform("no-such-asset", "noop", Ok, "out", "silver");
    assert!(matches!(result, Err(MedallionError::AssetNotFound(_))));

    // Nothing was created.
    assert!(lake.catalog().search_assets("", &[]).unwrap().is_empty());
    assert!(lake.catalog().lineage_of("no-such-asset").unwrap().is_empty());
    assert!(lake.store().list_datasets("silver").is_empty());
}

#[test]
fn test_transform_into_invalid_zone_adds_no_edge() {
    let dir = TempDir::new().unwrap();
    let lake = manager(&dir);

    let source_id = lake
        .ingest(&three_row_table(), &IngestRequest::new("t1", "data_team"))
        .unwrap();

    let result = lake.transform(&source_id, "noop", Ok, "out", "platinum");
    assert!(matches!(result, Err(MedallionError::InvalidZone(_))));
    assert!(lake.catalog().lineage_of(&source_id).unwrap().is_empty());
}

#[test]
fn test_empty_transform_label_gets_generic_name() {
    let dir = TempDir::new().unwrap();
    let lake = manager(&dir);

    let source_id = lake
        .ingest(&three_row_table(), &IngestRequest::new("t1", "data_team"))
        .unwrap();
    lake.transform(&source_id, "", Ok, "t1_copy", "silver").unwrap();

    let edges = lake.catalog().lineage_of(&source_id).unwrap();
    assert_eq!(edges[0].transformation, "custom_transform");
}

#[test]
fn test_search_returns_each_asset_once() {
    let dir = TempDir::new().unwrap();
    let lake = manager(&dir);

    let first = lake
        .ingest(&three_row_table(), &IngestRequest::new("alpha", "a"))
        .unwrap();
    let second = lake
        .ingest(&three_row_table(), &IngestRequest::new("beta", "b"))
        .unwrap();

    let all = lake.catalog().search_assets("", &[]).unwrap();
    let mut ids: Vec<&str> = all.iter().map(|a| a.asset_id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(all.len(), 2);
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first.as_str()));
    assert!(ids.contains(&second.as_str()));
}

#[test]
fn test_zone_summary_counts() {
    let dir = TempDir::new().unwrap();
    let lake = manager(&dir);

    lake.ingest(
        &three_row_table(),
        &IngestRequest::new("t1", "data_team").with_format(Format::Csv),
    )
    .unwrap();

    let summary = lake.zone_summary().unwrap();
    assert_eq!(summary.len(), 4);

    let raw = &summary["raw"];
    assert_eq!(raw.dataset_count, 1);
    assert!(raw.asset_count >= 1);

    for zone in ["bronze", "silver", "gold"] {
        assert_eq!(summary[zone].asset_count, 0, "zone {zone} should be empty");
        assert_eq!(summary[zone].dataset_count, 0);
    }
}

#[test]
fn test_reingest_same_name_creates_new_asset() {
    let dir = TempDir::new().unwrap();
    let lake = manager(&dir);
    let request = IngestRequest::new("events", "data_team");

    let first = lake.ingest(&three_row_table(), &request).unwrap();
    let second = lake.ingest(&three_row_table(), &request).unwrap();

    // Fresh ids per ingestion; both records coexist under the same name.
    assert_ne!(first, second);
    assert_eq!(lake.catalog().search_assets("events", &[]).unwrap().len(), 2);
    // One dataset directory holds both files.
    assert_eq!(lake.store().list_datasets("raw"), vec!["events"]);
}

#[test]
fn test_ingest_all_formats_round_trip() {
    let dir = TempDir::new().unwrap();
    let lake = manager(&dir);
    let table = three_row_table();

    for format in [Format::Parquet, Format::Csv, Format::Jsonl] {
        let id = lake
            .ingest(
                &table,
                &IngestRequest::new("multi", "data_team").with_format(format),
            )
            .unwrap();
        let asset = lake.catalog().get_asset(&id).unwrap().unwrap();
        assert_eq!(asset.format, format.extension());

        let loaded = lake.store().load(std::path::Path::new(&asset.path)).unwrap();
        assert_eq!(loaded, table);
    }
}

#[test]
fn test_failed_registration_leaves_file_on_disk() {
    let dir = TempDir::new().unwrap();
    let lake = manager(&dir);

    // Break the catalog after construction: replace the database file with a
    // directory so every subsequent connection fails.
    let db_path = dir.path().join("catalog.db");
    std::fs::remove_file(&db_path).unwrap();
    std::fs::create_dir(&db_path).unwrap();

    let err = lake
        .ingest(&three_row_table(), &IngestRequest::new("t1", "data_team"))
        .unwrap_err();
    assert!(matches!(err, MedallionError::PersistenceFailure(_)));

    // The zone write is not rolled back; the orphan file stays in raw.
    let dataset_dir = dir.path().join("lake").join("raw").join("t1");
    let files: Vec<_> = std::fs::read_dir(&dataset_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(files.len(), 1);
}
