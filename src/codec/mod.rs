//! Dataset encodings.
//!
//! The zone store does not interpret dataset bytes itself; it selects a codec
//! by [`Format`] on write and by file extension on read. Three encodings are
//! supported: Parquet (columnar), CSV (row-oriented), and JSONL
//! (line-delimited records).

mod csv;
mod jsonl;
mod parquet;

use crate::error::{MedallionError, Result};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A supported dataset encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Columnar Parquet files.
    Parquet,
    /// Row-oriented CSV with a header row.
    Csv,
    /// Newline-delimited JSON records.
    Jsonl,
}

impl Format {
    /// Parses a lowercase format tag.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "parquet" => Ok(Format::Parquet),
            "csv" => Ok(Format::Csv),
            "jsonl" => Ok(Format::Jsonl),
            other => Err(MedallionError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Sniffs the format from a path's extension.
    pub fn from_extension(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::parse(&ext.to_ascii_lowercase())
    }

    /// File extension used when storing datasets.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Parquet => "parquet",
            Format::Csv => "csv",
            Format::Jsonl => "jsonl",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Encodes a table into the given format.
pub fn encode(table: &Table, format: Format) -> Result<Vec<u8>> {
    match format {
        Format::Parquet => self::parquet::encode(table),
        Format::Csv => self::csv::encode(table),
        Format::Jsonl => self::jsonl::encode(table),
    }
}

/// Decodes bytes in the given format back into a table.
pub fn decode(bytes: &[u8], format: Format) -> Result<Table> {
    match format {
        Format::Parquet => self::parquet::decode(bytes),
        Format::Csv => self::csv::decode(bytes),
        Format::Jsonl => self::jsonl::decode(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, ColumnValues};

    fn sample_table() -> Table {
        Table::new(vec![
            Column::new("id", ColumnValues::Int(vec![1, 2, 3])),
            Column::new("score", ColumnValues::Float(vec![0.5, 10.0, -3.25])),
            Column::new("active", ColumnValues::Bool(vec![true, false, true])),
            Column::new(
                "name",
                ColumnValues::Str(vec!["ada".into(), "grace".into(), "edsger".into()]),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_parse_rejects_unknown_format() {
        assert!(matches!(
            Format::parse("xlsx"),
            Err(MedallionError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_extension_sniffing() {
        let format = Format::from_extension(Path::new("/lake/raw/t/t_20240101_000000.csv")).unwrap();
        assert_eq!(format, Format::Csv);

        assert!(Format::from_extension(Path::new("/lake/raw/t/file.xml")).is_err());
        assert!(Format::from_extension(Path::new("/lake/raw/t/noext")).is_err());
    }

    #[test]
    fn test_parquet_round_trip() {
        let table = sample_table();
        let bytes = encode(&table, Format::Parquet).unwrap();
        let decoded = decode(&bytes, Format::Parquet).unwrap();
        assert_eq!(decoded, table);
    }

    #[test]
    fn test_csv_round_trip() {
        let table = sample_table();
        let bytes = encode(&table, Format::Csv).unwrap();
        let decoded = decode(&bytes, Format::Csv).unwrap();
        assert_eq!(decoded, table);
    }

    #[test]
    fn test_jsonl_round_trip() {
        let table = sample_table();
        let bytes = encode(&table, Format::Jsonl).unwrap();
        let decoded = decode(&bytes, Format::Jsonl).unwrap();
        assert_eq!(decoded, table);
    }

    #[test]
    fn test_empty_row_round_trip() {
        let table = Table::new(vec![
            Column::new("id", ColumnValues::Int(vec![])),
            Column::new("name", ColumnValues::Str(vec![])),
        ])
        .unwrap();

        let bytes = encode(&table, Format::Parquet).unwrap();
        let decoded = decode(&bytes, Format::Parquet).unwrap();
        assert_eq!(decoded.row_count(), 0);
        assert_eq!(decoded.schema(), table.schema());
    }
}
