//! In-memory tabular values.
//!
//! A [`Table`] is the unit of data that moves through the lake: ingestion
//! writes one to a zone, transformations map one to another. Columns are
//! typed vectors of equal length; the column → type-tag mapping derived by
//! [`Table::schema`] is what the catalog records for an asset.

use crate::error::{MedallionError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Typed column payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnValues {
    /// 64-bit signed integers.
    Int(Vec<i64>),
    /// 64-bit floats.
    Float(Vec<f64>),
    /// Booleans.
    Bool(Vec<bool>),
    /// UTF-8 strings.
    Str(Vec<String>),
}

impl ColumnValues {
    /// Number of values in the column.
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Int(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Bool(v) => v.len(),
            ColumnValues::Str(v) => v.len(),
        }
    }

    /// Whether the column holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Type tag recorded in asset schemas.
    pub fn dtype(&self) -> &'static str {
        match self {
            ColumnValues::Int(_) => "int",
            ColumnValues::Float(_) => "float",
            ColumnValues::Bool(_) => "bool",
            ColumnValues::Str(_) => "string",
        }
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Column values.
    pub values: ColumnValues,
}

impl Column {
    /// Creates a new column.
    pub fn new(name: impl Into<String>, values: ColumnValues) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// An ordered collection of equal-length columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Builds a table, validating that columns are rectangular and names
    /// are unique.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let rows = first.values.len();
            for col in &columns {
                if col.values.len() != rows {
                    return Err(MedallionError::InvalidData(format!(
                        "column '{}' has {} values, expected {}",
                        col.name,
                        col.values.len(),
                        rows
                    )));
                }
            }
        }
        let mut seen = std::collections::HashSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(MedallionError::InvalidData(format!(
                    "duplicate column name '{}'",
                    col.name
                )));
            }
        }
        Ok(Self { columns })
    }

    /// Creates an empty table with no columns.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// The columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Derives the column → type-tag mapping captured in asset records.
    pub fn schema(&self) -> BTreeMap<String, String> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.values.dtype().to_string()))
            .collect()
    }
}
