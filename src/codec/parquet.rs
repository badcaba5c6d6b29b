//! Columnar Parquet codec.
//!
//! Tables map one-to-one onto single-batch Parquet files: `Int` columns to
//! `Int64`, `Float` to `Float64`, `Bool` to `Boolean`, `Str` to `Utf8`.
//! Decoding accepts multi-batch files and concatenates them.

use crate::error::{MedallionError, Result};
use crate::table::{Column, ColumnValues, Table};
use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use std::io::Cursor;
use std::sync::Arc;

pub(super) fn encode(table: &Table) -> Result<Vec<u8>> {
    let fields: Vec<Field> = table
        .columns()
        .iter()
        .map(|c| Field::new(c.name.as_str(), arrow_type(&c.values), false))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let arrays: Vec<ArrayRef> = table.columns().iter().map(|c| to_arrow(&c.values)).collect();

    let batch = RecordBatch::try_new(schema.clone(), arrays)
        .map_err(|e| MedallionError::Codec(format!("record batch build failed: {e}")))?;

    let mut cursor = Cursor::new(Vec::<u8>::new());
    let mut writer = ArrowWriter::try_new(&mut cursor, schema, None)
        .map_err(|e| MedallionError::Codec(format!("parquet writer init failed: {e}")))?;
    writer
        .write(&batch)
        .map_err(|e| MedallionError::Codec(format!("parquet write failed: {e}")))?;
    writer
        .close()
        .map_err(|e| MedallionError::Codec(format!("parquet close failed: {e}")))?;

    Ok(cursor.into_inner())
}

pub(super) fn decode(bytes: &[u8]) -> Result<Table> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(bytes.to_vec()))
        .map_err(|e| MedallionError::Codec(format!("parquet reader init failed: {e}")))?;

    // Seed columns from the file schema so zero-row files keep their shape.
    let mut columns: Vec<Column> = builder
        .schema()
        .fields()
        .iter()
        .map(|field| Ok(Column::new(field.name().clone(), empty_values(field.data_type())?)))
        .collect::<Result<Vec<_>>>()?;

    let reader = builder
        .build()
        .map_err(|e| MedallionError::Codec(format!("parquet reader build failed: {e}")))?;

    for batch in reader {
        let batch =
            batch.map_err(|e| MedallionError::Codec(format!("parquet read failed: {e}")))?;
        for (col, array) in columns.iter_mut().zip(batch.columns()) {
            append_from_arrow(&mut col.values, array)?;
        }
    }

    Table::new(columns)
}

fn arrow_type(values: &ColumnValues) -> DataType {
    match values {
        ColumnValues::Int(_) => DataType::Int64,
        ColumnValues::Float(_) => DataType::Float64,
        ColumnValues::Bool(_) => DataType::Boolean,
        ColumnValues::Str(_) => DataType::Utf8,
    }
}

fn to_arrow(values: &ColumnValues) -> ArrayRef {
    match values {
        ColumnValues::Int(v) => Arc::new(Int64Array::from(v.clone())),
        ColumnValues::Float(v) => Arc::new(Float64Array::from(v.clone())),
        ColumnValues::Bool(v) => Arc::new(BooleanArray::from(v.clone())),
        ColumnValues::Str(v) => Arc::new(StringArray::from(v.clone())),
    }
}

fn empty_values(data_type: &DataType) -> Result<ColumnValues> {
    match data_type {
        DataType::Int64 => Ok(ColumnValues::Int(Vec::new())),
        DataType::Float64 => Ok(ColumnValues::Float(Vec::new())),
        DataType::Boolean => Ok(ColumnValues::Bool(Vec::new())),
        DataType::Utf8 => Ok(ColumnValues::Str(Vec::new())),
        other => Err(MedallionError::Codec(format!(
            "unsupported parquet column type: {other}"
        ))),
    }
}

fn append_from_arrow(values: &mut ColumnValues, array: &ArrayRef) -> Result<()> {
    if array.null_count() > 0 {
        return Err(MedallionError::Codec(
            "null values are not supported".to_string(),
        ));
    }

    match values {
        ColumnValues::Int(out) => {
            let array = array
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(|| MedallionError::Codec("expected Int64 column".to_string()))?;
            out.extend(array.values().iter().copied());
        }
        ColumnValues::Float(out) => {
            let array = array
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| MedallionError::Codec("expected Float64 column".to_string()))?;
            out.extend(array.values().iter().copied());
        }
        ColumnValues::Bool(out) => {
            let array = array
                .as_any()
                .downcast_ref::<BooleanArray>()
                .ok_or_else(|| MedallionError::Codec("expected Boolean column".to_string()))?;
            out.extend(array.iter().map(|v| v.unwrap_or_default()));
        }
        ColumnValues::Str(out) => {
            let array = array
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| MedallionError::Codec("expected Utf8 column".to_string()))?;
            out.extend(array.iter().map(|v| v.unwrap_or_default().to_string()));
        }
    }
    Ok(())
}
