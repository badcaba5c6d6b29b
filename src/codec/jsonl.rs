//! Line-delimited JSON codec.
//!
//! One JSON object per line, keys in column order. Column types are inferred
//! from the collected values: all-integer number columns decode as integers,
//! any fractional value promotes the column to float.

use crate::error::{MedallionError, Result};
use crate::table::{Column, ColumnValues, Table};
use serde_json::{Map, Value};

pub(super) fn encode(table: &Table) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for row in 0..table.row_count() {
        let mut record = Map::new();
        for col in table.columns() {
            record.insert(col.name.clone(), cell_to_value(&col.values, row)?);
        }
        serde_json::to_writer(&mut out, &Value::Object(record))?;
        out.push(b'\n');
    }
    Ok(out)
}

pub(super) fn decode(bytes: &[u8]) -> Result<Table> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| MedallionError::Codec(format!("invalid UTF-8: {e}")))?;

    let mut names: Vec<String> = Vec::new();
    let mut cells: Vec<Vec<Value>> = Vec::new();

    for (lineno, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: Map<String, Value> = serde_json::from_str(line)?;

        if names.is_empty() {
            names = record.keys().cloned().collect();
            cells = vec![Vec::new(); names.len()];
        }
        if record.len() != names.len() {
            return Err(MedallionError::Codec(format!(
                "line {}: record has {} fields, expected {}",
                lineno + 1,
                record.len(),
                names.len()
            )));
        }
        for (i, name) in names.iter().enumerate() {
            let value = record.get(name).ok_or_else(|| {
                MedallionError::Codec(format!("line {}: missing field '{name}'", lineno + 1))
            })?;
            cells[i].push(value.clone());
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| Ok(Column::new(name, infer_column(raw)?)))
        .collect::<Result<Vec<_>>>()?;

    Table::new(columns)
}

fn cell_to_value(values: &ColumnValues, row: usize) -> Result<Value> {
    Ok(match values {
        ColumnValues::Int(v) => Value::from(v[row]),
        ColumnValues::Float(v) => serde_json::Number::from_f64(v[row])
            .map(Value::Number)
            .ok_or_else(|| {
                MedallionError::Codec(format!("non-finite float {} at row {row}", v[row]))
            })?,
        ColumnValues::Bool(v) => Value::from(v[row]),
        ColumnValues::Str(v) => Value::from(v[row].as_str()),
    })
}

fn infer_column(raw: Vec<Value>) -> Result<ColumnValues> {
    if raw.is_empty() {
        return Ok(ColumnValues::Str(Vec::new()));
    }

    if raw.iter().all(|v| v.as_i64().is_some()) {
        let ints = raw.iter().filter_map(Value::as_i64).collect();
        return Ok(ColumnValues::Int(ints));
    }
    if raw.iter().all(Value::is_number) {
        let floats = raw
            .iter()
            .map(|v| {
                v.as_f64().ok_or_else(|| {
                    MedallionError::Codec(format!("number out of f64 range: {v}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        return Ok(ColumnValues::Float(floats));
    }
    if raw.iter().all(Value::is_boolean) {
        let bools = raw.iter().filter_map(Value::as_bool).collect();
        return Ok(ColumnValues::Bool(bools));
    }
    if raw.iter().all(Value::is_string) {
        let strings = raw
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
        return Ok(ColumnValues::Str(strings));
    }

    Err(MedallionError::Codec(
        "mixed-type column in JSONL input".to_string(),
    ))
}
