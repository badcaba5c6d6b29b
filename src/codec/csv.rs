//! Row-oriented CSV codec.
//!
//! Encoding writes a header row followed by one record per table row.
//! Decoding infers column types from the parsed values the way the lake's
//! original CSV consumers did: a column is an integer column only if every
//! value parses as one, then float, then bool, falling back to string.

use crate::error::{MedallionError, Result};
use crate::table::{Column, ColumnValues, Table};

pub(super) fn encode(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let header: Vec<&str> = table.columns().iter().map(|c| c.name.as_str()).collect();
    writer.write_record(&header)?;

    for row in 0..table.row_count() {
        let record: Vec<String> = table
            .columns()
            .iter()
            .map(|c| cell_to_string(&c.values, row))
            .collect();
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| MedallionError::Codec(e.to_string()))
}

pub(super) fn decode(bytes: &[u8]) -> Result<Table> {
    let mut reader = csv::Reader::from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        if record.len() != headers.len() {
            return Err(MedallionError::Codec(format!(
                "record has {} fields, header has {}",
                record.len(),
                headers.len()
            )));
        }
        for (i, field) in record.iter().enumerate() {
            cells[i].push(field.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, raw)| Column::new(name, infer_column(raw)))
        .collect();

    Table::new(columns)
}

fn cell_to_string(values: &ColumnValues, row: usize) -> String {
    match values {
        ColumnValues::Int(v) => v[row].to_string(),
        // Debug formatting keeps a decimal point on integral floats, so the
        // column stays a float column on re-read.
        ColumnValues::Float(v) => format!("{:?}", v[row]),
        ColumnValues::Bool(v) => v[row].to_string(),
        ColumnValues::Str(v) => v[row].clone(),
    }
}

fn infer_column(raw: Vec<String>) -> ColumnValues {
    if raw.is_empty() {
        return ColumnValues::Str(raw);
    }

    if let Ok(ints) = raw.iter().map(|s| s.parse::<i64>()).collect::<std::result::Result<Vec<_>, _>>() {
        return ColumnValues::Int(ints);
    }
    if let Ok(floats) = raw.iter().map(|s| s.parse::<f64>()).collect::<std::result::Result<Vec<_>, _>>() {
        return ColumnValues::Float(floats);
    }
    if let Ok(bools) = raw.iter().map(|s| s.parse::<bool>()).collect::<std::result::Result<Vec<_>, _>>() {
        return ColumnValues::Bool(bools);
    }
    ColumnValues::Str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_inference() {
        let bytes = b"id,ratio,flag,label\n1,0.5,true,alpha\n2,2.0,false,beta\n";
        let table = decode(bytes).unwrap();

        assert_eq!(
            table.column("id").unwrap().values,
            ColumnValues::Int(vec![1, 2])
        );
        assert_eq!(
            table.column("ratio").unwrap().values,
            ColumnValues::Float(vec![0.5, 2.0])
        );
        assert_eq!(
            table.column("flag").unwrap().values,
            ColumnValues::Bool(vec![true, false])
        );
        assert_eq!(
            table.column("label").unwrap().values,
            ColumnValues::Str(vec!["alpha".into(), "beta".into()])
        );
    }

    #[test]
    fn test_integral_floats_stay_floats() {
        let table = Table::new(vec![Column::new(
            "ratio",
            ColumnValues::Float(vec![1.0, 2.0]),
        )])
        .unwrap();

        let bytes = encode(&table).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, table);
    }

    #[test]
    fn test_mixed_numeric_column_is_float() {
        let bytes = b"x\n1\n2.5\n";
        let table = decode(bytes).unwrap();
        assert_eq!(
            table.column("x").unwrap().values,
            ColumnValues::Float(vec![1.0, 2.5])
        );
    }
}
