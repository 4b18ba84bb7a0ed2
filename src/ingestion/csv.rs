//! CSV ingestion implementation (`.csv` and `.dat`).

use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::infer::{widen_nullable_integers, ColumnKind};

/// Ingest a CSV file into an in-memory [`DataSet`].
///
/// Rules:
///
/// - CSV must have a header row; header names become the column names.
/// - Every record must have as many fields as the header.
/// - Column types are inferred from the values (see [`ingest_csv_from_reader`]).
pub fn ingest_csv_from_path(path: impl AsRef<Path>) -> IngestionResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    ingest_csv_from_reader(&mut rdr)
}

/// Ingest CSV data from an existing CSV reader.
///
/// Empty cells become [`Value::Null`]. A column is `Int64` when every non-empty cell parses as an
/// integer, `Float64` when every cell parses as a number, `Bool` when every cell is `true`/`false`
/// (any case), and `Utf8` otherwise. An `Int64` column with any empty cell is reported as
/// `Float64`.
///
/// Header names and text cells are kept as written; surrounding whitespace is only ignored when
/// parsing numbers and booleans.
pub fn ingest_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
) -> IngestionResult<DataSet> {
    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(IngestionError::Malformed {
            message: "csv input has no header row".to_string(),
        });
    }

    let records = rdr.records().collect::<Result<Vec<_>, _>>()?;

    let mut kinds = vec![ColumnKind::Empty; headers.len()];
    for record in &records {
        for (kind, raw) in kinds.iter_mut().zip(record.iter()) {
            *kind = kind.observe(classify_cell(raw));
        }
    }

    let schema = Schema::new(
        headers
            .iter()
            .zip(&kinds)
            .map(|(name, kind)| Field::new(name, kind.data_type()))
            .collect(),
    );

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(records.len());
    for (row_idx0, record) in records.iter().enumerate() {
        // Report 1-based row number for users; +1 again because header is row 1.
        let user_row = row_idx0 + 2;

        let mut row: Vec<Value> = Vec::with_capacity(schema.len());
        for (idx, field) in schema.fields.iter().enumerate() {
            let raw = record.get(idx).unwrap_or("");
            row.push(parse_typed_value(user_row, &field.name, field.data_type, raw)?);
        }
        rows.push(row);
    }

    Ok(widen_nullable_integers(DataSet::new(schema, rows)))
}

fn classify_cell(raw: &str) -> ColumnKind {
    let trimmed = raw.trim();
    if raw.is_empty() {
        ColumnKind::Empty
    } else if trimmed.parse::<i64>().is_ok() {
        ColumnKind::Int
    } else if trimmed.parse::<f64>().is_ok() {
        ColumnKind::Float
    } else if parse_bool(trimmed).is_ok() {
        ColumnKind::Bool
    } else {
        ColumnKind::Text
    }
}

fn parse_typed_value(
    row: usize,
    column: &str,
    data_type: DataType,
    raw: &str,
) -> IngestionResult<Value> {
    if raw.is_empty() {
        return Ok(Value::Null);
    }

    let trimmed = raw.trim();
    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(raw.to_owned())),
        DataType::Int64 => trimmed.parse::<i64>().map(Value::Int64).map_err(|e| {
            IngestionError::ParseError {
                row,
                column: column.to_owned(),
                raw: raw.to_owned(),
                message: e.to_string(),
            }
        }),
        DataType::Float64 => trimmed.parse::<f64>().map(Value::Float64).map_err(|e| {
            IngestionError::ParseError {
                row,
                column: column.to_owned(),
                raw: raw.to_owned(),
                message: e.to_string(),
            }
        }),
        DataType::Bool => parse_bool(trimmed).map(Value::Bool).map_err(|message| {
            IngestionError::ParseError {
                row,
                column: column.to_owned(),
                raw: raw.to_owned(),
                message,
            }
        }),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    if s.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if s.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err("expected bool (true/false)".to_string())
    }
}
