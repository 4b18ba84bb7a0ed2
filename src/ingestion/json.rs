//! JSON ingestion implementation.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A column-oriented object: `{"a": {"0": 1, "1": 2}}`
//! - A single flat object (one row): `{"a":1}`
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! Columns are the union of keys across all records; a key missing from a record is a null.
//! Within a record keys are visited in sorted order, so column order follows key order rather
//! than the order keys were written in.

use std::fs;
use std::path::Path;

use serde_json::Map;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::infer::{widen_nullable_integers, ColumnKind};

type JsonObject = Map<String, serde_json::Value>;

/// Ingest JSON into an in-memory `DataSet`.
pub fn ingest_json_from_path(path: impl AsRef<Path>) -> IngestionResult<DataSet> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8(bytes).map_err(|e| IngestionError::Malformed {
        message: format!("json input is not valid utf-8: {e}"),
    })?;
    ingest_json_from_str(&text)
}

/// Ingest JSON from an in-memory string into a [`DataSet`].
pub fn ingest_json_from_str(input: &str) -> IngestionResult<DataSet> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IngestionError::Malformed {
            message: "json input is empty".to_string(),
        });
    }

    // First try parsing as a single JSON value (array or object).
    let records = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(idx0, v)| into_object(idx0 + 1, v))
            .collect::<IngestionResult<Vec<_>>>()?,
        Ok(serde_json::Value::Object(map)) if is_column_oriented(&map) => columns_to_records(map),
        Ok(serde_json::Value::Object(map)) => vec![map],
        Ok(_) => {
            return Err(IngestionError::Malformed {
                message: "json must be an object, an array of objects, or NDJSON".to_string(),
            });
        }
        Err(whole_err) => {
            // A single-line document that failed to parse is not NDJSON either.
            if trimmed.lines().count() <= 1 {
                return Err(whole_err.into());
            }
            parse_ndjson(trimmed)?
        }
    };

    table_from_records(&records)
}

fn parse_ndjson(input: &str) -> IngestionResult<Vec<JsonObject>> {
    let mut records = Vec::new();
    for (i, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let v = serde_json::from_str::<serde_json::Value>(line).map_err(|e| {
            IngestionError::Malformed {
                message: format!("invalid ndjson at line {}: {}", i + 1, e),
            }
        })?;
        records.push(into_object(i + 1, v)?);
    }
    Ok(records)
}

fn into_object(row_num: usize, v: serde_json::Value) -> IngestionResult<JsonObject> {
    match v {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(IngestionError::Malformed {
            message: format!("row {row_num} is not a json object"),
        }),
    }
}

fn is_column_oriented(map: &JsonObject) -> bool {
    !map.is_empty() && map.values().all(|v| v.is_object())
}

/// Turn `{"col": {"idx": value}}` into one record per distinct index.
fn columns_to_records(columns: JsonObject) -> Vec<JsonObject> {
    let mut index: Vec<String> = Vec::new();
    for cells in columns.values() {
        if let serde_json::Value::Object(cells) = cells {
            for key in cells.keys() {
                if !index.contains(key) {
                    index.push(key.clone());
                }
            }
        }
    }
    // Numeric row labels sort numerically, anything else after them by text.
    index.sort_by_key(|label| {
        let n = label.parse::<u64>().ok();
        (n.is_none(), n, label.clone())
    });

    index
        .iter()
        .map(|row_key| {
            let mut record = JsonObject::new();
            for (column, cells) in &columns {
                if let Some(v) = cells.get(row_key) {
                    record.insert(column.clone(), v.clone());
                }
            }
            record
        })
        .collect()
}

fn table_from_records(records: &[JsonObject]) -> IngestionResult<DataSet> {
    let mut names: Vec<&str> = Vec::new();
    let mut kinds: Vec<ColumnKind> = Vec::new();
    for record in records {
        for (key, v) in record {
            let pos = match names.iter().position(|n| *n == key.as_str()) {
                Some(pos) => pos,
                None => {
                    names.push(key.as_str());
                    kinds.push(ColumnKind::Empty);
                    names.len() - 1
                }
            };
            kinds[pos] = kinds[pos].observe(classify_json(v));
        }
    }

    let schema = Schema::new(
        names
            .iter()
            .zip(&kinds)
            .map(|(name, kind)| Field::new(*name, kind.data_type()))
            .collect(),
    );

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(records.len());
    for (idx0, record) in records.iter().enumerate() {
        let row_num = idx0 + 1;
        let mut row: Vec<Value> = Vec::with_capacity(schema.len());
        for field in &schema.fields {
            let jv = record.get(&field.name).unwrap_or(&serde_json::Value::Null);
            row.push(convert_json_value(row_num, &field.name, field.data_type, jv)?);
        }
        rows.push(row);
    }

    Ok(widen_nullable_integers(DataSet::new(schema, rows)))
}

fn classify_json(v: &serde_json::Value) -> ColumnKind {
    match v {
        serde_json::Value::Null => ColumnKind::Empty,
        serde_json::Value::Bool(_) => ColumnKind::Bool,
        serde_json::Value::Number(n) if n.is_i64() => ColumnKind::Int,
        serde_json::Value::Number(_) => ColumnKind::Float,
        serde_json::Value::String(_) | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            ColumnKind::Text
        }
    }
}

fn convert_json_value(
    row: usize,
    column: &str,
    data_type: DataType,
    v: &serde_json::Value,
) -> IngestionResult<Value> {
    if v.is_null() {
        return Ok(Value::Null);
    }

    match data_type {
        // Mixed columns are reported as text, so non-string values keep their JSON spelling.
        DataType::Utf8 => Ok(Value::Utf8(match v.as_str() {
            Some(s) => s.to_string(),
            None => v.to_string(),
        })),
        DataType::Bool => v.as_bool().map(Value::Bool).ok_or_else(|| IngestionError::ParseError {
            row,
            column: column.to_string(),
            raw: v.to_string(),
            message: "expected bool".to_string(),
        }),
        DataType::Int64 => v.as_i64().map(Value::Int64).ok_or_else(|| IngestionError::ParseError {
            row,
            column: column.to_string(),
            raw: v.to_string(),
            message: "expected integer number".to_string(),
        }),
        DataType::Float64 => v.as_f64().map(Value::Float64).ok_or_else(|| IngestionError::ParseError {
            row,
            column: column.to_string(),
            raw: v.to_string(),
            message: "expected number".to_string(),
        }),
    }
}
