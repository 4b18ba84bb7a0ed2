//! Avro ingestion implementation.
//!
//! Reads Avro object container files. The table schema is taken from the writer schema, which
//! must be a record of primitive fields (optionally wrapped in a `["null", T]` union).

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use apache_avro::types::Value as AvroValue;
use apache_avro::{Reader, Schema as AvroSchema};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::infer::widen_nullable_integers;

/// Ingest an Avro object container file into an in-memory [`DataSet`].
pub fn ingest_avro_from_path(path: impl AsRef<Path>) -> IngestionResult<DataSet> {
    let file = File::open(path.as_ref())?;
    ingest_avro_from_reader(BufReader::new(file))
}

/// Ingest Avro data from any reader positioned at the container header.
pub fn ingest_avro_from_reader<R: Read>(input: R) -> IngestionResult<DataSet> {
    let reader = Reader::new(input).map_err(|e| IngestionError::Malformed {
        message: format!("not an avro object container: {e}"),
    })?;
    let schema = avro_table_schema(reader.writer_schema())?;

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (idx0, record) in reader.enumerate() {
        let row_num = idx0 + 1;
        let fields = match record? {
            AvroValue::Record(fields) => fields,
            other => {
                return Err(IngestionError::Malformed {
                    message: format!("row {row_num} is not an avro record: {other:?}"),
                });
            }
        };

        let mut by_name: HashMap<String, AvroValue> = fields.into_iter().collect();
        let mut row: Vec<Value> = Vec::with_capacity(schema.len());
        for f in &schema.fields {
            let v = by_name.remove(&f.name).unwrap_or(AvroValue::Null);
            row.push(convert_avro_value(row_num, &f.name, f.data_type, v)?);
        }
        rows.push(row);
    }

    Ok(widen_nullable_integers(DataSet::new(schema, rows)))
}

fn avro_table_schema(schema: &AvroSchema) -> IngestionResult<Schema> {
    let AvroSchema::Record(record) = schema else {
        return Err(IngestionError::Malformed {
            message: "avro writer schema is not a record".to_string(),
        });
    };

    let mut fields = Vec::with_capacity(record.fields.len());
    for f in &record.fields {
        let data_type = avro_field_type(&f.schema).ok_or_else(|| IngestionError::UnsupportedType {
            column: f.name.clone(),
            type_name: format!("{:?}", f.schema),
        })?;
        fields.push(Field::new(f.name.clone(), data_type));
    }
    Ok(Schema::new(fields))
}

fn avro_field_type(schema: &AvroSchema) -> Option<DataType> {
    match schema {
        AvroSchema::String | AvroSchema::Enum(_) => Some(DataType::Utf8),
        AvroSchema::Int | AvroSchema::Long => Some(DataType::Int64),
        AvroSchema::Float | AvroSchema::Double => Some(DataType::Float64),
        AvroSchema::Boolean => Some(DataType::Bool),
        AvroSchema::Union(union) => {
            let mut non_null = union
                .variants()
                .iter()
                .filter(|v| !matches!(v, AvroSchema::Null));
            match (non_null.next(), non_null.next()) {
                (Some(inner), None) => avro_field_type(inner),
                _ => None,
            }
        }
        _ => None,
    }
}

fn convert_avro_value(
    row: usize,
    column: &str,
    data_type: DataType,
    v: AvroValue,
) -> IngestionResult<Value> {
    match (data_type, v) {
        (_, AvroValue::Null) => Ok(Value::Null),
        (_, AvroValue::Union(_, inner)) => convert_avro_value(row, column, data_type, *inner),
        (DataType::Utf8, AvroValue::String(s)) => Ok(Value::Utf8(s)),
        (DataType::Utf8, AvroValue::Enum(_, symbol)) => Ok(Value::Utf8(symbol)),
        (DataType::Int64, AvroValue::Int(i)) => Ok(Value::Int64(i64::from(i))),
        (DataType::Int64, AvroValue::Long(l)) => Ok(Value::Int64(l)),
        (DataType::Float64, AvroValue::Float(f)) => Ok(Value::Float64(f64::from(f))),
        (DataType::Float64, AvroValue::Double(d)) => Ok(Value::Float64(d)),
        (DataType::Bool, AvroValue::Boolean(b)) => Ok(Value::Bool(b)),
        (expected, other) => Err(IngestionError::ParseError {
            row,
            column: column.to_string(),
            raw: format!("{other:?}"),
            message: format!("expected {expected}"),
        }),
    }
}
