//! Parquet ingestion implementation.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use parquet::basic::{ConvertedType, Type as PhysicalType};
use parquet::file::reader::{ChunkReader, FileReader};
use parquet::file::serialized_reader::SerializedFileReader;
use parquet::record::Field as ParquetField;
use parquet::schema::types::ColumnDescriptor;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::infer::widen_nullable_integers;

/// Ingest a Parquet file into an in-memory `DataSet`.
///
/// Notes:
/// - The table schema comes from the file's leaf columns (by column path string)
/// - Uses the Parquet record API (`RowIter`) for a first implementation
pub fn ingest_parquet_from_path(path: impl AsRef<Path>) -> IngestionResult<DataSet> {
    let file = File::open(path.as_ref())?;
    let reader = SerializedFileReader::new(file).map_err(|e| IngestionError::Malformed {
        message: format!("not a parquet file: {e}"),
    })?;

    let schema = parquet_table_schema(&reader)?;

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (idx0, row_res) in reader.into_iter().enumerate() {
        let row_num = idx0 + 1;
        let row = row_res?;

        // Build a name->Field map for lookup.
        let mut map: HashMap<&str, &ParquetField> = HashMap::new();
        for (name, field) in row.get_column_iter() {
            map.insert(name.as_str(), field);
        }

        let mut out_row: Vec<Value> = Vec::with_capacity(schema.len());
        for f in &schema.fields {
            let v = map.get(f.name.as_str()).ok_or_else(|| IngestionError::SchemaMismatch {
                message: format!("row {row_num} missing column '{}'", f.name),
            })?;
            out_row.push(convert_parquet_field(row_num, &f.name, f.data_type, v)?);
        }
        rows.push(out_row);
    }

    Ok(widen_nullable_integers(DataSet::new(schema, rows)))
}

fn parquet_table_schema<R: ChunkReader + 'static>(
    reader: &SerializedFileReader<R>,
) -> IngestionResult<Schema> {
    let cols = reader
        .metadata()
        .file_metadata()
        .schema_descr()
        .columns();

    let mut fields = Vec::with_capacity(cols.len());
    for c in cols {
        let name = c.path().string();
        let data_type = parquet_column_type(c).ok_or_else(|| IngestionError::UnsupportedType {
            column: name.clone(),
            type_name: format!("{} ({})", c.physical_type(), c.converted_type()),
        })?;
        fields.push(Field::new(name, data_type));
    }
    Ok(Schema::new(fields))
}

fn parquet_column_type(c: &ColumnDescriptor) -> Option<DataType> {
    match (c.physical_type(), c.converted_type()) {
        (PhysicalType::BOOLEAN, ConvertedType::NONE) => Some(DataType::Bool),
        (
            PhysicalType::INT32 | PhysicalType::INT64,
            ConvertedType::NONE
            | ConvertedType::INT_8
            | ConvertedType::INT_16
            | ConvertedType::INT_32
            | ConvertedType::INT_64
            | ConvertedType::UINT_8
            | ConvertedType::UINT_16
            | ConvertedType::UINT_32
            | ConvertedType::UINT_64,
        ) => Some(DataType::Int64),
        (PhysicalType::FLOAT | PhysicalType::DOUBLE, ConvertedType::NONE) => Some(DataType::Float64),
        (
            PhysicalType::BYTE_ARRAY,
            ConvertedType::UTF8 | ConvertedType::ENUM | ConvertedType::JSON,
        ) => Some(DataType::Utf8),
        _ => None,
    }
}

fn convert_parquet_field(
    row: usize,
    column: &str,
    data_type: DataType,
    f: &ParquetField,
) -> IngestionResult<Value> {
    if let ParquetField::Null = f {
        return Ok(Value::Null);
    }

    match data_type {
        DataType::Utf8 => match f {
            ParquetField::Str(s) => Ok(Value::Utf8(s.clone())),
            _ => Err(IngestionError::ParseError {
                row,
                column: column.to_string(),
                raw: f.to_string(),
                message: "expected string".to_string(),
            }),
        },
        DataType::Bool => match f {
            ParquetField::Bool(b) => Ok(Value::Bool(*b)),
            _ => Err(IngestionError::ParseError {
                row,
                column: column.to_string(),
                raw: f.to_string(),
                message: "expected bool".to_string(),
            }),
        },
        DataType::Int64 => match f {
            ParquetField::Byte(v) => Ok(Value::Int64(i64::from(*v))),
            ParquetField::Short(v) => Ok(Value::Int64(i64::from(*v))),
            ParquetField::Int(v) => Ok(Value::Int64(i64::from(*v))),
            ParquetField::Long(v) => Ok(Value::Int64(*v)),
            ParquetField::UByte(v) => Ok(Value::Int64(i64::from(*v))),
            ParquetField::UShort(v) => Ok(Value::Int64(i64::from(*v))),
            ParquetField::UInt(v) => Ok(Value::Int64(i64::from(*v))),
            ParquetField::ULong(v) => i64::try_from(*v)
                .map(Value::Int64)
                .map_err(|_| IngestionError::ParseError {
                    row,
                    column: column.to_string(),
                    raw: f.to_string(),
                    message: "u64 out of range for i64".to_string(),
                }),
            _ => Err(IngestionError::ParseError {
                row,
                column: column.to_string(),
                raw: f.to_string(),
                message: "expected integer".to_string(),
            }),
        },
        DataType::Float64 => match f {
            ParquetField::Float(v) => Ok(Value::Float64(f64::from(*v))),
            ParquetField::Double(v) => Ok(Value::Float64(*v)),
            _ => Err(IngestionError::ParseError {
                row,
                column: column.to_string(),
                raw: f.to_string(),
                message: "expected number".to_string(),
            }),
        },
    }
}
