//! Column type inference for formats without declared types (CSV, JSON).

use crate::types::{DataSet, DataType, Value};

/// What the values seen so far in a column have in common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ColumnKind {
    /// Only nulls so far.
    #[default]
    Empty,
    Int,
    Float,
    Bool,
    Text,
}

impl ColumnKind {
    /// Fold one more observed value kind into the column's kind.
    pub(crate) fn observe(self, seen: ColumnKind) -> ColumnKind {
        use ColumnKind::*;
        match (self, seen) {
            (k, Empty) | (Empty, k) => k,
            (a, b) if a == b => a,
            (Int, Float) | (Float, Int) => Float,
            _ => Text,
        }
    }

    /// The logical type a column of this kind is reported as.
    ///
    /// A column that never held a value reports as [`DataType::Utf8`].
    pub(crate) fn data_type(self) -> DataType {
        match self {
            ColumnKind::Empty | ColumnKind::Text => DataType::Utf8,
            ColumnKind::Int => DataType::Int64,
            ColumnKind::Float => DataType::Float64,
            ColumnKind::Bool => DataType::Bool,
        }
    }
}

/// Report every `Int64` column that holds a null as `Float64`, converting its integers.
///
/// An integer column with gaps reads as floating point, so it never matches an integer schema.
pub(crate) fn widen_nullable_integers(mut table: DataSet) -> DataSet {
    let DataSet { schema, rows } = &mut table;
    for (idx, field) in schema.fields.iter_mut().enumerate() {
        if field.data_type != DataType::Int64
            || !rows.iter().any(|row| matches!(row.get(idx), Some(Value::Null)))
        {
            continue;
        }

        field.data_type = DataType::Float64;
        for row in rows.iter_mut() {
            if let Some(cell) = row.get_mut(idx) {
                if let Value::Int64(n) = *cell {
                    *cell = Value::Float64(n as f64);
                }
            }
        }
    }
    table
}
