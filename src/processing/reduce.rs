//! Reduction operations for [`crate::types::DataSet`].

use crate::types::{DataSet, Value};

/// Built-in reductions over a `Float64` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceOp {
    /// Sum of the values.
    Sum,
    /// Largest value.
    Max,
}

/// Reduce a column using a built-in [`ReduceOp`].
///
/// Only [`Value::Float64`] cells take part; nulls and other values are skipped. Returns `None` if
/// `column` does not exist or holds no float values.
pub fn reduce(dataset: &DataSet, column: &str, op: ReduceOp) -> Option<f64> {
    let idx = dataset.schema.index_of(column)?;
    let combine: fn(f64, f64) -> f64 = match op {
        ReduceOp::Sum => |a: f64, b: f64| a + b,
        ReduceOp::Max => f64::max,
    };

    dataset
        .rows
        .iter()
        .filter_map(|row| match row.get(idx) {
            Some(Value::Float64(v)) => Some(*v),
            _ => None,
        })
        .reduce(combine)
}
