//! The unified city table that validated files are merged into.

use crate::error::{IngestionError, IngestionResult};
use crate::ingestion::validate::mismatch_reason;
use crate::types::{CandidateTable, DataSet, DataType, Field, Schema, Value};

/// City name column.
pub const NAME: &str = "Name";
/// ISO country code column.
pub const COUNTRY_CODE: &str = "CountryCode";
/// Population column.
pub const POPULATION: &str = "Population";

/// The canonical schema every input file must match exactly.
pub fn canonical_schema() -> Schema {
    Schema::new(vec![
        Field::new(NAME, DataType::Utf8),
        Field::new(COUNTRY_CODE, DataType::Utf8),
        Field::new(POPULATION, DataType::Int64),
    ])
}

/// Growing table of merged rows.
///
/// The schema is fixed at construction. Rows are only ever appended, never deduplicated here;
/// duplicates across files are resolved by aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct Accumulator {
    data: DataSet,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Accumulator {
    /// An empty accumulator over [`canonical_schema`].
    pub fn new() -> Self {
        Self {
            data: DataSet::empty(canonical_schema()),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.data.schema
    }

    /// Append every row of `candidate`, reordering its columns into the accumulator's order.
    ///
    /// All-or-nothing: if the candidate's schema does not match exactly, nothing is appended.
    /// Returns the number of rows appended.
    pub fn append(&mut self, candidate: CandidateTable) -> IngestionResult<usize> {
        if let Some(message) = mismatch_reason(&self.data.schema, &candidate.schema) {
            return Err(IngestionError::SchemaMismatch { message });
        }

        let appended = candidate.row_count();
        if candidate.schema == self.data.schema {
            self.data.rows.extend(candidate.rows);
            return Ok(appended);
        }

        let projection: Vec<usize> = self
            .data
            .schema
            .field_names()
            .filter_map(|name| candidate.schema.index_of(name))
            .collect();

        self.data.rows.reserve(appended);
        for mut row in candidate.rows {
            let projected = projection
                .iter()
                .map(|&idx| {
                    row.get_mut(idx)
                        .map(|v| std::mem::replace(v, Value::Null))
                        .unwrap_or(Value::Null)
                })
                .collect();
            self.data.rows.push(projected);
        }
        Ok(appended)
    }

    pub fn row_count(&self) -> usize {
        self.data.row_count()
    }

    /// Read-only view of the merged rows.
    pub fn dataset(&self) -> &DataSet {
        &self.data
    }
}
