//! Group-by-key mean aggregation of the merged city table.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::accumulator::{Accumulator, COUNTRY_CODE, NAME, POPULATION};
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// One output row: a distinct `(Name, CountryCode)` key and its mean population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "CountryCode")]
    pub country_code: String,
    #[serde(rename = "Population")]
    pub population: f64,
}

/// Aggregated rows ordered by `Name`, then `CountryCode`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortedReport {
    rows: Vec<AggregateRow>,
}

impl SortedReport {
    pub fn rows(&self) -> &[AggregateRow] {
        &self.rows
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Schema of [`Self::to_dataset`].
    pub fn schema() -> Schema {
        Schema::new(vec![
            Field::new(NAME, DataType::Utf8),
            Field::new(COUNTRY_CODE, DataType::Utf8),
            Field::new(POPULATION, DataType::Float64),
        ])
    }

    /// The report as a [`DataSet`], for use with the generic processing functions.
    pub fn to_dataset(&self) -> DataSet {
        let rows = self
            .rows
            .iter()
            .map(|r| {
                vec![
                    Value::Utf8(r.name.clone()),
                    Value::Utf8(r.country_code.clone()),
                    Value::Float64(r.population),
                ]
            })
            .collect();
        DataSet::new(Self::schema(), rows)
    }
}

#[derive(Debug, Default)]
struct GroupTotals {
    sum: i128,
    count: u64,
}

/// Reduce the accumulator to one row per `(Name, CountryCode)`, holding the mean `Population`.
///
/// The result does not depend on row order. Only rows with a `Name`, a `CountryCode` and a
/// `Population` are grouped.
pub fn aggregate(accumulator: &Accumulator) -> SortedReport {
    mean_by_key(accumulator.dataset()).unwrap_or_default()
}

fn mean_by_key(dataset: &DataSet) -> Option<SortedReport> {
    let name_idx = dataset.schema.index_of(NAME)?;
    let cc_idx = dataset.schema.index_of(COUNTRY_CODE)?;
    let pop_idx = dataset.schema.index_of(POPULATION)?;

    // BTreeMap keeps keys in (Name, CountryCode) order, which is the report order.
    let groups = dataset.reduce_rows(
        BTreeMap::<(String, String), GroupTotals>::new(),
        |mut groups, row| {
            let (Some(Value::Utf8(name)), Some(Value::Utf8(cc)), Some(Value::Int64(pop))) =
                (row.get(name_idx), row.get(cc_idx), row.get(pop_idx))
            else {
                return groups;
            };
            let totals = groups.entry((name.clone(), cc.clone())).or_default();
            totals.sum += i128::from(*pop);
            totals.count += 1;
            groups
        },
    );

    let rows = groups
        .into_iter()
        .map(|((name, country_code), totals)| AggregateRow {
            name,
            country_code,
            population: totals.sum as f64 / totals.count as f64,
        })
        .collect();

    Some(SortedReport { rows })
}
