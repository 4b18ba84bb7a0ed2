//! Writing the aggregated report and computing the run summary.

use std::fmt;
use std::io::Write;
use std::path::Path;

use crate::accumulator::{Accumulator, COUNTRY_CODE, NAME, POPULATION};
use crate::error::IngestionResult;
use crate::processing::{reduce, ReduceOp, SortedReport};
use crate::types::Value;

/// Country whose total population is reported in the summary.
pub const SUMMARY_COUNTRY_CODE: &str = "BRA";

/// Write `report` as CSV to `destination`: a `Name,CountryCode,Population` header, then one line
/// per row. The header is written even when the report is empty.
pub fn emit(report: &SortedReport, destination: impl AsRef<Path>) -> IngestionResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(destination)?;
    emit_to_writer(report, &mut wtr)
}

/// Like [`emit`], but into an existing CSV writer.
pub fn emit_to_writer<W: Write>(report: &SortedReport, wtr: &mut csv::Writer<W>) -> IngestionResult<()> {
    wtr.write_record([NAME, COUNTRY_CODE, POPULATION])?;
    for row in report.rows() {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Statistics printed at the end of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Rows merged before aggregation.
    pub total_rows: usize,
    /// Distinct `(Name, CountryCode)` keys after aggregation.
    pub unique_rows: usize,
    /// Name of the city with the largest mean population; `None` if the report is empty.
    pub largest_population_city: Option<String>,
    /// Sum of mean populations over rows with `CountryCode == "BRA"`.
    pub brazil_population: f64,
}

/// Compute the [`RunSummary`] for a run.
///
/// Ties for the largest population go to the first tied row in report order, i.e. the smallest
/// `(Name, CountryCode)`.
pub fn summarize(accumulator: &Accumulator, report: &SortedReport) -> RunSummary {
    let ds = report.to_dataset();

    let largest_population_city = reduce(&ds, POPULATION, ReduceOp::Max).and_then(|max| {
        report
            .rows()
            .iter()
            .find(|r| r.population == max)
            .map(|r| r.name.clone())
    });

    let brazil_population = ds
        .schema
        .index_of(COUNTRY_CODE)
        .map(|cc_idx| {
            ds.filter_rows(|row| {
                matches!(row.get(cc_idx), Some(Value::Utf8(cc)) if cc == SUMMARY_COUNTRY_CODE)
            })
        })
        .and_then(|brazil| reduce(&brazil, POPULATION, ReduceOp::Sum))
        .unwrap_or(0.0);

    RunSummary {
        total_rows: accumulator.row_count(),
        unique_rows: report.len(),
        largest_population_city,
        brazil_population,
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "The total number of rows in all files is {}", self.total_rows)?;
        writeln!(f, "The total number of unique rows is {}", self.unique_rows)?;
        writeln!(
            f,
            "The city with the largest population is: {}",
            self.largest_population_city.as_deref().unwrap_or("no data")
        )?;
        writeln!(
            f,
            "The total population in all the cities in Brazil is: {}",
            format_float(self.brazil_population)
        )
    }
}

/// Format a float the way it appears in the report: whole numbers keep a trailing `.0`.
pub fn format_float(v: f64) -> String {
    format!("{v:?}")
}
