//! In-memory data transformations.
//!
//! The processing layer operates on [`crate::types::DataSet`] values produced by ingestion.
//!
//! Currently implemented:
//!
//! - [`aggregate()`]: mean population per `(Name, CountryCode)`, sorted by name
//! - [`reduce()`]: sum/max over a float column
//!
//! ## Example: filter → reduce
//!
//! ```rust
//! use citylist::processing::{reduce, ReduceOp};
//! use citylist::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![
//!     Field::new("Name", DataType::Utf8),
//!     Field::new("CountryCode", DataType::Utf8),
//!     Field::new("Population", DataType::Float64),
//! ]);
//! let ds = DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::Utf8("Recife".into()), Value::Utf8("BRA".into()), Value::Float64(100.0)],
//!         vec![Value::Utf8("Rosario".into()), Value::Utf8("ARG".into()), Value::Float64(50.0)],
//!         vec![Value::Utf8("Salvador".into()), Value::Utf8("BRA".into()), Value::Float64(200.0)],
//!     ],
//! );
//!
//! let cc_idx = ds.schema.index_of("CountryCode").unwrap();
//! let brazil = ds.filter_rows(|row| matches!(row.get(cc_idx), Some(Value::Utf8(cc)) if cc == "BRA"));
//!
//! assert_eq!(reduce(&brazil, "Population", ReduceOp::Sum), Some(300.0));
//! ```

pub mod aggregate;
pub mod reduce;

pub use aggregate::{aggregate, AggregateRow, SortedReport};
pub use reduce::{reduce, ReduceOp};
