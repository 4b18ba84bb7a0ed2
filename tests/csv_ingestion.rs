use citylist::accumulator::canonical_schema;
use citylist::ingestion::csv::{ingest_csv_from_path, ingest_csv_from_reader};
use citylist::ingestion::validate::{mismatch_reason, verify};
use citylist::types::{DataType, Value};

fn reader(input: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes())
}

#[test]
fn ingest_csv_from_path_happy_path() {
    let ds = ingest_csv_from_path("tests/fixtures/cities.csv").unwrap();

    assert_eq!(ds.row_count(), 3);
    assert!(verify(&canonical_schema(), &ds.schema));
    assert_eq!(
        ds.rows[0],
        vec![
            Value::Utf8("Tokyo".to_string()),
            Value::Utf8("JPN".to_string()),
            Value::Int64(37_000_000),
        ]
    );
}

#[test]
fn dat_file_with_reordered_columns_still_conforms() {
    let ds = ingest_csv_from_path("tests/fixtures/cities_reordered.DAT").unwrap();
    assert_eq!(ds.schema.index_of("Population"), Some(0));
    assert!(verify(&canonical_schema(), &ds.schema));
}

#[test]
fn column_types_are_inferred_from_values() {
    let input = "a,b,c,d,e\n1,1.5,true,x,\n2,2,FALSE,7,\n";
    let ds = ingest_csv_from_reader(&mut reader(input)).unwrap();
    let types: Vec<DataType> = ds.schema.fields.iter().map(|f| f.data_type).collect();
    assert_eq!(
        types,
        vec![
            DataType::Int64,
            DataType::Float64,
            DataType::Bool,
            DataType::Utf8,
            DataType::Utf8,
        ]
    );
    assert_eq!(ds.rows[1][1], Value::Float64(2.0));
    assert_eq!(ds.rows[1][2], Value::Bool(false));
    assert_eq!(ds.rows[1][3], Value::Utf8("7".to_string()));
    assert_eq!(ds.rows[0][4], Value::Null);
}

#[test]
fn empty_population_cell_makes_the_column_float() {
    let input = "Name,CountryCode,Population\nOslo,NOR,\nBergen,NOR,285000\n";
    let ds = ingest_csv_from_reader(&mut reader(input)).unwrap();
    assert_eq!(ds.rows[0][2], Value::Null);
    assert_eq!(ds.rows[1][2], Value::Float64(285_000.0));
    assert_eq!(
        mismatch_reason(&canonical_schema(), &ds.schema).as_deref(),
        Some("column 'Population' is float64 but expected int64")
    );
}

#[test]
fn empty_name_cell_is_null_text() {
    let input = "Name,CountryCode,Population\n,NOR,1000\nBergen,NOR,285000\n";
    let ds = ingest_csv_from_reader(&mut reader(input)).unwrap();
    assert!(verify(&canonical_schema(), &ds.schema));
    assert_eq!(ds.rows[0][0], Value::Null);
}

#[test]
fn padded_header_is_kept_and_fails_schema_check() {
    let input = "Name, CountryCode,Population\nOslo,NOR,709000\n";
    let ds = ingest_csv_from_reader(&mut reader(input)).unwrap();
    assert_eq!(
        mismatch_reason(&canonical_schema(), &ds.schema).as_deref(),
        Some("unexpected column ' CountryCode'")
    );
}

#[test]
fn text_cells_keep_whitespace_but_numbers_parse() {
    let input = "Name,CountryCode,Population\n Oslo ,NOR, 709000\n";
    let ds = ingest_csv_from_reader(&mut reader(input)).unwrap();
    assert!(verify(&canonical_schema(), &ds.schema));
    assert_eq!(ds.rows[0][0], Value::Utf8(" Oslo ".to_string()));
    assert_eq!(ds.rows[0][2], Value::Int64(709_000));
}

#[test]
fn text_population_fails_schema_check() {
    let ds = ingest_csv_from_path("tests/fixtures/cities_text_population.csv").unwrap();
    assert_eq!(
        mismatch_reason(&canonical_schema(), &ds.schema).as_deref(),
        Some("column 'Population' is utf8 but expected int64")
    );
}

#[test]
fn float_population_fails_schema_check() {
    let ds = ingest_csv_from_path("tests/fixtures/cities_float_population.csv").unwrap();
    assert!(!verify(&canonical_schema(), &ds.schema));
}

#[test]
fn extra_column_fails_schema_check() {
    let ds = ingest_csv_from_path("tests/fixtures/cities_extra_column.csv").unwrap();
    assert_eq!(
        mismatch_reason(&canonical_schema(), &ds.schema).as_deref(),
        Some("unexpected column 'District'")
    );
}

#[test]
fn ingest_csv_errors_on_ragged_rows() {
    let input = "Name,CountryCode,Population\nOslo,NOR\n";
    let err = ingest_csv_from_reader(&mut reader(input)).unwrap_err();
    assert!(err.to_string().contains("csv error"));
}

#[test]
fn ingest_csv_errors_on_empty_input() {
    let err = ingest_csv_from_reader(&mut reader("")).unwrap_err();
    assert!(err.to_string().contains("no header row"));
}
