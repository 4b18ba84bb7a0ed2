use std::fs;
use std::path::Path;
use std::sync::Mutex;

use citylist::error::DecodeFailureKind;
use citylist::ingestion::{
    ingest_directory, IngestionContext, IngestionEvent, IngestionFormat, IngestionObserver, IngestionSeverity,
    IngestionStats,
};
use citylist::processing::aggregate;
use citylist::report::summarize;
use citylist::PipelineError;

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<IngestionEvent>>,
    merged: Mutex<Vec<(String, usize)>>,
}

impl RecordingObserver {
    fn events(&self) -> Vec<IngestionEvent> {
        self.events.lock().unwrap().clone()
    }

    fn merged(&self) -> Vec<(String, usize)> {
        self.merged.lock().unwrap().clone()
    }
}

impl IngestionObserver for RecordingObserver {
    fn on_merged(&self, ctx: &IngestionContext, stats: IngestionStats) {
        let name = ctx.path.file_name().unwrap().to_string_lossy().into_owned();
        self.merged.lock().unwrap().push((name, stats.rows));
    }

    fn on_event(&self, event: &IngestionEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

#[test]
fn merges_known_formats_and_reports_unknown_extension_once() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "a.csv",
        "Name,CountryCode,Population\nTokyo,JPN,37000000\nTokyo,JPN,37400000\n",
    );
    write(dir.path(), "b.txt", "irrelevant");

    let obs = RecordingObserver::default();
    let outcome = ingest_directory(dir.path(), &obs).unwrap();

    assert_eq!(outcome.files_merged, 1);
    assert_eq!(outcome.files_skipped, 1);
    assert_eq!(outcome.accumulator.row_count(), 2);
    assert_eq!(obs.merged(), vec![("a.csv".to_string(), 2)]);

    let events = obs.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].severity(), IngestionSeverity::Info);
    assert_eq!(
        events[0].message(),
        "the extension of b.txt is not defined and thus the data was not processed"
    );

    let report = aggregate(&outcome.accumulator);
    assert_eq!(report.len(), 1);
    assert_eq!(report.rows()[0].population, 37_200_000.0);

    let summary = summarize(&outcome.accumulator, &report);
    assert_eq!(summary.total_rows, 2);
    assert_eq!(summary.unique_rows, 1);
    assert_eq!(summary.largest_population_city.as_deref(), Some("Tokyo"));
}

#[test]
fn schema_mismatch_is_reported_once_as_info() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "good.csv", "Name,CountryCode,Population\nLima,PER,9700000\n");
    write(
        dir.path(),
        "extra.csv",
        "Name,CountryCode,District,Population\nCusco,PER,Cusco,430000\n",
    );

    let obs = RecordingObserver::default();
    let outcome = ingest_directory(dir.path(), &obs).unwrap();

    assert_eq!(outcome.accumulator.row_count(), 1);
    let events = obs.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].severity(), IngestionSeverity::Info);
    assert!(matches!(events[0], IngestionEvent::SchemaMismatch { .. }));
    assert!(
        events[0]
            .message()
            .starts_with("extra.csv is not matching the table structure")
    );
}

#[test]
fn file_with_missing_population_is_skipped_as_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "a.csv",
        "Name,CountryCode,Population\nGhost,XXX,\nLima,PER,9700000\n",
    );
    write(dir.path(), "b.csv", "Name,CountryCode,Population\nQuito,ECU,2800000\n");

    let obs = RecordingObserver::default();
    let outcome = ingest_directory(dir.path(), &obs).unwrap();

    assert_eq!(outcome.files_merged, 1);
    assert_eq!(outcome.files_skipped, 1);
    assert_eq!(outcome.accumulator.row_count(), 1);

    let events = obs.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].severity(), IngestionSeverity::Info);
    assert_eq!(
        events[0].message(),
        "a.csv is not matching the table structure \
         (column 'Population' is float64 but expected int64)"
    );

    let names: Vec<String> = aggregate(&outcome.accumulator)
        .rows()
        .iter()
        .map(|r| r.name.clone())
        .collect();
    assert_eq!(names, vec!["Quito".to_string()]);
}

#[test]
fn undecodable_file_is_reported_once_as_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "broken.parquet", "Name,CountryCode,Population\n");

    let obs = RecordingObserver::default();
    let outcome = ingest_directory(dir.path(), &obs).unwrap();

    assert_eq!(outcome.files_merged, 0);
    assert_eq!(outcome.files_skipped, 1);
    let events = obs.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].severity(), IngestionSeverity::Error);
    match &events[0] {
        IngestionEvent::DecodeFailed { format, kind, .. } => {
            assert_eq!(*format, IngestionFormat::Parquet);
            assert_eq!(*kind, DecodeFailureKind::NotThisFormat);
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(events[0].message().ends_with("broken.parquet is not a Parquet file"));
}

#[test]
fn missing_directory_is_an_input_path_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");

    let obs = RecordingObserver::default();
    let err = ingest_directory(&missing, &obs).unwrap_err();
    assert!(matches!(err, PipelineError::InputPath { .. }));
    assert!(obs.events().is_empty());
}

#[test]
fn file_as_input_path_is_an_input_path_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "cities.csv", "Name,CountryCode,Population\n");

    let err = ingest_directory(dir.path().join("cities.csv"), &RecordingObserver::default()).unwrap_err();
    assert!(matches!(err, PipelineError::InputPath { .. }));
}

#[test]
fn subdirectories_are_not_visited() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "top.csv", "Name,CountryCode,Population\nQuito,ECU,2800000\n");
    let nested = dir.path().join("nested");
    fs::create_dir(&nested).unwrap();
    write(&nested, "deep.csv", "Name,CountryCode,Population\nCuenca,ECU,600000\n");

    let obs = RecordingObserver::default();
    let outcome = ingest_directory(dir.path(), &obs).unwrap();

    assert_eq!(outcome.accumulator.row_count(), 1);
    assert_eq!(outcome.files_skipped, 0);
    assert!(obs.events().is_empty());
}

#[test]
fn empty_directory_yields_empty_accumulator() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = ingest_directory(dir.path(), &RecordingObserver::default()).unwrap();
    assert_eq!(outcome.accumulator.row_count(), 0);
    assert!(aggregate(&outcome.accumulator).is_empty());
}

#[test]
fn brazil_total_spans_formats() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "br.csv", "Name,CountryCode,Population\nRecife,BRA,100\n");
    write(
        dir.path(),
        "mixed.json",
        r#"[{"Name":"Salvador","CountryCode":"BRA","Population":200},
            {"Name":"Rosario","CountryCode":"ARG","Population":50}]"#,
    );
    write(dir.path(), "more.dat", "Population,CountryCode,Name\n300,BRA,Recife\n");

    let outcome = ingest_directory(dir.path(), &RecordingObserver::default()).unwrap();
    let report = aggregate(&outcome.accumulator);
    let summary = summarize(&outcome.accumulator, &report);

    assert_eq!(summary.total_rows, 4);
    assert_eq!(summary.unique_rows, 3);
    // Recife averages to 200, Salvador is 200.
    assert_eq!(summary.brazil_population, 400.0);
    assert_eq!(summary.largest_population_city.as_deref(), Some("Recife"));
}

#[test]
fn report_does_not_depend_on_file_names() {
    let files = [
        ("Name,CountryCode,Population\nAccra,GHA,2500000\nKumasi,GHA,3300000\n"),
        ("Name,CountryCode,Population\nAccra,GHA,2300000\n"),
        ("Name,CountryCode,Population\nKumasi,GHA,3500000\nTamale,GHA,370000\n"),
    ];

    let run = |names: [&str; 3]| {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in names.iter().zip(files) {
            write(dir.path(), name, contents);
        }
        let outcome = ingest_directory(dir.path(), &RecordingObserver::default()).unwrap();
        aggregate(&outcome.accumulator)
    };

    let a = run(["1.csv", "2.csv", "3.csv"]);
    let b = run(["3.csv", "1.csv", "2.csv"]);
    assert_eq!(a, b);
    let names: Vec<&str> = a.rows().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Accra", "Kumasi", "Tamale"]);
    assert_eq!(a.rows()[0].population, 2_400_000.0);
}
