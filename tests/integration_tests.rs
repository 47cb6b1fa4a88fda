use bikeshare_stats::city::City;
use bikeshare_stats::config::StoreConfig;
use bikeshare_stats::error::DataSourceError;
use bikeshare_stats::filter::{self, DayFilter, FilterSpec, FilteredView, MonthFilter};
use bikeshare_stats::output::{report_json, write_report};
use bikeshare_stats::paginate::window;
use bikeshare_stats::record::{Column, RecordStore, TripTable};
use bikeshare_stats::stats::{CategoryCount, Report, StationPair};
use chrono::Weekday;
use std::path::PathBuf;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn store(strict: bool) -> RecordStore {
    RecordStore::new(
        StoreConfig {
            data_dir: fixtures(),
            ..StoreConfig::default()
        }
        .strict(strict),
    )
}

fn load(city: &str) -> TripTable {
    store(false).load(city).expect("Failed to load fixture")
}

fn count(value: &str, count: usize) -> CategoryCount {
    CategoryCount {
        value: value.into(),
        count,
    }
}

#[test]
fn test_full_pipeline_chicago() {
    let table = load("chicago");
    let view = filter::apply(&table, &FilterSpec::default());
    let report = Report::compute(&view);

    assert_eq!(report.trips, 10);
    assert!(report.failures().is_empty());

    let time = report.time.computed().unwrap();
    assert_eq!(time.common_month, Some(1));
    assert_eq!(time.common_day, Some("friday"));
    assert_eq!(time.common_hour, Some(14));

    let stations = report.stations.computed().unwrap();
    assert_eq!(
        stations.common_start.as_deref(),
        Some("Clinton St & Washington Blvd")
    );
    assert_eq!(stations.common_end.as_deref(), Some("Canal St & Madison St"));
    assert_eq!(
        stations.common_trip,
        Some(StationPair {
            start: "Clinton St & Washington Blvd".into(),
            end: "Canal St & Madison St".into(),
        })
    );

    let durations = report.durations.computed().unwrap();
    assert_eq!(durations.total_seconds, Some(6004.0));
    assert!((durations.mean_seconds.unwrap() - 600.4).abs() < 1e-9);

    let users = report.users.computed().unwrap();
    assert_eq!(
        users.user_types,
        Some(vec![count("Subscriber", 9), count("Customer", 1)])
    );
    assert_eq!(users.genders, Some(vec![count("Male", 7), count("Female", 2)]));
    let years = users.birth_years.unwrap();
    assert_eq!(years.earliest, 1975);
    assert_eq!(years.most_recent, 1992);
    assert_eq!(years.most_common, 1992);
}

#[test]
fn test_identity_filter_keeps_every_row() {
    let table = load("chicago");
    let view = filter::apply(&table, &FilterSpec::default());

    assert_eq!(view.len(), table.len());
    for (i, record) in table.records().iter().enumerate() {
        assert_eq!(view.get(i), Some(record));
    }
}

#[test]
fn test_month_and_day_filters() {
    let table = load("chicago");

    let january = filter::apply(&table, &FilterSpec::new(MonthFilter::Only(1), DayFilter::All));
    assert_eq!(january.len(), 3);
    assert!(january.iter().all(|r| r.month() == 1));

    let fridays = filter::apply(
        &table,
        &FilterSpec::new(MonthFilter::All, DayFilter::Only(Weekday::Fri)),
    );
    assert_eq!(fridays.len(), 3);
    assert!(fridays.iter().all(|r| r.day_name() == "friday"));

    let june_mondays = filter::apply(
        &table,
        &FilterSpec::new(MonthFilter::Only(6), DayFilter::Only(Weekday::Mon)),
    );
    assert_eq!(june_mondays.len(), 1);
    assert_eq!(
        june_mondays.get(0).unwrap().start_station.as_deref(),
        Some("Clinton St & Washington Blvd")
    );
}

#[test]
fn test_empty_view_reports_nothing() {
    let table = load("chicago");
    let spec = FilterSpec::new(MonthFilter::Only(2), DayFilter::Only(Weekday::Sun));
    let view = filter::apply(&table, &spec);
    let report = Report::compute(&view);

    assert!(view.is_empty());
    assert!(report.failures().is_empty());
    assert_eq!(report.time.computed().unwrap().common_month, None);
    assert_eq!(report.stations.computed().unwrap().common_trip, None);
    assert_eq!(report.durations.computed().unwrap().mean_seconds, None);
    assert_eq!(report.users.computed().unwrap().birth_years, None);

    let mut buf = Vec::new();
    write_report(&mut buf, City::Chicago, &spec, &report).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("0 trips"));
    assert!(text.contains("Trip Duration data not available in the dataset."));
}

#[test]
fn test_washington_has_no_demographics() {
    let table = load("washington");
    let schema = table.schema();
    assert!(!schema.has(Column::Gender));
    assert!(!schema.has(Column::BirthYear));

    let report = Report::compute(&FilteredView::all(&table));
    let users = report.users.computed().unwrap();
    assert_eq!(
        users.user_types,
        Some(vec![count("Subscriber", 3), count("Customer", 2)])
    );
    assert_eq!(users.genders, None);
    assert_eq!(users.birth_years, None);

    let total = report.durations.computed().unwrap().total_seconds.unwrap();
    assert!((total - 4905.634).abs() < 1e-6);

    let mut buf = Vec::new();
    write_report(&mut buf, City::Washington, &FilterSpec::default(), &report).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("Gender data not available in the dataset."));
    assert!(text.contains("Year of birth data not available in the dataset."));
}

#[test]
fn test_unreadable_rows_are_skipped_by_default() {
    let table = load("new york city");

    assert_eq!(table.len(), 4);
    assert_eq!(table.skipped_rows(), 1);

    let report = Report::compute(&FilteredView::all(&table));
    let users = report.users.computed().unwrap();
    assert_eq!(
        users.user_types,
        Some(vec![count("Subscriber", 2), count("Customer", 1)])
    );
    assert_eq!(users.genders, Some(vec![count("Male", 2)]));
    assert_eq!(users.birth_years.unwrap().most_common, 1998);
}

#[test]
fn test_strict_load_rejects_unreadable_rows() {
    let err = store(true).load("new york city").unwrap_err();
    match err {
        DataSourceError::InvalidRow { line, reason } => {
            assert_eq!(line, 4);
            assert!(reason.contains("not a timestamp"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unknown_city_is_a_data_source_error() {
    let err = store(false).load("boston").unwrap_err();
    assert!(matches!(err, DataSourceError::UnknownCity(_)));
}

#[test]
fn test_pages_partition_the_view() {
    let table = load("chicago");
    let view = filter::apply(&table, &FilterSpec::new(MonthFilter::All, DayFilter::All));

    let first = window(&view, 0, 5);
    let second = window(&view, 5, 5);
    let third = window(&view, 10, 5);

    assert_eq!(first.len(), 5);
    assert_eq!(second.len(), 5);
    assert!(third.is_empty());

    let seen: Vec<_> = first.iter().chain(&second).copied().collect();
    let all: Vec<_> = table.records().iter().collect();
    assert_eq!(seen, all);
}

#[test]
fn test_json_report_includes_rows() {
    let table = load("chicago");
    let spec = FilterSpec::new(MonthFilter::Only(1), DayFilter::All);
    let view = filter::apply(&table, &spec);
    let report = Report::compute(&view);
    let rows = window(&view, 0, 2);

    let json = report_json(City::Chicago, &spec, &report, &rows).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["trips"], 3);
    assert_eq!(value["durations"]["status"], "computed");
    assert_eq!(value["rows"].as_array().unwrap().len(), 2);
    assert_eq!(value["rows"][0]["day"], "wednesday");
    assert_eq!(value["rows"][0]["birth_year"], 1981);
}
