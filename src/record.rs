//! Trip records and the CSV-backed record store.
//!
//! A city file is read once into a [`TripTable`]. Which optional columns the
//! table carries is decided by the CSV header and recorded in its [`Schema`],
//! so aggregators check availability up front instead of probing rows.

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Serialize, Serializer};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::city::City;
use crate::config::StoreConfig;
use crate::error::{AggregationError, DataSourceError};

pub const START_TIME: &str = "Start Time";

/// Earliest birth year accepted as plausible.
pub const MIN_BIRTH_YEAR: i32 = 1850;

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const DAY_NAMES: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Lowercase day name, Monday first.
pub fn day_name(day: Weekday) -> &'static str {
    DAY_NAMES[day.num_days_from_monday() as usize]
}

/// Parses a lowercase or mixed-case day name into a [`Weekday`].
pub fn parse_day_name(s: &str) -> Option<Weekday> {
    let s = s.trim().to_lowercase();
    DAY_NAMES
        .iter()
        .position(|name| *name == s)
        .and_then(|i| Weekday::try_from(i as u8).ok())
}

/// Optional columns a city file may or may not provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    EndTime,
    TripDuration,
    StartStation,
    EndStation,
    UserType,
    Gender,
    BirthYear,
}

impl Column {
    pub const COUNT: usize = 7;

    pub const ALL: [Column; Column::COUNT] = [
        Column::EndTime,
        Column::TripDuration,
        Column::StartStation,
        Column::EndStation,
        Column::UserType,
        Column::Gender,
        Column::BirthYear,
    ];

    /// CSV header naming this column.
    pub fn header(self) -> &'static str {
        match self {
            Column::EndTime => "End Time",
            Column::TripDuration => "Trip Duration",
            Column::StartStation => "Start Station",
            Column::EndStation => "End Station",
            Column::UserType => "User Type",
            Column::Gender => "Gender",
            Column::BirthYear => "Birth Year",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Which optional columns a table carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Schema {
    available: [bool; Column::COUNT],
}

impl Schema {
    /// A schema with every optional column available.
    pub fn full() -> Self {
        Self {
            available: [true; Column::COUNT],
        }
    }

    pub fn with(mut self, column: Column) -> Self {
        self.available[column.index()] = true;
        self
    }

    pub fn without(mut self, column: Column) -> Self {
        self.available[column.index()] = false;
        self
    }

    pub fn has(&self, column: Column) -> bool {
        self.available[column.index()]
    }

    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        Column::ALL.into_iter().filter(|c| self.has(*c))
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.columns().map(Column::header))
    }
}

/// A typed cell that keeps its raw text when it fails validation.
///
/// Malformed cells survive loading so that only the aggregator reading the
/// column fails, not the whole load.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Parsed<T> {
    Value(T),
    Malformed(String),
}

impl<T: Copy> Parsed<T> {
    fn from_text(raw: &str, parse: impl Fn(&str) -> Option<T>) -> Self {
        match parse(raw) {
            Some(v) => Parsed::Value(v),
            None => Parsed::Malformed(raw.to_string()),
        }
    }

    /// Returns the value, or an [`AggregationError`] naming `column`.
    pub fn get(&self, column: Column) -> Result<T, AggregationError> {
        match self {
            Parsed::Value(v) => Ok(*v),
            Parsed::Malformed(raw) => Err(AggregationError::MalformedValue {
                column: column.header(),
                raw: raw.clone(),
            }),
        }
    }
}

/// One bicycle rental.
///
/// Month, day of week and hour are derived from `start_time` on construction
/// and cannot drift from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRecord {
    pub start_time: NaiveDateTime,
    pub end_time: Option<Parsed<NaiveDateTime>>,
    pub trip_duration: Option<Parsed<f64>>,
    pub start_station: Option<String>,
    pub end_station: Option<String>,
    pub user_type: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<Parsed<i32>>,
    month: u32,
    #[serde(serialize_with = "serialize_day")]
    day: Weekday,
    hour: u32,
}

fn serialize_day<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(day_name(*day))
}

impl TripRecord {
    pub fn new(start_time: NaiveDateTime) -> Self {
        TripRecord {
            start_time,
            end_time: None,
            trip_duration: None,
            start_station: None,
            end_station: None,
            user_type: None,
            gender: None,
            birth_year: None,
            month: start_time.month(),
            day: start_time.weekday(),
            hour: start_time.hour(),
        }
    }

    /// Month of the start time, 1 to 12.
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> Weekday {
        self.day
    }

    pub fn day_name(&self) -> &'static str {
        day_name(self.day)
    }

    /// Hour of the start time, 0 to 23.
    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn with_stations(mut self, start: &str, end: &str) -> Self {
        self.start_station = Some(start.to_string());
        self.end_station = Some(end.to_string());
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.trip_duration = Some(Parsed::Value(seconds));
        self
    }

    pub fn with_rider(mut self, user_type: &str, gender: &str, birth_year: i32) -> Self {
        self.user_type = Some(user_type.to_string());
        self.gender = Some(gender.to_string());
        self.birth_year = Some(Parsed::Value(birth_year));
        self
    }
}

/// What to do with a row whose start time cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowPolicy {
    /// Drop the row, log it and count it in [`TripTable::skipped_rows`].
    #[default]
    Skip,
    /// Fail the whole load with [`DataSourceError::InvalidRow`].
    Reject,
}

/// All trips of one city, in file order.
#[derive(Debug, Clone, Default)]
pub struct TripTable {
    schema: Schema,
    records: Vec<TripRecord>,
    skipped_rows: usize,
}

impl TripTable {
    pub fn new(schema: Schema, records: Vec<TripRecord>) -> Self {
        Self {
            schema,
            records,
            skipped_rows: 0,
        }
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows dropped under [`RowPolicy::Skip`].
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}

/// Loads city files from a data directory.
#[derive(Debug, Clone)]
pub struct RecordStore {
    config: StoreConfig,
}

impl RecordStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Loads the table for a city selector key such as `"new york city"`.
    pub fn load(&self, city_key: &str) -> Result<TripTable, DataSourceError> {
        let city: City = city_key.parse()?;
        self.load_city(city)
    }

    #[tracing::instrument(skip(self, city), fields(city = %city))]
    pub fn load_city(&self, city: City) -> Result<TripTable, DataSourceError> {
        let path = self.config.data_dir.join(city.file_name());
        debug!(path = %path.display(), "Opening city file");

        let file = File::open(&path).map_err(|source| DataSourceError::Io {
            path: path.clone(),
            source,
        })?;

        let table = read_table(file, &path, self.config.row_policy)?;
        info!(
            rows = table.len(),
            skipped = table.skipped_rows(),
            columns = table.schema().columns().count(),
            "City data loaded"
        );
        Ok(table)
    }
}

/// Reads a trip table from CSV. `path` is only used in error messages.
pub fn read_table<R: Read>(
    reader: R,
    path: &Path,
    policy: RowPolicy,
) -> Result<TripTable, DataSourceError> {
    let csv_err = |source: csv::Error| DataSourceError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = rdr.headers().map_err(csv_err)?.clone();
    let layout = Layout::from_headers(&headers, path)?;

    let mut records = Vec::new();
    let mut skipped_rows = 0;

    for result in rdr.records() {
        let row = result.map_err(csv_err)?;
        let line = row.position().map_or(0, |p| p.line());

        match layout.parse_row(&row) {
            Ok(record) => records.push(record),
            Err(reason) => match policy {
                RowPolicy::Skip => {
                    warn!(line, %reason, "Skipping unparseable row");
                    skipped_rows += 1;
                }
                RowPolicy::Reject => return Err(DataSourceError::InvalidRow { line, reason }),
            },
        }
    }

    Ok(TripTable {
        schema: layout.schema(),
        records,
        skipped_rows,
    })
}

/// Header positions of the columns we read.
struct Layout {
    start_time: usize,
    optional: [Option<usize>; Column::COUNT],
}

impl Layout {
    fn from_headers(headers: &StringRecord, path: &Path) -> Result<Self, DataSourceError> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let start_time = position(START_TIME).ok_or_else(|| DataSourceError::MissingColumn {
            path: path.to_path_buf(),
            column: START_TIME,
        })?;

        let mut optional = [None; Column::COUNT];
        for column in Column::ALL {
            optional[column.index()] = position(column.header());
        }

        Ok(Self {
            start_time,
            optional,
        })
    }

    fn schema(&self) -> Schema {
        Column::ALL
            .into_iter()
            .filter(|c| self.optional[c.index()].is_some())
            .fold(Schema::default(), Schema::with)
    }

    /// Non-empty text of an optional cell.
    fn cell<'r>(&self, row: &'r StringRecord, column: Column) -> Option<&'r str> {
        self.optional[column.index()]
            .and_then(|i| row.get(i))
            .filter(|s| !s.is_empty())
    }

    fn parse_row(&self, row: &StringRecord) -> Result<TripRecord, String> {
        let raw = row.get(self.start_time).unwrap_or_default();
        let start = parse_timestamp(raw).ok_or_else(|| format!("unparseable start time '{raw}'"))?;

        let text = |column| self.cell(row, column).map(str::to_string);

        let mut record = TripRecord::new(start);
        record.end_time = self
            .cell(row, Column::EndTime)
            .map(|s| Parsed::from_text(s, parse_timestamp));
        record.trip_duration = self
            .cell(row, Column::TripDuration)
            .map(|s| Parsed::from_text(s, parse_duration));
        record.start_station = text(Column::StartStation);
        record.end_station = text(Column::EndStation);
        record.user_type = text(Column::UserType);
        record.gender = text(Column::Gender);
        record.birth_year = self
            .cell(row, Column::BirthYear)
            .map(|s| Parsed::from_text(s, parse_birth_year));
        Ok(record)
    }
}

pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Non-negative, finite seconds. Fractions are allowed.
fn parse_duration(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

/// Integral year between [`MIN_BIRTH_YEAR`] and the current year. Accepts
/// float notation such as `1992.0`.
fn parse_birth_year(s: &str) -> Option<i32> {
    let v = s.parse::<f64>().ok().filter(|v| v.is_finite() && v.fract() == 0.0)?;
    let current = chrono::Local::now().year();
    let year = v as i32;
    (MIN_BIRTH_YEAR..=current).contains(&year).then_some(year)
}
