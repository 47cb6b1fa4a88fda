//! Month and day-of-week filtering.

use chrono::{Month, Weekday};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::record::{TripRecord, TripTable, day_name, parse_day_name};

/// Months covered by the datasets, January through June.
const MONTH_NAMES: [&str; 6] = ["january", "february", "march", "april", "may", "june"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{input}' is not a valid {kind} (expected {expected})")]
pub struct SelectorError {
    kind: &'static str,
    input: String,
    expected: &'static str,
}

/// Lowercase English name of a month number, if it is 1 to 12.
pub fn month_name(month: u32) -> Option<String> {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name().to_lowercase())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthFilter {
    #[default]
    All,
    /// Month number, 1 to 6.
    Only(u32),
}

impl MonthFilter {
    pub const CHOICES: &'static str = "all, january, february, march, april, may, june";

    fn matches(self, record: &TripRecord) -> bool {
        match self {
            MonthFilter::All => true,
            MonthFilter::Only(m) => record.month() == m,
        }
    }
}

impl FromStr for MonthFilter {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "all" {
            return Ok(MonthFilter::All);
        }
        MONTH_NAMES
            .iter()
            .position(|name| *name == s)
            .map(|i| MonthFilter::Only(i as u32 + 1))
            .ok_or(SelectorError {
                kind: "month",
                input: s,
                expected: Self::CHOICES,
            })
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthFilter::All => f.write_str("all"),
            MonthFilter::Only(m) => {
                f.write_str(month_name(*m).as_deref().unwrap_or("unknown month"))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DayFilter {
    #[default]
    All,
    Only(Weekday),
}

impl DayFilter {
    pub const CHOICES: &'static str =
        "all, monday, tuesday, wednesday, thursday, friday, saturday, sunday";

    fn matches(self, record: &TripRecord) -> bool {
        match self {
            DayFilter::All => true,
            DayFilter::Only(d) => record.day() == d,
        }
    }
}

impl FromStr for DayFilter {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "all" {
            return Ok(DayFilter::All);
        }
        parse_day_name(&s).map(DayFilter::Only).ok_or(SelectorError {
            kind: "day",
            input: s,
            expected: Self::CHOICES,
        })
    }
}

impl fmt::Display for DayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayFilter::All => f.write_str("all"),
            DayFilter::Only(d) => f.write_str(day_name(*d)),
        }
    }
}

impl Serialize for DayFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Month and day predicates for one run. Both must hold for a row to pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    pub month: MonthFilter,
    pub day: DayFilter,
}

impl FilterSpec {
    pub fn new(month: MonthFilter, day: DayFilter) -> Self {
        Self { month, day }
    }

    pub fn matches(&self, record: &TripRecord) -> bool {
        self.month.matches(record) && self.day.matches(record)
    }
}

/// The rows of a [`TripTable`] that passed a [`FilterSpec`], in table order.
///
/// Borrows the table immutably, so the view cannot change under an
/// aggregator.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a TripTable,
    rows: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// A view over every row of `table`.
    pub fn all(table: &'a TripTable) -> Self {
        Self {
            table,
            rows: (0..table.len()).collect(),
        }
    }

    pub fn table(&self) -> &'a TripTable {
        self.table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a TripRecord> {
        let table = self.table;
        self.rows.get(index).map(|&i| &table.records()[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a TripRecord> + '_ {
        let records = self.table.records();
        self.rows.iter().map(move |&i| &records[i])
    }
}

/// Selects the rows of `table` matching `spec`. An empty result is not an
/// error.
#[tracing::instrument(skip(table), fields(rows = table.len()))]
pub fn apply<'a>(table: &'a TripTable, spec: &FilterSpec) -> FilteredView<'a> {
    let rows: Vec<usize> = table
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| spec.matches(r))
        .map(|(i, _)| i)
        .collect();

    debug!(kept = rows.len(), "Filter applied");
    FilteredView { table, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Schema;
    use chrono::NaiveDateTime;

    fn trip(ts: &str) -> TripRecord {
        TripRecord::new(NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S").unwrap())
    }

    fn table() -> TripTable {
        TripTable::new(
            Schema::default(),
            vec![
                trip("2017-01-02 08:00:00"), // monday
                trip("2017-01-03 09:00:00"), // tuesday
                trip("2017-03-06 10:00:00"), // monday
                trip("2017-03-07 11:00:00"), // tuesday
                trip("2017-06-05 12:00:00"), // monday
            ],
        )
    }

    #[test]
    fn test_all_all_is_identity() {
        let table = table();
        let view = apply(&table, &FilterSpec::default());

        assert_eq!(view.len(), table.len());
        let kept: Vec<_> = view.iter().collect();
        let all: Vec<_> = table.records().iter().collect();
        assert_eq!(kept, all);
    }

    #[test]
    fn test_month_filter() {
        let table = table();
        let spec = FilterSpec::new(MonthFilter::Only(3), DayFilter::All);
        let view = apply(&table, &spec);

        assert_eq!(view.len(), 2);
        assert!(view.iter().all(|r| r.month() == 3));
    }

    #[test]
    fn test_day_filter() {
        let table = table();
        let spec = FilterSpec::new(MonthFilter::All, DayFilter::Only(Weekday::Mon));
        let view = apply(&table, &spec);

        assert_eq!(view.len(), 3);
        assert!(view.iter().all(|r| r.day_name() == "monday"));
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let table = table();
        let spec = FilterSpec::new(MonthFilter::Only(3), DayFilter::Only(Weekday::Tue));
        let view = apply(&table, &spec);

        assert_eq!(view.len(), 1);
        assert_eq!(view.get(0).unwrap().hour(), 11);
    }

    #[test]
    fn test_no_match_is_empty_view() {
        let table = table();
        let spec = FilterSpec::new(MonthFilter::Only(2), DayFilter::All);
        let view = apply(&table, &spec);

        assert!(view.is_empty());
        assert!(view.get(0).is_none());
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn test_parse_selectors() {
        assert_eq!(" March ".parse::<MonthFilter>().unwrap(), MonthFilter::Only(3));
        assert_eq!("all".parse::<MonthFilter>().unwrap(), MonthFilter::All);
        assert!("july".parse::<MonthFilter>().is_err());

        assert_eq!(
            "Saturday".parse::<DayFilter>().unwrap(),
            DayFilter::Only(Weekday::Sat)
        );
        assert!("funday".parse::<DayFilter>().is_err());
    }

    #[test]
    fn test_display_selectors() {
        assert_eq!(MonthFilter::Only(6).to_string(), "june");
        assert_eq!(DayFilter::Only(Weekday::Thu).to_string(), "thursday");
        assert_eq!(DayFilter::All.to_string(), "all");
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1).as_deref(), Some("january"));
        assert_eq!(month_name(13), None);
    }
}
