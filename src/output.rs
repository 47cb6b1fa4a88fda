//! Rendering of reports and trip pages for the console.
//!
//! Supports a plain-text report, a JSON report, and tabular pages of raw
//! trips. Absent statistics are printed as explicit notices.

use serde::Serialize;
use std::io::{self, Write};
use tracing::debug;

use crate::city::City;
use crate::filter::{FilterSpec, month_name};
use crate::format::format_duration;
use crate::record::{Column, Parsed, Schema, TripRecord};
use crate::stats::{
    CategoryCount, DurationStats, Outcome, Report, StationStats, TimeStats, UserStats,
};

pub const RULE: &str = "----------------------------------------";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn not_available(out: &mut impl Write, what: &str) -> io::Result<()> {
    writeln!(out, "{what} data not available in the dataset.")
}

/// Writes every statistic group of `report` as text.
pub fn write_report(
    out: &mut impl Write,
    city: City,
    spec: &FilterSpec,
    report: &Report,
) -> io::Result<()> {
    writeln!(
        out,
        "Statistics for {city} (month: {}, day: {}), {} trips",
        spec.month, spec.day, report.trips
    )?;
    writeln!(out, "{RULE}")?;

    section(
        out,
        "Calculating The Most Frequent Times of Travel...",
        &report.time,
        write_time,
    )?;
    section(
        out,
        "Calculating The Most Popular Stations and Trip...",
        &report.stations,
        write_stations,
    )?;
    section(
        out,
        "Calculating Trip Duration...",
        &report.durations,
        write_durations,
    )?;
    section(out, "Calculating User Stats...", &report.users, write_users)?;
    Ok(())
}

fn section<W: Write, T>(
    out: &mut W,
    heading: &str,
    outcome: &Outcome<T>,
    body: fn(&mut W, &T) -> io::Result<()>,
) -> io::Result<()> {
    writeln!(out, "\n{heading}\n")?;
    match outcome {
        Outcome::Computed(stats) => body(out, stats)?,
        Outcome::Failed(e) => writeln!(out, "An error occurred: {e}")?,
    }
    writeln!(out, "{RULE}")
}

fn write_time<W: Write>(out: &mut W, stats: &TimeStats) -> io::Result<()> {
    match stats.common_month.and_then(month_name) {
        Some(month) => writeln!(out, "The most common month for travel is: {month}")?,
        None => not_available(out, "Month")?,
    }
    match stats.common_day {
        Some(day) => writeln!(out, "The most common day of the week for travel is: {day}")?,
        None => not_available(out, "Day of the week")?,
    }
    match stats.common_hour {
        Some(hour) => writeln!(out, "The most common start hour for travel is: {hour}")?,
        None => not_available(out, "Start Time")?,
    }
    Ok(())
}

fn write_stations<W: Write>(out: &mut W, stats: &StationStats) -> io::Result<()> {
    match &stats.common_start {
        Some(s) => writeln!(out, "The most common start station is: {s}")?,
        None => not_available(out, "Start Station")?,
    }
    match &stats.common_end {
        Some(s) => writeln!(out, "The most common end station is: {s}")?,
        None => not_available(out, "End Station")?,
    }
    match &stats.common_trip {
        Some(pair) => writeln!(
            out,
            "The most frequent combination of start and end station is from '{}' to '{}'",
            pair.start, pair.end
        )?,
        None => not_available(out, "Start Station or End Station")?,
    }
    Ok(())
}

fn write_durations<W: Write>(out: &mut W, stats: &DurationStats) -> io::Result<()> {
    match stats.total_seconds {
        Some(total) => writeln!(out, "Total travel time: {}", format_duration(total))?,
        None => not_available(out, "Trip Duration")?,
    }
    match stats.mean_seconds {
        Some(mean) => writeln!(out, "Mean travel time: {}", format_duration(mean))?,
        None => not_available(out, "Trip Duration")?,
    }
    Ok(())
}

fn write_users<W: Write>(out: &mut W, stats: &UserStats) -> io::Result<()> {
    write_counts(out, "Counts of user types:", "User Type", stats.user_types.as_deref())?;
    writeln!(out)?;
    write_counts(out, "Counts of gender:", "Gender", stats.genders.as_deref())?;
    writeln!(out)?;
    match &stats.birth_years {
        Some(years) => {
            writeln!(out, "Year of birth statistics:")?;
            writeln!(out, "Earliest birth year: {}", years.earliest)?;
            writeln!(out, "Most recent birth year: {}", years.most_recent)?;
            writeln!(out, "Most common birth year: {}", years.most_common)?;
        }
        None => not_available(out, "Year of birth")?,
    }
    Ok(())
}

fn write_counts<W: Write>(
    out: &mut W,
    title: &str,
    what: &str,
    counts: Option<&[CategoryCount]>,
) -> io::Result<()> {
    let Some(counts) = counts else {
        return not_available(out, what);
    };
    writeln!(out, "{title}")?;
    for c in counts {
        writeln!(out, "{}: {}", c.value, c.count)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    city: City,
    filter: &'a FilterSpec,
    #[serde(flatten)]
    report: &'a Report,
    #[serde(skip_serializing_if = "no_rows")]
    rows: &'a [&'a TripRecord],
}

fn no_rows(rows: &&[&TripRecord]) -> bool {
    rows.is_empty()
}

/// Serializes a report, and optionally a page of raw trips, as pretty JSON.
pub fn report_json(
    city: City,
    spec: &FilterSpec,
    report: &Report,
    rows: &[&TripRecord],
) -> serde_json::Result<String> {
    let doc = ReportDocument {
        city,
        filter: spec,
        report,
        rows,
    };
    serde_json::to_string_pretty(&doc)
}

/// Writes one page of trips as an aligned table, numbering rows from
/// `offset`. Only columns in `schema` are shown.
pub fn write_page(
    out: &mut impl Write,
    schema: Schema,
    offset: usize,
    records: &[&TripRecord],
) -> io::Result<()> {
    debug!(offset, rows = records.len(), "Writing page");

    let mut header = vec!["#".to_string(), "Start Time".to_string()];
    header.extend(schema.columns().map(|c| c.header().to_string()));

    let rows: Vec<Vec<String>> = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let mut cells = vec![
                (offset + i).to_string(),
                r.start_time.format(TIME_FORMAT).to_string(),
            ];
            cells.extend(schema.columns().map(|c| cell_text(r, c)));
            cells
        })
        .collect();

    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            rows.iter()
                .map(|row| row[col].chars().count())
                .chain(std::iter::once(header[col].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    for row in std::iter::once(&header).chain(&rows) {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:<w$}"))
            .collect();
        writeln!(out, "{}", line.join("  ").trim_end())?;
    }
    Ok(())
}

fn cell_text(record: &TripRecord, column: Column) -> String {
    fn parsed<T>(cell: &Option<Parsed<T>>, show: impl Fn(&T) -> String) -> String {
        match cell {
            Some(Parsed::Value(v)) => show(v),
            Some(Parsed::Malformed(raw)) => raw.clone(),
            None => String::new(),
        }
    }

    match column {
        Column::EndTime => parsed(&record.end_time, |t| t.format(TIME_FORMAT).to_string()),
        Column::TripDuration => parsed(&record.trip_duration, |d| d.to_string()),
        Column::StartStation => record.start_station.clone().unwrap_or_default(),
        Column::EndStation => record.end_station.clone().unwrap_or_default(),
        Column::UserType => record.user_type.clone().unwrap_or_default(),
        Column::Gender => record.gender.clone().unwrap_or_default(),
        Column::BirthYear => parsed(&record.birth_year, |y| y.to_string()),
    }
}
