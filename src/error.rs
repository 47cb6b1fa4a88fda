//! Error types for loading trip data and computing statistics.

use serde::{Serialize, Serializer};
use std::path::PathBuf;
use thiserror::Error;

/// Failure to produce a [`TripTable`](crate::record::TripTable) for a city.
///
/// Fatal to the current run only; the session reports it and moves on to the
/// restart question.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("unknown city '{0}' (expected one of: chicago, new york city, washington)")]
    UnknownCity(String),

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} has no '{column}' column", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("line {line}: {reason}")]
    InvalidRow { line: u64, reason: String },
}

/// Failure inside a single aggregator group.
///
/// Never aborts the other groups of a report.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregationError {
    #[error("malformed value '{raw}' in column '{column}'")]
    MalformedValue { column: &'static str, raw: String },

    #[error("sum of column '{column}' is not a finite number")]
    NonFinite { column: &'static str },
}

impl Serialize for AggregationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
