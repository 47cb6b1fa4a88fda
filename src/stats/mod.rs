//! Descriptive statistics over a filtered view of trips.
//!
//! Four independent groups are computed: travel times, stations, trip
//! durations and rider demographics. A [`Report`] holds all four, and a
//! failure in one group is recorded next to the others instead of aborting
//! them.

pub mod duration;
pub mod frequency;
pub mod station;
pub mod time;
pub mod user;

pub use duration::DurationStats;
pub use station::{StationPair, StationStats};
pub use time::TimeStats;
pub use user::{BirthYearStats, CategoryCount, UserStats};

use serde::Serialize;
use tracing::{error, info};

use crate::error::AggregationError;
use crate::filter::FilteredView;

/// Result of one aggregator group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Outcome<T> {
    Computed(T),
    Failed(AggregationError),
}

impl<T> Outcome<T> {
    pub fn computed(&self) -> Option<&T> {
        match self {
            Outcome::Computed(v) => Some(v),
            Outcome::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

impl<T> From<Result<T, AggregationError>> for Outcome<T> {
    fn from(result: Result<T, AggregationError>) -> Self {
        match result {
            Ok(v) => Outcome::Computed(v),
            Err(e) => Outcome::Failed(e),
        }
    }
}

/// All statistic groups for one filtered view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub trips: usize,
    pub time: Outcome<TimeStats>,
    pub stations: Outcome<StationStats>,
    pub durations: Outcome<DurationStats>,
    pub users: Outcome<UserStats>,
}

impl Report {
    #[tracing::instrument(name = "report", skip_all, fields(rows = view.len()))]
    pub fn compute(view: &FilteredView<'_>) -> Self {
        let report = Report {
            trips: view.len(),
            time: Outcome::Computed(time::compute(view)),
            stations: Outcome::Computed(station::compute(view)),
            durations: duration::compute(view).into(),
            users: user::compute(view).into(),
        };

        for (group, failure) in report.failures() {
            error!(group, error = %failure, "Statistic group failed");
        }
        info!(trips = report.trips, "Report computed");
        report
    }

    /// Groups that failed, by name.
    pub fn failures(&self) -> Vec<(&'static str, &AggregationError)> {
        fn failed<T>(o: &Outcome<T>) -> Option<&AggregationError> {
            match o {
                Outcome::Failed(e) => Some(e),
                Outcome::Computed(_) => None,
            }
        }

        [
            ("time", failed(&self.time)),
            ("stations", failed(&self.stations)),
            ("durations", failed(&self.durations)),
            ("users", failed(&self.users)),
        ]
        .into_iter()
        .filter_map(|(name, e)| e.map(|e| (name, e)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Parsed, Schema, TripRecord, TripTable};
    use chrono::NaiveDateTime;

    fn trip() -> TripRecord {
        let ts = NaiveDateTime::parse_from_str("2017-04-10 07:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
        TripRecord::new(ts)
            .with_stations("A", "B")
            .with_duration(60.0)
            .with_rider("Subscriber", "Male", 1990)
    }

    #[test]
    fn test_empty_view_reports_all_absent() {
        let table = TripTable::new(Schema::full(), vec![]);
        let report = Report::compute(&FilteredView::all(&table));

        assert_eq!(report.trips, 0);
        assert_eq!(report.time, Outcome::Computed(TimeStats::default()));
        assert_eq!(report.stations, Outcome::Computed(StationStats::default()));
        assert_eq!(report.durations, Outcome::Computed(DurationStats::default()));
        assert_eq!(report.users, Outcome::Computed(UserStats::default()));
        assert!(report.failures().is_empty());
    }

    #[test]
    fn test_failed_group_does_not_block_others() {
        let mut bad = trip();
        bad.trip_duration = Some(Parsed::Malformed("n/a".into()));
        let table = TripTable::new(Schema::full(), vec![trip(), bad]);
        let report = Report::compute(&FilteredView::all(&table));

        assert!(report.durations.is_failed());
        assert_eq!(report.time.computed().unwrap().common_hour, Some(7));
        assert_eq!(
            report.stations.computed().unwrap().common_start.as_deref(),
            Some("A")
        );
        assert!(report.users.computed().unwrap().birth_years.is_some());

        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, "durations");
    }

    #[test]
    fn test_outcome_serialization() {
        let ok: Outcome<DurationStats> = Outcome::Computed(DurationStats::default());
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["status"], "computed");

        let failed: Outcome<DurationStats> = Outcome::Failed(AggregationError::NonFinite {
            column: "Trip Duration",
        });
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "failed");
        assert!(json["value"].as_str().unwrap().contains("Trip Duration"));
    }
}
