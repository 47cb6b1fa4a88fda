use serde::Serialize;

use crate::filter::FilteredView;
use crate::record::Column;
use crate::stats::frequency::{mode, running_leader};

/// A start/end station combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StationPair {
    pub start: String,
    pub end: String,
}

/// Most popular stations and trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StationStats {
    pub common_start: Option<String>,
    pub common_end: Option<String>,
    pub common_trip: Option<StationPair>,
}

/// Rows with a missing station cell are left out of that column's count and
/// out of the pair count. An empty view yields all fields absent.
#[tracing::instrument(name = "station_stats", skip_all, fields(rows = view.len()))]
pub fn compute(view: &FilteredView<'_>) -> StationStats {
    let schema = view.table().schema();
    let has_start = schema.has(Column::StartStation);
    let has_end = schema.has(Column::EndStation);

    let common_start = has_start
        .then(|| mode(view.iter().filter_map(|r| r.start_station.as_deref())))
        .flatten();
    let common_end = has_end
        .then(|| mode(view.iter().filter_map(|r| r.end_station.as_deref())))
        .flatten();

    let common_trip = (has_start && has_end)
        .then(|| {
            running_leader(view.iter().filter_map(|r| {
                Some((r.start_station.as_deref()?, r.end_station.as_deref()?))
            }))
        })
        .flatten()
        .map(|(start, end)| StationPair {
            start: start.to_string(),
            end: end.to_string(),
        });

    StationStats {
        common_start: common_start.map(str::to_string),
        common_end: common_end.map(str::to_string),
        common_trip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Schema, TripRecord, TripTable};
    use chrono::NaiveDateTime;

    fn trip(start: &str, end: &str) -> TripRecord {
        let ts = NaiveDateTime::parse_from_str("2017-01-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        TripRecord::new(ts).with_stations(start, end)
    }

    #[test]
    fn test_common_stations_and_trip() {
        let table = TripTable::new(
            Schema::full(),
            vec![
                trip("Clark St", "Canal St"),
                trip("State St", "Canal St"),
                trip("Clark St", "Canal St"),
                trip("State St", "Lake Shore"),
                trip("State St", "Wells St"),
            ],
        );
        let stats = compute(&FilteredView::all(&table));

        assert_eq!(stats.common_start.as_deref(), Some("State St"));
        assert_eq!(stats.common_end.as_deref(), Some("Canal St"));
        assert_eq!(
            stats.common_trip,
            Some(StationPair {
                start: "Clark St".into(),
                end: "Canal St".into(),
            })
        );
    }

    #[test]
    fn test_trip_tie_goes_to_first_pair_reaching_max() {
        let table = TripTable::new(
            Schema::full(),
            vec![
                trip("A", "B"),
                trip("C", "D"),
                trip("C", "D"),
                trip("A", "B"),
            ],
        );
        let stats = compute(&FilteredView::all(&table));

        assert_eq!(stats.common_trip.unwrap().start, "C");
        // single-column modes break ties by first occurrence
        assert_eq!(stats.common_start.as_deref(), Some("A"));
    }

    #[test]
    fn test_missing_end_station_column() {
        let table = TripTable::new(
            Schema::full().without(Column::EndStation),
            vec![trip("A", "B"), trip("A", "C")],
        );
        let stats = compute(&FilteredView::all(&table));

        assert_eq!(stats.common_start.as_deref(), Some("A"));
        assert_eq!(stats.common_end, None);
        assert_eq!(stats.common_trip, None);
    }

    #[test]
    fn test_empty_view() {
        let table = TripTable::new(Schema::full(), vec![]);
        assert_eq!(
            compute(&FilteredView::all(&table)),
            StationStats::default()
        );
    }
}
