use serde::Serialize;

use crate::filter::FilteredView;
use crate::stats::frequency::mode;

/// Most frequent times of travel.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeStats {
    /// Month number, 1 to 12.
    pub common_month: Option<u32>,
    pub common_day: Option<&'static str>,
    /// Start hour, 0 to 23.
    pub common_hour: Option<u32>,
}

/// Month, day and hour are derived from the required start time, so only an
/// empty view leaves these fields absent.
#[tracing::instrument(name = "time_stats", skip_all, fields(rows = view.len()))]
pub fn compute(view: &FilteredView<'_>) -> TimeStats {
    TimeStats {
        common_month: mode(view.iter().map(|r| r.month())),
        common_day: mode(view.iter().map(|r| r.day_name())),
        common_hour: mode(view.iter().map(|r| r.hour())),
    }
}
