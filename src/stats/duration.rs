use serde::Serialize;

use crate::error::AggregationError;
use crate::filter::FilteredView;
use crate::record::Column;

/// Total and average trip duration, in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DurationStats {
    pub total_seconds: Option<f64>,
    pub mean_seconds: Option<f64>,
}

/// Both fields are absent when the column is unavailable or the view holds
/// no durations; the mean never divides by zero.
///
/// # Errors
///
/// Fails on the first malformed duration cell, or if the total overflows.
#[tracing::instrument(name = "duration_stats", skip_all, fields(rows = view.len()))]
pub fn compute(view: &FilteredView<'_>) -> Result<DurationStats, AggregationError> {
    if !view.table().schema().has(Column::TripDuration) {
        return Ok(DurationStats::default());
    }

    let mut total = 0.0;
    let mut count = 0usize;
    for cell in view.iter().filter_map(|r| r.trip_duration.as_ref()) {
        total += cell.get(Column::TripDuration)?;
        count += 1;
    }

    if count == 0 {
        return Ok(DurationStats::default());
    }
    if !total.is_finite() {
        return Err(AggregationError::NonFinite {
            column: Column::TripDuration.header(),
        });
    }

    Ok(DurationStats {
        total_seconds: Some(total),
        mean_seconds: Some(total / count as f64),
    })
}
