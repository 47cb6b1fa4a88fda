use serde::Serialize;

use crate::error::AggregationError;
use crate::filter::FilteredView;
use crate::record::Column;
use crate::stats::frequency::{FrequencyTable, mode};

/// Number of trips for one category value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BirthYearStats {
    pub earliest: i32,
    pub most_recent: i32,
    pub most_common: i32,
}

/// Rider demographics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserStats {
    /// Most frequent first.
    pub user_types: Option<Vec<CategoryCount>>,
    /// Most frequent first.
    pub genders: Option<Vec<CategoryCount>>,
    pub birth_years: Option<BirthYearStats>,
}

/// # Errors
///
/// Fails on the first malformed birth year in the view.
#[tracing::instrument(name = "user_stats", skip_all, fields(rows = view.len()))]
pub fn compute(view: &FilteredView<'_>) -> Result<UserStats, AggregationError> {
    let schema = view.table().schema();

    let user_types = schema
        .has(Column::UserType)
        .then(|| value_counts(view.iter().filter_map(|r| r.user_type.as_deref())))
        .flatten();
    let genders = schema
        .has(Column::Gender)
        .then(|| value_counts(view.iter().filter_map(|r| r.gender.as_deref())))
        .flatten();

    let birth_years = if schema.has(Column::BirthYear) {
        let years = view
            .iter()
            .filter_map(|r| r.birth_year.as_ref())
            .map(|cell| cell.get(Column::BirthYear))
            .collect::<Result<Vec<i32>, _>>()?;
        birth_year_stats(&years)
    } else {
        None
    };

    Ok(UserStats {
        user_types,
        genders,
        birth_years,
    })
}

fn value_counts<'a>(values: impl Iterator<Item = &'a str>) -> Option<Vec<CategoryCount>> {
    let table: FrequencyTable<&str> = values.collect();
    if table.is_empty() {
        return None;
    }
    Some(
        table
            .into_sorted()
            .into_iter()
            .map(|(value, count)| CategoryCount {
                value: value.to_string(),
                count,
            })
            .collect(),
    )
}

fn birth_year_stats(years: &[i32]) -> Option<BirthYearStats> {
    Some(BirthYearStats {
        earliest: *years.iter().min()?,
        most_recent: *years.iter().max()?,
        most_common: mode(years.iter().copied())?,
    })
}
