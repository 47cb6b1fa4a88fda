//! Descriptive statistics over per-city bikeshare trip data.
//!
//! City CSV files are loaded into a [`record::TripTable`], narrowed by month
//! and day of week with [`filter::apply`], and summarised by the four groups
//! in [`stats`].

pub mod city;
pub mod config;
pub mod error;
pub mod filter;
pub mod format;
pub mod output;
pub mod paginate;
pub mod record;
pub mod session;
pub mod stats;
