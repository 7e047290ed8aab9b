//! Per-year climate indices derived from the daily table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// First day opening and last day closing a run of warm days within one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowingSeasonBounds {
    pub year: i32,
    pub start_doy: Option<u32>,
    pub end_doy: Option<u32>,
}

/// Earliest season start and latest season end over all years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowingSeasonEnvelope {
    pub earliest_start_doy: u32,
    pub latest_end_doy: u32,
    pub years: usize,
}

/// Accumulated thawing degree days for one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DegreeDaySum {
    pub year: i32,
    pub tdd: f64,
}

/// The latest frost day of a year's analysis window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LastFrostEvent {
    pub year: i32,
    pub date: NaiveDate,
    pub doy: u32,
    /// Minimum temperature on that day, °C.
    pub tan: f64,
}

/// Days whose accumulated TDD lies inside the flowering window, and the coldest
/// minimum temperature among them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloweringWindow {
    pub year: i32,
    pub first_doy: u32,
    pub last_doy: u32,
    pub days: usize,
    pub min_tan: f64,
}

/// July temperature extremes and mean for one year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JulySummary {
    pub year: i32,
    /// Highest daily maximum, °C.
    pub highest_max: Option<f64>,
    /// Monthly mean of the daily mean, °C.
    pub mean: Option<f64>,
    /// Lowest daily minimum, °C.
    pub lowest_min: Option<f64>,
}
