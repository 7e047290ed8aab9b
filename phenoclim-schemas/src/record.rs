use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// One calendar day of station observations after normalization.
///
/// `year`, `month` and `doy` are always derived from `date`; construct records through
/// [`DailyRecord::new`] so they cannot disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    /// Day of year, 1-based.
    pub doy: u32,
    /// Daily mean temperature, °C.
    pub tam: Option<f64>,
    /// Daily minimum temperature, °C.
    pub tan: Option<f64>,
    /// Daily maximum temperature, °C.
    pub tax: Option<f64>,
    /// Precipitation, mm.
    pub rr: Option<f64>,
}

impl DailyRecord {
    pub fn new(
        date: NaiveDate,
        tam: Option<f64>,
        tan: Option<f64>,
        tax: Option<f64>,
        rr: Option<f64>,
    ) -> Self {
        Self {
            date,
            year: date.year(),
            month: date.month(),
            doy: date.ordinal(),
            tam,
            tan,
            tax,
            rr,
        }
    }

    /// A calendar day with no observation at all.
    pub fn empty(date: NaiveDate) -> Self {
        Self::new(date, None, None, None, None)
    }

    /// Positive part of the mean temperature; absent stays absent.
    pub fn thawing_degrees(&self) -> Option<f64> {
        self.tam.map(|t| t.max(0.0))
    }
}
