//! Raw rows of the input tables, before any cleaning.

use serde::Deserialize;

/// Column names of the daily station table.
pub const STATION_DATE: &str = "Date";
pub const STATION_TAM: &str = "TAM";
pub const STATION_TAN: &str = "TAN";
pub const STATION_TAX: &str = "TAX";
pub const STATION_RR: &str = "RR";

/// One line of the daily station table, fields kept as text so that sentinel
/// encodings can be recognised before they are parsed.
#[derive(Debug, Clone, Deserialize)]
pub struct StationRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "TAM", default)]
    pub tam: String,
    #[serde(rename = "TAN", default)]
    pub tan: String,
    #[serde(rename = "TAX", default)]
    pub tax: String,
    #[serde(rename = "RR", default)]
    pub rr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarRow {
    #[serde(rename = "Date")]
    pub date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JulyRow {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "TXX", alias = "Tmax", default)]
    pub highest_max: String,
    #[serde(rename = "TAM", alias = "Tmean", default)]
    pub mean: String,
    #[serde(rename = "TNN", alias = "Tmin", default)]
    pub lowest_min: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedsetRow {
    #[serde(rename = "Plot")]
    pub plot: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Flowers")]
    pub flowers: u32,
    #[serde(rename = "Seedset")]
    pub seedset: u32,
}
