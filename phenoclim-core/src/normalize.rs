//! Turns the raw station table into one record per calendar day with absent values
//! made explicit.

use crate::error::PhenoclimError;
use chrono::{Datelike, NaiveDate};
use log::{debug, info, warn};
use phenoclim_schemas::{
    file_formats::{
        CalendarRow, StationRow, STATION_DATE, STATION_RR, STATION_TAM, STATION_TAN, STATION_TAX,
    },
    record::DailyRecord,
};
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Temperature value the station uses for "not measured".
pub const TEMPERATURE_SENTINEL: f64 = -99.9;

/// Parses a numeric field. Empty text, a lone `-` and anything unparseable are absent.
/// A decimal comma is accepted.
pub fn parse_value(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() || text == "-" {
        return None;
    }
    text.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Parses a temperature field, mapping the station sentinel to absent.
pub fn parse_temperature(text: &str) -> Option<f64> {
    parse_value(text).filter(|v| (v - TEMPERATURE_SENTINEL).abs() > 1e-9)
}

/// Parses a precipitation field; negative amounts encode a missing reading.
pub fn parse_precipitation(text: &str) -> Option<f64> {
    parse_value(text).filter(|v| *v >= 0.0)
}

/// Parses `dd.mm.yyyy`, falling back to ISO `yyyy-mm-dd`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%d.%m.%Y")
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
        .ok()
}

/// Opens a delimited table, choosing `;` or `,` from the header line.
pub(crate) fn open_table(path: &Path) -> Result<csv::Reader<File>, PhenoclimError> {
    let display = path.display().to_string();
    let file = File::open(path).map_err(|e| PhenoclimError::FileIO(display.clone(), e))?;
    let mut header = String::new();
    BufReader::new(file)
        .read_line(&mut header)
        .map_err(|e| PhenoclimError::FileIO(display.clone(), e))?;
    let delimiter = if header.contains(';') { b';' } else { b',' };

    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| PhenoclimError::CsvError(display, e))
}

/// Fails with the first of `columns` that the table's header lacks.
pub(crate) fn require_columns(
    reader: &mut csv::Reader<File>,
    path: &Path,
    columns: &[&str],
) -> Result<(), PhenoclimError> {
    let headers = reader
        .headers()
        .map_err(|e| PhenoclimError::CsvError(path.display().to_string(), e))?;
    for column in columns {
        if !headers.iter().any(|h| h == *column) {
            return Err(PhenoclimError::MissingColumn {
                path: path.display().to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// Fails unless the header holds one name out of every group, naming the first group
/// with no match.
pub(crate) fn require_any_columns(
    reader: &mut csv::Reader<File>,
    path: &Path,
    groups: &[&[&str]],
) -> Result<(), PhenoclimError> {
    let headers = reader
        .headers()
        .map_err(|e| PhenoclimError::CsvError(path.display().to_string(), e))?;
    for names in groups {
        if !headers.iter().any(|h| names.contains(&h)) {
            return Err(PhenoclimError::MissingColumn {
                path: path.display().to_string(),
                column: names.join("/"),
            });
        }
    }
    Ok(())
}

/// Converts one raw station row. Sentinels become absent here, before any value is
/// derived from another. Returns `None` when the date cannot be read.
pub fn station_record(row: &StationRow) -> Option<DailyRecord> {
    let date = parse_date(&row.date)?;
    Some(DailyRecord::new(
        date,
        parse_temperature(&row.tam),
        parse_temperature(&row.tan),
        parse_temperature(&row.tax),
        parse_precipitation(&row.rr),
    ))
}

/// Reads the semicolon-delimited daily station table.
pub fn read_station_table(path: &Path) -> Result<Vec<DailyRecord>, PhenoclimError> {
    let mut reader = open_table(path)?;
    require_columns(
        &mut reader,
        path,
        &[STATION_DATE, STATION_TAM, STATION_TAN, STATION_TAX, STATION_RR],
    )?;

    let mut records = Vec::new();
    for (line, result) in reader.deserialize::<StationRow>().enumerate() {
        let row = result.map_err(|e| PhenoclimError::CsvError(path.display().to_string(), e))?;
        match station_record(&row) {
            Some(record) => records.push(record),
            // header is line 1
            None => warn!(
                "{}: line {} has unreadable date '{}', row dropped",
                path.display(),
                line + 2,
                row.date
            ),
        }
    }
    info!("Read {} station rows from '{}'", records.len(), path.display());
    Ok(records)
}

/// Reads the reference calendar: one `Date` column covering the study period.
pub fn read_calendar(path: &Path) -> Result<Vec<NaiveDate>, PhenoclimError> {
    let mut reader = open_table(path)?;
    require_columns(&mut reader, path, &[STATION_DATE])?;

    let mut dates = Vec::new();
    for (line, result) in reader.deserialize::<CalendarRow>().enumerate() {
        let row = result.map_err(|e| PhenoclimError::CsvError(path.display().to_string(), e))?;
        match parse_date(&row.date) {
            Some(date) => dates.push(date),
            None => warn!(
                "{}: line {} has unreadable date '{}', row dropped",
                path.display(),
                line + 2,
                row.date
            ),
        }
    }
    Ok(dates)
}

/// Every day from January 1 of the first record's year to December 31 of the last
/// record's year.
pub fn calendar_spanning(records: &[DailyRecord]) -> Vec<NaiveDate> {
    let (Some(first), Some(last)) = (
        records.iter().map(|r| r.date).min(),
        records.iter().map(|r| r.date).max(),
    ) else {
        return Vec::new();
    };
    let start = NaiveDate::from_ymd_opt(first.year(), 1, 1).unwrap_or(first);
    let end = NaiveDate::from_ymd_opt(last.year(), 12, 31).unwrap_or(last);
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Fills an absent mean temperature with the midpoint of minimum and maximum.
pub fn backfill_mean(record: &mut DailyRecord) {
    if record.tam.is_none() {
        if let (Some(tan), Some(tax)) = (record.tan, record.tax) {
            record.tam = Some((tan + tax) / 2.0);
        }
    }
}

/// Left-joins the calendar onto the station records.
///
/// Every calendar day appears exactly once, in date order, with absent values where the
/// station has no row. Station rows outside the calendar are dropped.
pub fn normalize(
    calendar: &[NaiveDate],
    station: Vec<DailyRecord>,
) -> Result<Vec<DailyRecord>, PhenoclimError> {
    let mut by_date: HashMap<NaiveDate, DailyRecord> = HashMap::with_capacity(station.len());
    for record in station {
        let date = record.date;
        if by_date.insert(date, record).is_some() {
            return Err(PhenoclimError::DuplicateDate(date));
        }
    }

    let days: BTreeSet<NaiveDate> = calendar.iter().copied().collect();
    let mut records = Vec::with_capacity(days.len());
    let mut missing = 0usize;
    for date in &days {
        let mut record = by_date.remove(date).unwrap_or_else(|| {
            missing += 1;
            DailyRecord::empty(*date)
        });
        backfill_mean(&mut record);
        records.push(record);
    }

    if !by_date.is_empty() {
        debug!("{} station rows fall outside the calendar", by_date.len());
    }
    info!(
        "Normalized {} calendar days ({} without a station row)",
        records.len(),
        missing
    );
    Ok(records)
}
