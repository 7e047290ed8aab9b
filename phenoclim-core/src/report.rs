//! CSV report tables and the JSON run summary.

use crate::error::PhenoclimError;
use chrono::NaiveDate;
use csv::Writer;
use phenoclim_schemas::{
    climate::{DegreeDaySum, LastFrostEvent},
    statistics::{PairedComparison, SummaryStats},
};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct YearlyTddRow {
    pub year: i32,
    pub tdd: f64,
    pub outlier: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrostTruncatedRow {
    pub year: i32,
    pub last_frost_date: NaiveDate,
    pub last_frost_doy: u32,
    pub tdd: f64,
}

impl From<&(LastFrostEvent, DegreeDaySum)> for FrostTruncatedRow {
    fn from((frost, sum): &(LastFrostEvent, DegreeDaySum)) -> Self {
        Self {
            year: sum.year,
            last_frost_date: frost.date,
            last_frost_doy: frost.doy,
            tdd: sum.tdd,
        }
    }
}

/// One line of `summary_stats.csv`: the statistics of one reported metric.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub metric: String,
    pub n: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub mean: f64,
    pub q3: f64,
    pub max: f64,
    pub iqr: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
    pub std_dev: f64,
    pub std_error: f64,
}

impl SummaryRow {
    pub fn new(metric: &str, stats: &SummaryStats) -> Self {
        Self {
            metric: metric.to_string(),
            n: stats.n,
            min: stats.min,
            q1: stats.q1,
            median: stats.median,
            mean: stats.mean,
            q3: stats.q3,
            max: stats.max,
            iqr: stats.iqr,
            lower_fence: stats.lower_fence,
            upper_fence: stats.upper_fence,
            std_dev: stats.std_dev,
            std_error: stats.std_error,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PairedTestRow {
    pub variable: String,
    pub n: usize,
    pub mean_difference: f64,
    pub sd_difference: f64,
    pub t: f64,
    pub df: f64,
    pub p_value: f64,
    pub shapiro_w: f64,
    pub shapiro_p: f64,
}

impl From<&PairedComparison> for PairedTestRow {
    fn from(comparison: &PairedComparison) -> Self {
        Self {
            variable: comparison.variable.clone(),
            n: comparison.n,
            mean_difference: comparison.mean_difference,
            sd_difference: comparison.sd_difference,
            t: comparison.t,
            df: comparison.df,
            p_value: comparison.p_value,
            shapiro_w: comparison.normality.w,
            shapiro_p: comparison.normality.p_value,
        }
    }
}

/// Writes serializable rows to a CSV file with a header line.
pub struct TableWriter {
    writer: Writer<fs::File>,
    path: String,
    rows: usize,
}

impl TableWriter {
    pub fn create(path: &Path) -> Result<Self, PhenoclimError> {
        let display = path.display().to_string();
        let writer =
            Writer::from_path(path).map_err(|e| PhenoclimError::CsvError(display.clone(), e))?;
        Ok(Self {
            writer,
            path: display,
            rows: 0,
        })
    }

    pub fn write_row<T: Serialize>(&mut self, row: &T) -> Result<(), PhenoclimError> {
        self.writer
            .serialize(row)
            .map_err(|e| PhenoclimError::CsvError(self.path.clone(), e))?;
        self.rows += 1;
        Ok(())
    }

    /// Flushes the file and returns the number of rows written.
    pub fn finish(mut self) -> Result<usize, PhenoclimError> {
        self.writer
            .flush()
            .map_err(|e| PhenoclimError::FileIO(self.path.clone(), e))?;
        Ok(self.rows)
    }
}

/// Writes a whole table in one go.
pub fn write_table<T, I>(path: &Path, rows: I) -> Result<usize, PhenoclimError>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut writer = TableWriter::create(path)?;
    for row in rows {
        writer.write_row(&row)?;
    }
    writer.finish()
}

/// Writes `value` as pretty-printed JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PhenoclimError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| PhenoclimError::FileIO(path.display().to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yearly_tdd.csv");
        let rows = vec![
            YearlyTddRow { year: 2001, tdd: 1500.5, outlier: false },
            YearlyTddRow { year: 2002, tdd: 2100.0, outlier: true },
        ];

        assert_eq!(write_table(&path, rows).unwrap(), 2);
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "year,tdd,outlier");
        assert_eq!(lines[2], "2002,2100.0,true");
    }
}
