//! July temperature extremes per year, either read from the summary table or derived
//! from the daily records.

use crate::error::PhenoclimError;
use crate::normalize::{open_table, parse_temperature, require_any_columns};
use crate::series::YearlyTable;
use phenoclim_schemas::{climate::JulySummary, file_formats::JulyRow};
use std::path::Path;

const JULY: u32 = 7;

/// Reads the July table (`Year`, `TXX`, `TAM`, `TNN`; `Tmax`, `Tmean` and `Tmin` are
/// accepted as the older names).
pub fn read_july_table(path: &Path) -> Result<Vec<JulySummary>, PhenoclimError> {
    let mut reader = open_table(path)?;
    require_any_columns(
        &mut reader,
        path,
        &[&["Year"], &["TXX", "Tmax"], &["TAM", "Tmean"], &["TNN", "Tmin"]],
    )?;

    let mut summaries = Vec::new();
    for result in reader.deserialize::<JulyRow>() {
        let row = result.map_err(|e| PhenoclimError::CsvError(path.display().to_string(), e))?;
        summaries.push(JulySummary {
            year: row.year,
            highest_max: parse_temperature(&row.highest_max),
            mean: parse_temperature(&row.mean),
            lowest_min: parse_temperature(&row.lowest_min),
        });
    }
    summaries.sort_by_key(|s| s.year);
    Ok(summaries)
}

/// July summaries derived from the daily records of each year in `table`.
///
/// The mean is taken over the July days that have a mean temperature.
pub fn july_summaries(table: &YearlyTable) -> Vec<JulySummary> {
    table
        .iter()
        .filter_map(|series| {
            let july: Vec<_> = series.records.iter().filter(|r| r.month == JULY).collect();
            if july.is_empty() {
                return None;
            }
            let means: Vec<f64> = july.iter().filter_map(|r| r.tam).collect();
            Some(JulySummary {
                year: series.year,
                highest_max: july
                    .iter()
                    .filter_map(|r| r.tax)
                    .max_by(|a, b| a.total_cmp(b)),
                mean: (!means.is_empty()).then(|| means.iter().sum::<f64>() / means.len() as f64),
                lowest_min: july
                    .iter()
                    .filter_map(|r| r.tan)
                    .min_by(|a, b| a.total_cmp(b)),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use phenoclim_schemas::record::DailyRecord;
    use std::io::Write;

    #[test]
    fn derives_extremes_from_july_days_only() {
        let day = |m: u32, d: u32, tam: Option<f64>, tan: Option<f64>, tax: Option<f64>| {
            DailyRecord::new(NaiveDate::from_ymd_opt(2015, m, d).unwrap(), tam, tan, tax, None)
        };
        let table = YearlyTable::from_records(vec![
            day(6, 30, Some(30.0), Some(-10.0), Some(40.0)),
            day(7, 1, Some(14.0), Some(6.0), Some(22.0)),
            day(7, 2, None, Some(4.5), Some(25.5)),
            day(7, 3, Some(18.0), None, None),
        ])
        .unwrap();

        let summaries = july_summaries(&table);
        assert_eq!(summaries.len(), 1);
        let july = summaries[0];
        assert_eq!(july.highest_max, Some(25.5));
        assert_eq!(july.mean, Some(16.0));
        assert_eq!(july.lowest_min, Some(4.5));
    }

    #[test]
    fn reads_table_with_missing_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Year;TXX;TAM;TNN").unwrap();
        writeln!(file, "2012;31.2;17.5;5.1").unwrap();
        writeln!(file, "2011;-;16.0;-99.9").unwrap();

        let summaries = read_july_table(file.path()).unwrap();
        assert_eq!(summaries[0].year, 2011);
        assert_eq!(summaries[0].highest_max, None);
        assert_eq!(summaries[0].lowest_min, None);
        assert_eq!(summaries[1].mean, Some(17.5));
    }

    #[test]
    fn unknown_value_columns_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Year;TX;TM;TN").unwrap();
        writeln!(file, "2012;31.2;17.5;5.1").unwrap();

        let err = read_july_table(file.path()).unwrap_err();
        assert!(matches!(
            err,
            PhenoclimError::MissingColumn { ref column, .. } if column == "TXX/Tmax"
        ));
    }

    #[test]
    fn older_column_names_are_accepted() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Year,Tmax,Tmean,Tmin").unwrap();
        writeln!(file, "2013,29.0,16.5,4.0").unwrap();

        let summaries = read_july_table(file.path()).unwrap();
        assert_eq!(summaries[0].highest_max, Some(29.0));
        assert_eq!(summaries[0].mean, Some(16.5));
        assert_eq!(summaries[0].lowest_min, Some(4.0));
    }
}
