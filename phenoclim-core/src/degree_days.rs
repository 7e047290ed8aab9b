//! Thawing-degree-day totals, last frost, and the flowering-window minimum temperature.

use crate::series::{YearlySeries, YearlyTable};
use log::debug;
use phenoclim_schemas::{
    climate::{DegreeDaySum, FloweringWindow, LastFrostEvent},
    thresholds::Thresholds,
};

/// Sum of positive mean temperatures. Days without a mean contribute nothing.
pub fn thawing_degree_days(series: &YearlySeries) -> f64 {
    series
        .records
        .iter()
        .filter_map(|r| r.thawing_degrees())
        .sum()
}

/// Annual totals; pass a table that already went through the full-year filter.
pub fn yearly_sums(table: &YearlyTable) -> Vec<DegreeDaySum> {
    table
        .iter()
        .map(|series| DegreeDaySum {
            year: series.year,
            tdd: thawing_degree_days(series),
        })
        .collect()
}

/// Latest day whose minimum temperature is at or below the frost threshold.
pub fn last_frost(series: &YearlySeries, thresholds: &Thresholds) -> Option<LastFrostEvent> {
    series
        .records
        .iter()
        .filter_map(|r| {
            let tan = r.tan.filter(|t| *t <= thresholds.frost_temp_c)?;
            Some(LastFrostEvent {
                year: r.year,
                date: r.date,
                doy: r.doy,
                tan,
            })
        })
        .max_by_key(|event| event.date)
}

/// Degree days accumulated up to and including each year's last frost.
///
/// Years without a frost day have no boundary to truncate at and are left out.
pub fn frost_truncated_sums(
    table: &YearlyTable,
    thresholds: &Thresholds,
) -> Vec<(LastFrostEvent, DegreeDaySum)> {
    table
        .iter()
        .filter_map(|series| {
            let Some(frost) = last_frost(series, thresholds) else {
                debug!("Year {} has no frost day in range", series.year);
                return None;
            };
            let tdd = series
                .records
                .iter()
                .filter(|r| r.date <= frost.date)
                .filter_map(|r| r.thawing_degrees())
                .sum();
            Some((
                frost,
                DegreeDaySum {
                    year: series.year,
                    tdd,
                },
            ))
        })
        .collect()
}

/// Running total of positive mean temperatures in date order.
///
/// The first absent mean temperature makes this and every later entry absent. Years
/// with a gap before the flowering window therefore yield no window at all; this is
/// how incomplete years drop out of the flowering analysis.
pub fn running_sums(series: &YearlySeries) -> Vec<Option<f64>> {
    let mut total = Some(0.0);
    series
        .records
        .iter()
        .map(|r| {
            total = match (total, r.thawing_degrees()) {
                (Some(sum), Some(degrees)) => Some(sum + degrees),
                _ => None,
            };
            total
        })
        .collect()
}

/// Days whose running total lies strictly inside the flowering TDD bounds.
///
/// The running total never decreases, so these days form one contiguous block.
pub fn flowering_window(series: &YearlySeries, thresholds: &Thresholds) -> Option<FloweringWindow> {
    let lower = thresholds.flowering_tdd_lower;
    let upper = thresholds.flowering_tdd_upper;
    let block: Vec<_> = series
        .records
        .iter()
        .zip(running_sums(series))
        .filter(|(_, sum)| sum.map_or(false, |s| s > lower && s < upper))
        .map(|(r, _)| r)
        .collect();

    let first = block.first()?;
    let last = block.last()?;
    let min_tan = block
        .iter()
        .filter_map(|r| r.tan)
        .min_by(|a, b| a.total_cmp(b))?;
    Some(FloweringWindow {
        year: series.year,
        first_doy: first.doy,
        last_doy: last.doy,
        days: block.len(),
        min_tan,
    })
}

/// Flowering windows of every year; pass the table before any day-range restriction.
pub fn flowering_windows(table: &YearlyTable, thresholds: &Thresholds) -> Vec<FloweringWindow> {
    table
        .iter()
        .filter_map(|series| {
            let window = flowering_window(series, thresholds);
            if window.is_none() {
                debug!("Year {} has no flowering window", series.year);
            }
            window
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use phenoclim_schemas::record::DailyRecord;

    fn series(days: &[(Option<f64>, Option<f64>)]) -> YearlySeries {
        let start = NaiveDate::from_ymd_opt(2011, 4, 1).unwrap();
        YearlySeries {
            year: 2011,
            records: days
                .iter()
                .enumerate()
                .map(|(i, (tam, tan))| {
                    DailyRecord::new(start + Duration::days(i as i64), *tam, *tan, None, None)
                })
                .collect(),
        }
    }

    #[test]
    fn negative_and_absent_means_add_nothing() {
        let s = series(&[(Some(-4.0), None), (None, None), (Some(2.5), None), (Some(0.5), None)]);
        assert_eq!(thawing_degree_days(&s), 3.0);
    }

    #[test]
    fn cold_year_sums_to_zero() {
        let s = series(&[(Some(-1.0), None), (Some(0.0), None), (None, None)]);
        assert_eq!(thawing_degree_days(&s), 0.0);
    }

    #[test]
    fn truncated_sum_includes_the_frost_day() {
        let s = series(&[
            (Some(2.0), Some(-5.0)),
            (Some(3.0), Some(-3.0)),
            (Some(4.0), Some(-1.0)),
            (Some(5.0), Some(1.0)),
        ]);
        let table = YearlyTable::from_records(s.records.clone()).unwrap();
        let sums = frost_truncated_sums(&table, &Thresholds::default());

        assert_eq!(sums.len(), 1);
        let (frost, sum) = &sums[0];
        assert_eq!(frost.doy, s.records[1].doy);
        assert_eq!(frost.tan, -3.0);
        assert_eq!(sum.tdd, 5.0);
    }

    #[test]
    fn year_without_frost_is_left_out() {
        let s = series(&[(Some(2.0), Some(-2.9)), (Some(3.0), None), (Some(4.0), Some(0.0))]);
        let table = YearlyTable::from_records(s.records).unwrap();
        assert!(frost_truncated_sums(&table, &Thresholds::default()).is_empty());
    }

    #[test]
    fn absent_day_poisons_later_running_sums() {
        let s = series(&[(Some(1.0), None), (None, None), (Some(2.0), None)]);
        assert_eq!(running_sums(&s), vec![Some(1.0), None, None]);
    }

    #[test]
    fn flowering_window_is_strictly_inside_bounds() {
        // 100 + 80 reaches exactly 180 (excluded), then 200, 240, 270, then 280.
        let s = series(&[
            (Some(100.0), Some(-1.0)),
            (Some(80.0), Some(-9.0)),
            (Some(20.0), Some(2.0)),
            (Some(40.0), Some(-0.5)),
            (Some(30.0), Some(1.0)),
            (Some(10.0), Some(-7.0)),
        ]);
        let window = flowering_window(&s, &Thresholds::default()).unwrap();
        assert_eq!(window.days, 3);
        assert_eq!(window.first_doy, s.records[2].doy);
        assert_eq!(window.last_doy, s.records[4].doy);
        assert_eq!(window.min_tan, -0.5);
    }

    #[test]
    fn gap_before_window_yields_nothing() {
        let s = series(&[
            (Some(100.0), Some(0.0)),
            (None, Some(0.0)),
            (Some(100.0), Some(0.0)),
        ]);
        assert!(flowering_window(&s, &Thresholds::default()).is_none());
    }
}
