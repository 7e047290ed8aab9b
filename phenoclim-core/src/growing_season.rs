//! Growing-season bounds from runs of warm days.
//!
//! A day opens the season when it and the following `run - 1` days all have a mean
//! temperature above the threshold; it closes the season when it and the preceding
//! `run - 1` days do. Days outside the year count as cold, so no run reaches across a
//! year boundary. Absent mean temperatures count as cold as well.

use crate::series::{YearlySeries, YearlyTable};
use log::info;
use phenoclim_schemas::{
    climate::{GrowingSeasonBounds, GrowingSeasonEnvelope},
    thresholds::Thresholds,
};

fn warm_days(series: &YearlySeries, thresholds: &Thresholds) -> Vec<bool> {
    series
        .records
        .iter()
        .map(|r| r.tam.map_or(false, |t| t > thresholds.growing_season_temp_c))
        .collect()
}

/// Per-day flag: the day starts a run of warm days.
pub fn start_flags(series: &YearlySeries, thresholds: &Thresholds) -> Vec<bool> {
    let warm = warm_days(series, thresholds);
    let run = thresholds.growing_season_run_days.max(1);
    (0..warm.len())
        .map(|i| i + run <= warm.len() && warm[i..i + run].iter().all(|w| *w))
        .collect()
}

/// Per-day flag: the day ends a run of warm days.
pub fn end_flags(series: &YearlySeries, thresholds: &Thresholds) -> Vec<bool> {
    let warm = warm_days(series, thresholds);
    let run = thresholds.growing_season_run_days.max(1);
    (0..warm.len())
        .map(|i| i + 1 >= run && warm[i + 1 - run..=i].iter().all(|w| *w))
        .collect()
}

/// First start-day and last end-day of one year.
pub fn locate(series: &YearlySeries, thresholds: &Thresholds) -> GrowingSeasonBounds {
    let start_doy = start_flags(series, thresholds)
        .iter()
        .position(|f| *f)
        .map(|i| series.records[i].doy);
    let end_doy = end_flags(series, thresholds)
        .iter()
        .rposition(|f| *f)
        .map(|i| series.records[i].doy);
    GrowingSeasonBounds {
        year: series.year,
        start_doy,
        end_doy,
    }
}

pub fn locate_all(table: &YearlyTable, thresholds: &Thresholds) -> Vec<GrowingSeasonBounds> {
    table.iter().map(|series| locate(series, thresholds)).collect()
}

/// Earliest start and latest end over all years with a defined season.
///
/// This is a one-off calibration of the fixed analysis window, not part of a run.
pub fn envelope(bounds: &[GrowingSeasonBounds]) -> Option<GrowingSeasonEnvelope> {
    let complete: Vec<(u32, u32)> = bounds
        .iter()
        .filter_map(|b| Some((b.start_doy?, b.end_doy?)))
        .collect();
    let earliest_start_doy = complete.iter().map(|(s, _)| *s).min()?;
    let latest_end_doy = complete.iter().map(|(_, e)| *e).max()?;
    info!(
        "Growing-season envelope over {} years: day {} to day {}",
        complete.len(),
        earliest_start_doy,
        latest_end_doy
    );
    Some(GrowingSeasonEnvelope {
        earliest_start_doy,
        latest_end_doy,
        years: complete.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use phenoclim_schemas::record::DailyRecord;

    fn series(temps: &[Option<f64>]) -> YearlySeries {
        let start = NaiveDate::from_ymd_opt(2005, 1, 1).unwrap();
        YearlySeries {
            year: 2005,
            records: temps
                .iter()
                .enumerate()
                .map(|(i, t)| {
                    DailyRecord::new(start + Duration::days(i as i64), *t, None, None, None)
                })
                .collect(),
        }
    }

    #[test]
    fn no_start_flag_in_final_days_of_year() {
        // Ten-day year, only days 6-10 are warm.
        let temps: Vec<Option<f64>> = (1..=10)
            .map(|d| Some(if d >= 6 { 10.0 } else { 0.0 }))
            .collect();
        let s = series(&temps);
        let thresholds = Thresholds::default();

        let starts = start_flags(&s, &thresholds);
        assert_eq!(starts.iter().filter(|f| **f).count(), 1);
        assert!(starts[5]);
        assert!(starts[6..].iter().all(|f| !*f));

        let ends = end_flags(&s, &thresholds);
        assert!(ends[..9].iter().all(|f| !*f));
        assert!(ends[9]);
    }

    #[test]
    fn locate_returns_first_start_and_last_end() {
        let mut temps = vec![Some(0.0); 30];
        for t in temps.iter_mut().take(16).skip(3) {
            *t = Some(8.0);
        }
        let bounds = locate(&series(&temps), &Thresholds::default());
        assert_eq!(bounds.start_doy, Some(4));
        assert_eq!(bounds.end_doy, Some(16));
    }

    #[test]
    fn absent_and_threshold_days_break_the_run() {
        let temps = vec![
            Some(6.0),
            Some(6.0),
            None,
            Some(6.0),
            Some(5.0),
            Some(6.0),
            Some(6.0),
        ];
        let bounds = locate(&series(&temps), &Thresholds::default());
        assert_eq!(bounds.start_doy, None);
        assert_eq!(bounds.end_doy, None);
    }

    #[test]
    fn envelope_ignores_years_without_season() {
        let bounds = [
            GrowingSeasonBounds { year: 2000, start_doy: Some(140), end_doy: Some(280) },
            GrowingSeasonBounds { year: 2001, start_doy: Some(139), end_doy: Some(270) },
            GrowingSeasonBounds { year: 2002, start_doy: None, end_doy: Some(300) },
            GrowingSeasonBounds { year: 2003, start_doy: Some(150), end_doy: Some(287) },
        ];
        let env = envelope(&bounds).unwrap();
        assert_eq!(env.earliest_start_doy, 139);
        assert_eq!(env.latest_end_doy, 287);
        assert_eq!(env.years, 3);
    }
}
