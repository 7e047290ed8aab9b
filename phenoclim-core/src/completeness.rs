use crate::series::YearlyTable;
use log::info;
use phenoclim_schemas::thresholds::Thresholds;
use std::ops::RangeInclusive;

/// Keeps a year only if enough days inside `doy_range` have a mean temperature.
///
/// Years failing the policy are dropped entirely; nothing is imputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletenessPolicy {
    pub doy_range: RangeInclusive<u32>,
    pub min_present_days: usize,
}

impl CompletenessPolicy {
    /// Whole calendar year; used for annual degree-day totals.
    pub fn full_year(thresholds: &Thresholds) -> Self {
        Self {
            doy_range: 1..=366,
            min_present_days: thresholds.full_year_min_days,
        }
    }

    /// Spring/early summer analysis window; used for the frost and flowering indices.
    pub fn growing_window(thresholds: &Thresholds) -> Self {
        Self {
            doy_range: thresholds.window_start_doy..=thresholds.window_end_doy,
            min_present_days: thresholds.window_min_days(),
        }
    }

    /// Restricts every year to the day range, then drops incomplete years.
    pub fn apply(&self, table: &YearlyTable) -> YearlyTable {
        let filtered = table.filter_map(|series| {
            let restricted = series.restricted_to(&self.doy_range);
            let present = restricted.present_tam_days();
            if present >= self.min_present_days {
                Some(restricted)
            } else {
                info!(
                    "Year {} dropped: {} of {} required days with a mean temperature",
                    series.year, present, self.min_present_days
                );
                None
            }
        });
        info!(
            "Completeness filter (days {:?}, >= {}) kept {} of {} years",
            self.doy_range,
            self.min_present_days,
            filtered.len(),
            table.len()
        );
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use phenoclim_schemas::record::DailyRecord;

    /// A non-leap year with mean temperature on the first `present` days only.
    fn year_with_present_days(year: i32, present: usize) -> Vec<DailyRecord> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
        (0..365)
            .map(|i| {
                let tam = (i < present).then_some(1.0);
                DailyRecord::new(start + Duration::days(i as i64), tam, None, None, None)
            })
            .collect()
    }

    #[test]
    fn full_year_threshold_is_inclusive() {
        let mut records = year_with_present_days(2001, 355);
        records.extend(year_with_present_days(2002, 354));
        let table = YearlyTable::from_records(records).unwrap();

        let kept = CompletenessPolicy::full_year(&Thresholds::default()).apply(&table);
        assert_eq!(kept.years().collect::<Vec<_>>(), vec![2001]);
        assert_eq!(kept.get(2001).unwrap().len(), 365);
    }

    #[test]
    fn growing_window_restricts_before_counting() {
        let start = NaiveDate::from_ymd_opt(2003, 1, 1).unwrap();
        // Only the window itself is observed, with 5 gaps: passes.
        let records: Vec<DailyRecord> = (0..365)
            .map(|i| {
                let date = start + Duration::days(i);
                let doy = i as u32 + 1;
                let inside = (91..=213).contains(&doy) && !(100..105).contains(&doy);
                DailyRecord::new(date, inside.then_some(2.0), None, None, None)
            })
            .collect();
        let table = YearlyTable::from_records(records).unwrap();

        let kept = CompletenessPolicy::growing_window(&Thresholds::default()).apply(&table);
        let series = kept.get(2003).unwrap();
        assert_eq!(series.len(), 123);
        assert_eq!(series.records.first().unwrap().doy, 91);
        assert_eq!(series.records.last().unwrap().doy, 213);
    }

    #[test]
    fn growing_window_rejects_six_gaps() {
        let start = NaiveDate::from_ymd_opt(2003, 1, 1).unwrap();
        let records: Vec<DailyRecord> = (0..365)
            .map(|i| {
                let doy = i as u32 + 1;
                let tam = (!(100..106).contains(&doy)).then_some(2.0);
                DailyRecord::new(start + Duration::days(i), tam, None, None, None)
            })
            .collect();
        let table = YearlyTable::from_records(records).unwrap();

        let kept = CompletenessPolicy::growing_window(&Thresholds::default()).apply(&table);
        assert!(kept.is_empty());
    }
}
