use crate::error::PhenoclimError;
use phenoclim_schemas::record::DailyRecord;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// The daily records of one calendar year, ordered by date.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlySeries {
    pub year: i32,
    pub records: Vec<DailyRecord>,
}

impl YearlySeries {
    /// Number of days carrying a mean temperature.
    pub fn present_tam_days(&self) -> usize {
        self.records.iter().filter(|r| r.tam.is_some()).count()
    }

    /// A copy restricted to the given day-of-year range.
    pub fn restricted_to(&self, doy_range: &RangeInclusive<u32>) -> Self {
        Self {
            year: self.year,
            records: self
                .records
                .iter()
                .filter(|r| doy_range.contains(&r.doy))
                .cloned()
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Daily records keyed by year. Built once and handed to every derivation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearlyTable {
    years: BTreeMap<i32, YearlySeries>,
}

impl YearlyTable {
    /// Groups records by year. Records are sorted by date within each year; a date
    /// occurring twice is rejected.
    pub fn from_records(records: Vec<DailyRecord>) -> Result<Self, PhenoclimError> {
        let mut years: BTreeMap<i32, YearlySeries> = BTreeMap::new();
        for record in records {
            years
                .entry(record.year)
                .or_insert_with(|| YearlySeries {
                    year: record.year,
                    records: Vec::new(),
                })
                .records
                .push(record);
        }

        for series in years.values_mut() {
            series.records.sort_by_key(|r| r.date);
            if let Some(pair) = series.records.windows(2).find(|w| w[0].date == w[1].date) {
                return Err(PhenoclimError::DuplicateDate(pair[0].date));
            }
        }
        Ok(Self { years })
    }

    /// Applies `f` to every year and keeps the series it returns.
    pub(crate) fn filter_map<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&YearlySeries) -> Option<YearlySeries>,
    {
        Self {
            years: self
                .years
                .values()
                .filter_map(|series| f(series).map(|s| (s.year, s)))
                .collect(),
        }
    }

    pub fn get(&self, year: i32) -> Option<&YearlySeries> {
        self.years.get(&year)
    }

    /// Years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    /// Series in ascending year order.
    pub fn iter(&self) -> impl Iterator<Item = &YearlySeries> {
        self.years.values()
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}
