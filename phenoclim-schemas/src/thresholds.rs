use serde::{Deserialize, Serialize};

/// The fixed calibration of the analysis for one station.
///
/// Every field has a default; a configuration file may override any subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// A growing-season day needs a mean temperature strictly above this, °C.
    pub growing_season_temp_c: f64,
    /// Length of the run of qualifying days that opens or closes the season.
    pub growing_season_run_days: usize,
    /// A frost day has a minimum temperature at or below this, °C.
    pub frost_temp_c: f64,
    /// Lower (exclusive) bound of the accumulated TDD window around flowering.
    pub flowering_tdd_lower: f64,
    /// Upper (exclusive) bound of the accumulated TDD window around flowering.
    pub flowering_tdd_upper: f64,
    /// Minimum number of days with a mean temperature for a whole-year total.
    pub full_year_min_days: usize,
    pub window_start_doy: u32,
    pub window_end_doy: u32,
    /// Days inside the analysis window allowed to lack a mean temperature.
    pub window_max_missing_days: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            growing_season_temp_c: 5.0,
            growing_season_run_days: 5,
            frost_temp_c: -3.0,
            flowering_tdd_lower: 180.0,
            flowering_tdd_upper: 275.0,
            full_year_min_days: 355,
            window_start_doy: 91,
            window_end_doy: 213,
            window_max_missing_days: 5,
        }
    }
}

impl Thresholds {
    /// Number of days in the analysis window, both ends included.
    pub fn window_len(&self) -> usize {
        (self.window_end_doy + 1).saturating_sub(self.window_start_doy) as usize
    }

    /// Present days needed for a year to pass the growing-window policy.
    pub fn window_min_days(&self) -> usize {
        self.window_len().saturating_sub(self.window_max_missing_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_tolerates_five_missing_days() {
        let thresholds = Thresholds::default();
        assert_eq!(thresholds.window_len(), 123);
        assert_eq!(thresholds.window_min_days(), 118);
    }
}
