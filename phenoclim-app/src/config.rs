use anyhow::{Context, Result};
use log::info;
use phenoclim_core::{july, normalize, seedset, YearlyTable};
use phenoclim_schemas::{
    climate::JulySummary, seedset::FlowerPlotObservation, thresholds::Thresholds,
};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Locations of the input tables. Relative paths are taken from the config file's
/// directory.
#[derive(Debug, Clone, Deserialize)]
pub struct Inputs {
    pub station_daily: PathBuf,
    pub calendar: Option<PathBuf>,
    pub july_summary: Option<PathBuf>,
    pub seedset: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeedsetSettings {
    pub first_year: i32,
    pub second_year: i32,
    /// Plots observed in both years. Empty means every plot found in both years.
    pub plots: Vec<String>,
}

impl Default for SeedsetSettings {
    fn default() -> Self {
        Self {
            first_year: 2020,
            second_year: 2021,
            plots: Vec::new(),
        }
    }
}

/// The analysis configuration, read from a YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_station")]
    pub station: String,
    pub inputs: Inputs,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub seedset: SeedsetSettings,
}

fn default_station() -> String {
    "station".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./data/runs")
}

impl AnalysisConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML from {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.inputs.station_daily = base.join(&config.inputs.station_daily);
        for input in [
            &mut config.inputs.calendar,
            &mut config.inputs.july_summary,
            &mut config.inputs.seedset,
        ] {
            if let Some(p) = input.as_mut() {
                *p = base.join(&*p);
            }
        }
        config.output_dir = base.join(&config.output_dir);
        Ok(config)
    }
}

/// Every input table of a run, loaded and normalized.
pub struct AnalysisData {
    pub daily: YearlyTable,
    pub july: Option<Vec<JulySummary>>,
    pub seedset: Option<Vec<FlowerPlotObservation>>,
}

impl AnalysisData {
    /// Reads the station table alone, aligned to the calendar and grouped by year.
    pub fn load_daily(config: &AnalysisConfig) -> Result<YearlyTable> {
        info!("Loading daily data for '{}'...", config.station);
        let inputs = &config.inputs;

        let station = normalize::read_station_table(&inputs.station_daily).with_context(|| {
            format!("Failed to load station table {}", inputs.station_daily.display())
        })?;
        let calendar = match &inputs.calendar {
            Some(path) => normalize::read_calendar(path)
                .with_context(|| format!("Failed to load calendar {}", path.display()))?,
            None => normalize::calendar_spanning(&station),
        };
        let records = normalize::normalize(&calendar, station)
            .context("Failed to align station table with the calendar")?;
        Ok(YearlyTable::from_records(records)?)
    }

    pub fn load(config: &AnalysisConfig) -> Result<Self> {
        let daily = Self::load_daily(config)?;
        let inputs = &config.inputs;

        let july = inputs
            .july_summary
            .as_deref()
            .map(|path| {
                july::read_july_table(path)
                    .with_context(|| format!("Failed to load July table {}", path.display()))
            })
            .transpose()?;
        let seedset = inputs
            .seedset
            .as_deref()
            .map(|path| {
                seedset::read_seedset_table(path)
                    .with_context(|| format!("Failed to load seed-set table {}", path.display()))
            })
            .transpose()?;

        info!("Inputs loaded: {} years of daily data.", daily.len());
        Ok(Self {
            daily,
            july,
            seedset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_default_when_omitted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.yaml");
        fs::write(
            &path,
            "inputs:\n  station_daily: station.csv\nthresholds:\n  frost_temp_c: -2.0\n",
        )
        .unwrap();

        let config = AnalysisConfig::load(&path).unwrap();
        assert_eq!(config.thresholds.frost_temp_c, -2.0);
        assert_eq!(config.thresholds.full_year_min_days, 355);
        assert_eq!(config.seedset.first_year, 2020);
        assert_eq!(config.inputs.station_daily, dir.path().join("station.csv"));
        assert!(config.inputs.calendar.is_none());
    }

    #[test]
    fn missing_inputs_section_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.yaml");
        fs::write(&path, "station: Somewhere\n").unwrap();
        assert!(AnalysisConfig::load(&path).is_err());
    }

    #[test]
    fn daily_data_loads_without_the_optional_tables() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("station.csv"),
            "Date;TAM;TAN;TAX;RR\n01.01.2010;1.0;-2.0;3.0;0.0\n",
        )
        .unwrap();
        fs::write(dir.path().join("july.csv"), "Year;TX;TM;TN\n2010;1;2;3\n").unwrap();
        let path = dir.path().join("analysis.yaml");
        fs::write(
            &path,
            concat!(
                "inputs:\n",
                "  station_daily: station.csv\n",
                "  july_summary: july.csv\n",
                "  seedset: missing.csv\n",
            ),
        )
        .unwrap();

        let config = AnalysisConfig::load(&path).unwrap();
        let daily = AnalysisData::load_daily(&config).unwrap();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily.get(2010).unwrap().len(), 365);
        assert!(AnalysisData::load(&config).is_err());
    }
}
