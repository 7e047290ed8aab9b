use crate::config::{AnalysisConfig, AnalysisData};
use anyhow::Result;
use log::{info, warn};
use phenoclim_core::{
    completeness::CompletenessPolicy,
    degree_days, growing_season, july,
    report::{self, FrostTruncatedRow, PairedTestRow, SummaryRow, YearlyTddRow},
    seedset::{self, PlotPair},
    statistics, PhenoclimError, YearlyTable,
};
use phenoclim_schemas::{
    climate::{DegreeDaySum, FloweringWindow, GrowingSeasonBounds, JulySummary, LastFrostEvent},
    statistics::{PairedComparison, SummaryStats},
    thresholds::Thresholds,
};
use serde::Serialize;
use std::path::Path;

/// A per-year metric and its summary statistics, when there were enough years.
#[derive(Debug, Clone, Serialize)]
pub struct YearlyMetric {
    pub name: String,
    pub values: Vec<(i32, f64)>,
    pub stats: Option<SummaryStats>,
}

impl YearlyMetric {
    fn new(name: &str, values: Vec<(i32, f64)>) -> Result<Self> {
        let sample: Vec<f64> = values.iter().map(|(_, v)| *v).collect();
        let stats = match statistics::summarize(&sample) {
            Ok(stats) => Some(stats),
            Err(PhenoclimError::InsufficientSample { needed, got }) => {
                warn!("{name}: {got} years is too few for statistics (need {needed})");
                None
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            name: name.to_string(),
            values,
            stats,
        })
    }

    /// Years lying outside the IQR fences.
    pub fn outlier_years(&self) -> Vec<i32> {
        match &self.stats {
            Some(stats) => self
                .values
                .iter()
                .filter(|(_, v)| stats.is_outlier(*v))
                .map(|(year, _)| *year)
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Everything the climate half of a run produces.
#[derive(Debug, Clone, Serialize)]
pub struct ClimateOutput {
    pub full_years: usize,
    pub window_years: usize,
    pub yearly_tdd: Vec<DegreeDaySum>,
    pub frost_truncated: Vec<(LastFrostEvent, DegreeDaySum)>,
    pub flowering: Vec<FloweringWindow>,
    pub july: Vec<JulySummary>,
    pub metrics: Vec<YearlyMetric>,
}

impl ClimateOutput {
    pub fn metric(&self, name: &str) -> Option<&YearlyMetric> {
        self.metrics.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct SeedsetOutput {
    pub first_year: i32,
    pub second_year: i32,
    pub pairs: Vec<PlotPair>,
    pub comparisons: Vec<PairedComparison>,
}

pub const METRIC_TDD: &str = "tdd_full_year";
pub const METRIC_LAST_FROST: &str = "last_frost_doy";
pub const METRIC_FROST_TDD: &str = "tdd_to_last_frost";
pub const METRIC_FLOWERING_TMIN: &str = "flowering_window_tmin";
pub const METRIC_JULY_MAX: &str = "july_highest_max";
pub const METRIC_JULY_MEAN: &str = "july_mean";
pub const METRIC_JULY_MIN: &str = "july_lowest_min";

/// Derives the climate indices, writes their tables, and summarizes them.
pub fn run_climate_analysis(
    data: &AnalysisData,
    thresholds: &Thresholds,
    output_dir: &Path,
) -> Result<ClimateOutput> {
    println!("\n--- [Workflow] Climate Indices ---");

    let full_year = CompletenessPolicy::full_year(thresholds).apply(&data.daily);
    let window = CompletenessPolicy::growing_window(thresholds).apply(&data.daily);

    let yearly_tdd = degree_days::yearly_sums(&full_year);
    let frost_truncated = degree_days::frost_truncated_sums(&window, thresholds);
    let flowering = degree_days::flowering_windows(&data.daily, thresholds);
    let july = match &data.july {
        Some(table) => table.clone(),
        None => july::july_summaries(&full_year),
    };

    let july_values = |f: fn(&JulySummary) -> Option<f64>| -> Vec<(i32, f64)> {
        july.iter().filter_map(|s| Some((s.year, f(s)?))).collect()
    };
    let metrics = vec![
        YearlyMetric::new(METRIC_TDD, yearly_tdd.iter().map(|s| (s.year, s.tdd)).collect())?,
        YearlyMetric::new(
            METRIC_LAST_FROST,
            frost_truncated
                .iter()
                .map(|(frost, _)| (frost.year, f64::from(frost.doy)))
                .collect(),
        )?,
        YearlyMetric::new(
            METRIC_FROST_TDD,
            frost_truncated.iter().map(|(_, s)| (s.year, s.tdd)).collect(),
        )?,
        YearlyMetric::new(
            METRIC_FLOWERING_TMIN,
            flowering.iter().map(|w| (w.year, w.min_tan)).collect(),
        )?,
        YearlyMetric::new(METRIC_JULY_MAX, july_values(|s| s.highest_max))?,
        YearlyMetric::new(METRIC_JULY_MEAN, july_values(|s| s.mean))?,
        YearlyMetric::new(METRIC_JULY_MIN, july_values(|s| s.lowest_min))?,
    ];

    let output = ClimateOutput {
        full_years: full_year.len(),
        window_years: window.len(),
        yearly_tdd,
        frost_truncated,
        flowering,
        july,
        metrics,
    };
    write_climate_tables(&output, output_dir)?;
    Ok(output)
}

fn write_climate_tables(output: &ClimateOutput, output_dir: &Path) -> Result<()> {
    let tdd_outliers = output
        .metric(METRIC_TDD)
        .map(|m| m.outlier_years())
        .unwrap_or_default();
    report::write_table(
        &output_dir.join("yearly_tdd.csv"),
        output.yearly_tdd.iter().map(|s| YearlyTddRow {
            year: s.year,
            tdd: s.tdd,
            outlier: tdd_outliers.contains(&s.year),
        }),
    )?;
    report::write_table(
        &output_dir.join("last_frost.csv"),
        output.frost_truncated.iter().map(|(frost, _)| *frost),
    )?;
    report::write_table(
        &output_dir.join("frost_truncated_tdd.csv"),
        output.frost_truncated.iter().map(FrostTruncatedRow::from),
    )?;
    report::write_table(
        &output_dir.join("flowering_window.csv"),
        output.flowering.iter().copied(),
    )?;
    report::write_table(&output_dir.join("july_summary.csv"), output.july.iter().copied())?;
    report::write_table(
        &output_dir.join("summary_stats.csv"),
        output
            .metrics
            .iter()
            .filter_map(|m| Some(SummaryRow::new(&m.name, m.stats.as_ref()?))),
    )?;
    info!("Climate tables written to '{}'", output_dir.display());
    Ok(())
}

/// Pairs the seed-set plots and runs the paired comparisons.
pub fn run_seedset_analysis(
    observations: &[phenoclim_schemas::seedset::FlowerPlotObservation],
    config: &AnalysisConfig,
    output_dir: &Path,
) -> Result<SeedsetOutput> {
    println!("\n--- [Workflow] Seed-Set Paired Comparison ---");
    let settings = &config.seedset;
    let pairs = seedset::pair_observations(
        observations,
        &settings.plots,
        settings.first_year,
        settings.second_year,
    )?;
    info!(
        "{} plots observed in both {} and {}",
        pairs.len(),
        settings.first_year,
        settings.second_year
    );

    let comparisons = seedset::compare(&pairs)?;
    report::write_table(
        &output_dir.join("paired_tests.csv"),
        comparisons.iter().map(PairedTestRow::from),
    )?;

    Ok(SeedsetOutput {
        first_year: settings.first_year,
        second_year: settings.second_year,
        pairs,
        comparisons,
    })
}

/// Growing-season bounds of every complete year and their envelope.
pub fn run_calibration(daily: &YearlyTable, thresholds: &Thresholds) -> Result<()> {
    println!("\n--- [Calibration] Growing-Season Envelope ---");
    let full_year = CompletenessPolicy::full_year(thresholds).apply(daily);
    let bounds = growing_season::locate_all(&full_year, thresholds);
    print_growing_seasons(&bounds);

    match growing_season::envelope(&bounds) {
        Some(envelope) => {
            println!(
                "Envelope over {} years: day {} to day {}",
                envelope.years, envelope.earliest_start_doy, envelope.latest_end_doy
            );
            println!(
                "Configured analysis window: day {} to day {}",
                thresholds.window_start_doy, thresholds.window_end_doy
            );
            if thresholds.window_start_doy < envelope.earliest_start_doy
                || thresholds.window_end_doy > envelope.latest_end_doy
            {
                warn!("The analysis window is not covered by the observed growing season.");
            }
        }
        None => warn!("No year has a defined growing season."),
    }
    Ok(())
}

fn print_growing_seasons(bounds: &[GrowingSeasonBounds]) {
    let show = |doy: Option<u32>| doy.map_or("-".to_string(), |d| d.to_string());
    println!("| Year | Start DOY | End DOY |");
    println!("|------|-----------|---------|");
    for b in bounds {
        println!("| {} | {:>9} | {:>7} |", b.year, show(b.start_doy), show(b.end_doy));
    }
}

/// The machine-readable record of a run.
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub station: &'a str,
    pub generated_at: String,
    pub thresholds: &'a Thresholds,
    pub years_loaded: usize,
    pub climate: &'a ClimateOutput,
    pub paired_tests: Vec<PairedComparison>,
}

pub fn write_run_summary(
    config: &AnalysisConfig,
    data: &AnalysisData,
    climate: &ClimateOutput,
    seedset: Option<&SeedsetOutput>,
    output_dir: &Path,
) -> Result<()> {
    let summary = RunSummary {
        station: &config.station,
        generated_at: chrono::Utc::now().to_rfc3339(),
        thresholds: &config.thresholds,
        years_loaded: data.daily.len(),
        climate,
        paired_tests: seedset.map(|s| s.comparisons.clone()).unwrap_or_default(),
    };
    report::write_json(&output_dir.join("run_summary.json"), &summary)?;
    Ok(())
}

pub fn print_summary_report(
    config: &AnalysisConfig,
    climate: &ClimateOutput,
    seedset: Option<&SeedsetOutput>,
) {
    println!("\n\n--- [Final Summary Report] ---");
    println!("========================================");
    println!("Station: {}", config.station);
    println!(
        "Years passing the full-year filter:   {} (>= {} days)",
        climate.full_years, config.thresholds.full_year_min_days
    );
    println!(
        "Years passing the window filter:      {} (days {}-{}, >= {} days)",
        climate.window_years,
        config.thresholds.window_start_doy,
        config.thresholds.window_end_doy,
        config.thresholds.window_min_days()
    );
    println!("Years with a frost in the window:     {}", climate.frost_truncated.len());
    println!("Years with a flowering window:        {}", climate.flowering.len());
    println!("----------------------------------------");

    println!("\nSummary Statistics:");
    println!(
        "  {:<22} {:>4} {:>8} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "metric", "n", "min", "q1", "median", "mean", "q3", "max"
    );
    for metric in &climate.metrics {
        match &metric.stats {
            Some(s) => println!(
                "  {:<22} {:>4} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2} {:>8.2}",
                metric.name, s.n, s.min, s.q1, s.median, s.mean, s.q3, s.max
            ),
            None => println!("  {:<22} {:>4} (too few years)", metric.name, metric.values.len()),
        }
        let outliers = metric.outlier_years();
        if !outliers.is_empty() {
            println!("    outlier years: {:?}", outliers);
        }
    }

    if let Some(seedset) = seedset {
        println!(
            "\nPaired Comparison ({} - {}, {} plots):",
            seedset.first_year,
            seedset.second_year,
            seedset.pairs.len()
        );
        for c in &seedset.comparisons {
            println!(
                "  - {:<16} mean diff {:>8.3} | t = {:>7.3}, df = {:.0}, p = {:.4}",
                c.variable, c.mean_difference, c.t, c.df, c.p_value
            );
            println!(
                "    {:<16} Shapiro-Wilk W = {:.3}, p = {:.4}",
                "", c.normality.w, c.normality.p_value
            );
        }
    }

    println!("========================================");
}
