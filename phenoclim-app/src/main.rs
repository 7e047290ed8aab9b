//! Phenoclim - climate indices and flowering phenology for a single weather station.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{AnalysisConfig, AnalysisData};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

mod config;
mod plotting;
mod workflow;

#[derive(Parser)]
#[command(
    name = "phenoclim",
    version,
    about = "Climate indices and flowering phenology for a single weather station"
)]
struct Cli {
    /// Analysis configuration file.
    #[arg(long, short, default_value = "phenoclim.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Runs the full analysis and writes tables and figures.
    Run {
        /// Overrides the configured output directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Writes the tables only.
        #[arg(long)]
        no_plots: bool,
    },
    /// Prints the growing season of every complete year and their envelope.
    Calibrate,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    println!("--- Phenoclim ---");

    let config = AnalysisConfig::load(&cli.config)?;

    match cli.command {
        Command::Calibrate => {
            let daily = AnalysisData::load_daily(&config)?;
            workflow::run_calibration(&daily, &config.thresholds)
        }
        Command::Run {
            output_dir,
            no_plots,
        } => {
            let data = AnalysisData::load(&config)?;
            let base = output_dir.unwrap_or_else(|| config.output_dir.clone());
            let run_dir = create_run_dir(&base, &cli.config)?;
            run(&config, &data, &run_dir, !no_plots)?;
            println!("\nAnalysis complete. Results are in '{}'", run_dir.display());
            Ok(())
        }
    }
}

/// Creates `phenoclim_<timestamp>` under `base` and copies the config into it.
fn create_run_dir(base: &Path, config_path: &Path) -> Result<PathBuf> {
    let run_dir = base.join(format!(
        "phenoclim_{}",
        chrono::Utc::now().format("%Y%m%d_%H%M%S")
    ));
    fs::create_dir_all(&run_dir)
        .with_context(|| format!("Failed to create output directory: {}", run_dir.display()))?;

    let file_name = config_path.file_name().unwrap_or(OsStr::new("phenoclim.yaml"));
    fs::copy(config_path, run_dir.join(file_name))
        .with_context(|| format!("Failed to copy {} to the run directory", config_path.display()))?;
    Ok(run_dir)
}

fn run(config: &AnalysisConfig, data: &AnalysisData, run_dir: &Path, plots: bool) -> Result<()> {
    let climate = workflow::run_climate_analysis(data, &config.thresholds, run_dir)?;

    let seedset = match &data.seedset {
        Some(observations) => Some(workflow::run_seedset_analysis(observations, config, run_dir)?),
        None => {
            log::info!("No seed-set table configured, skipping the paired comparison.");
            None
        }
    };

    workflow::write_run_summary(config, data, &climate, seedset.as_ref(), run_dir)?;
    if plots {
        plotting::generate_all_plots(run_dir, &climate, seedset.as_ref())?;
    }
    workflow::print_summary_report(config, &climate, seedset.as_ref());
    Ok(())
}
