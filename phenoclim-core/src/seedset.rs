//! Flower and seed-set counts of the plots observed in two consecutive seasons.

use crate::error::PhenoclimError;
use crate::normalize::{open_table, require_columns};
use crate::statistics;
use log::{info, warn};
use phenoclim_schemas::{
    file_formats::SeedsetRow,
    seedset::FlowerPlotObservation,
    statistics::PairedComparison,
};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// One plot's observations in both compared years.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotPair {
    pub plot: String,
    pub first: FlowerPlotObservation,
    pub second: FlowerPlotObservation,
}

fn validate(observation: &FlowerPlotObservation) -> Result<(), PhenoclimError> {
    if observation.seedset > observation.flowers {
        return Err(PhenoclimError::InvalidObservation {
            plot: observation.plot.clone(),
            year: observation.year,
            reason: format!(
                "{} seed heads from {} flowers",
                observation.seedset, observation.flowers
            ),
        });
    }
    Ok(())
}

/// Reads the seed-set table (`Plot`, `Year`, `Flowers`, `Seedset`).
pub fn read_seedset_table(path: &Path) -> Result<Vec<FlowerPlotObservation>, PhenoclimError> {
    let mut reader = open_table(path)?;
    require_columns(&mut reader, path, &["Plot", "Year", "Flowers", "Seedset"])?;

    let mut observations = Vec::new();
    for result in reader.deserialize::<SeedsetRow>() {
        let row = result.map_err(|e| PhenoclimError::CsvError(path.display().to_string(), e))?;
        let observation = FlowerPlotObservation {
            plot: row.plot,
            year: row.year,
            flowers: row.flowers,
            seedset: row.seedset,
        };
        validate(&observation)?;
        observations.push(observation);
    }
    info!(
        "Read {} plot observations from '{}'",
        observations.len(),
        path.display()
    );
    Ok(observations)
}

/// Pairs each plot's first-year and second-year observation.
///
/// Only the listed plots take part; observations of other plots are ignored entirely.
/// An empty list selects every plot observed in both years. A listed plot without
/// exactly one observation in each year is an error.
pub fn pair_observations(
    observations: &[FlowerPlotObservation],
    plots: &[String],
    first_year: i32,
    second_year: i32,
) -> Result<Vec<PlotPair>, PhenoclimError> {
    let mut by_plot: BTreeMap<&str, Vec<&FlowerPlotObservation>> = BTreeMap::new();
    for observation in observations {
        if observation.year == first_year || observation.year == second_year {
            by_plot.entry(observation.plot.as_str()).or_default().push(observation);
        }
    }

    let selected: Vec<String> = if plots.is_empty() {
        let derived: Vec<String> = by_plot
            .iter()
            .filter(|(_, obs)| {
                obs.iter().any(|o| o.year == first_year)
                    && obs.iter().any(|o| o.year == second_year)
            })
            .map(|(plot, _)| plot.to_string())
            .collect();
        warn!(
            "No plot list configured; using the {} plots observed in both {} and {}",
            derived.len(),
            first_year,
            second_year
        );
        derived
    } else {
        let unique: BTreeSet<&String> = plots.iter().collect();
        unique.into_iter().cloned().collect()
    };

    let unpaired = |plot: &str| PhenoclimError::UnpairedPlot {
        plot: plot.to_string(),
        first_year,
        second_year,
    };

    selected
        .iter()
        .map(|plot| -> Result<PlotPair, PhenoclimError> {
            let obs = by_plot.get(plot.as_str()).ok_or_else(|| unpaired(plot))?;
            let in_year = |year: i32| -> Result<FlowerPlotObservation, PhenoclimError> {
                let mut matching = obs.iter().filter(|o| o.year == year);
                match (matching.next(), matching.next()) {
                    (Some(single), None) => Ok((*single).clone()),
                    _ => Err(unpaired(plot)),
                }
            };
            Ok(PlotPair {
                plot: plot.clone(),
                first: in_year(first_year)?,
                second: in_year(second_year)?,
            })
        })
        .collect()
}

/// Paired t-tests of relative seed-set and flower count, first minus second year.
pub fn compare(pairs: &[PlotPair]) -> Result<Vec<PairedComparison>, PhenoclimError> {
    let rel_first: Vec<f64> = pairs.iter().map(|p| p.first.rel_seedset()).collect();
    let rel_second: Vec<f64> = pairs.iter().map(|p| p.second.rel_seedset()).collect();
    let flowers_first: Vec<f64> = pairs.iter().map(|p| f64::from(p.first.flowers)).collect();
    let flowers_second: Vec<f64> = pairs.iter().map(|p| f64::from(p.second.flowers)).collect();

    Ok(vec![
        statistics::paired_t_test("rel_seedset_pct", &rel_first, &rel_second)?,
        statistics::paired_t_test("flowers", &flowers_first, &flowers_second)?,
    ])
}
