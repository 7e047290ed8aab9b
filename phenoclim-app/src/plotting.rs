//! Figures for a run: one chart per yearly index, the July temperatures and the
//! paired seed-set comparison.

use crate::workflow::{
    ClimateOutput, SeedsetOutput, YearlyMetric, METRIC_FLOWERING_TMIN, METRIC_FROST_TDD,
    METRIC_LAST_FROST, METRIC_TDD,
};
use anyhow::Result;
use log::warn;
use phenoclim_schemas::climate::JulySummary;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

/// Generates and saves every figure of a run.
pub fn generate_all_plots(
    output_dir: &Path,
    climate: &ClimateOutput,
    seedset: Option<&SeedsetOutput>,
) -> Result<()> {
    println!("[Plotting] Generating figures...");

    let yearly = [
        (
            METRIC_TDD,
            "1_yearly_tdd.png",
            "Thawing Degree Days per Year",
            "TDD (°C·d)",
        ),
        (
            METRIC_LAST_FROST,
            "2_last_frost.png",
            "Last Frost in the Growing Window",
            "Day of year",
        ),
        (
            METRIC_FROST_TDD,
            "3_frost_truncated_tdd.png",
            "Thawing Degree Days up to the Last Frost",
            "TDD (°C·d)",
        ),
        (
            METRIC_FLOWERING_TMIN,
            "4_flowering_window_tmin.png",
            "Lowest Minimum Temperature in the Flowering Window",
            "Temperature (°C)",
        ),
    ];
    for (name, file, title, y_desc) in yearly {
        match climate.metric(name) {
            Some(metric) if !metric.values.is_empty() => {
                plot_yearly_metric(&output_dir.join(file), title, y_desc, metric)?
            }
            _ => warn!("[Plotting] No values for '{}', skipping {}.", name, file),
        }
    }

    if climate.july.is_empty() {
        warn!("[Plotting] No July data, skipping 5_july_temperatures.png.");
    } else {
        plot_july_temperatures(&output_dir.join("5_july_temperatures.png"), &climate.july)?;
    }

    if let Some(seedset) = seedset.filter(|s| !s.pairs.is_empty()) {
        plot_seedset_pairs(&output_dir.join("6_seedset_paired.png"), seedset)?;
    }

    println!("[Plotting] Figures have been saved to '{}'.", output_dir.display());
    Ok(())
}

/// Pads a value range so points don't sit on the frame.
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return 0.0..1.0;
    }
    let pad = ((hi - lo) * 0.1).max(1.0);
    (lo - pad)..(hi + pad)
}

fn year_range(years: impl Iterator<Item = i32>) -> Range<i32> {
    let (first, last) = years.fold((i32::MAX, i32::MIN), |(lo, hi), y| (lo.min(y), hi.max(y)));
    if first > last {
        return 0..1;
    }
    (first - 1)..(last + 2)
}

/// Line chart of a yearly index with its IQR fences; outlier years are labelled.
fn plot_yearly_metric(path: &Path, title: &str, y_desc: &str, metric: &YearlyMetric) -> Result<()> {
    let root = BitMapBackend::new(path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let fences = metric
        .stats
        .iter()
        .flat_map(|s| [s.lower_fence, s.upper_fence]);
    let y_range = padded_range(metric.values.iter().map(|(_, v)| *v).chain(fences));
    let x_range = year_range(metric.values.iter().map(|(year, _)| *year));
    let (x_start, x_end) = (x_range.start, x_range.end);

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 40).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc(y_desc)
        .draw()?;

    chart
        .draw_series(LineSeries::new(metric.values.iter().copied(), BLUE.stroke_width(2)))?
        .label(metric.name.as_str())
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.filled()));
    chart.draw_series(
        metric
            .values
            .iter()
            .map(|&(year, v)| Circle::new((year, v), 4, BLUE.filled())),
    )?;

    if let Some(stats) = &metric.stats {
        chart
            .draw_series(LineSeries::new(
                [(x_start, stats.mean), (x_end, stats.mean)],
                BLACK.stroke_width(1),
            ))?
            .label("Mean")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK.filled()));

        let fences = [
            (stats.upper_fence, "Upper fence"),
            (stats.lower_fence, "Lower fence"),
        ];
        for (fence, label) in fences {
            chart
                .draw_series(DashedLineSeries::new(
                    [(x_start, fence), (x_end, fence)],
                    5,
                    5,
                    (&RED).into(),
                ))?
                .label(label)
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.filled()));
        }

        let outliers: Vec<(i32, f64)> = metric
            .values
            .iter()
            .copied()
            .filter(|(_, v)| stats.is_outlier(*v))
            .collect();
        chart.draw_series(
            outliers
                .iter()
                .map(|&(year, v)| Circle::new((year, v), 6, RED.filled())),
        )?;
        chart.draw_series(outliers.iter().map(|&(year, v)| {
            Text::new(year.to_string(), (year, v), ("sans-serif", 15).into_font())
        }))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

/// Highest maximum, mean and lowest minimum of July, one line each.
fn plot_july_temperatures(path: &Path, july: &[JulySummary]) -> Result<()> {
    let root = BitMapBackend::new(path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let all_values = july
        .iter()
        .flat_map(|s| [s.highest_max, s.mean, s.lowest_min])
        .flatten();
    let mut chart = ChartBuilder::on(&root)
        .caption("July Temperatures", ("sans-serif", 40).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(year_range(july.iter().map(|s| s.year)), padded_range(all_values))?;

    chart
        .configure_mesh()
        .x_desc("Year")
        .y_desc("Temperature (°C)")
        .draw()?;

    let lines: [(&str, fn(&JulySummary) -> Option<f64>, RGBColor); 3] = [
        ("Highest maximum", |s| s.highest_max, RED),
        ("Mean", |s| s.mean, GREEN),
        ("Lowest minimum", |s| s.lowest_min, BLUE),
    ];
    for (label, value, color) in lines {
        let points: Vec<(i32, f64)> = july
            .iter()
            .filter_map(|s| Some((s.year, value(s)?)))
            .collect();
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.filled()));
        chart.draw_series(
            points
                .iter()
                .map(|&(year, v)| Circle::new((year, v), 3, color.filled())),
        )?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

/// Slope chart of relative seed set: one line per plot from the first to the second year.
fn plot_seedset_pairs(path: &Path, seedset: &SeedsetOutput) -> Result<()> {
    let root = BitMapBackend::new(path, (800, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let y_max = seedset
        .pairs
        .iter()
        .flat_map(|p| [p.first.rel_seedset(), p.second.rel_seedset()])
        .fold(0.0, f64::max);

    let caption = format!(
        "Relative Seed Set, {} vs {}",
        seedset.first_year, seedset.second_year
    );
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 40).into_font())
        .margin(20)
        .x_label_area_size(30)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5f64..1.5f64, 0f64..(y_max * 1.1).max(1.0))?;

    let (first_year, second_year) = (seedset.first_year, seedset.second_year);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(3)
        .x_label_formatter(&|x| {
            if x.abs() < 0.25 {
                first_year.to_string()
            } else if (x - 1.0).abs() < 0.25 {
                second_year.to_string()
            } else {
                String::new()
            }
        })
        .y_desc("Relative seed set (%)")
        .draw()?;

    for pair in &seedset.pairs {
        let points = [(0.0, pair.first.rel_seedset()), (1.0, pair.second.rel_seedset())];
        chart.draw_series(LineSeries::new(points, BLUE.mix(0.6).stroke_width(2)))?;
        chart.draw_series(points.iter().map(|&p| Circle::new(p, 4, BLUE.filled())))?;
        chart.draw_series(std::iter::once(Text::new(
            pair.plot.clone(),
            (1.05, pair.second.rel_seedset()),
            ("sans-serif", 14).into_font(),
        )))?;
    }

    root.present()?;
    Ok(())
}
