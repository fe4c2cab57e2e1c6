//! Pipeline Module
//! Runs the full batch: load, clean, render the seven report artifacts,
//! export the enriched table.
//!
//! The report steps are mutually independent reads of one immutable table,
//! so they go through rayon; a failed step is logged and skipped without
//! disturbing the others. Load, clean and export failures abort the run.

use polars::prelude::DataFrame;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::charts;
use crate::data;
use crate::data::schema::ColumnId;
use crate::stats;

pub const EXPORT_FILE: &str = "processed_accident_data.csv";
pub const TOP_WEATHER_LIMIT: usize = 10;
pub const VISIBILITY_BINS: usize = 30;
const KDE_GRID_POINTS: usize = 200;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] data::LoaderError),
    #[error(transparent)]
    Clean(#[from] data::ProcessorError),
    #[error(transparent)]
    Export(#[from] data::ExportError),
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Stats(#[from] stats::StatsError),
    #[error(transparent)]
    Chart(#[from] charts::ChartError),
    #[error(transparent)]
    Hotspot(#[from] charts::HotspotError),
}

/// The seven report artifacts, in the reference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    HourlyCounts,
    WeekdayCounts,
    TopWeather,
    VisibilityDistribution,
    WindBySeverity,
    CorrelationMatrix,
    HotspotMap,
}

impl Report {
    pub const ALL: [Report; 7] = [
        Report::HourlyCounts,
        Report::WeekdayCounts,
        Report::TopWeather,
        Report::VisibilityDistribution,
        Report::WindBySeverity,
        Report::CorrelationMatrix,
        Report::HotspotMap,
    ];

    pub const fn file_name(self) -> &'static str {
        match self {
            Report::HourlyCounts => "accidents_by_hour.png",
            Report::WeekdayCounts => "accidents_by_day.png",
            Report::TopWeather => "top_weather_conditions.png",
            Report::VisibilityDistribution => "visibility_distribution.png",
            Report::WindBySeverity => "wind_speed_by_severity.png",
            Report::CorrelationMatrix => "correlation_heatmap.png",
            Report::HotspotMap => "accident_hotspots.html",
        }
    }

    /// Render this report from the enriched table into `out_dir`.
    pub fn run(self, df: &DataFrame, out_dir: &Path) -> Result<PathBuf, ReportError> {
        let dest = out_dir.join(self.file_name());
        match self {
            Report::HourlyCounts => {
                let counts = stats::hourly_counts(df)?;
                charts::render_hourly_bar(&counts, &dest)?;
            }
            Report::WeekdayCounts => {
                let counts = stats::weekday_counts(df)?;
                charts::render_weekday_bar(&counts, &dest)?;
            }
            Report::TopWeather => {
                let top = stats::top_weather_conditions(df, TOP_WEATHER_LIMIT)?;
                charts::render_weather_bar(&top, &dest)?;
            }
            Report::VisibilityDistribution => {
                let values = stats::numeric_values(df, ColumnId::VisibilityMi)?;
                let hist = stats::histogram(&values, VISIBILITY_BINS);
                let curve = kde_curve(&values, &hist);
                charts::render_visibility_histogram(&hist, &curve, &dest)?;
            }
            Report::WindBySeverity => {
                let groups = stats::wind_by_severity(df)?;
                charts::render_wind_boxplot(&groups, &dest)?;
            }
            Report::CorrelationMatrix => {
                let matrix = stats::correlation_matrix(df)?;
                charts::render_correlation_heatmap(&matrix, &dest)?;
            }
            Report::HotspotMap => {
                let sample = stats::spatial_sample(
                    df,
                    stats::HOTSPOT_SAMPLE_SIZE,
                    stats::HOTSPOT_SAMPLE_SEED,
                )?;
                charts::write_hotspot_map(&sample, &dest)?;
            }
        }
        Ok(dest)
    }
}

/// KDE overlay for the visibility histogram, scaled from density into count
/// space (n * bin width) so it shares the histogram's y axis.
fn kde_curve(values: &[f64], hist: &stats::Histogram) -> Vec<(f64, f64)> {
    if hist.counts.is_empty() || values.len() < 2 {
        return Vec::new();
    }
    let x0 = hist.edges[0];
    let x1 = *hist.edges.last().unwrap_or(&x0);
    if !(x1 > x0) {
        return Vec::new();
    }

    let grid: Vec<f64> = (0..=KDE_GRID_POINTS)
        .map(|i| x0 + (x1 - x0) * i as f64 / KDE_GRID_POINTS as f64)
        .collect();
    let density = stats::gaussian_kde(values, &grid);
    let bin_width = hist.edges[1] - hist.edges[0];
    let scale = values.len() as f64 * bin_width;

    grid.into_iter()
        .zip(density)
        .map(|(x, d)| (x, d * scale))
        .collect()
}

/// Everything a successful run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub charts: Vec<PathBuf>,
    pub hotspot: Option<PathBuf>,
    pub export: PathBuf,
}

/// Execute the whole batch for `input`, writing all artifacts to `out_dir`.
pub fn run(input: &Path, out_dir: &Path) -> Result<RunSummary, PipelineError> {
    let raw = data::load_csv(input)?;
    info!(rows = raw.height(), "loaded input table");

    let enriched = data::clean(&raw)?;
    info!(
        rows = enriched.height(),
        columns = enriched.width(),
        "projected and enriched table"
    );

    let results: Vec<(Report, Result<PathBuf, ReportError>)> = Report::ALL
        .par_iter()
        .map(|report| (*report, report.run(&enriched, out_dir)))
        .collect();

    let mut charts = Vec::new();
    let mut hotspot = None;
    for (report, result) in results {
        match result {
            Ok(path) => {
                info!(report = ?report, path = %path.display(), "report rendered");
                if report == Report::HotspotMap {
                    hotspot = Some(path);
                } else {
                    charts.push(path);
                }
            }
            Err(err) => warn!(report = ?report, %err, "report step failed, continuing"),
        }
    }

    let export = out_dir.join(EXPORT_FILE);
    data::export_csv(&enriched, &export)?;
    info!(path = %export.display(), "enriched table exported");

    Ok(RunSummary {
        charts,
        hotspot,
        export,
    })
}
