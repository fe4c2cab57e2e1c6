//! Static Chart Renderer
//! Draws the six descriptive PNG charts with plotters' bitmap backend.
//! Figure size mirrors the reference figures: 12x6 inches at 100 DPI,
//! square-ish for the correlation grid.

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::stats::{CorrelationMatrix, Histogram as HistogramBins};

const FIGURE_SIZE: (u32, u32) = (1200, 600);
const GRID_SIZE: (u32, u32) = (820, 700);

const BAR_BLUE: RGBColor = RGBColor(52, 120, 186);
const BAR_ORANGE: RGBColor = RGBColor(255, 165, 0);
const HIST_GREEN: RGBColor = RGBColor(56, 142, 60);
const KDE_RED: RGBColor = RGBColor(211, 47, 47);
const BOX_BLUE: RGBColor = RGBColor(33, 113, 181);

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to render chart: {0}")]
    Draw(String),
    #[error("I/O error while writing chart: {0}")]
    Io(#[from] std::io::Error),
}

fn draw_err<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Draw(err.to_string())
}

/// Bar chart of accident counts per hour (0-23).
pub fn render_hourly_bar(counts: &[(u32, u64)], path: &Path) -> Result<(), ChartError> {
    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let y_max = counts.iter().map(|&(_, c)| c).max().unwrap_or(0).max(1);
    let mut chart = ChartBuilder::on(&root)
        .caption("Accidents by Hour of Day", ("sans-serif", 30))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d((0u32..23u32).into_segmented(), 0u64..y_max + y_max / 10 + 1)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Hour")
        .y_desc("Number of Accidents")
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BAR_BLUE.mix(0.85).filled())
                .margin(3)
                .data(counts.iter().copied()),
        )
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    Ok(())
}

/// Bar chart over named categories in the order given.
fn render_category_bar(
    title: &str,
    x_desc: &str,
    labels: &[String],
    counts: &[u64],
    color: RGBColor,
    path: &Path,
) -> Result<(), ChartError> {
    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    if labels.is_empty() {
        // Degenerate input: leave an empty canvas rather than fail.
        root.present().map_err(draw_err)?;
        return Ok(());
    }

    let y_max = counts.iter().copied().max().unwrap_or(0).max(1);
    let last = (labels.len() - 1) as u32;
    let labels_owned = labels.to_vec();

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d((0u32..last).into_segmented(), 0u64..y_max + y_max / 10 + 1)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(x_desc)
        .y_desc("Number of Accidents")
        .axis_desc_style(("sans-serif", 18))
        .x_labels(labels.len())
        .x_label_formatter(&move |v| match v {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => labels_owned
                .get(*i as usize)
                .cloned()
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        })
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(color.mix(0.85).filled())
                .margin(8)
                .data(counts.iter().enumerate().map(|(i, &c)| (i as u32, c))),
        )
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    Ok(())
}

/// Weekday bar chart in fixed Monday..Sunday order.
pub fn render_weekday_bar(counts: &[(&'static str, u64)], path: &Path) -> Result<(), ChartError> {
    let labels: Vec<String> = counts.iter().map(|(n, _)| n.to_string()).collect();
    let values: Vec<u64> = counts.iter().map(|(_, c)| *c).collect();
    render_category_bar(
        "Accidents by Day of the Week",
        "",
        &labels,
        &values,
        BAR_BLUE,
        path,
    )
}

/// Top weather conditions, descending frequency.
pub fn render_weather_bar(top: &[(String, u64)], path: &Path) -> Result<(), ChartError> {
    let labels: Vec<String> = top.iter().map(|(n, _)| n.clone()).collect();
    let values: Vec<u64> = top.iter().map(|(_, c)| *c).collect();
    render_category_bar(
        "Top 10 Weather Conditions During Accidents",
        "Weather Condition",
        &labels,
        &values,
        BAR_ORANGE,
        path,
    )
}

/// Visibility histogram with a KDE overlay scaled into count space.
pub fn render_visibility_histogram(
    hist: &HistogramBins,
    kde_curve: &[(f64, f64)],
    path: &Path,
) -> Result<(), ChartError> {
    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    if hist.counts.is_empty() {
        root.present().map_err(draw_err)?;
        return Ok(());
    }

    let x_min = hist.edges[0];
    let x_max = *hist.edges.last().unwrap_or(&(x_min + 1.0));
    let bars_max = hist.counts.iter().copied().max().unwrap_or(0) as f64;
    let curve_max = kde_curve.iter().map(|&(_, y)| y).fold(0.0f64, f64::max);
    let y_max = bars_max.max(curve_max).max(1.0) * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption("Visibility Distribution During Accidents", ("sans-serif", 30))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(x_min..x_max.max(x_min + 1.0), 0f64..y_max)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_desc("Visibility (miles)")
        .y_desc("Count")
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(hist.counts.iter().enumerate().map(|(i, &count)| {
            Rectangle::new(
                [(hist.edges[i], 0.0), (hist.edges[i + 1], count as f64)],
                HIST_GREEN.mix(0.6).filled(),
            )
        }))
        .map_err(draw_err)?;

    if !kde_curve.is_empty() {
        chart
            .draw_series(LineSeries::new(
                kde_curve.iter().copied(),
                ShapeStyle::from(&KDE_RED).stroke_width(2),
            ))
            .map_err(draw_err)?;
    }

    root.present().map_err(draw_err)?;
    Ok(())
}

/// One box-and-whisker per severity level (1.5 IQR whiskers via Quartiles).
pub fn render_wind_boxplot(
    groups: &BTreeMap<i32, Vec<f64>>,
    path: &Path,
) -> Result<(), ChartError> {
    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let populated: Vec<(&i32, &Vec<f64>)> =
        groups.iter().filter(|(_, v)| !v.is_empty()).collect();
    if populated.is_empty() {
        root.present().map_err(draw_err)?;
        return Ok(());
    }

    let y_max = populated
        .iter()
        .flat_map(|(_, v)| v.iter())
        .fold(0.0f64, |acc, &v| acc.max(v)) as f32;
    let labels: Vec<String> = populated.iter().map(|(s, _)| s.to_string()).collect();
    let last = (populated.len() - 1) as u32;

    let mut chart = ChartBuilder::on(&root)
        .caption("Wind Speed by Severity Level", ("sans-serif", 30))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d((0u32..last).into_segmented(), 0f32..y_max * 1.1 + 1.0)
        .map_err(draw_err)?;

    let labels_for_axis = labels.clone();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Severity")
        .y_desc("Wind Speed (mph)")
        .axis_desc_style(("sans-serif", 18))
        .x_labels(labels.len())
        .x_label_formatter(&move |v| match v {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => labels_for_axis
                .get(*i as usize)
                .cloned()
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        })
        .draw()
        .map_err(draw_err)?;

    for (idx, (_, values)) in populated.iter().enumerate() {
        let quartiles = Quartiles::new(values);
        chart
            .draw_series(std::iter::once(
                Boxplot::new_vertical(SegmentValue::CenterOf(idx as u32), &quartiles)
                    .width(40)
                    .whisker_width(0.5)
                    .style(ShapeStyle::from(&BOX_BLUE)),
            ))
            .map_err(draw_err)?;
    }

    root.present().map_err(draw_err)?;
    Ok(())
}

/// Diverging blue-white-red color for a correlation value in [-1, 1].
fn correlation_color(value: f64) -> RGBColor {
    if value.is_nan() {
        return RGBColor(224, 224, 224);
    }
    let t = ((value + 1.0) / 2.0).clamp(0.0, 1.0);
    let lerp = |a: f64, b: f64, t: f64| (a + (b - a) * t) as u8;
    if t < 0.5 {
        let s = t * 2.0;
        RGBColor(lerp(59.0, 255.0, s), lerp(76.0, 255.0, s), lerp(192.0, 255.0, s))
    } else {
        let s = (t - 0.5) * 2.0;
        RGBColor(lerp(255.0, 180.0, s), lerp(255.0, 4.0, s), lerp(255.0, 38.0, s))
    }
}

/// Annotated 4x4 correlation heat grid, first variable in the top row.
pub fn render_correlation_heatmap(
    matrix: &CorrelationMatrix,
    path: &Path,
) -> Result<(), ChartError> {
    let root = BitMapBackend::new(path, GRID_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let n = matrix.labels.len();
    let mut chart = ChartBuilder::on(&root)
        .caption("Correlation Heatmap: Weather vs Severity", ("sans-serif", 26))
        .margin(15)
        .build_cartesian_2d(-1.9f64..n as f64 + 0.1, -0.9f64..n as f64 + 0.1)
        .map_err(draw_err)?;

    let cell_text = TextStyle::from(("sans-serif", 18).into_font())
        .pos(Pos::new(HPos::Center, VPos::Center));
    let cell_text_light = cell_text.color(&WHITE);
    let row_label = TextStyle::from(("sans-serif", 15).into_font())
        .pos(Pos::new(HPos::Right, VPos::Center));
    let col_label = TextStyle::from(("sans-serif", 15).into_font())
        .pos(Pos::new(HPos::Center, VPos::Top));

    let mut elements: Vec<DynElement<'_, BitMapBackend<'_>, (f64, f64)>> = Vec::new();
    for i in 0..n {
        // row i renders top-down
        let y0 = (n - 1 - i) as f64;
        for j in 0..n {
            let value = matrix.values[i][j];
            elements.push(
                Rectangle::new(
                    [(j as f64, y0), (j as f64 + 1.0, y0 + 1.0)],
                    correlation_color(value).filled(),
                )
                .into_dyn(),
            );
            elements.push(
                Rectangle::new(
                    [(j as f64, y0), (j as f64 + 1.0, y0 + 1.0)],
                    ShapeStyle::from(&BLACK),
                )
                .into_dyn(),
            );
            let text = if value.is_nan() {
                "-".to_string()
            } else {
                format!("{value:.2}")
            };
            let style = if value.abs() > 0.5 {
                cell_text_light.clone()
            } else {
                cell_text.clone()
            };
            elements.push(
                Text::new(text, (j as f64 + 0.5, y0 + 0.5), style).into_dyn(),
            );
        }

        elements.push(
            Text::new(
                matrix.labels[i].to_string(),
                (-0.1, y0 + 0.5),
                row_label.clone(),
            )
            .into_dyn(),
        );
        elements.push(
            Text::new(
                matrix.labels[i].to_string(),
                (i as f64 + 0.5, -0.1),
                col_label.clone(),
            )
            .into_dyn(),
        );
    }

    chart.draw_series(elements).map_err(draw_err)?;
    root.present().map_err(draw_err)?;
    Ok(())
}
