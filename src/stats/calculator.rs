//! Statistics Calculator Module
//! Pure aggregations over the enriched accident table: the counts,
//! distributions and matrices each report artifact is rendered from.

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use statrs::distribution::{Continuous, Normal};
use std::collections::BTreeMap;
use std::collections::HashMap;
use thiserror::Error;

use crate::data::schema::{ColumnId, WEEKDAYS};

/// Columns entering the Pearson correlation matrix, in display order.
pub const CORRELATION_COLUMNS: [ColumnId; 4] = [
    ColumnId::Severity,
    ColumnId::VisibilityMi,
    ColumnId::WindSpeedMph,
    ColumnId::PrecipitationIn,
];

/// Hotspot sample parameters, matching the reference analysis.
pub const HOTSPOT_SAMPLE_SIZE: usize = 10_000;
pub const HOTSPOT_SAMPLE_SEED: u64 = 42;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Histogram of a numeric column: `edges` has one more entry than `counts`.
#[derive(Debug, Clone, Default)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

/// Pairwise Pearson correlations; `values[i][j]` correlates
/// `labels[i]` with `labels[j]`. Degenerate pairs are NaN.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub labels: [&'static str; 4],
    pub values: [[f64; 4]; 4],
}

/// Accident counts per hour of day. Always 24 entries, zero-filled;
/// rows with a null Hour are skipped.
pub fn hourly_counts(df: &DataFrame) -> Result<Vec<(u32, u64)>, StatsError> {
    let hours = df.column(ColumnId::Hour.name())?.i32()?;
    let mut counts = [0u64; 24];
    for hour in hours.into_iter().flatten() {
        if (0..24).contains(&hour) {
            counts[hour as usize] += 1;
        }
    }
    Ok((0u32..24).map(|h| (h, counts[h as usize])).collect())
}

/// Accident counts per weekday in fixed Monday..Sunday order, zero-filled.
pub fn weekday_counts(df: &DataFrame) -> Result<Vec<(&'static str, u64)>, StatsError> {
    let days = df.column(ColumnId::DayOfWeek.name())?.str()?;
    let mut counts = [0u64; 7];
    for day in days.into_iter().flatten() {
        if let Some(idx) = WEEKDAYS.iter().position(|w| *w == day) {
            counts[idx] += 1;
        }
    }
    Ok(WEEKDAYS
        .iter()
        .enumerate()
        .map(|(i, name)| (*name, counts[i]))
        .collect())
}

/// The `limit` most frequent weather conditions, descending by count.
/// Ties are broken by first appearance in file order, which keeps the
/// ranking deterministic across runs.
pub fn top_weather_conditions(
    df: &DataFrame,
    limit: usize,
) -> Result<Vec<(String, u64)>, StatsError> {
    let weather = df.column(ColumnId::WeatherCondition.name())?.str()?;

    let mut counts: HashMap<&str, (u64, usize)> = HashMap::new();
    let mut next_rank = 0usize;
    for condition in weather.into_iter().flatten() {
        let entry = counts.entry(condition).or_insert_with(|| {
            let rank = next_rank;
            next_rank += 1;
            (0, rank)
        });
        entry.0 += 1;
    }

    let mut ranked: Vec<(&str, u64, usize)> = counts
        .into_iter()
        .map(|(name, (count, first_seen))| (name, count, first_seen))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked.truncate(limit);

    Ok(ranked
        .into_iter()
        .map(|(name, count, _)| (name.to_string(), count))
        .collect())
}

/// Non-null values of a numeric column as f64.
pub fn numeric_values(df: &DataFrame, column: ColumnId) -> Result<Vec<f64>, StatsError> {
    let values = df.column(column.name())?.cast(&DataType::Float64)?;
    let values = values.f64()?;
    Ok(values.into_iter().flatten().filter(|v| v.is_finite()).collect())
}

/// Equal-width histogram over `bins` buckets. Empty input yields an empty
/// histogram; a degenerate (single-valued) input yields one occupied bucket.
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    if values.is_empty() || bins == 0 {
        return Histogram::default();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = if max > min {
        (max - min) / bins as f64
    } else {
        1.0
    };

    let mut counts = vec![0u64; bins];
    for &v in values {
        let mut idx = ((v - min) / width) as usize;
        if idx >= bins {
            idx = bins - 1; // max lands in the last bucket
        }
        counts[idx] += 1;
    }

    let edges = (0..=bins).map(|i| min + i as f64 * width).collect();
    Histogram { edges, counts }
}

/// Gaussian kernel density estimate evaluated on `grid`, Silverman's rule
/// for the bandwidth. Returns densities (area 1); callers scale to count
/// space when overlaying on a histogram.
pub fn gaussian_kde(values: &[f64], grid: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n < 2 {
        return vec![0.0; grid.len()];
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std = variance.sqrt();

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let iqr = sorted[(3 * n) / 4] - sorted[n / 4];

    let mut spread = std;
    if iqr > 0.0 {
        spread = spread.min(iqr / 1.34);
    }
    let bandwidth = 0.9 * spread * (n as f64).powf(-0.2);
    if !(bandwidth > 0.0) {
        return vec![0.0; grid.len()];
    }

    let Ok(kernel) = Normal::new(0.0, 1.0) else {
        return vec![0.0; grid.len()];
    };

    grid.iter()
        .map(|&x| {
            values
                .iter()
                .map(|&xi| kernel.pdf((x - xi) / bandwidth))
                .sum::<f64>()
                / (n as f64 * bandwidth)
        })
        .collect()
}

/// Wind speed samples grouped by severity level, ordered by severity.
/// Rows with a null severity or wind speed are skipped.
pub fn wind_by_severity(df: &DataFrame) -> Result<BTreeMap<i32, Vec<f64>>, StatsError> {
    let severity = df.column(ColumnId::Severity.name())?.i32()?;
    let wind = df
        .column(ColumnId::WindSpeedMph.name())?
        .cast(&DataType::Float64)?;
    let wind = wind.f64()?;

    let mut groups: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for (sev, speed) in severity.into_iter().zip(wind.into_iter()) {
        if let (Some(sev), Some(speed)) = (sev, speed) {
            if speed.is_finite() {
                groups.entry(sev).or_default().push(speed);
            }
        }
    }
    Ok(groups)
}

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
}

/// Pairwise Pearson correlation of severity, visibility, wind speed and
/// precipitation, using pairwise-complete observations. Symmetric with a
/// unit diagonal; pairs without variance come out NaN.
pub fn correlation_matrix(df: &DataFrame) -> Result<CorrelationMatrix, StatsError> {
    let mut series: Vec<Vec<Option<f64>>> = Vec::with_capacity(CORRELATION_COLUMNS.len());
    for column in CORRELATION_COLUMNS {
        let values = df.column(column.name())?.cast(&DataType::Float64)?;
        series.push(values.f64()?.into_iter().collect());
    }

    let mut values = [[f64::NAN; 4]; 4];
    for i in 0..CORRELATION_COLUMNS.len() {
        values[i][i] = 1.0;
        for j in (i + 1)..CORRELATION_COLUMNS.len() {
            let mut xs = Vec::new();
            let mut ys = Vec::new();
            for (x, y) in series[i].iter().zip(&series[j]) {
                if let (Some(x), Some(y)) = (x, y) {
                    if x.is_finite() && y.is_finite() {
                        xs.push(*x);
                        ys.push(*y);
                    }
                }
            }
            let r = pearson(&xs, &ys);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    let mut labels = [""; 4];
    for (slot, column) in labels.iter_mut().zip(CORRELATION_COLUMNS) {
        *slot = column.name();
    }
    Ok(CorrelationMatrix { labels, values })
}

/// Deterministic sample of non-null (lat, lng) pairs for the hotspot map:
/// min(`max_size`, available) points drawn without replacement from a seeded
/// RNG, so identical inputs always yield the identical sample.
pub fn spatial_sample(
    df: &DataFrame,
    max_size: usize,
    seed: u64,
) -> Result<Vec<(f64, f64)>, StatsError> {
    let lat = df.column(ColumnId::StartLat.name())?.f64()?;
    let lng = df.column(ColumnId::StartLng.name())?.f64()?;

    let pairs: Vec<(f64, f64)> = lat
        .into_iter()
        .zip(lng.into_iter())
        .filter_map(|(lat, lng)| match (lat, lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some((lat, lng)),
            _ => None,
        })
        .collect();

    let amount = pairs.len().min(max_size);
    let mut rng = StdRng::seed_from_u64(seed);
    let indices = rand::seq::index::sample(&mut rng, pairs.len(), amount);
    Ok(indices.into_iter().map(|i| pairs[i]).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with(column: &str, values: Vec<Option<&str>>) -> DataFrame {
        DataFrame::new(vec![Column::new(column.into(), values)]).unwrap()
    }

    #[test]
    fn hourly_counts_are_zero_filled_and_skip_nulls() {
        let df = DataFrame::new(vec![Column::new(
            "Hour".into(),
            vec![Some(0i32), Some(13), Some(23), Some(13), None],
        )])
        .unwrap();

        let counts = hourly_counts(&df).unwrap();
        assert_eq!(counts.len(), 24);
        assert_eq!(counts[0], (0, 1));
        assert_eq!(counts[13], (13, 2));
        assert_eq!(counts[23], (23, 1));
        assert_eq!(counts[7], (7, 0));
    }

    #[test]
    fn weekday_counts_keep_monday_first_order() {
        let df = frame_with(
            "DayOfWeek",
            vec![Some("Friday"), Some("Monday"), Some("Monday"), None],
        );

        let counts = weekday_counts(&df).unwrap();
        let names: Vec<&str> = counts.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, WEEKDAYS.to_vec());
        assert_eq!(counts[0], ("Monday", 2));
        assert_eq!(counts[4], ("Friday", 1));
        assert_eq!(counts[6], ("Sunday", 0));
    }

    #[test]
    fn top_weather_sorts_by_count_then_first_seen() {
        let df = frame_with(
            "Weather_Condition",
            vec![
                Some("Rain"),
                Some("Clear"),
                Some("Clear"),
                Some("Fog"), // ties with Rain at 1; Rain appeared first
                None,
            ],
        );

        let top = top_weather_conditions(&df, 10).unwrap();
        assert_eq!(
            top,
            vec![
                ("Clear".to_string(), 2),
                ("Rain".to_string(), 1),
                ("Fog".to_string(), 1),
            ]
        );
    }

    #[test]
    fn top_weather_respects_limit() {
        let df = frame_with(
            "Weather_Condition",
            vec![Some("A"), Some("B"), Some("C"), Some("D")],
        );
        assert_eq!(top_weather_conditions(&df, 2).unwrap().len(), 2);
    }

    #[test]
    fn histogram_buckets_cover_the_range() {
        let values = [0.0, 1.0, 2.0, 3.0, 10.0];
        let hist = histogram(&values, 5);
        assert_eq!(hist.counts.len(), 5);
        assert_eq!(hist.edges.len(), 6);
        assert_eq!(hist.counts.iter().sum::<u64>(), values.len() as u64);
        // max value lands in the last bucket, not past it
        assert_eq!(hist.counts[4], 1);
    }

    #[test]
    fn histogram_of_nothing_is_empty() {
        let hist = histogram(&[], 30);
        assert!(hist.counts.is_empty());
        assert!(hist.edges.is_empty());
    }

    #[test]
    fn kde_integrates_to_roughly_one() {
        let values: Vec<f64> = (0..100).map(|i| (i % 17) as f64).collect();
        let grid: Vec<f64> = (-50..=220).map(|i| i as f64 / 10.0).collect();
        let density = gaussian_kde(&values, &grid);
        let step = 0.1;
        let area: f64 = density.iter().map(|d| d * step).sum();
        assert!((area - 1.0).abs() < 0.05, "area was {area}");
    }

    #[test]
    fn wind_groups_by_severity_skipping_nulls() {
        let df = DataFrame::new(vec![
            Column::new("Severity".into(), vec![Some(2i32), Some(4), Some(2), None]),
            Column::new(
                "Wind_Speed(mph)".into(),
                vec![Some(5.0), Some(20.0), None, Some(7.0)],
            ),
        ])
        .unwrap();

        let groups = wind_by_severity(&df).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[&2], vec![5.0]);
        assert_eq!(groups[&4], vec![20.0]);
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let df = DataFrame::new(vec![
            Column::new("Severity".into(), vec![1i32, 2, 3, 4, 2, 3]),
            Column::new("Visibility(mi)".into(), vec![10.0, 8.0, 4.0, 1.0, 9.0, 3.0]),
            Column::new("Wind_Speed(mph)".into(), vec![3.0, 6.0, 9.0, 15.0, 5.0, 11.0]),
            Column::new(
                "Precipitation(in)".into(),
                vec![0.0, 0.1, 0.4, 0.9, 0.0, 0.5],
            ),
        ])
        .unwrap();

        let matrix = correlation_matrix(&df).unwrap();
        for i in 0..4 {
            assert!((matrix.values[i][i] - 1.0).abs() < 1e-12);
            for j in 0..4 {
                let v = matrix.values[i][j];
                assert!((-1.0..=1.0).contains(&v));
                assert!((v - matrix.values[j][i]).abs() < 1e-12);
            }
        }
        // severity rises as visibility falls in this fixture
        assert!(matrix.values[0][1] < 0.0);
    }

    #[test]
    fn zero_variance_column_correlates_as_nan() {
        let df = DataFrame::new(vec![
            Column::new("Severity".into(), vec![2i32, 2, 2]),
            Column::new("Visibility(mi)".into(), vec![10.0, 5.0, 1.0]),
            Column::new("Wind_Speed(mph)".into(), vec![3.0, 6.0, 9.0]),
            Column::new("Precipitation(in)".into(), vec![0.0, 0.1, 0.2]),
        ])
        .unwrap();

        let matrix = correlation_matrix(&df).unwrap();
        assert!(matrix.values[0][1].is_nan());
        assert!((matrix.values[0][0] - 1.0).abs() < 1e-12);
        assert!(!matrix.values[1][2].is_nan());
    }

    fn coordinate_frame(n: usize) -> DataFrame {
        let lat: Vec<Option<f64>> = (0..n).map(|i| Some(30.0 + i as f64 * 0.01)).collect();
        let lng: Vec<Option<f64>> = (0..n).map(|i| Some(-90.0 - i as f64 * 0.01)).collect();
        DataFrame::new(vec![
            Column::new("Start_Lat".into(), lat),
            Column::new("Start_Lng".into(), lng),
        ])
        .unwrap()
    }

    #[test]
    fn spatial_sample_is_capped_and_deterministic() {
        let df = coordinate_frame(500);
        let a = spatial_sample(&df, 100, HOTSPOT_SAMPLE_SEED).unwrap();
        let b = spatial_sample(&df, 100, HOTSPOT_SAMPLE_SEED).unwrap();
        assert_eq!(a.len(), 100);
        assert_eq!(a, b);
    }

    #[test]
    fn spatial_sample_takes_everything_when_small() {
        let mut df = coordinate_frame(5);
        df.with_column(Column::new(
            "Start_Lat".into(),
            vec![Some(30.0), Some(30.1), None, Some(30.3), Some(30.4)],
        ))
        .unwrap();

        let sample = spatial_sample(&df, 10_000, HOTSPOT_SAMPLE_SEED).unwrap();
        assert_eq!(sample.len(), 4); // one row lost to the null latitude
    }
}
