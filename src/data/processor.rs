//! Data Processor Module
//! Projects the loaded table down to the accident schema, parses timestamps
//! and derives the calendar features (Hour, DayOfWeek).

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use polars::prelude::*;
use thiserror::Error;

use crate::data::schema::{ColumnId, INPUT_COLUMNS, WEEKDAYS};

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Column '{0}' is absent from the loaded table")]
    MissingColumn(&'static str),
}

/// Accepted timestamp layouts. The dataset uses space-separated timestamps,
/// occasionally with a fractional-seconds tail; `T`-separated is accepted as
/// a fallback.
const TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw.trim(), fmt).ok())
}

fn weekday_name(day: Weekday) -> &'static str {
    WEEKDAYS[day.num_days_from_monday() as usize]
}

/// Narrow the loaded table to the eleven accident columns, apply the declared
/// dtypes, parse `Start_Time` and append `Hour` / `DayOfWeek`.
///
/// Policy (deliberate, see DESIGN.md): a row with an unparsable timestamp or
/// numeric field keeps its place with nulls in the affected columns; only a
/// missing column is fatal.
pub fn clean(df: &DataFrame) -> Result<DataFrame, ProcessorError> {
    for col in INPUT_COLUMNS {
        if df.column(col.name()).is_err() {
            return Err(ProcessorError::MissingColumn(col.name()));
        }
    }

    let mut out = df.select(INPUT_COLUMNS.iter().map(|c| c.name()))?;

    // Non-strict casts: values that do not fit the declared dtype become null.
    for col in INPUT_COLUMNS {
        if let Some(dtype) = col.declared_dtype() {
            let cast = out.column(col.name())?.cast(&dtype)?;
            out.with_column(cast)?;
        }
    }

    let raw_times = out
        .column(ColumnId::StartTime.name())?
        .cast(&DataType::String)?;
    let raw_times = raw_times.str()?;

    let height = out.height();
    let mut stamps: Vec<Option<i64>> = Vec::with_capacity(height);
    let mut hours: Vec<Option<i32>> = Vec::with_capacity(height);
    let mut days: Vec<Option<&'static str>> = Vec::with_capacity(height);

    for value in raw_times.into_iter() {
        match value.and_then(parse_timestamp) {
            Some(dt) => {
                stamps.push(Some(dt.and_utc().timestamp_micros()));
                hours.push(Some(dt.hour() as i32));
                days.push(Some(weekday_name(dt.weekday())));
            }
            None => {
                stamps.push(None);
                hours.push(None);
                days.push(None);
            }
        }
    }

    let parsed = Column::new(ColumnId::StartTime.name().into(), stamps)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;
    out.with_column(parsed)?;
    out.with_column(Column::new(ColumnId::Hour.name().into(), hours))?;
    out.with_column(Column::new(ColumnId::DayOfWeek.name().into(), days))?;

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::enriched_columns;

    fn sample_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("Severity".into(), vec!["2", "3", "not-a-number"]),
            Column::new(
                "Start_Time".into(),
                vec![
                    "2023-01-02 00:15:00",
                    "2023-01-02 13:30:45.500",
                    "garbage",
                ],
            ),
            Column::new("Start_Lat".into(), vec![39.1, 40.7, 34.0]),
            Column::new("Start_Lng".into(), vec![-84.5, -74.0, -118.2]),
            Column::new("City".into(), vec!["Cincinnati", "New York", "Los Angeles"]),
            Column::new("Weather_Condition".into(), vec!["Clear", "Rain", "Fog"]),
            Column::new("Visibility(mi)".into(), vec![10.0, 4.0, 0.5]),
            Column::new("Wind_Speed(mph)".into(), vec![5.0, 12.0, 2.0]),
            Column::new("Precipitation(in)".into(), vec![0.0, 0.3, 0.0]),
            Column::new("Street".into(), vec!["Main St", "Broadway", "Sunset Blvd"]),
            Column::new("Side".into(), vec!["R", "L", "R"]),
        ])
        .expect("frame")
    }

    #[test]
    fn derives_hour_and_day_consistent_with_start_time() {
        let cleaned = clean(&sample_frame()).expect("clean");

        let hours = cleaned.column("Hour").unwrap().i32().unwrap();
        assert_eq!(hours.get(0), Some(0));
        assert_eq!(hours.get(1), Some(13));

        let days = cleaned.column("DayOfWeek").unwrap().str().unwrap();
        // 2023-01-02 is a Monday
        assert_eq!(days.get(0), Some("Monday"));
        assert_eq!(days.get(1), Some("Monday"));
    }

    #[test]
    fn unparsable_timestamp_nulls_row_features() {
        let cleaned = clean(&sample_frame()).expect("clean");

        let hours = cleaned.column("Hour").unwrap().i32().unwrap();
        assert_eq!(hours.get(2), None);
        let days = cleaned.column("DayOfWeek").unwrap().str().unwrap();
        assert_eq!(days.get(2), None);

        let stamps = cleaned.column("Start_Time").unwrap();
        assert_eq!(stamps.null_count(), 1);
    }

    #[test]
    fn non_numeric_severity_becomes_null() {
        let cleaned = clean(&sample_frame()).expect("clean");
        let severity = cleaned.column("Severity").unwrap().i32().unwrap();
        assert_eq!(severity.get(0), Some(2));
        assert_eq!(severity.get(2), None);
    }

    #[test]
    fn output_columns_match_enriched_schema() {
        let cleaned = clean(&sample_frame()).expect("clean");
        let names: Vec<&str> = cleaned
            .get_column_names()
            .iter()
            .map(|s| s.as_str())
            .collect();
        assert_eq!(names, enriched_columns());
    }

    #[test]
    fn missing_column_is_fatal() {
        let df = DataFrame::new(vec![Column::new(
            "Severity".into(),
            vec![2i32, 3],
        )])
        .unwrap();
        let err = clean(&df).unwrap_err();
        assert!(matches!(err, ProcessorError::MissingColumn("Start_Time")));
    }
}
