//! Column Schema Module
//! Explicit typed schema for the accident dataset, instead of stringly-typed
//! column lookups scattered through the pipeline.

use polars::prelude::*;

/// Every column the pipeline touches, input and derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnId {
    Severity,
    StartTime,
    StartLat,
    StartLng,
    City,
    WeatherCondition,
    VisibilityMi,
    WindSpeedMph,
    PrecipitationIn,
    Street,
    Side,
    // Derived from StartTime during cleaning
    Hour,
    DayOfWeek,
}

/// The eleven input columns, in projection order.
pub const INPUT_COLUMNS: [ColumnId; 11] = [
    ColumnId::Severity,
    ColumnId::StartTime,
    ColumnId::StartLat,
    ColumnId::StartLng,
    ColumnId::City,
    ColumnId::WeatherCondition,
    ColumnId::VisibilityMi,
    ColumnId::WindSpeedMph,
    ColumnId::PrecipitationIn,
    ColumnId::Street,
    ColumnId::Side,
];

/// Weekday names in the fixed chart order (never alphabetical).
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

impl ColumnId {
    /// Header name as it appears in the CSV / enriched table.
    pub const fn name(self) -> &'static str {
        match self {
            ColumnId::Severity => "Severity",
            ColumnId::StartTime => "Start_Time",
            ColumnId::StartLat => "Start_Lat",
            ColumnId::StartLng => "Start_Lng",
            ColumnId::City => "City",
            ColumnId::WeatherCondition => "Weather_Condition",
            ColumnId::VisibilityMi => "Visibility(mi)",
            ColumnId::WindSpeedMph => "Wind_Speed(mph)",
            ColumnId::PrecipitationIn => "Precipitation(in)",
            ColumnId::Street => "Street",
            ColumnId::Side => "Side",
            ColumnId::Hour => "Hour",
            ColumnId::DayOfWeek => "DayOfWeek",
        }
    }

    /// Declared dtype the cleaner casts the column to.
    ///
    /// `StartTime` is `None`: it is parsed row-by-row with chrono and
    /// materialized as Datetime(us) rather than cast.
    pub fn declared_dtype(self) -> Option<DataType> {
        match self {
            ColumnId::Severity => Some(DataType::Int32),
            ColumnId::StartTime => None,
            ColumnId::StartLat
            | ColumnId::StartLng
            | ColumnId::VisibilityMi
            | ColumnId::WindSpeedMph
            | ColumnId::PrecipitationIn => Some(DataType::Float64),
            ColumnId::City
            | ColumnId::WeatherCondition
            | ColumnId::Street
            | ColumnId::Side
            | ColumnId::DayOfWeek => Some(DataType::String),
            ColumnId::Hour => Some(DataType::Int32),
        }
    }
}

/// All columns of the enriched table, in export order.
pub fn enriched_columns() -> Vec<&'static str> {
    INPUT_COLUMNS
        .iter()
        .map(|c| c.name())
        .chain([ColumnId::Hour.name(), ColumnId::DayOfWeek.name()])
        .collect()
}
