//! Statistics module - aggregations behind every report artifact

mod calculator;

pub use calculator::{
    correlation_matrix, gaussian_kde, histogram, hourly_counts, numeric_values, spatial_sample,
    top_weather_conditions, weekday_counts, wind_by_severity, CorrelationMatrix, Histogram,
    StatsError, CORRELATION_COLUMNS, HOTSPOT_SAMPLE_SEED, HOTSPOT_SAMPLE_SIZE,
};
