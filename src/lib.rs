//! Accident Insights - batch analysis of US traffic accident records.
//!
//! Loads the accident CSV, derives calendar features, renders seven
//! descriptive report artifacts and exports the cleaned table.

pub mod charts;
pub mod data;
pub mod pipeline;
pub mod stats;
