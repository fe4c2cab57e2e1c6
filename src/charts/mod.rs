//! Charts module - static PNG rendering and the interactive hotspot map

mod hotspot;
mod renderer;

pub use hotspot::{write_hotspot_map, HotspotError};
pub use renderer::{
    render_correlation_heatmap, render_hourly_bar, render_visibility_histogram,
    render_weather_bar, render_weekday_bar, render_wind_boxplot, ChartError,
};
