//! Hotspot Map Module
//! Writes the accident hotspot map as a standalone interactive HTML page:
//! a Leaflet base map with a leaflet.heat kernel-density layer, centered on
//! the mean coordinate of the sampled points.

use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HotspotError {
    #[error("Failed to write hotspot map: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode heat points: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serializes as `[lat, lng]`, the shape leaflet.heat consumes.
#[derive(Serialize)]
struct HeatPoint(f64, f64);

const ZOOM_START: u32 = 5;
const HEAT_RADIUS: u32 = 10;

// OpenStreetMap tiles instead of the discontinued Stamen Toner provider.
const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8"/>
<title>Accident Hotspots</title>
<meta name="viewport" content="width=device-width, initial-scale=1.0"/>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css"/>
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<script src="https://unpkg.com/leaflet.heat@0.2.0/dist/leaflet-heat.js"></script>
<style>html, body, #map { height: 100%; margin: 0; }</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map('map').setView([__CENTER_LAT__, __CENTER_LNG__], __ZOOM__);
L.tileLayer('https://tile.openstreetmap.org/{z}/{x}/{y}.png', {
    maxZoom: 19,
    attribution: '&copy; OpenStreetMap contributors'
}).addTo(map);
L.heatLayer(__POINTS__, {radius: __RADIUS__}).addTo(map);
</script>
</body>
</html>
"#;

/// Mean coordinate of the sample; (0, 0) when the sample is empty so the
/// degenerate map still renders.
fn center(points: &[(f64, f64)]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }
    let n = points.len() as f64;
    let (lat_sum, lng_sum) = points
        .iter()
        .fold((0.0, 0.0), |(la, ln), &(lat, lng)| (la + lat, ln + lng));
    (lat_sum / n, lng_sum / n)
}

/// Render the heat map HTML for `points` and write it to `path`.
pub fn write_hotspot_map(points: &[(f64, f64)], path: &Path) -> Result<(), HotspotError> {
    let heat: Vec<HeatPoint> = points.iter().map(|&(lat, lng)| HeatPoint(lat, lng)).collect();
    let (lat, lng) = center(points);

    let html = TEMPLATE
        .replace("__CENTER_LAT__", &format!("{lat:.6}"))
        .replace("__CENTER_LNG__", &format!("{lng:.6}"))
        .replace("__ZOOM__", &ZOOM_START.to_string())
        .replace("__RADIUS__", &HEAT_RADIUS.to_string())
        .replace("__POINTS__", &serde_json::to_string(&heat)?);

    std::fs::write(path, html)?;
    Ok(())
}
