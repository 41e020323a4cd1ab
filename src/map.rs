//! City risk markers for the world map panel

use serde::Serialize;
use serde_json::{Value, json};

use crate::colormap::{RiskColorMap, Rgb};
use crate::models::Location;
use crate::series::LengthUnit;

/// Marker radius in pixels, as drawn on the map
pub const MARKER_RADIUS: u32 = 10;
pub const MARKER_FILL_OPACITY: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub value_mm: f64,
    pub color: Rgb,
    pub band: Option<String>,
    pub popup: String,
}

/// One marker per city, all colored by the selected year's level
pub fn city_markers(
    cities: &[Location],
    color_map: &RiskColorMap,
    level_mm: f64,
    unit: LengthUnit,
) -> Vec<MapMarker> {
    let color = color_map.color_of(level_mm);
    let band = color_map.label_of(level_mm).map(str::to_string);

    cities
        .iter()
        .map(|city| MapMarker {
            name: city.name.clone(),
            latitude: city.latitude,
            longitude: city.longitude,
            value_mm: level_mm,
            color,
            band: band.clone(),
            popup: format!(
                "{}: sea-level rise {:.1} {}",
                city.name,
                unit.convert(level_mm),
                unit.suffix()
            ),
        })
        .collect()
}

/// GeoJSON FeatureCollection of markers (coordinates in lon, lat order)
pub fn to_geojson(markers: &[MapMarker], year: i32) -> Value {
    let features: Vec<Value> = markers
        .iter()
        .map(|m| {
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [m.longitude, m.latitude],
                },
                "properties": {
                    "name": m.name,
                    "year": year,
                    "value_mm": m.value_mm,
                    "color": m.color.to_string(),
                    "band": m.band,
                    "popup": m.popup,
                    "radius": MARKER_RADIUS,
                    "fill_opacity": MARKER_FILL_OPACITY,
                },
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features })
}
