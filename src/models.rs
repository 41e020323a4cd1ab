//! Data models for the climate dashboard

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

/// One yearly observation of global mean sea-level rise
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub year: i32,
    pub value_mm: f64, // rise relative to the first year of the series
}

/// Ordered, read-only yearly series. Years strictly increase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub source: String,
    pub points: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.to_string(),
            latitude,
            longitude,
        }
    }
}

/// Free-text risk description shown when a country is picked from the dropdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionNote {
    pub country: String,
    pub summary: String,
}

/// Inclusive slider bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderRange {
    pub min: u32,
    pub max: u32,
}

impl SliderRange {
    pub fn clamp(&self, value: u32) -> u32 {
        value.clamp(self.min, self.max)
    }

    /// Bounds must not be inverted; `clamp` relies on `min <= max`
    pub fn validate(&self, name: &str) -> Result<(), DashboardError> {
        if self.min > self.max {
            return Err(DashboardError::Parse(format!(
                "{name} range has min {} above max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Slider selections for the air-conditioner panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationInputs {
    pub hours_per_day: u32,
    pub days_used: u32,
}

impl SimulationInputs {
    /// Clamp raw control values into the configured slider bounds
    pub fn new(hours_per_day: u32, days_used: u32, hours: SliderRange, days: SliderRange) -> Self {
        Self {
            hours_per_day: hours.clamp(hours_per_day),
            days_used: days.clamp(days_used),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub energy_kwh: f64,
    pub co2_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub label: String,
}

/// Checkbox states for one session, keyed by item id
pub type ChecklistState = BTreeMap<String, bool>;
