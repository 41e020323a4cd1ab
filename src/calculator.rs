//! Air-conditioner energy and emission calculator

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{DerivedMetrics, SimulationInputs};

/// How CO2 is derived from usage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EmissionModel {
    /// Grid emission factor applied to the energy total
    GridFactor { kg_per_kwh: f64 },
    /// Fixed CO2 mass per hour of operation, independent of the energy figure
    PerHour { kg_per_hour: f64 },
}

/// Rate constants for one appliance/grid combination
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyModel {
    pub power_kwh_per_hour: f64,
    pub emission: EmissionModel,
}

impl EnergyModel {
    /// Energy and CO2 totals for a usage pattern. Never rounds.
    pub fn compute(&self, inputs: &SimulationInputs) -> DerivedMetrics {
        let operating_hours = inputs.hours_per_day as f64 * inputs.days_used as f64;
        let energy_kwh = operating_hours * self.power_kwh_per_hour;
        let co2_kg = match self.emission {
            EmissionModel::GridFactor { kg_per_kwh } => energy_kwh * kg_per_kwh,
            EmissionModel::PerHour { kg_per_hour } => operating_hours * kg_per_hour,
        };
        DerivedMetrics { energy_kwh, co2_kg }
    }

    /// One-line description of the emission basis, shown under the results
    pub fn basis(&self) -> String {
        match self.emission {
            EmissionModel::GridFactor { kg_per_kwh } => {
                format!("grid emission factor {kg_per_kwh} kg/kWh")
            }
            EmissionModel::PerHour { kg_per_hour } => {
                format!("{kg_per_hour} kg CO2 per operating hour")
            }
        }
    }
}

/// Round for display only
pub fn round_to(value: f64, places: u32) -> f64 {
    let scale = 10f64.powi(places as i32);
    (value * scale).round() / scale
}

impl fmt::Display for DerivedMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total energy: {:.1} kWh", self.energy_kwh)?;
        write!(f, "CO2 emitted:  {:.2} kg", round_to(self.co2_kg, 2))
    }
}
