//! Dashboard variants
//!
//! Every dashboard shares the same panels; variants differ only in their
//! city list, color scheme, rate constants, slider bounds and checklist copy.
//! Constants are kept per variant exactly as configured, even where two
//! variants describe the same real-world quantity differently.

use serde::{Deserialize, Serialize};

use crate::calculator::{EmissionModel, EnergyModel};
use crate::colormap::{RiskBand, RiskColorMap, Rgb, Threshold};
use crate::error::DashboardError;
use crate::models::{ChecklistItem, Location, RegionNote, SliderRange, TimeSeries};

pub const DEFAULT_VARIANT: &str = "classroom";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ColorScheme {
    /// Diverging gradient; `max` defaults to the largest value in the series
    Gradient {
        #[serde(default)]
        min: f64,
        #[serde(default)]
        max: Option<f64>,
    },
    Thresholds { bands: Vec<Threshold>, top: RiskBand },
}

impl ColorScheme {
    pub fn build(&self, series: &TimeSeries) -> RiskColorMap {
        match self {
            ColorScheme::Gradient { min, max } => {
                let max = max.unwrap_or_else(|| series.value_bounds().1);
                RiskColorMap::continuous(*min, max)
            }
            ColorScheme::Thresholds { bands, top } => {
                RiskColorMap::thresholds(bands.clone(), top.clone())
            }
        }
    }
}

/// Initial control positions when a session starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    pub start_year: i32,
    /// Last year of the series when unset
    #[serde(default)]
    pub end_year: Option<i32>,
    pub inspect_year: i32,
    pub hours_per_day: u32,
    pub days_used: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub name: String,
    pub title: String,
    pub cities: Vec<Location>,
    pub color_scheme: ColorScheme,
    /// Map legend; derived from the color map when empty
    #[serde(default)]
    pub legend: Vec<RiskBand>,
    pub energy: EnergyModel,
    pub hours: SliderRange,
    pub days: SliderRange,
    pub defaults: Defaults,
    pub checklist: Vec<ChecklistItem>,
    #[serde(default)]
    pub region_notes: Vec<RegionNote>,
}

impl Variant {
    pub fn validate(&self) -> Result<(), DashboardError> {
        self.hours.validate("hours")?;
        self.days.validate("days")
    }

    pub fn legend(&self, color_map: &RiskColorMap) -> Vec<RiskBand> {
        if self.legend.is_empty() {
            color_map.legend()
        } else {
            self.legend.clone()
        }
    }

    pub fn region_note(&self, country: &str) -> Option<&RegionNote> {
        self.region_notes
            .iter()
            .find(|note| note.country.eq_ignore_ascii_case(country))
    }
}

#[derive(Debug, Clone)]
pub struct VariantSet {
    variants: Vec<Variant>,
}

impl VariantSet {
    pub fn builtin() -> Self {
        Self {
            variants: vec![classroom(), coastal()],
        }
    }

    /// Add a variant, replacing any built-in one with the same name
    pub fn insert(&mut self, variant: Variant) {
        self.variants.retain(|v| v.name != variant.name);
        self.variants.push(variant);
    }

    pub fn insert_json(&mut self, json: &str) -> Result<&Variant, DashboardError> {
        let variant: Variant =
            serde_json::from_str(json).map_err(|e| DashboardError::Parse(e.to_string()))?;
        variant.validate()?;
        let name = variant.name.clone();
        self.insert(variant);
        self.find(&name)
    }

    pub fn find(&self, name: &str) -> Result<&Variant, DashboardError> {
        self.variants
            .iter()
            .find(|v| v.name == name)
            .ok_or_else(|| DashboardError::UnknownVariant(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.variants.iter()
    }
}

fn mission(id: &str, label: &str) -> ChecklistItem {
    ChecklistItem {
        id: id.to_string(),
        label: label.to_string(),
    }
}

fn note(country: &str, summary: &str) -> RegionNote {
    RegionNote {
        country: country.to_string(),
        summary: summary.to_string(),
    }
}

fn hex(r: u8, g: u8, b: u8) -> Rgb {
    Rgb::new(r, g, b)
}

/// The four-band sea-level legend shared by the map panels
fn sea_level_bands() -> (Vec<Threshold>, RiskBand) {
    let band = |upper: f64, label: &str, color: Rgb| Threshold {
        upper,
        band: RiskBand::new(label, color),
    };
    (
        vec![
            band(20.0, "low (0-20 mm)", hex(0x08, 0x30, 0x6b)),
            band(40.0, "moderate (20-40 mm)", hex(0x2b, 0x8c, 0xbe)),
            band(60.0, "high (40-60 mm)", hex(0xfd, 0xae, 0x61)),
        ],
        RiskBand::new("very high (60 mm and above)", hex(0xd7, 0x30, 0x27)),
    )
}

/// Twelve world cities, continuous gradient, Korean grid emission factor
fn classroom() -> Variant {
    let (bands, top) = sea_level_bands();
    let mut legend: Vec<RiskBand> = bands.into_iter().map(|t| t.band).collect();
    legend.push(top);

    Variant {
        name: "classroom".to_string(),
        title: "When the sea boils, the classroom boils too".to_string(),
        cities: vec![
            Location::new("Seoul", 37.5665, 126.9780),
            Location::new("Busan", 35.1796, 129.0756),
            Location::new("Tokyo", 35.6762, 139.6503),
            Location::new("Shanghai", 31.2304, 121.4737),
            Location::new("Jakarta", -6.2088, 106.8456),
            Location::new("London", 51.5074, -0.1278),
            Location::new("Amsterdam", 52.3676, 4.9041),
            Location::new("New York", 40.7128, -74.0060),
            Location::new("Miami", 25.7617, -80.1918),
            Location::new("Rio de Janeiro", -22.9068, -43.1729),
            Location::new("Cape Town", -33.9249, 18.4241),
            Location::new("Sydney", -33.8688, 151.2093),
        ],
        color_scheme: ColorScheme::Gradient { min: 0.0, max: None },
        legend,
        energy: EnergyModel {
            power_kwh_per_hour: 0.8,
            emission: EmissionModel::GridFactor { kg_per_kwh: 0.424 },
        },
        hours: SliderRange { min: 0, max: 24 },
        days: SliderRange { min: 1, max: 90 },
        defaults: Defaults {
            start_year: 2010,
            end_year: None,
            inspect_year: 2015,
            hours_per_day: 6,
            days_used: 30,
        },
        checklist: vec![
            mission(
                "data-explorers",
                "Climate data explorers: analyse the data and share it with friends",
            ),
            mission(
                "cooler-classroom",
                "Cool our classroom by 1°C: blinds, ventilation, energy monitors",
            ),
            mission(
                "speak-with-data",
                "Speak with data: survey classroom temperature and air-conditioner use, then ask for fixes",
            ),
        ],
        region_notes: Vec::new(),
    }
}

/// Four low-lying cities, discrete bands, per-hour emission constant
fn coastal() -> Variant {
    let (bands, top) = sea_level_bands();

    Variant {
        name: "coastal".to_string(),
        title: "Rising seas at the coast".to_string(),
        cities: vec![
            Location::new("Male", 4.1755, 73.5093),
            Location::new("Amsterdam", 52.3676, 4.9041),
            Location::new("Dhaka", 23.8103, 90.4125),
            Location::new("Busan", 35.1796, 129.0756),
        ],
        color_scheme: ColorScheme::Thresholds { bands, top },
        legend: Vec::new(),
        energy: EnergyModel {
            power_kwh_per_hour: 1.0,
            emission: EmissionModel::PerHour { kg_per_hour: 0.46 },
        },
        hours: SliderRange { min: 1, max: 12 },
        days: SliderRange { min: 1, max: 60 },
        defaults: Defaults {
            start_year: 1993,
            end_year: None,
            inspect_year: 2023,
            hours_per_day: 4,
            days_used: 30,
        },
        checklist: vec![
            mission("set-26", "Keep the classroom at 26°C"),
            mission("fan-first", "Use a fan alongside the air conditioner"),
            mission("unplug", "Switch off idle devices"),
            mission("summer-class", "Join a summer climate class"),
        ],
        region_notes: vec![
            note("Maldives", "Most islands sit less than one metre above sea level."),
            note("Netherlands", "A quarter of the land lies below sea level behind dikes."),
            note("Bangladesh", "Delta farmland floods further inland with each storm surge."),
            note("South Korea", "Southern port cities face more frequent coastal flooding."),
        ],
    }
}
