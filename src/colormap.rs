//! Risk color mapping for sea-level values
//!
//! Two forms are supported: a continuous diverging gradient over a fixed
//! domain, and an ordered threshold table of discrete bands. Both clamp
//! out-of-domain values and both are monotonic in alarm level.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DashboardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(DashboardError::Parse(format!("invalid color '{s}'")));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| DashboardError::Parse(format!("invalid color '{s}'")))
        };
        Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = DashboardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// ColorBrewer RdYlBu reversed: deep blue (safe) through pale yellow to deep red
const RD_YL_BU_R: [Rgb; 11] = [
    Rgb::new(0x31, 0x36, 0x95),
    Rgb::new(0x45, 0x75, 0xb4),
    Rgb::new(0x74, 0xad, 0xd1),
    Rgb::new(0xab, 0xd9, 0xe9),
    Rgb::new(0xe0, 0xf3, 0xf8),
    Rgb::new(0xff, 0xff, 0xbf),
    Rgb::new(0xfe, 0xe0, 0x90),
    Rgb::new(0xfd, 0xae, 0x61),
    Rgb::new(0xf4, 0x6d, 0x43),
    Rgb::new(0xd7, 0x30, 0x27),
    Rgb::new(0xa5, 0x00, 0x26),
];

/// Sample the diverging gradient at `t` in [0, 1]
pub fn diverging(t: f64) -> Rgb {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let pos = t * (RD_YL_BU_R.len() - 1) as f64;
    let idx = (pos.floor() as usize).min(RD_YL_BU_R.len() - 2);
    RD_YL_BU_R[idx].lerp(RD_YL_BU_R[idx + 1], pos - idx as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBand {
    pub label: String,
    pub color: Rgb,
}

impl RiskBand {
    pub fn new(label: &str, color: Rgb) -> Self {
        Self {
            label: label.to_string(),
            color,
        }
    }
}

/// Upper bound (inclusive) of one band in a threshold table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub upper: f64,
    pub band: RiskBand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RiskColorMap {
    Continuous { min: f64, max: f64 },
    Thresholds { bands: Vec<Threshold>, top: RiskBand },
}

impl RiskColorMap {
    pub fn continuous(min: f64, max: f64) -> Self {
        RiskColorMap::Continuous { min, max }
    }

    /// Threshold table; bands are ordered by ascending upper bound
    pub fn thresholds(mut bands: Vec<Threshold>, top: RiskBand) -> Self {
        bands.sort_by(|a, b| a.upper.total_cmp(&b.upper));
        RiskColorMap::Thresholds { bands, top }
    }

    /// Ordering used for "how alarming is this value".
    ///
    /// Continuous maps return the normalized position in [0, 1]; threshold
    /// maps return the band ordinal (0 for the first band, `bands.len()` for
    /// the top band).
    pub fn alarm_level(&self, value: f64) -> f64 {
        match self {
            RiskColorMap::Continuous { min, max } => normalize(value, *min, *max),
            RiskColorMap::Thresholds { bands, .. } => band_index(bands, value) as f64,
        }
    }

    pub fn color_of(&self, value: f64) -> Rgb {
        match self {
            RiskColorMap::Continuous { min, max } => diverging(normalize(value, *min, *max)),
            RiskColorMap::Thresholds { bands, top } => bands
                .get(band_index(bands, value))
                .map_or(top.color, |t| t.band.color),
        }
    }

    /// Band label for threshold maps; continuous maps have none
    pub fn label_of(&self, value: f64) -> Option<&str> {
        match self {
            RiskColorMap::Continuous { .. } => None,
            RiskColorMap::Thresholds { bands, top } => Some(
                bands
                    .get(band_index(bands, value))
                    .map_or(top.label.as_str(), |t| t.band.label.as_str()),
            ),
        }
    }

    /// Legend entries, safest first
    pub fn legend(&self) -> Vec<RiskBand> {
        match self {
            RiskColorMap::Continuous { min, max } => [0.0, 0.25, 0.5, 0.75, 1.0]
                .iter()
                .map(|&t| {
                    let value = min + (max - min) * t;
                    RiskBand {
                        label: format!("{value:.1}"),
                        color: diverging(t),
                    }
                })
                .collect(),
            RiskColorMap::Thresholds { bands, top } => {
                let mut legend: Vec<RiskBand> = bands.iter().map(|t| t.band.clone()).collect();
                legend.push(top.clone());
                legend
            }
        }
    }
}

fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if max <= min || value.is_nan() {
        return 0.0;
    }
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

/// Index of the first threshold the value does not exceed; `bands.len()` if none
fn band_index(bands: &[Threshold], value: f64) -> usize {
    bands
        .iter()
        .position(|t| value <= t.upper)
        .unwrap_or(bands.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn classroom_legend() -> RiskColorMap {
        RiskColorMap::thresholds(
            vec![
                Threshold {
                    upper: 40.0,
                    band: RiskBand::new("moderate", "#2b8cbe".parse().unwrap()),
                },
                Threshold {
                    upper: 20.0,
                    band: RiskBand::new("low", "#08306b".parse().unwrap()),
                },
                Threshold {
                    upper: 60.0,
                    band: RiskBand::new("high", "#fdae61".parse().unwrap()),
                },
            ],
            RiskBand::new("very high", "#d73027".parse().unwrap()),
        )
    }

    #[test]
    fn hex_formatting_and_parsing() {
        let c: Rgb = "#d73027".parse().unwrap();
        assert_eq!(c, Rgb::new(0xd7, 0x30, 0x27));
        assert_eq!(c.to_string(), "#d73027");
        assert_eq!("08306B".parse::<Rgb>().unwrap().to_string(), "#08306b");
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#zzzzzz".parse::<Rgb>().is_err());
    }

    #[test]
    fn gradient_endpoints_and_midpoint() {
        assert_eq!(diverging(0.0).to_string(), "#313695");
        assert_eq!(diverging(0.5).to_string(), "#ffffbf");
        assert_eq!(diverging(1.0).to_string(), "#a50026");
        assert_eq!(diverging(f64::NAN), diverging(0.0));
    }

    #[test]
    fn thresholds_pick_first_bound_not_exceeded() {
        let map = classroom_legend();
        assert_eq!(map.label_of(0.0), Some("low"));
        assert_eq!(map.label_of(20.0), Some("low"));
        assert_eq!(map.label_of(20.1), Some("moderate"));
        assert_eq!(map.label_of(48.5), Some("high"));
        assert_eq!(map.label_of(60.0), Some("high"));
        assert_eq!(map.label_of(68.9), Some("very high"));
        assert_eq!(map.color_of(68.9).to_string(), "#d73027");
        assert_eq!(map.color_of(-5.0).to_string(), "#08306b");
    }

    #[test]
    fn legend_lists_bands_then_top() {
        let labels: Vec<String> = classroom_legend()
            .legend()
            .into_iter()
            .map(|b| b.label)
            .collect();
        assert_eq!(labels, vec!["low", "moderate", "high", "very high"]);

        let continuous = RiskColorMap::continuous(0.0, 68.9).legend();
        assert_eq!(continuous.len(), 5);
        assert_eq!(continuous[0].color.to_string(), "#313695");
        assert_eq!(continuous[4].label, "68.9");
    }

    #[test]
    fn degenerate_domain_maps_to_low_end() {
        let map = RiskColorMap::continuous(10.0, 10.0);
        assert_eq!(map.color_of(50.0), diverging(0.0));
        assert_eq!(map.alarm_level(50.0), 0.0);
    }

    #[test]
    fn continuous_map_has_no_labels() {
        assert_eq!(RiskColorMap::continuous(0.0, 1.0).label_of(0.5), None);
    }

    proptest! {
        #[test]
        fn continuous_alarm_level_is_monotonic(a in -50.0f64..150.0, b in -50.0f64..150.0) {
            let map = RiskColorMap::continuous(0.0, 68.9);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(map.alarm_level(lo) <= map.alarm_level(hi));
        }

        #[test]
        fn threshold_alarm_level_is_monotonic(a in -50.0f64..150.0, b in -50.0f64..150.0) {
            let map = classroom_legend();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(map.alarm_level(lo) <= map.alarm_level(hi));
        }

        #[test]
        fn out_of_domain_values_clamp(below in -1000.0f64..0.0, above in 68.9f64..1000.0) {
            let map = RiskColorMap::continuous(0.0, 68.9);
            prop_assert_eq!(map.color_of(below), map.color_of(0.0));
            prop_assert_eq!(map.color_of(above), map.color_of(68.9));

            let bands = classroom_legend();
            prop_assert_eq!(bands.color_of(below), bands.color_of(0.0));
            prop_assert_eq!(bands.color_of(above + 60.0), bands.color_of(1000.0));
        }
    }
}
