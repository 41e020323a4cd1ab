//! Embedded sea-level series and the chart computations over it

use clap::ValueEnum;
use serde::Serialize;

use crate::error::DashboardError;
use crate::models::{SeriesPoint, TimeSeries};

pub const EMBEDDED_SOURCE: &str = "NASA Global Mean Sea Level (1993-2023)";
pub const FIRST_YEAR: i32 = 1993;

/// Yearly rise in mm, one entry per year starting at `FIRST_YEAR`
const EMBEDDED_LEVELS_MM: [f64; 31] = [
    0.0, 2.4, 4.5, 6.3, 8.2, 10.4, 12.5, 14.1, 16.3, 18.2, 20.4, 22.1, 24.5, 26.8, 29.3, 31.1,
    33.6, 36.1, 38.4, 41.0, 43.2, 46.0, 48.5, 51.0, 54.2, 56.9, 59.5, 62.0, 65.1, 67.4, 68.9,
];

impl TimeSeries {
    /// Build a series, ordering points by year. Later duplicates of a year win.
    pub fn new(source: &str, mut points: Vec<SeriesPoint>) -> Result<Self, DashboardError> {
        if points.is_empty() {
            return Err(DashboardError::EmptySeries);
        }
        points.sort_by_key(|p| p.year);
        points.dedup_by(|later, earlier| {
            if later.year == earlier.year {
                *earlier = *later;
                true
            } else {
                false
            }
        });
        Ok(Self {
            source: source.to_string(),
            points,
        })
    }

    /// The series compiled into the binary, used whenever nothing else loads
    pub fn embedded() -> Self {
        let points = EMBEDDED_LEVELS_MM
            .iter()
            .zip(FIRST_YEAR..)
            .map(|(&value_mm, year)| SeriesPoint { year, value_mm })
            .collect();
        Self {
            source: EMBEDDED_SOURCE.to_string(),
            points,
        }
    }

    pub fn first_year(&self) -> i32 {
        self.points.first().map_or(FIRST_YEAR, |p| p.year)
    }

    pub fn last_year(&self) -> i32 {
        self.points.last().map_or(FIRST_YEAR, |p| p.year)
    }

    /// Smallest and largest value, used as the continuous color domain
    pub fn value_bounds(&self) -> (f64, f64) {
        self.points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.value_mm), hi.max(p.value_mm))
        })
    }

    /// Contiguous slice of points with `start <= year <= end`
    pub fn filter_window(&self, start: i32, end: i32) -> Result<&[SeriesPoint], DashboardError> {
        if start > end {
            return Err(DashboardError::InvalidRange { start, end });
        }
        let lo = self.points.partition_point(|p| p.year < start);
        let hi = self.points.partition_point(|p| p.year <= end);
        Ok(&self.points[lo..hi.max(lo)])
    }

    /// Point for `year`, or the closest year present (the earlier one on a tie)
    pub fn nearest_point(&self, year: i32) -> Result<SeriesPoint, DashboardError> {
        let idx = match self.points.binary_search_by_key(&year, |p| p.year) {
            Ok(idx) => idx,
            Err(0) => 0,
            Err(idx) if idx == self.points.len() => idx.saturating_sub(1),
            Err(idx) => {
                let (before, after) = (self.points[idx - 1], self.points[idx]);
                if after.year - year < year - before.year { idx } else { idx - 1 }
            }
        };
        self.points.get(idx).copied().ok_or(DashboardError::EmptySeries)
    }
}

/// Trailing moving average over `window` points.
///
/// The first `window - 1` outputs average over however many points exist so
/// far, so the trend line spans the whole chart. A zero window acts as 1.
pub fn moving_average(points: &[SeriesPoint], window: usize) -> Vec<SeriesPoint> {
    let window = window.max(1);

    points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let span = &points[(i + 1).saturating_sub(window)..=i];
            let sum: f64 = span.iter().map(|p| p.value_mm).sum();
            SeriesPoint {
                year: point.year,
                value_mm: sum / span.len() as f64,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    #[default]
    Mm,
    Cm,
    In,
}

impl LengthUnit {
    pub fn convert(self, mm: f64) -> f64 {
        match self {
            LengthUnit::Mm => mm,
            LengthUnit::Cm => mm / 10.0,
            LengthUnit::In => mm / 25.4,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            LengthUnit::Mm => "mm",
            LengthUnit::Cm => "cm",
            LengthUnit::In => "in",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(year: i32, value_mm: f64) -> SeriesPoint {
        SeriesPoint { year, value_mm }
    }

    #[test]
    fn embedded_series_spans_1993_to_2023() {
        let series = TimeSeries::embedded();
        assert_eq!(series.points.len(), 31);
        assert_eq!(series.points[0], point(1993, 0.0));
        assert_eq!(*series.points.last().unwrap(), point(2023, 68.9));
        assert!(series.points.windows(2).all(|w| w[0].year < w[1].year));
    }

    #[test]
    fn window_2010_to_2023_has_fourteen_points() {
        let series = TimeSeries::embedded();
        let window = series.filter_window(2010, 2023).unwrap();
        assert_eq!(window.len(), 14);
        assert_eq!(window[0].year, 2010);
        assert_eq!(window[0].value_mm, 36.1);
        assert_eq!(*window.last().unwrap(), point(2023, 68.9));
    }

    #[test]
    fn reversed_window_is_invalid_range() {
        let series = TimeSeries::embedded();
        assert_eq!(
            series.filter_window(2020, 2010),
            Err(DashboardError::InvalidRange {
                start: 2020,
                end: 2010
            })
        );
    }

    #[test]
    fn window_outside_series_is_empty() {
        let series = TimeSeries::embedded();
        assert!(series.filter_window(1950, 1960).unwrap().is_empty());
        assert!(series.filter_window(2030, 2040).unwrap().is_empty());
        assert_eq!(series.filter_window(1900, 2100).unwrap().len(), 31);
    }

    #[test]
    fn single_year_window() {
        let series = TimeSeries::embedded();
        let window = series.filter_window(2015, 2015).unwrap();
        assert_eq!(window, &[point(2015, 48.5)]);
    }

    #[test]
    fn nearest_point_on_full_series() {
        let series = TimeSeries::embedded();
        assert_eq!(series.nearest_point(2015), Ok(point(2015, 48.5)));
        assert_eq!(series.nearest_point(1980), Ok(point(1993, 0.0)));
        assert_eq!(series.nearest_point(2050), Ok(point(2023, 68.9)));
    }

    #[test]
    fn nearest_point_snaps_over_gaps() {
        let series = TimeSeries::new(
            "gapped",
            vec![point(2000, 0.0), point(2003, 6.0), point(2010, 20.0)],
        )
        .unwrap();
        assert_eq!(series.nearest_point(2003), Ok(point(2003, 6.0)));
        assert_eq!(series.nearest_point(2005), Ok(point(2003, 6.0)));
        assert_eq!(series.nearest_point(2008), Ok(point(2010, 20.0)));
        assert_eq!(series.nearest_point(2001), Ok(point(2000, 0.0)));
        assert_eq!(
            TimeSeries::new("even", vec![point(2000, 0.0), point(2002, 4.0)])
                .unwrap()
                .nearest_point(2001),
            Ok(point(2000, 0.0))
        );
        assert_eq!(series.nearest_point(1990), Ok(point(2000, 0.0)));

        let empty = TimeSeries {
            source: "empty".to_string(),
            points: Vec::new(),
        };
        assert_eq!(empty.nearest_point(2000), Err(DashboardError::EmptySeries));
    }

    #[test]
    fn new_sorts_and_keeps_last_duplicate() {
        let series = TimeSeries::new(
            "test",
            vec![point(2001, 3.0), point(2000, 1.0), point(2001, 4.0)],
        )
        .unwrap();
        assert_eq!(series.points, vec![point(2000, 1.0), point(2001, 4.0)]);
        assert_eq!(TimeSeries::new("empty", vec![]), Err(DashboardError::EmptySeries));
    }

    #[test]
    fn moving_average_uses_partial_leading_windows() {
        let points = [point(1, 1.0), point(2, 2.0), point(3, 3.0), point(4, 6.0)];
        let trend = moving_average(&points, 3);
        let values: Vec<f64> = trend.iter().map(|p| p.value_mm).collect();
        assert_eq!(values, vec![1.0, 1.5, 2.0, 11.0 / 3.0]);
        assert_eq!(trend.iter().map(|p| p.year).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn moving_average_window_one_is_identity() {
        let series = TimeSeries::embedded();
        assert_eq!(moving_average(&series.points, 1), series.points);
        assert_eq!(moving_average(&series.points, 0), series.points);
        assert!(moving_average(&[], 5).is_empty());
    }

    #[test]
    fn unit_conversion() {
        assert_eq!(LengthUnit::Mm.convert(68.9), 68.9);
        assert!((LengthUnit::Cm.convert(68.9) - 6.89).abs() < 1e-12);
        assert!((LengthUnit::In.convert(25.4) - 1.0).abs() < 1e-12);
    }
}
