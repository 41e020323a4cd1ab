//! One render pass: an immutable snapshot of control values in, display state out

use serde::Serialize;

use crate::calculator::round_to;
use crate::colormap::RiskBand;
use crate::error::DashboardError;
use crate::map::{self, MapMarker};
use crate::models::{DerivedMetrics, RegionNote, SeriesPoint, SimulationInputs, TimeSeries};
use crate::progress::{Checklist, percent_label};
use crate::series::{LengthUnit, moving_average};
use crate::variants::Variant;

/// Control values for one request. `None` means "the variant's default".
#[derive(Debug, Clone, Default)]
pub struct SessionInputs {
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub inspect_year: Option<i32>,
    pub hours_per_day: Option<u32>,
    pub days_used: Option<u32>,
    pub done: Vec<usize>,
    pub trend_window: Option<usize>,
    pub unit: LengthUnit,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChartView {
    Ready {
        start_year: i32,
        end_year: i32,
        unit: LengthUnit,
        points: Vec<SeriesPoint>,
        trend: Option<Vec<SeriesPoint>>,
    },
    /// Non-fatal: the chart is skipped and this message shown instead
    Warning { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub year: i32,
    pub level_mm: f64,
    pub markers: Vec<MapMarker>,
    pub legend: Vec<RiskBand>,
    pub note: Option<RegionNote>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnergyView {
    pub inputs: SimulationInputs,
    pub metrics: DerivedMetrics,
    /// CO2 rounded to two places for display
    pub co2_display_kg: f64,
    pub basis: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChecklistEntry {
    pub number: usize,
    pub label: String,
    pub checked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChecklistView {
    pub entries: Vec<ChecklistEntry>,
    pub fraction: f64,
    pub percent: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub variant: String,
    pub title: String,
    pub source: String,
    pub chart: ChartView,
    pub map: MapView,
    pub energy: EnergyView,
    pub checklist: ChecklistView,
}

pub fn chart(variant: &Variant, series: &TimeSeries, inputs: &SessionInputs) -> ChartView {
    let start = inputs.start_year.unwrap_or(variant.defaults.start_year);
    let end = inputs
        .end_year
        .or(variant.defaults.end_year)
        .unwrap_or_else(|| series.last_year());

    match series.filter_window(start, end) {
        Ok(window) => {
            let trend = inputs.trend_window.map(|w| moving_average(window, w));
            ChartView::Ready {
                start_year: start,
                end_year: end,
                unit: inputs.unit,
                points: window.to_vec(),
                trend,
            }
        }
        Err(e @ DashboardError::InvalidRange { .. }) => ChartView::Warning {
            message: format!("Start year cannot be later than end year ({e})"),
        },
        Err(e) => ChartView::Warning {
            message: e.to_string(),
        },
    }
}

pub fn map_view(
    variant: &Variant,
    series: &TimeSeries,
    inputs: &SessionInputs,
) -> Result<MapView, DashboardError> {
    let requested = inputs.inspect_year.unwrap_or(variant.defaults.inspect_year);
    let point = series.nearest_point(requested)?;
    let (year, level_mm) = (point.year, point.value_mm);
    let color_map = variant.color_scheme.build(series);

    Ok(MapView {
        year,
        level_mm,
        markers: map::city_markers(&variant.cities, &color_map, level_mm, inputs.unit),
        legend: variant.legend(&color_map),
        note: inputs
            .country
            .as_deref()
            .and_then(|c| variant.region_note(c))
            .cloned(),
    })
}

pub fn energy_view(variant: &Variant, inputs: &SessionInputs) -> EnergyView {
    let sim = SimulationInputs::new(
        inputs.hours_per_day.unwrap_or(variant.defaults.hours_per_day),
        inputs.days_used.unwrap_or(variant.defaults.days_used),
        variant.hours,
        variant.days,
    );
    let metrics = variant.energy.compute(&sim);
    EnergyView {
        inputs: sim,
        co2_display_kg: round_to(metrics.co2_kg, 2),
        metrics,
        basis: variant.energy.basis(),
    }
}

pub fn checklist_view(
    variant: &Variant,
    inputs: &SessionInputs,
) -> Result<ChecklistView, DashboardError> {
    let checklist = Checklist::new(&variant.checklist);
    let state = checklist.state_with_done(&inputs.done)?;
    let fraction = checklist.progress(&state);

    Ok(ChecklistView {
        entries: variant
            .checklist
            .iter()
            .enumerate()
            .map(|(i, item)| ChecklistEntry {
                number: i + 1,
                label: item.label.clone(),
                checked: state.get(&item.id).copied().unwrap_or(false),
            })
            .collect(),
        fraction,
        percent: percent_label(fraction),
        status: checklist.status_line(&state),
    })
}

/// Recompute every panel from one snapshot
pub fn render(
    variant: &Variant,
    series: &TimeSeries,
    inputs: &SessionInputs,
) -> Result<DashboardView, DashboardError> {
    Ok(DashboardView {
        variant: variant.name.clone(),
        title: variant.title.clone(),
        source: series.source.clone(),
        chart: chart(variant, series, inputs),
        map: map_view(variant, series, inputs)?,
        energy: energy_view(variant, inputs),
        checklist: checklist_view(variant, inputs)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::VariantSet;

    fn classroom() -> Variant {
        VariantSet::builtin().find("classroom").unwrap().clone()
    }

    #[test]
    fn defaults_render_every_panel() {
        let view = render(&classroom(), &TimeSeries::embedded(), &SessionInputs::default()).unwrap();

        match &view.chart {
            ChartView::Ready {
                start_year,
                end_year,
                points,
                trend,
                ..
            } => {
                assert_eq!((*start_year, *end_year), (2010, 2023));
                assert_eq!(points.len(), 14);
                assert!(trend.is_none());
            }
            other => panic!("expected chart, got {other:?}"),
        }
        assert_eq!(view.map.year, 2015);
        assert_eq!(view.map.level_mm, 48.5);
        assert_eq!(view.map.markers.len(), 12);
        assert_eq!(view.energy.co2_display_kg, 61.06);
        assert_eq!(view.checklist.status, "0% achieved");
    }

    #[test]
    fn reversed_range_becomes_warning() {
        let inputs = SessionInputs {
            start_year: Some(2020),
            end_year: Some(2000),
            ..Default::default()
        };
        let view = chart(&classroom(), &TimeSeries::embedded(), &inputs);
        match view {
            ChartView::Warning { message } => assert!(message.starts_with("Start year cannot")),
            other => panic!("expected warning, got {other:?}"),
        }
    }

    #[test]
    fn trend_line_matches_window_length() {
        let inputs = SessionInputs {
            start_year: Some(2000),
            end_year: Some(2009),
            trend_window: Some(5),
            ..Default::default()
        };
        match chart(&classroom(), &TimeSeries::embedded(), &inputs) {
            ChartView::Ready { points, trend, .. } => {
                assert_eq!(trend.map(|t| t.len()), Some(points.len()));
            }
            other => panic!("expected chart, got {other:?}"),
        }
    }

    #[test]
    fn slider_values_are_clamped() {
        let inputs = SessionInputs {
            hours_per_day: Some(30),
            days_used: Some(0),
            ..Default::default()
        };
        let view = energy_view(&classroom(), &inputs);
        assert_eq!(view.inputs.hours_per_day, 24);
        assert_eq!(view.inputs.days_used, 1);
    }

    #[test]
    fn inspect_year_is_clamped_to_series() {
        let inputs = SessionInputs {
            inspect_year: Some(2050),
            ..Default::default()
        };
        let view = map_view(&classroom(), &TimeSeries::embedded(), &inputs).unwrap();
        assert_eq!(view.year, 2023);
        assert_eq!(view.level_mm, 68.9);
    }

    #[test]
    fn missing_year_snaps_without_failing_dashboard() {
        let gapped = TimeSeries::new(
            "imported",
            vec![
                SeriesPoint { year: 2010, value_mm: 0.0 },
                SeriesPoint { year: 2014, value_mm: 9.0 },
                SeriesPoint { year: 2020, value_mm: 21.0 },
            ],
        )
        .unwrap();
        let inputs = SessionInputs {
            inspect_year: Some(2015),
            ..Default::default()
        };
        let view = render(&classroom(), &gapped, &inputs).unwrap();
        assert_eq!(view.map.year, 2014);
        assert_eq!(view.map.level_mm, 9.0);
        assert!(matches!(view.chart, ChartView::Ready { .. }));
    }

    #[test]
    fn checklist_marks_done_items() {
        let inputs = SessionInputs {
            done: vec![1, 3],
            ..Default::default()
        };
        let view = checklist_view(&classroom(), &inputs).unwrap();
        let checked: Vec<bool> = view.entries.iter().map(|e| e.checked).collect();
        assert_eq!(checked, vec![true, false, true]);
        assert_eq!(view.percent, "67%");
    }

    #[test]
    fn unknown_checklist_item_fails_render() {
        let inputs = SessionInputs {
            done: vec![9],
            ..Default::default()
        };
        assert_eq!(
            render(&classroom(), &TimeSeries::embedded(), &inputs).unwrap_err(),
            DashboardError::UnknownChecklistItem(9)
        );
    }

    #[test]
    fn country_note_is_attached_when_known() {
        let coastal = VariantSet::builtin().find("coastal").unwrap().clone();
        let inputs = SessionInputs {
            country: Some("Netherlands".to_string()),
            ..Default::default()
        };
        let view = map_view(&coastal, &TimeSeries::embedded(), &inputs).unwrap();
        assert_eq!(view.note.map(|n| n.country), Some("Netherlands".to_string()));
    }
}
