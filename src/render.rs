//! Plain-text rendering of the dashboard panels

use std::fmt;

use crate::models::SeriesPoint;
use crate::series::LengthUnit;
use crate::session::{ChartView, ChecklistView, DashboardView, EnergyView, MapView};

const BAR_WIDTH: usize = 40;
const PROGRESS_WIDTH: usize = 20;

/// Horizontal bar scaled so `max` fills the full width
fn bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let filled = ((value / max).min(1.0) * width as f64).round() as usize;
    "#".repeat(filled)
}

/// Text chart: one row per year, optional trend column
pub fn format_chart(points: &[SeriesPoint], trend: Option<&[SeriesPoint]>, unit: LengthUnit) -> String {
    let mut output = String::new();
    let max = points.iter().map(|p| p.value_mm).fold(0.0, f64::max);

    for (i, point) in points.iter().enumerate() {
        output.push_str(&format!(
            "{}  {:>7.1} {}",
            point.year,
            unit.convert(point.value_mm),
            unit.suffix()
        ));
        if let Some(t) = trend.and_then(|t| t.get(i)) {
            output.push_str(&format!("  trend {:>7.1}", unit.convert(t.value_mm)));
        }
        output.push_str(&format!("  {}\n", bar(point.value_mm, max, BAR_WIDTH)));
    }
    output
}

pub fn progress_bar(fraction: f64) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * PROGRESS_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(PROGRESS_WIDTH - filled))
}

impl fmt::Display for ChartView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartView::Ready {
                start_year,
                end_year,
                unit,
                points,
                trend,
            } => {
                writeln!(f, "Sea-level rise, {start_year}-{end_year}")?;
                if points.is_empty() {
                    return writeln!(f, "  (no data in range)");
                }
                write!(f, "{}", format_chart(points, trend.as_deref(), *unit))
            }
            ChartView::Warning { message } => writeln!(f, "Warning: {message}"),
        }
    }
}

impl fmt::Display for MapView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "City sea-level risk, {} ({:.1} mm)", self.year, self.level_mm)?;
        writeln!(f, "{:<18} {:>9} {:>10}  {}", "City", "Lat", "Lon", "Color")?;
        writeln!(f, "{}", "-".repeat(48))?;
        for m in &self.markers {
            write!(
                f,
                "{:<18} {:>9.4} {:>10.4}  {}",
                m.name, m.latitude, m.longitude, m.color
            )?;
            match &m.band {
                Some(band) => writeln!(f, "  {band}")?,
                None => writeln!(f)?,
            }
        }
        writeln!(f)?;
        writeln!(f, "Legend:")?;
        for entry in &self.legend {
            writeln!(f, "  {}  {}", entry.color, entry.label)?;
        }
        if let Some(note) = &self.note {
            writeln!(f)?;
            writeln!(f, "{}: {}", note.country, note.summary)?;
        }
        Ok(())
    }
}

impl fmt::Display for EnergyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Air conditioner: {} h/day for {} days",
            self.inputs.hours_per_day, self.inputs.days_used
        )?;
        writeln!(f, "{}", self.metrics)?;
        writeln!(f, "Basis: {}", self.basis)
    }
}

impl fmt::Display for ChecklistView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Climate action checklist")?;
        for entry in &self.entries {
            let mark = if entry.checked { "x" } else { " " };
            writeln!(f, "  {}. [{}] {}", entry.number, mark, entry.label)?;
        }
        writeln!(f, "{} {}", progress_bar(self.fraction), self.status)
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== {} ===", self.title)?;
        writeln!(f, "Data: {}", self.source)?;
        writeln!(f)?;
        writeln!(f, "{}", self.chart)?;
        writeln!(f, "{}", self.map)?;
        writeln!(f, "{}", self.energy)?;
        write!(f, "{}", self.checklist)
    }
}
