//! Sea-level dataset import
//!
//! Reads NASA GMSL text files (whitespace columns with a decimal year in the
//! third column, `HDR` header lines) and simple `year,value` CSV files, then
//! averages the samples per calendar year and rebases the result so the
//! first year reads 0 mm.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use regex::Regex;
use rusqlite::Connection;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::db;
use crate::models::{SeriesPoint, TimeSeries};

/// GMSL column holding smoothed, GIA-applied variation with seasonal signal removed (1-based)
pub const DEFAULT_GMSL_COLUMN: usize = 12;

/// Values at or above this are the dataset's missing-value sentinel
const MISSING_SENTINEL: f64 = 99900.0;

/// One raw observation: decimal year and value in mm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub decimal_year: f64,
    pub value_mm: f64,
}

/// Extract samples from dataset text. Lines that are neither GMSL nor CSV rows are skipped.
pub fn parse_text(content: &str, gmsl_column: usize) -> Result<Vec<Sample>> {
    // Pattern: <type> <cycle> <year.fraction> <observations> ...
    let gmsl_row = Regex::new(r"^\s*\d+\s+\d+\s+\d{4}\.\d+\s")?;
    // Pattern: 2010,36.1 (comma, semicolon or tab separated)
    let csv_row = Regex::new(r"^\s*(\d{4}(?:\.\d+)?)\s*[,;\t]\s*(-?\d+(?:\.\d+)?)\s*$")?;

    let mut samples = Vec::new();

    for line in content.lines() {
        if line.trim_start().starts_with("HDR") {
            continue;
        }

        if gmsl_row.is_match(line) {
            let columns: Vec<&str> = line.split_whitespace().collect();
            let year = columns.get(2).and_then(|c| c.parse::<f64>().ok());
            let value = gmsl_column
                .checked_sub(1)
                .and_then(|idx| columns.get(idx))
                .and_then(|c| c.parse::<f64>().ok());
            if let (Some(decimal_year), Some(value_mm)) = (year, value) {
                if value_mm < MISSING_SENTINEL {
                    samples.push(Sample {
                        decimal_year,
                        value_mm,
                    });
                }
            }
            continue;
        }

        if let Some(cap) = csv_row.captures(line) {
            if let (Ok(decimal_year), Ok(value_mm)) = (cap[1].parse::<f64>(), cap[2].parse::<f64>()) {
                samples.push(Sample {
                    decimal_year,
                    value_mm,
                });
            }
        }
    }

    Ok(samples)
}

/// Average samples per calendar year and rebase so the first year is zero
pub fn yearly_series(samples: &[Sample], source: &str) -> Result<TimeSeries> {
    let mut by_year: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for sample in samples {
        let entry = by_year.entry(sample.decimal_year.floor() as i32).or_default();
        entry.0 += sample.value_mm;
        entry.1 += 1;
    }

    let Some(baseline) = by_year.values().next().map(|(sum, n)| sum / *n as f64) else {
        bail!("no sea-level samples found in {source}");
    };

    let points = by_year
        .into_iter()
        .map(|(year, (sum, n))| SeriesPoint {
            year,
            value_mm: sum / n as f64 - baseline,
        })
        .collect();
    Ok(TimeSeries::new(source, points)?)
}

/// Every `.txt` or `.csv` file at or below `path`
pub fn find_data_files(path: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("txt") || ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();
    files
}

/// Parse every data file under `path` into one series and cache it
pub fn import_to_database(conn: &mut Connection, path: &Path, gmsl_column: usize) -> Result<ImportStats> {
    let mut stats = ImportStats::default();
    let mut samples = Vec::new();

    let files = find_data_files(path);
    info!(path = %path.display(), files = files.len(), "scanning for sea-level data");

    for file in &files {
        let content = match fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => {
                warn!(file = %file.display(), error = %e, "skipping unreadable file");
                stats.errors += 1;
                continue;
            }
        };
        let parsed = parse_text(&content, gmsl_column)?;
        if parsed.is_empty() {
            stats.skipped += 1;
            continue;
        }
        info!(file = %file.display(), samples = parsed.len(), "parsed");
        stats.files += 1;
        stats.samples += parsed.len();
        samples.extend(parsed);
    }

    let series = yearly_series(&samples, &path.display().to_string())
        .with_context(|| format!("Failed to import {}", path.display()))?;
    stats.years = series.points.len();
    stats.dataset_id = db::insert_series(conn, &series)?;
    Ok(stats)
}

#[derive(Debug, Default)]
pub struct ImportStats {
    pub dataset_id: i64,
    pub files: usize,
    pub samples: usize,
    pub years: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl std::fmt::Display for ImportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Imported dataset #{}: {} samples from {} files ({} years). Skipped: {}, Errors: {}",
            self.dataset_id, self.samples, self.files, self.years, self.skipped, self.errors
        )
    }
}
