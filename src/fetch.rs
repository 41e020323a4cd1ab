//! Startup dataset loading
//!
//! The series is resolved once per run: a network fetch when requested, then
//! the SQLite cache, then the embedded series. Failures at any step only log
//! a warning and fall through to the next source.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::db;
use crate::import;
use crate::models::TimeSeries;

pub const DEFAULT_DATASET_URL: &str =
    "https://climate.nasa.gov/system/internal_resources/details/original/121_Global_Sea_Level_Data_File.txt";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Download and parse a GMSL or CSV dataset
pub fn fetch_series(url: &str, gmsl_column: usize) -> Result<TimeSeries> {
    let client = Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    debug!(url, "fetching sea-level dataset");
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("Failed to fetch {url}"))?;
    if !response.status().is_success() {
        bail!("{url} returned {}", response.status());
    }
    let body = response.text().context("Failed to read response body")?;

    let samples = import::parse_text(&body, gmsl_column)?;
    import::yearly_series(&samples, url)
}

/// Where the series came from, for logging and the `source` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesOrigin {
    Network,
    Cache,
    Embedded,
}

/// Resolve the series for this run. Never fails.
pub fn resolve_series(
    mut cache: Option<&mut Connection>,
    fetch_url: Option<&str>,
    gmsl_column: usize,
) -> (TimeSeries, SeriesOrigin) {
    if let Some(url) = fetch_url {
        match fetch_series(url, gmsl_column) {
            Ok(series) => {
                info!(url, years = series.points.len(), "loaded sea-level dataset from network");
                if let Some(conn) = cache.as_deref_mut() {
                    if let Err(e) = db::insert_series(conn, &series) {
                        warn!(error = %e, "could not cache fetched dataset");
                    }
                }
                return (series, SeriesOrigin::Network);
            }
            Err(e) => warn!(url, error = %format!("{e:#}"), "fetch failed, falling back"),
        }
    }

    if let Some(conn) = cache {
        match db::latest_series(conn) {
            Ok(Some(series)) => {
                debug!(source = %series.source, "using cached sea-level dataset");
                return (series, SeriesOrigin::Cache);
            }
            Ok(None) => debug!("cache is empty"),
            Err(e) => warn!(error = %format!("{e:#}"), "cache unreadable, falling back"),
        }
    }

    (TimeSeries::embedded(), SeriesOrigin::Embedded)
}
