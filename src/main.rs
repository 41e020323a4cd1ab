//! Climate Calculator
//!
//! Sea-level risk, air-conditioner emission and climate-action checklist
//! calculator for the "when the sea boils, the classroom boils too" dashboard.

mod calculator;
mod colormap;
mod db;
mod error;
mod fetch;
mod import;
mod map;
mod models;
mod progress;
mod render;
mod series;
mod session;
mod variants;

use std::fmt::Display;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::models::TimeSeries;
use crate::series::LengthUnit;
use crate::session::{ChartView, SessionInputs};
use crate::variants::{ColorScheme, DEFAULT_VARIANT, Variant, VariantSet};

#[derive(Parser)]
#[command(name = "climate-calculator")]
#[command(about = "Sea-level risk, air-conditioner emission and climate checklist calculator")]
struct Cli {
    /// Path to the SQLite dataset cache
    #[arg(short, long, default_value = "climate_data.db")]
    database: PathBuf,

    /// Dashboard variant to use
    #[arg(short, long, default_value = DEFAULT_VARIANT)]
    variant: String,

    /// Load an extra variant definition from a JSON file
    #[arg(long)]
    variant_file: Option<PathBuf>,

    /// Fetch the sea-level dataset from the network before rendering
    #[arg(long)]
    fetch: bool,

    /// Dataset URL used by --fetch and the fetch command
    #[arg(long, default_value = fetch::DEFAULT_DATASET_URL)]
    url: String,

    /// GMSL column (1-based) holding the sea-level values
    #[arg(long, default_value_t = import::DEFAULT_GMSL_COLUMN)]
    column: usize,

    /// Unit for displayed sea-level values
    #[arg(long, value_enum, default_value_t = LengthUnit::Mm)]
    unit: LengthUnit,

    /// Print machine-readable JSON instead of text
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sea-level rise chart for a year window
    Series {
        /// First year of the window (default: variant setting)
        #[arg(short, long)]
        start: Option<i32>,

        /// Last year of the window (default: last year of the series)
        #[arg(short, long)]
        end: Option<i32>,

        /// Add a moving-average trend line over this many years
        #[arg(short, long)]
        trend: Option<usize>,
    },

    /// City risk markers for one year
    Map {
        /// Year to inspect (default: variant setting)
        #[arg(short, long)]
        year: Option<i32>,

        /// Show the risk note for a country
        #[arg(short, long)]
        country: Option<String>,

        /// Print markers as GeoJSON
        #[arg(long)]
        geojson: bool,
    },

    /// Air-conditioner energy use and CO2 emissions
    Energy {
        /// Average hours of use per day
        #[arg(long)]
        hours: Option<u32>,

        /// Number of days used
        #[arg(long)]
        days: Option<u32>,
    },

    /// Climate action checklist progress
    Checklist {
        /// Completed item numbers, e.g. --done 1,3
        #[arg(short, long, value_delimiter = ',')]
        done: Vec<usize>,
    },

    /// Every panel from one set of inputs
    Dashboard {
        #[arg(long)]
        start: Option<i32>,
        #[arg(long)]
        end: Option<i32>,
        #[arg(long)]
        trend: Option<usize>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        country: Option<String>,
        #[arg(long)]
        hours: Option<u32>,
        #[arg(long)]
        days: Option<u32>,
        #[arg(long, value_delimiter = ',')]
        done: Vec<usize>,
    },

    /// List available dashboard variants
    Variants,

    /// Import GMSL or CSV sea-level files into the cache
    Import {
        /// File or directory to import
        path: PathBuf,

        /// Clear cached datasets before importing
        #[arg(long)]
        clear: bool,
    },

    /// Download the dataset at --url into the cache
    Fetch,

    /// Show which sea-level series is in use
    Source,

    /// Initialize an empty cache database
    Init,

    /// Remove every cached dataset
    Clear,
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn open_cache(cli: &Cli) -> Result<Connection> {
    let conn = Connection::open(&cli.database)
        .with_context(|| format!("Failed to open {}", cli.database.display()))?;
    db::init_schema(&conn)?;
    Ok(conn)
}

/// Series for this run; the cache is only touched when it already exists or a fetch was asked for
fn load_series(cli: &Cli) -> Result<(TimeSeries, fetch::SeriesOrigin)> {
    let mut cache = if cli.fetch || cli.database.exists() {
        Some(open_cache(cli)?)
    } else {
        None
    };
    let url = cli.fetch.then_some(cli.url.as_str());
    let (series, origin) = fetch::resolve_series(cache.as_mut(), url, cli.column);
    debug!(?origin, source = %series.source, years = series.points.len(), "series resolved");
    Ok((series, origin))
}

fn print_output<T: Serialize + Display>(json: bool, value: &T) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{value}");
    }
    Ok(())
}

fn warn_on_chart(chart: &ChartView) {
    if let ChartView::Warning { message } = chart {
        warn!(%message, "chart skipped");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let mut variants = VariantSet::builtin();
    if let Some(path) = &cli.variant_file {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let added = variants
            .insert_json(&json)
            .with_context(|| format!("Invalid variant file {}", path.display()))?;
        debug!(variant = %added.name, "loaded variant file");
    }

    match &cli.command {
        Commands::Series { start, end, trend } => {
            let variant = variants.find(&cli.variant)?;
            let (series, _) = load_series(&cli)?;
            let inputs = SessionInputs {
                start_year: *start,
                end_year: *end,
                trend_window: *trend,
                unit: cli.unit,
                ..Default::default()
            };
            let chart = session::chart(variant, &series, &inputs);
            warn_on_chart(&chart);
            print_output(cli.json, &chart)?;
        }

        Commands::Map {
            year,
            country,
            geojson,
        } => {
            let variant = variants.find(&cli.variant)?;
            let (series, _) = load_series(&cli)?;
            let inputs = SessionInputs {
                inspect_year: *year,
                country: country.clone(),
                unit: cli.unit,
                ..Default::default()
            };
            let view = session::map_view(variant, &series, &inputs)?;
            if *geojson {
                let collection = map::to_geojson(&view.markers, view.year);
                println!("{}", serde_json::to_string_pretty(&collection)?);
            } else {
                print_output(cli.json, &view)?;
            }
        }

        Commands::Energy { hours, days } => {
            let variant = variants.find(&cli.variant)?;
            let inputs = SessionInputs {
                hours_per_day: *hours,
                days_used: *days,
                ..Default::default()
            };
            print_output(cli.json, &session::energy_view(variant, &inputs))?;
        }

        Commands::Checklist { done } => {
            let variant = variants.find(&cli.variant)?;
            let inputs = SessionInputs {
                done: done.clone(),
                ..Default::default()
            };
            print_output(cli.json, &session::checklist_view(variant, &inputs)?)?;
        }

        Commands::Dashboard {
            start,
            end,
            trend,
            year,
            country,
            hours,
            days,
            done,
        } => {
            let variant = variants.find(&cli.variant)?;
            let (series, _) = load_series(&cli)?;
            let inputs = SessionInputs {
                start_year: *start,
                end_year: *end,
                inspect_year: *year,
                hours_per_day: *hours,
                days_used: *days,
                done: done.clone(),
                trend_window: *trend,
                unit: cli.unit,
                country: country.clone(),
            };
            let view = session::render(variant, &series, &inputs)?;
            warn_on_chart(&view.chart);
            print_output(cli.json, &view)?;
        }

        Commands::Variants => {
            println!("{:<14} {:>6} {:<11} {}", "Variant", "Cities", "Colors", "Emissions");
            println!("{}", "-".repeat(60));
            for v in variants.iter() {
                println!(
                    "{:<14} {:>6} {:<11} {}",
                    v.name,
                    v.cities.len(),
                    scheme_name(v),
                    v.energy.basis()
                );
            }
        }

        Commands::Import { path, clear } => {
            let mut conn = open_cache(&cli)?;
            if *clear {
                println!("Clearing cached datasets...");
                db::clear_datasets(&conn)?;
            }
            let stats = import::import_to_database(&mut conn, path, cli.column)?;
            println!("{stats}");
        }

        Commands::Fetch => {
            let mut conn = open_cache(&cli)?;
            let series = fetch::fetch_series(&cli.url, cli.column)?;
            let id = db::insert_series(&mut conn, &series)?;
            println!(
                "Fetched {} years ({}-{}) into dataset #{}",
                series.points.len(),
                series.first_year(),
                series.last_year(),
                id
            );
        }

        Commands::Source => {
            let (series, origin) = load_series(&cli)?;
            println!("Using: {} ({:?})", series.source, origin);
            println!(
                "Years: {}-{} ({} points)",
                series.first_year(),
                series.last_year(),
                series.points.len()
            );
            if cli.database.exists() {
                let conn = open_cache(&cli)?;
                let datasets = db::list_datasets(&conn)?;
                if !datasets.is_empty() {
                    println!("\nCached datasets:");
                    for (id, source, count, loaded_at) in datasets {
                        println!("  #{id} {source} ({count} years, loaded {loaded_at})");
                    }
                }
            }
        }

        Commands::Init => {
            open_cache(&cli)?;
            println!("Database initialized at: {}", cli.database.display());
        }

        Commands::Clear => {
            let conn = open_cache(&cli)?;
            db::clear_datasets(&conn)?;
            println!("Cleared cached datasets");
        }
    }

    Ok(())
}

fn scheme_name(variant: &Variant) -> &'static str {
    match variant.color_scheme {
        ColorScheme::Gradient { .. } => "gradient",
        ColorScheme::Thresholds { .. } => "thresholds",
    }
}
