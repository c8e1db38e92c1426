//! CLI entry point for the feeder reliability tool.
//!
//! Provides subcommands for computing SAIFI/SAIDI/CAIDI aggregation tables
//! from an outage workbook, reporting a selected slice, listing workbook
//! options, and joining metrics with feeder coordinates for maps.

use anyhow::Result;
use clap::{Parser, Subcommand};
use feeder_reliability::analyzers::aggregate::compute_tables;
use feeder_reliability::analyzers::fault::fault_summaries;
use feeder_reliability::analyzers::period::{Granularity, WeekSelection, select};
use feeder_reliability::analyzers::trend::monthly_trend;
use feeder_reliability::fetch::{
    BasicClient,
    auth::{ApiKey, UrlParam},
};
use feeder_reliability::geo::FeederLocations;
use feeder_reliability::output::{print_json, write_table};
use feeder_reliability::record::{OutageRecord, clean_feeder_name, normalize_worksheet};
use feeder_reliability::sheet::{DirSource, HttpSource, Worksheet, WorksheetSource};
use serde::Serialize;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "feeder_reliability")]
#[command(about = "Computes power-distribution reliability indices from outage logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute all aggregation tables from a workbook and write them as CSV
    Analyze {
        /// Workbook directory of per-month CSVs, or a manifest URL
        #[arg(value_name = "WORKBOOK")]
        workbook: String,

        /// Directory the result tables are written to
        #[arg(short, long, default_value = "results")]
        output_dir: String,
    },
    /// Print the metrics slice for a month at the chosen granularity
    Report {
        /// Workbook directory of per-month CSVs, or a manifest URL
        #[arg(value_name = "WORKBOOK")]
        workbook: String,

        /// Time bucket for the report axis
        #[arg(short, long, value_enum, default_value = "monthly")]
        granularity: Granularity,

        /// Month worksheet label to report on
        #[arg(short, long)]
        month: String,

        /// Feeder name filter, cleaned the same way as worksheet data
        #[arg(short, long)]
        feeder: Option<String>,

        /// Week label (e.g. 2025-W02), or "all" for every week in the month
        #[arg(short, long, default_value = "all")]
        week: String,
    },
    /// List the distinct feeder names and month labels in a workbook
    List {
        /// Workbook directory of per-month CSVs, or a manifest URL
        #[arg(value_name = "WORKBOOK")]
        workbook: String,
    },
    /// Join per-feeder monthly metrics with coordinates for map rendering
    MapData {
        /// Workbook directory of per-month CSVs, or a manifest URL
        #[arg(value_name = "WORKBOOK")]
        workbook: String,

        /// JSON file mapping feeder names to [latitude, longitude]
        #[arg(short, long)]
        locations: String,

        /// Output CSV path
        #[arg(short, long, default_value = "results/map.csv")]
        output: String,
    },
}

/// One monthly metrics row joined with its feeder's coordinates.
#[derive(Serialize)]
struct MapRow {
    feeder: String,
    month: String,
    latitude: f64,
    longitude: f64,
    interruptions: usize,
    saifi: f64,
    saidi: f64,
    caidi: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/feeder_reliability.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("feeder_reliability.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            workbook,
            output_dir,
        } => {
            let records = load_records(&workbook).await?;
            if records.is_empty() {
                warn!("No outage records found in workbook; nothing to aggregate");
                return Ok(());
            }

            let tables = compute_tables(&records);
            write_table(&format!("{output_dir}/daily.csv"), &tables.daily)?;
            write_table(&format!("{output_dir}/weekly.csv"), &tables.weekly)?;
            write_table(&format!("{output_dir}/monthly.csv"), &tables.monthly)?;
            write_table(&format!("{output_dir}/trend.csv"), &monthly_trend(&records))?;
            write_table(&format!("{output_dir}/faults.csv"), &fault_summaries(&records))?;

            info!(
                records = records.len(),
                daily = tables.daily.len(),
                weekly = tables.weekly.len(),
                monthly = tables.monthly.len(),
                output_dir,
                "Aggregation tables written"
            );
        }
        Commands::Report {
            workbook,
            granularity,
            month,
            feeder,
            week,
        } => {
            let records = load_records(&workbook).await?;
            let tables = compute_tables(&records);
            if tables.is_empty() {
                warn!("No outage records found in workbook");
                return Ok(());
            }

            let feeder = feeder.as_deref().map(clean_feeder_name);
            let week = WeekSelection::parse(&week);
            let selection = select(&tables, granularity, &month, feeder.as_deref(), &week);

            if selection.is_empty() {
                warn!(month = %month, "No metrics available for this selection");
            } else {
                info!(
                    axis = selection.axis,
                    rows = selection.rows.len(),
                    "Metrics selected"
                );
                print_json(&selection.rows)?;
            }
        }
        Commands::List { workbook } => {
            let records = load_records(&workbook).await?;

            let feeders: BTreeSet<&str> = records.iter().map(|r| r.feeder.as_str()).collect();
            let months: BTreeSet<&str> = records.iter().map(|r| r.month.as_str()).collect();

            for feeder in &feeders {
                info!(feeder = %feeder, "Feeder");
            }
            for month in &months {
                info!(month = %month, "Month");
            }
            info!(
                feeders = feeders.len(),
                months = months.len(),
                "Workbook options"
            );
        }
        Commands::MapData {
            workbook,
            locations,
            output,
        } => {
            let records = load_records(&workbook).await?;
            if records.is_empty() {
                warn!("No outage records found in workbook");
                return Ok(());
            }

            let locations = FeederLocations::load(&locations)?;
            let tables = compute_tables(&records);

            let mut rows = Vec::new();
            for metrics in &tables.monthly {
                match locations.get(&metrics.feeder) {
                    Some((latitude, longitude)) => rows.push(MapRow {
                        feeder: metrics.feeder.clone(),
                        month: metrics.month.clone(),
                        latitude,
                        longitude,
                        interruptions: metrics.interruptions,
                        saifi: metrics.saifi,
                        saidi: metrics.saidi,
                        caidi: metrics.caidi,
                    }),
                    None => {
                        warn!(feeder = %metrics.feeder, "No coordinates for feeder, omitting from map")
                    }
                }
            }

            write_table(&output, &rows)?;
            info!(rows = rows.len(), output, "Map data written");
        }
    }

    Ok(())
}

/// Loads the workbook from a local directory or, for `http(s)` arguments, a
/// published manifest URL. `WORKBOOK_API_KEY` (usually via `.env`) enables
/// auth for gated exports: bearer-header by default, or a query parameter
/// when `WORKBOOK_KEY_PARAM` names one.
async fn load_worksheets(workbook: &str) -> Result<Vec<Worksheet>> {
    if !workbook.starts_with("http") {
        return DirSource::new(workbook).worksheets().await;
    }

    let key = std::env::var("WORKBOOK_API_KEY").ok();
    let param_name = std::env::var("WORKBOOK_KEY_PARAM").ok();
    match (key, param_name) {
        (Some(key), Some(param_name)) => {
            let client = UrlParam {
                inner: BasicClient::new(),
                param_name,
                key,
            };
            HttpSource::new(client, workbook).worksheets().await
        }
        (Some(key), None) => {
            let client = ApiKey::bearer(BasicClient::new(), key);
            HttpSource::new(client, workbook).worksheets().await
        }
        (None, _) => HttpSource::new(BasicClient::new(), workbook).worksheets().await,
    }
}

/// Loads and normalizes every worksheet, logging reject counts per month.
async fn load_records(workbook: &str) -> Result<Vec<OutageRecord>> {
    let sheets = load_worksheets(workbook).await?;

    let mut records = Vec::new();
    for sheet in &sheets {
        if sheet.rows.is_empty() {
            debug!(month = %sheet.month, "Skipping empty worksheet");
            continue;
        }

        let batch = normalize_worksheet(&sheet.month, &sheet.rows);
        if batch.rejected > 0 {
            warn!(
                month = %sheet.month,
                rejected = batch.rejected,
                "Rows excluded from aggregation"
            );
        }
        info!(
            month = %sheet.month,
            records = batch.records.len(),
            "Worksheet normalized"
        );
        records.extend(batch.records);
    }

    Ok(records)
}
