//! Banknote Dashboard - Main Entry Point
//!
//! Uploads a CSV of banknote measurements to the serving API and renders
//! the verdicts in the terminal.

mod client;
mod constants;
mod render;
mod report;
mod session;
mod table;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use client::{ApiClient, ApiConfig};
use report::StatusFilter;
use session::{Phase, Session};
use table::{Table, UploadedFile};

#[derive(Parser, Debug)]
#[command(
    name = "banknote-dashboard",
    about = "Detect counterfeit banknotes from a CSV of measurements"
)]
struct Args {
    /// Serving API base URL
    #[arg(long, default_value = constants::DEFAULT_API_URL, env = "BANKNOTE_API_URL")]
    api_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = constants::DEFAULT_TIMEOUT_SECS, env = "BANKNOTE_API_TIMEOUT")]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Test the connection to the serving API
    Check,

    /// Show the columns and first rows of a CSV
    Preview {
        file: PathBuf,

        #[arg(long, default_value_t = constants::DEFAULT_PREVIEW_ROWS)]
        rows: usize,
    },

    /// Score every row of a CSV and show the report
    Detect {
        file: PathBuf,

        #[arg(long, default_value_t = constants::DEFAULT_PREVIEW_ROWS)]
        rows: usize,

        /// Rows shown in the results table and written by --export
        #[arg(long, value_enum, default_value_t = StatusFilter::All)]
        filter: StatusFilter,

        /// Write the filtered results to this CSV
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = ApiConfig {
        base_url: args.api_url,
        timeout_seconds: args.timeout,
    };

    match args.command {
        Command::Check => check(config).await,
        Command::Preview { file, rows } => {
            let mut session = Session::new();
            let table = session.select_file(open(&file)?)?;
            print_preview(table, rows);
            Ok(())
        }
        Command::Detect { file, rows, filter, export: export_path } => {
            detect(config, &file, rows, filter, export_path.as_deref()).await
        }
    }
}

fn open(path: &Path) -> anyhow::Result<UploadedFile> {
    UploadedFile::open(path).with_context(|| format!("Failed to open {}", path.display()))
}

async fn check(config: ApiConfig) -> anyhow::Result<()> {
    let url = config.base_url.clone();
    let client = ApiClient::new(config)?;

    match client.health_check().await {
        Ok(health) => {
            println!("✅ API reachable at {}", url);
            println!("Status:        {}", health.status);
            println!("Models loaded: {}", health.models_loaded);
            println!("Columns:       {}", health.expected_columns.join(", "));
            Ok(())
        }
        Err(e) => anyhow::bail!("API unreachable at {}: {}", url, e),
    }
}

async fn detect(
    config: ApiConfig,
    file: &Path,
    rows: usize,
    filter: StatusFilter,
    export_path: Option<&Path>,
) -> anyhow::Result<()> {
    let client = ApiClient::new(config)?;
    let mut session = Session::new();

    let table = session.select_file(open(file)?)?;
    print_preview(table, rows);

    println!("\nAnalysing {}...", file.display());
    let report = match session.submit(&client).await {
        Phase::Results(report) => report,
        Phase::Failed(msg) => anyhow::bail!("{}", msg),
        other => anyhow::bail!("Detection did not complete ({:?})", other),
    };

    let summary = report.summary();
    println!("\n{}", render::metrics(summary));
    print!("{}", render::chart(summary));

    let view = report.filtered(filter);
    println!("\nResults ({:?}, {} rows):", filter, view.len());
    print!("{}", render::table(&view.head(rows)));
    if view.len() > rows {
        println!("... {} more rows", view.len() - rows);
    }

    if let Some(path) = export_path {
        export(&view, path)?;
        println!("\nExported {} rows to {}", view.len(), path.display());
    }

    println!("\n{}", render::alert(summary));
    Ok(())
}

fn print_preview(table: &Table, rows: usize) {
    println!("Columns: {}", table.headers().join(", "));
    let missing = table.missing_columns();
    if !missing.is_empty() {
        println!("⚠️  Missing required columns: {}", missing.join(", "));
    }

    println!("\nFirst {} of {} rows:", rows.min(table.len()), table.len());
    print!("{}", render::table(&table.head(rows)));
}

/// Write `table` as UTF-8 CSV to `path`
fn export(table: &Table, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    table
        .write_csv(BufWriter::new(file))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Exported {} rows to {}", table.len(), path.display());
    Ok(())
}
