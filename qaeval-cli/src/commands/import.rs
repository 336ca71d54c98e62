//! JSON and CSV import commands

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use qaeval_core::QaEvalConfig;
use qaeval_server::import::{ImportReport, Importer, Payload, TableOutcome};
use serde_json::Value;

use super::{connect, print_json};
use crate::ui;

#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// JSON file: an array of records, or an object mapping table names to arrays
    pub file: PathBuf,

    /// Target table (required when the file holds a bare array)
    #[arg(long, short = 't')]
    pub table: Option<String>,

    /// Import tables in dependency order (parents before children)
    #[arg(long)]
    pub ordered: bool,

    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct ImportCsvArgs {
    /// CSV file to import
    pub file: PathBuf,

    /// Target table
    #[arg(long, short = 't')]
    pub table: String,

    /// The first row is data, columns map positionally
    #[arg(long)]
    pub no_header: bool,
}

pub async fn run_import(args: ImportArgs, config: &QaEvalConfig) -> Result<()> {
    let text = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", args.file.display()))?;
    let payload = Payload::detect(value)?;
    if matches!(payload, Payload::SingleTable(_)) && args.table.is_none() {
        bail!("{} holds a bare array; pass --table", args.file.display());
    }

    let pool = connect(config).await?;
    let importer = Importer::new(&pool);

    match payload {
        Payload::SingleTable(records) => {
            let table = args.table.as_deref().unwrap_or_default();
            let outcome = ui::with_spinner_async(
                format!("Importing {} records into {}", records.len(), table),
                format!("{table} done"),
                importer.import_table(table, &records),
            )
            .await?;
            report_table(table, &outcome, args.json)
        }
        Payload::MultiTable(tables) => {
            if args.table.is_some() {
                tracing::warn!("--table is ignored for multi-table files");
            }
            let msg = format!("Importing {} table(s)", tables.len());
            let report = if args.ordered {
                ui::with_spinner_async(msg, "import finished", importer.import_ordered(&tables)).await?
            } else {
                ui::with_spinner_async(msg, "import finished", importer.import_batch(&tables)).await?
            };
            report_batch(&report, args.json)
        }
    }
}

pub async fn run_import_csv(args: ImportCsvArgs, config: &QaEvalConfig) -> Result<()> {
    let input = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let pool = connect(config).await?;
    let outcome = ui::with_spinner_async(
        format!("Importing {} into {}", args.file.display(), args.table),
        format!("{} done", args.table),
        Importer::new(&pool).import_csv(&args.table, &input, !args.no_header),
    )
    .await?;

    report_table(&args.table, &outcome, false)
}

fn report_table(table: &str, outcome: &TableOutcome, json: bool) -> Result<()> {
    if json {
        print_json(outcome)?;
    } else {
        println!("{table}: {}", outcome.message);
    }
    if outcome.is_failed() {
        bail!("import into {table} failed");
    }
    Ok(())
}

fn report_batch(report: &ImportReport, json: bool) -> Result<()> {
    if json {
        print_json(report)?;
    } else {
        for t in &report.tables {
            println!("{}: {}", t.table, t.outcome.message);
        }
        for warning in &report.warnings {
            println!("⚠ {warning}");
        }
        println!("total imported: {}", report.total_imported);
    }
    if !report.success {
        bail!("one or more tables failed to import");
    }
    Ok(())
}
