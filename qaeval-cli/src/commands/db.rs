//! Schema bootstrap and inspection

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use qaeval_core::QaEvalConfig;
use qaeval_server::db::introspect::foreign_keys;
use qaeval_server::db::repos::TableRepo;
use qaeval_server::db::schema::{create_tables, StatementStatus};

use super::{connect, print_json};
use crate::ui;

#[derive(Parser, Debug)]
pub struct DbArgs {
    #[command(subcommand)]
    pub command: DbCommands,
}

#[derive(Subcommand, Debug)]
pub enum DbCommands {
    /// Create all tables and constraints (safe to re-run)
    Init,
    /// List tables in the configured database
    Tables,
    /// List foreign-key relations
    ForeignKeys {
        /// Print JSON instead of one relation per line
        #[arg(long)]
        json: bool,
    },
}

pub async fn run_db(args: DbArgs, config: &QaEvalConfig) -> Result<()> {
    let pool = connect(config).await?;

    match args.command {
        DbCommands::Init => {
            let pb = ui::spinner("Creating tables and constraints");
            let report = create_tables(&pool).await;
            for stmt in &report.statements {
                let mark = match stmt.status {
                    StatementStatus::Applied => "✓",
                    StatementStatus::AlreadyPresent => "·",
                    StatementStatus::Failed => "✗",
                };
                tracing::debug!(statement = stmt.name, "{}", stmt.message);
                if let Some(pb) = &pb {
                    pb.println(format!("{mark} {}: {}", stmt.name, stmt.message));
                } else {
                    println!("{mark} {}: {}", stmt.name, stmt.message);
                }
            }
            if report.success {
                ui::finish_success(pb, "schema ready");
            } else {
                let failed = report.failures().count();
                ui::finish_error(pb, format!("{failed} statement(s) failed"));
                bail!("schema initialization finished with {failed} failure(s)");
            }
        }
        DbCommands::Tables => {
            for table in TableRepo::new(&pool).list().await? {
                println!("{table}");
            }
        }
        DbCommands::ForeignKeys { json } => {
            let keys = foreign_keys(&pool).await?;
            if json {
                print_json(&keys)?;
            } else {
                for fk in keys {
                    println!("{fk}");
                }
            }
        }
    }

    Ok(())
}
