//! Command implementations for the qaeval CLI

pub mod db;
pub mod evaluate;
pub mod import;
pub mod models;
pub mod serve;
pub mod users;

use anyhow::{Context, Result};
use qaeval_core::QaEvalConfig;
use qaeval_server::db::{create_pool_with_options, MySqlPool};

// Re-export main dispatcher functions for flat access from main.rs
pub use db::run_db;
pub use evaluate::run_evaluate;
pub use import::{run_import, run_import_csv};
pub use models::run_models;
pub use serve::run_serve;
pub use users::run_users;

/// Connect with the configured pool size.
pub(crate) async fn connect(config: &QaEvalConfig) -> Result<MySqlPool> {
    config.validate().context("Configuration is invalid")?;
    create_pool_with_options(&config.database_url(), config.database.pool_size)
        .await
        .context("Failed to connect to MySQL")
}

/// Pretty-printed JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
