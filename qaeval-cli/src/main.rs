//! qaeval CLI - QA evaluation dataset service
//!
//! Entry point for the `qaeval` command-line tool, which provides:
//! - The HTTP API server (`serve`)
//! - Schema bootstrap and inspection (`db`)
//! - JSON and CSV import (`import`, `import-csv`)
//! - Batch LLM scoring of standard pairs (`evaluate`, `models`)
//! - Admin account bootstrap (`users create-admin`)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use qaeval_core::{load_dotenv, QaEvalConfig};

mod commands;
mod config;
mod tracing_setup;
mod ui;

#[derive(Parser, Debug)]
#[command(
    name = "qaeval",
    author,
    version,
    about = "Question/answer evaluation dataset service: import, annotate, score and report",
    long_about = "Manage a MySQL-backed dataset of raw and curated question/answer pairs. \
                  Import data, promote raw answers to the standard set, score pairs with \
                  LLM judges and serve everything over an authenticated HTTP API."
)]
struct Cli {
    /// Debug logging (unless RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    /// Suppress progress spinners and bars
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create, list and inspect database tables
    Db(commands::db::DbArgs),
    /// Import a JSON file (single table or multi-table document)
    Import(commands::import::ImportArgs),
    /// Import a CSV file into one table
    ImportCsv(commands::import::ImportCsvArgs),
    /// Score standard pairs with an LLM judge
    Evaluate(commands::evaluate::EvaluateArgs),
    /// List judge models and provider availability
    Models(commands::models::ModelsArgs),
    /// Manage user accounts
    Users(commands::users::UsersArgs),
    /// Show or validate configuration
    Config(config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Completions(args) = cli.command {
        return run_completions(args);
    }

    load_dotenv();
    let config = QaEvalConfig::load().context("Failed to load configuration")?;

    tracing_setup::init(&tracing_setup::TracingConfig {
        debug: cli.debug || config.app.debug,
        default_level: config.app.log_level.clone(),
    })
    .ok();
    ui::init_quiet_mode(cli.quiet);

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, config).await?,
        Commands::Db(args) => commands::run_db(args, &config).await?,
        Commands::Import(args) => commands::run_import(args, &config).await?,
        Commands::ImportCsv(args) => commands::run_import_csv(args, &config).await?,
        Commands::Evaluate(args) => commands::run_evaluate(args, &config).await?,
        Commands::Models(args) => commands::run_models(args, &config)?,
        Commands::Users(args) => commands::run_users(args, &config).await?,
        Commands::Config(args) => config::run_config(args, &config)?,
        Commands::Completions(args) => run_completions(args)?,
    }
    Ok(())
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
