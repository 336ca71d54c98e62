use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use qaeval_core::QaEvalConfig;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration with secrets masked
    Show(ShowArgs),
    /// Validate database settings and numeric ranges
    Validate,
    /// Show which config file is in use
    Path,
}

#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Print JSON instead of TOML
    #[arg(long)]
    pub json: bool,
}

pub fn run_config(args: ConfigArgs, config: &QaEvalConfig) -> Result<()> {
    match args.command {
        ConfigCommands::Show(args) => run_show(args, config),
        ConfigCommands::Validate => run_validate(config),
        ConfigCommands::Path => run_path(),
    }
}

fn run_show(args: ShowArgs, config: &QaEvalConfig) -> Result<()> {
    let redacted = config.redacted();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&redacted)?);
    } else {
        print!("{}", redacted.to_toml().context("Failed to render config")?);
    }
    Ok(())
}

fn run_validate(config: &QaEvalConfig) -> Result<()> {
    config.validate().context("Configuration is invalid")?;

    println!("✅ Configuration is valid");
    println!("   database: {}", redacted_target(config));
    match config.auth.jwt_secret {
        Some(_) => println!("   JWT_SECRET: set"),
        None => println!("   ⚠ JWT_SECRET not set (required by `qaeval serve`)"),
    }
    if config.llm.openai_api_key.is_none() && config.llm.anthropic_api_key.is_none() {
        println!("   ⚠ no LLM API keys set, evaluation is unavailable");
    }
    Ok(())
}

fn run_path() -> Result<()> {
    match QaEvalConfig::find_config_file() {
        Some(path) => println!("{}", path.display()),
        None => println!("(no config file, using defaults and environment)"),
    }
    Ok(())
}

fn redacted_target(config: &QaEvalConfig) -> String {
    let db = &config.database;
    match &config.redacted().database.url {
        Some(url) => url.clone(),
        None => format!("{}@{}:{}/{}", db.user, db.host, db.port, db.name),
    }
}
