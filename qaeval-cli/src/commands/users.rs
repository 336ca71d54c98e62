//! Account administration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use qaeval_core::QaEvalConfig;
use qaeval_server::auth::{AuthService, SessionStore, TokenKeys, DEFAULT_ADMIN_USERNAME};
use uuid::Uuid;

use super::connect;

#[derive(Parser, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommands,
}

#[derive(Subcommand, Debug)]
pub enum UsersCommands {
    /// Create the first admin account (refused if one exists)
    CreateAdmin(CreateAdminArgs),
}

#[derive(Parser, Debug)]
pub struct CreateAdminArgs {
    /// Login name
    #[arg(long, default_value = DEFAULT_ADMIN_USERNAME)]
    pub username: String,

    /// Initial password (at least 8 characters with a letter and a digit)
    #[arg(long, env = "QAEVAL_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run_users(args: UsersArgs, config: &QaEvalConfig) -> Result<()> {
    match args.command {
        UsersCommands::CreateAdmin(args) => create_admin(args, config).await,
    }
}

async fn create_admin(args: CreateAdminArgs, config: &QaEvalConfig) -> Result<()> {
    let pool = connect(config).await?;

    // No tokens are issued here; any secret will do when none is configured.
    let secret = config
        .auth
        .jwt_secret
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let keys = TokenKeys::new(&secret, config.auth.jwt_expiration_hours)?;
    let sessions = SessionStore::new();

    let user_id = AuthService::new(&pool, &keys, &sessions)
        .create_admin(Some(&args.username), &args.password)
        .await
        .context("Failed to create admin account")?;

    println!("✅ Created admin '{}' (user_id {})", args.username, user_id);
    Ok(())
}
