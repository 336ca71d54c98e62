//! HTTP server command
//!
//! Runs the qaeval API: auth, browsing, import, annotation, evaluation and
//! reports.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use qaeval_core::QaEvalConfig;
use qaeval_llm::{Evaluator, ProviderRegistry};
use qaeval_server::auth::TokenKeys;
use qaeval_server::http::{run_server, AppState, ServerConfig};

use super::connect;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: SERVER_HOST:SERVER_PORT, 127.0.0.1:3030)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment)
    #[arg(long)]
    pub database_url: Option<String>,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, mut config: QaEvalConfig) -> Result<()> {
    if let Some(url) = args.database_url {
        config.database.url = Some(url);
    }

    // Refuse to start without a signing secret
    let secret = config
        .require_jwt_secret()
        .context("Set JWT_SECRET in the environment, ./.env or ~/.qaeval/.env")?;
    let tokens = TokenKeys::new(secret, config.auth.jwt_expiration_hours)
        .context("Invalid token settings")?;

    let bind_addr = match args.bind {
        Some(addr) => addr,
        None => format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .context("SERVER_HOST/SERVER_PORT do not form a socket address")?,
    };

    let registry = ProviderRegistry::from_config(&config.llm).context("Failed to set up LLM providers")?;
    let evaluator = Evaluator::new(Arc::new(registry));

    let pool = connect(&config).await?;

    tracing::info!("Starting qaeval server on {}", bind_addr);

    let server_config = ServerConfig {
        bind_addr,
        cors_permissive: args.cors_permissive || config.server.cors_permissive,
    };

    // Run server (blocks until shutdown)
    run_server(AppState::new(pool, evaluator, tokens), server_config)
        .await
        .context("Server error")?;

    Ok(())
}
