use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use hedgebot_web_api::ApiServer;

use super::{connect_engine, load_config};

/// Arguments for the serve command.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Listen address; defaults to `[server]` host:port from config
    #[arg(short, long)]
    pub addr: Option<String>,

    /// Database connection URL (overrides `[database].url`)
    #[arg(long, env = "DATABASE_URL")]
    pub db_url: Option<String>,
}

/// Starts the HTTP API.
///
/// # Errors
/// Returns an error if config loading, the database connection, or binding fails.
pub async fn run_serve(args: ServeArgs, profile: Option<&str>) -> Result<()> {
    let config = load_config(profile)?;
    let addr = args.addr.unwrap_or_else(|| config.server.addr());
    let engine = connect_engine(&config, args.db_url).await?;

    tracing::info!(
        addr,
        spike_multiplier = config.hedge.volatility_spike_multiplier,
        recovery_buffer = config.hedge.volatility_recovery_buffer,
        drawdown_trigger_r = config.hedge.drawdown_trigger_r,
        "Starting hedge API"
    );
    ApiServer::new(Arc::new(engine)).serve(&addr).await
}
